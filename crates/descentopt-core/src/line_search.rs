//! Line search algorithms for gradient-based optimization.
//!
//! Given a point x, a descent direction p and an objective f, a line search
//! picks a step size α > 0 for the update x + α p. The searches here work on
//! the one-dimensional restriction
//!
//! φ(α) = f(x + α p),    φ'(α) = ∇f(x + α p) · p
//!
//! # Acceptance Conditions
//!
//! ## Armijo Condition (Sufficient Decrease)
//! φ(α) ≤ φ(0) + c₁ α φ'(0)
//!
//! ## Strong Wolfe Conditions
//! 1. Armijo: φ(α) ≤ φ(0) + c₁ α φ'(0)
//! 2. Strong curvature: |φ'(α)| ≤ c₂ |φ'(0)|
//!
//! where 0 < c₁ < c₂ < 1.
//!
//! # Algorithm Variants
//!
//! ## Backtracking Line Search
//! Tries α = 1, then the minimizer of the quadratic interpolating φ(0),
//! φ'(0) and φ(1), then repeatedly the minimizer of the cubic through the
//! last two trials. A trial that would shrink the step by less than 4% or by
//! more than half is replaced by plain halving. Only φ is evaluated.
//!
//! ## Strong Wolfe Line Search
//! Moré–Thuente search: keeps an interval of uncertainty that is known to
//! contain a point satisfying both conditions, and picks each new trial from
//! safeguarded cubic and quadratic interpolants of φ and φ'. Evaluates φ and
//! φ' at every trial, and φ'(0) once more at the start.
//!
//! # Outcome
//!
//! Running out of budget, or hitting a numerical limit, is not an error: the
//! search returns [`LineSearchOutcome::Failed`] and the caller decides what
//! to do with it. Only invalid parameters and objective failures surface as
//! `Err`.
//!
//! # Examples
//!
//! ```rust
//! use descentopt_core::prelude::*;
//! use descentopt_core::test_functions::Booth;
//! use nalgebra::Vector2;
//!
//! let cost_fn = CountingCostFunction::new(Booth);
//! let point = Vector2::new(-4.0, -10.0);
//! let (value, gradient) = cost_fn.cost_and_gradient(&point)?;
//! let direction = -&gradient;
//!
//! let mut line_search = StrongWolfeLineSearch::new();
//! let params = LineSearchParams::strong_wolfe();
//! let outcome = line_search.search(&cost_fn, &point, value, &gradient, &direction, &params)?;
//!
//! assert!(outcome.is_success());
//! # Ok::<(), descentopt_core::error::OptimizerError>(())
//! ```

use crate::{
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult, Result},
    types::{Direction, Point, Scalar},
};
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim};
use num_traits::Float;
use std::fmt::{self, Debug};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Accepted step of a successful line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchResult<T> {
    /// The accepted step size α
    pub step_size: T,

    /// The objective value φ(α) at the accepted step
    pub new_value: T,

    /// Objective evaluations performed by the search
    pub function_evals: usize,

    /// Gradient evaluations performed by the search
    pub gradient_evals: usize,
}

/// Why a line search gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// φ'(0) is not negative
    NotDescentDirection,
    /// The evaluation budget ran out
    BudgetExhausted,
    /// The step shrank below the minimum step size
    StepBelowMinimum,
    /// The search stalled at the smallest allowed step
    StepAtMinimum,
    /// The search stalled at the largest allowed step
    StepAtMaximum,
    /// Rounding errors prevent further progress
    RoundingErrors,
    /// The interval of uncertainty fell below tolerance
    IntervalTooSmall,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotDescentDirection => "search direction is not a descent direction",
            Self::BudgetExhausted => "evaluation budget exhausted",
            Self::StepBelowMinimum => "step size fell below the minimum",
            Self::StepAtMinimum => "step size stuck at the minimum",
            Self::StepAtMaximum => "step size stuck at the maximum",
            Self::RoundingErrors => "rounding errors prevent progress",
            Self::IntervalTooSmall => "interval of uncertainty below tolerance",
        };
        f.write_str(text)
    }
}

/// Details of a failed line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchFailure<T> {
    /// Why the search stopped
    pub reason: FailureReason,

    /// Last step size tried
    pub last_step_size: T,

    /// Objective evaluations performed by the search
    pub function_evals: usize,

    /// Gradient evaluations performed by the search
    pub gradient_evals: usize,
}

/// Outcome of a line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineSearchOutcome<T> {
    /// A step satisfying the acceptance condition was found
    Success(LineSearchResult<T>),
    /// No acceptable step was found
    Failed(LineSearchFailure<T>),
}

impl<T: Copy> LineSearchOutcome<T> {
    /// True if the search found an acceptable step.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The accepted step size, if any.
    pub fn step_size(&self) -> Option<T> {
        match self {
            Self::Success(result) => Some(result.step_size),
            Self::Failed(_) => None,
        }
    }

    /// Objective evaluations performed, whatever the outcome.
    pub fn function_evals(&self) -> usize {
        match self {
            Self::Success(result) => result.function_evals,
            Self::Failed(failure) => failure.function_evals,
        }
    }

    /// Gradient evaluations performed, whatever the outcome.
    pub fn gradient_evals(&self) -> usize {
        match self {
            Self::Success(result) => result.gradient_evals,
            Self::Failed(failure) => failure.gradient_evals,
        }
    }
}

/// Parameters for line search algorithms.
///
/// # Wolfe Condition Constants
/// - **c₁ (Armijo parameter)**: sufficient decrease requirement, in (0, 1)
/// - **c₂ (curvature parameter)**: curvature requirement, in (c₁, 1)
///
/// # Step Size Management
/// - **initial_step_size**: first trial step α₀
/// - **min_step_size** / **max_step_size**: bounds on trial steps
/// - **max_iterations**: evaluation budget
/// - **xtol**: relative width below which a Wolfe bracket is collapsed
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineSearchParams<T>
where
    T: Scalar,
{
    /// Initial step size α₀ for line search start
    pub initial_step_size: T,

    /// Maximum allowable step size
    pub max_step_size: T,

    /// Minimum step size threshold before declaring line search failure
    pub min_step_size: T,

    /// Maximum number of trial steps before termination
    pub max_iterations: usize,

    /// Armijo parameter c₁ ∈ (0,1) for sufficient decrease condition
    /// φ(α) ≤ φ(0) + c₁αφ'(0)
    pub c1: T,

    /// Wolfe parameter c₂ ∈ (c₁,1) for curvature condition
    /// |φ'(α)| ≤ c₂|φ'(0)|
    pub c2: T,

    /// Relative tolerance on the width of the Wolfe interval of uncertainty
    pub xtol: T,
}

impl<T> Default for LineSearchParams<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            initial_step_size: T::one(),
            max_step_size: T::MAX_STEP_SIZE,
            min_step_size: T::MIN_STEP_SIZE,
            max_iterations: 100,
            c1: <T as Scalar>::from_f64(crate::types::constants::DEFAULT_C1),
            c2: <T as Scalar>::from_f64(crate::types::constants::DEFAULT_C2),
            xtol: T::INTERVAL_TOLERANCE,
        }
    }
}

impl<T> LineSearchParams<T>
where
    T: Scalar,
{
    /// Validates line search parameters.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidConfiguration` if:
    /// - Step sizes violate positivity or ordering constraints
    /// - Wolfe constants don't satisfy 0 < c₁ < c₂ < 1
    /// - The interval tolerance is negative
    /// - Maximum iterations is zero
    pub fn validate(&self) -> OptimizerResult<()> {
        if !(self.min_step_size > T::zero()) {
            return Err(invalid("Minimum step size must be positive", "min_step_size", self.min_step_size));
        }

        if !(self.max_step_size > self.min_step_size) {
            return Err(invalid(
                "Maximum step size must be greater than minimum step size",
                "max_step_size",
                self.max_step_size,
            ));
        }

        if !(self.initial_step_size >= self.min_step_size && self.initial_step_size <= self.max_step_size) {
            return Err(invalid(
                "Initial step size must lie within [min_step_size, max_step_size]",
                "initial_step_size",
                self.initial_step_size,
            ));
        }

        if !(self.c1 > T::zero() && self.c1 < T::one()) {
            return Err(invalid("Armijo constant c1 must be in (0, 1)", "c1", self.c1));
        }

        if !(self.c2 > self.c1 && self.c2 < T::one()) {
            return Err(invalid("Wolfe constant c2 must satisfy c1 < c2 < 1", "c2", self.c2));
        }

        if !(self.xtol >= T::zero()) {
            return Err(invalid("Interval tolerance must be non-negative", "xtol", self.xtol));
        }

        if self.max_iterations == 0 {
            return Err(OptimizerError::invalid_configuration(
                "Maximum iterations must be at least 1",
                "max_iterations",
                "0",
            ));
        }

        Ok(())
    }

    /// Parameters for the strong Wolfe search: c₁ = 10⁻³, c₂ = 0.9,
    /// steps in [10⁻⁸, 50], 100 trials.
    pub fn strong_wolfe() -> Self {
        Self::default()
    }

    /// Parameters for Armijo backtracking: c₁ = 10⁻³, steps down to machine
    /// epsilon, 100 trials.
    pub fn armijo() -> Self {
        Self {
            min_step_size: T::EPSILON,
            ..Self::default()
        }
    }

    /// Sets the Armijo constant c₁.
    pub fn with_c1(mut self, c1: T) -> Self {
        self.c1 = c1;
        self
    }

    /// Sets the curvature constant c₂.
    pub fn with_c2(mut self, c2: T) -> Self {
        self.c2 = c2;
        self
    }

    /// Sets the trial budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the first trial step.
    pub fn with_initial_step_size(mut self, step_size: T) -> Self {
        self.initial_step_size = step_size;
        self
    }
}

fn invalid<T: Scalar>(reason: &str, parameter: &str, value: T) -> OptimizerError {
    OptimizerError::invalid_configuration(reason, parameter, value.to_string())
}

/// Interface for line search algorithms.
///
/// Implementations look for α > 0 along a descent direction p (φ'(0) < 0)
/// and report the result as a [`LineSearchOutcome`]. Every objective and
/// gradient evaluation goes through `cost_fn`, so a counting wrapper sees the
/// search's own evaluations.
pub trait LineSearch<T>: Debug
where
    T: Scalar,
{
    /// Performs a line search along `direction`.
    ///
    /// By default computes φ'(0) = `gradient · direction` and delegates to
    /// [`search_with_deriv`](Self::search_with_deriv).
    ///
    /// # Errors
    ///
    /// Returns errors for invalid parameters and for objective evaluation
    /// failures. A search that finds no acceptable step is `Ok(Failed(_))`.
    #[allow(clippy::too_many_arguments)]
    fn search<C, D>(
        &mut self,
        cost_fn: &C,
        point: &Point<T, D>,
        value: T,
        gradient: &Direction<T, D>,
        direction: &Direction<T, D>,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchOutcome<T>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        let directional_deriv = gradient.dot(direction);
        self.search_with_deriv(cost_fn, point, value, direction, directional_deriv, params)
    }

    /// Line search with a pre-computed directional derivative φ'(0).
    #[allow(clippy::too_many_arguments)]
    fn search_with_deriv<C, D>(
        &mut self,
        cost_fn: &C,
        point: &Point<T, D>,
        value: T,
        direction: &Direction<T, D>,
        directional_deriv: T,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchOutcome<T>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>;

    /// Returns a human-readable name identifying the line search algorithm.
    fn name(&self) -> &str;
}

/// Returns `point + step_size * direction`.
pub fn step_along<T, D>(point: &Point<T, D>, direction: &Direction<T, D>, step_size: T) -> Point<T, D>
where
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    let mut trial = point.clone();
    trial.axpy(step_size, direction, T::one());
    trial
}

/// The restriction φ of the objective to the search line, with counters.
struct LineFunction<'a, T, D, C>
where
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    cost_fn: &'a C,
    point: &'a Point<T, D>,
    direction: &'a Direction<T, D>,
    function_evals: usize,
    gradient_evals: usize,
}

impl<'a, T, D, C> LineFunction<'a, T, D, C>
where
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
    C: CostFunction<T, D>,
{
    fn new(cost_fn: &'a C, point: &'a Point<T, D>, direction: &'a Direction<T, D>) -> Self {
        Self {
            cost_fn,
            point,
            direction,
            function_evals: 0,
            gradient_evals: 0,
        }
    }

    /// φ(α)
    fn value(&mut self, step_size: T) -> Result<T> {
        let trial = step_along(self.point, self.direction, step_size);
        self.function_evals += 1;
        self.cost_fn.cost(&trial)
    }

    /// φ'(0), from a fresh gradient at the starting point
    fn initial_slope(&mut self) -> Result<T> {
        self.gradient_evals += 1;
        Ok(self.cost_fn.gradient(self.point)?.dot(self.direction))
    }

    /// (φ(α), φ'(α))
    fn value_and_slope(&mut self, step_size: T) -> Result<(T, T)> {
        let trial = step_along(self.point, self.direction, step_size);
        self.function_evals += 1;
        let value = self.cost_fn.cost(&trial)?;
        self.gradient_evals += 1;
        let slope = self.cost_fn.gradient(&trial)?.dot(self.direction);
        Ok((value, slope))
    }

    fn success(&self, step_size: T, new_value: T) -> LineSearchOutcome<T> {
        LineSearchOutcome::Success(LineSearchResult {
            step_size,
            new_value,
            function_evals: self.function_evals,
            gradient_evals: self.gradient_evals,
        })
    }

    fn failure(&self, reason: FailureReason, last_step_size: T) -> LineSearchOutcome<T> {
        tracing::trace!(
            %reason,
            last_step_size = Scalar::to_f64(last_step_size),
            function_evals = self.function_evals,
            "line search failed"
        );
        LineSearchOutcome::Failed(LineSearchFailure {
            reason,
            last_step_size,
            function_evals: self.function_evals,
            gradient_evals: self.gradient_evals,
        })
    }
}

/// Backtracking line search with the Armijo sufficient decrease condition.
///
/// Trial steps shrink through quadratic, then cubic interpolation of φ,
/// safeguarded so that each new step is between 4% and 50% smaller than the
/// previous one. Only objective values are used; the gradient at trial
/// points is never evaluated.
///
/// The search fails when φ'(0) ≥ 0, when the step drops to
/// `min_step_size`, or when `max_iterations` trials have been spent.
#[derive(Debug, Clone, Copy)]
pub struct BacktrackingLineSearch;

impl BacktrackingLineSearch {
    /// Creates a new backtracking line search.
    pub fn new() -> Self {
        Self
    }
}

impl Default for BacktrackingLineSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LineSearch<T> for BacktrackingLineSearch
where
    T: Scalar,
{
    fn search_with_deriv<C, D>(
        &mut self,
        cost_fn: &C,
        point: &Point<T, D>,
        value: T,
        direction: &Direction<T, D>,
        directional_deriv: T,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchOutcome<T>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        params.validate()?;

        let mut phi = LineFunction::new(cost_fn, point, direction);
        let phi0 = value;
        let derphi0 = directional_deriv;
        let c1 = params.c1;

        if !(derphi0 < T::zero()) {
            return Ok(phi.failure(FailureReason::NotDescentDirection, T::zero()));
        }

        let armijo = |alpha: T, phi_alpha: T| phi_alpha <= phi0 + c1 * alpha * derphi0;

        let mut alpha0 = params.initial_step_size;
        let mut phi_a0 = phi.value(alpha0)?;
        if armijo(alpha0, phi_a0) {
            return Ok(phi.success(alpha0, phi_a0));
        }
        if phi.function_evals >= params.max_iterations {
            return Ok(phi.failure(FailureReason::BudgetExhausted, alpha0));
        }

        // Minimizer of the quadratic through φ(0), φ'(0) and φ(α₀).
        let two = <T as Scalar>::from_f64(2.0);
        let mut alpha1 = -derphi0 * alpha0 * alpha0 / two / (phi_a0 - phi0 - derphi0 * alpha0);
        let mut phi_a1 = phi.value(alpha1)?;
        if armijo(alpha1, phi_a1) {
            return Ok(phi.success(alpha1, phi_a1));
        }

        let three = <T as Scalar>::from_f64(3.0);
        let half = <T as Scalar>::from_f64(0.5);
        let min_reduction = <T as Scalar>::from_f64(0.96);

        while alpha1 > params.min_step_size {
            if phi.function_evals >= params.max_iterations {
                return Ok(phi.failure(FailureReason::BudgetExhausted, alpha1));
            }

            // Minimizer of the cubic through φ(0), φ'(0), φ(α₀) and φ(α₁).
            let factor = alpha0 * alpha0 * alpha1 * alpha1 * (alpha1 - alpha0);
            let residual0 = phi_a0 - phi0 - derphi0 * alpha0;
            let residual1 = phi_a1 - phi0 - derphi0 * alpha1;
            let a = (alpha0 * alpha0 * residual1 - alpha1 * alpha1 * residual0) / factor;
            let b = (-(alpha0 * alpha0 * alpha0) * residual1 + alpha1 * alpha1 * alpha1 * residual0) / factor;
            let discriminant = Float::abs(b * b - three * a * derphi0);
            let mut alpha2 = (-b + Float::sqrt(discriminant)) / (three * a);

            let phi_a2 = phi.value(alpha2)?;
            if armijo(alpha2, phi_a2) {
                return Ok(phi.success(alpha2, phi_a2));
            }

            if (alpha1 - alpha2) > alpha1 * half || (T::one() - alpha2 / alpha1) < min_reduction {
                alpha2 = alpha1 * half;
            }

            alpha0 = alpha1;
            alpha1 = alpha2;
            phi_a0 = phi_a1;
            phi_a1 = phi_a2;
        }

        Ok(phi.failure(FailureReason::StepBelowMinimum, alpha1))
    }

    fn name(&self) -> &str {
        "Backtracking"
    }
}

/// Line search satisfying the strong Wolfe conditions.
///
/// Implements the Moré–Thuente algorithm. The search starts at
/// `initial_step_size` and keeps an interval [stx, sty] (unordered) of
/// uncertainty. Until the interval is known to bracket an acceptable step it
/// extrapolates, with trial steps growing between 1.1× and 4× the distance
/// from stx. Once bracketed, each trial comes from a safeguarded
/// interpolant, falling back to bisection when the interval does not shrink
/// by a third over two trials.
///
/// While no trial has satisfied sufficient decrease with a non-negative
/// slope, the search works on the auxiliary function
/// ψ(α) = φ(α) - φ(0) - c₁ α φ'(0), which keeps the bracket aligned with the
/// Armijo condition.
///
/// The search fails on budget exhaustion, when the step is stuck at
/// `min_step_size` or `max_step_size`, when the interval shrinks below
/// `xtol`, or when rounding errors push a trial outside the interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrongWolfeLineSearch;

impl StrongWolfeLineSearch {
    /// Creates a new strong Wolfe line search.
    pub fn new() -> Self {
        Self
    }
}

/// Interval of uncertainty of the Moré–Thuente search.
///
/// `stx` is the best step so far, `sty` the other endpoint. `fx`/`fy` and
/// `gx`/`gy` are the function values and slopes at the endpoints.
#[derive(Debug, Clone, Copy)]
struct Bracket<T> {
    stx: T,
    fx: T,
    gx: T,
    sty: T,
    fy: T,
    gy: T,
    bracketed: bool,
}

impl<T: Scalar> Bracket<T> {
    /// Computes a safeguarded trial step from the endpoints and the trial
    /// (stp, fp, dp), then updates the interval.
    ///
    /// Four cases, by the shape of the data:
    /// 1. higher value at the trial: the minimizer is bracketed; take the
    ///    cubic step unless the quadratic one is closer to stx.
    /// 2. lower value, slopes of opposite sign: bracketed; take the cubic or
    ///    secant step, whichever is farther from the trial.
    /// 3. lower value, same sign, slope magnitude decreasing: cubic step if
    ///    it points the right way, otherwise a step bound; then safeguarded.
    /// 4. lower value, same sign, slope not decreasing: cubic step toward
    ///    sty if bracketed, otherwise a step bound.
    fn safeguarded_step(&mut self, stp: T, fp: T, dp: T, stpmin: T, stpmax: T) -> T {
        let three = <T as Scalar>::from_f64(3.0);
        let half = <T as Scalar>::from_f64(0.5);
        let p66 = <T as Scalar>::from_f64(0.66);
        let (stx, fx, dx) = (self.stx, self.fx, self.gx);
        let (sty, fy, dy) = (self.sty, self.fy, self.gy);

        let sgnd = dp * (dx / Float::abs(dx));

        let stpf = if fp > fx {
            let theta = three * (fx - fp) / (stp - stx) + dx + dp;
            let s = max3(theta, dx, dp);
            let mut gamma = s * Float::sqrt((theta / s) * (theta / s) - (dx / s) * (dp / s));
            if stp < stx {
                gamma = -gamma;
            }
            let p = (gamma - dx) + theta;
            let q = ((gamma - dx) + gamma) + dp;
            let r = p / q;
            let stpc = stx + r * (stp - stx);
            let stpq = stx + ((dx / ((fx - fp) / (stp - stx) + dx)) / (T::one() + T::one())) * (stp - stx);
            self.bracketed = true;
            if Float::abs(stpc - stx) < Float::abs(stpq - stx) {
                stpc
            } else {
                stpc + (stpq - stpc) * half
            }
        } else if sgnd < T::zero() {
            let theta = three * (fx - fp) / (stp - stx) + dx + dp;
            let s = max3(theta, dx, dp);
            let mut gamma = s * Float::sqrt((theta / s) * (theta / s) - (dx / s) * (dp / s));
            if stp > stx {
                gamma = -gamma;
            }
            let p = (gamma - dp) + theta;
            let q = ((gamma - dp) + gamma) + dx;
            let r = p / q;
            let stpc = stp + r * (stx - stp);
            let stpq = stp + (dp / (dp - dx)) * (stx - stp);
            self.bracketed = true;
            if Float::abs(stpc - stp) > Float::abs(stpq - stp) {
                stpc
            } else {
                stpq
            }
        } else if Float::abs(dp) < Float::abs(dx) {
            let theta = three * (fx - fp) / (stp - stx) + dx + dp;
            let s = max3(theta, dx, dp);
            let radicand = Float::max(T::zero(), (theta / s) * (theta / s) - (dx / s) * (dp / s));
            let mut gamma = s * Float::sqrt(radicand);
            if stp > stx {
                gamma = -gamma;
            }
            let p = (gamma - dp) + theta;
            let q = (gamma + (dx - dp)) + gamma;
            let r = p / q;
            let stpc = if r < T::zero() && gamma != T::zero() {
                stp + r * (stx - stp)
            } else if stp > stx {
                stpmax
            } else {
                stpmin
            };
            let stpq = stp + (dp / (dp - dx)) * (stx - stp);

            if self.bracketed {
                let closer = if Float::abs(stpc - stp) < Float::abs(stpq - stp) {
                    stpc
                } else {
                    stpq
                };
                let limit = stp + p66 * (sty - stp);
                if stp > stx {
                    Float::min(limit, closer)
                } else {
                    Float::max(limit, closer)
                }
            } else {
                let farther = if Float::abs(stpc - stp) > Float::abs(stpq - stp) {
                    stpc
                } else {
                    stpq
                };
                Float::max(stpmin, Float::min(stpmax, farther))
            }
        } else if self.bracketed {
            let theta = three * (fp - fy) / (sty - stp) + dy + dp;
            let s = max3(theta, dy, dp);
            let mut gamma = s * Float::sqrt((theta / s) * (theta / s) - (dy / s) * (dp / s));
            if stp > sty {
                gamma = -gamma;
            }
            let p = (gamma - dp) + theta;
            let q = ((gamma - dp) + gamma) + dy;
            let r = p / q;
            stp + r * (sty - stp)
        } else if stp > stx {
            stpmax
        } else {
            stpmin
        };

        if fp > fx {
            self.sty = stp;
            self.fy = fp;
            self.gy = dp;
        } else {
            if sgnd < T::zero() {
                self.sty = stx;
                self.fy = fx;
                self.gy = dx;
            }
            self.stx = stp;
            self.fx = fp;
            self.gx = dp;
        }

        stpf
    }
}

fn max3<T: Scalar>(a: T, b: T, c: T) -> T {
    Float::max(Float::max(Float::abs(a), Float::abs(b)), Float::abs(c))
}

impl StrongWolfeLineSearch {
    /// Moré–Thuente iteration from φ(0) = `value` and φ'(0) = `directional_deriv`.
    fn run<T, D, C>(
        phi: &mut LineFunction<'_, T, D, C>,
        value: T,
        directional_deriv: T,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchOutcome<T>>
    where
        T: Scalar,
        D: Dim,
        DefaultAllocator: Allocator<D>,
        C: CostFunction<T, D>,
    {
        let finit = value;
        let ginit = directional_deriv;

        if !(ginit < T::zero()) {
            return Ok(phi.failure(FailureReason::NotDescentDirection, T::zero()));
        }

        let stpmin = params.min_step_size;
        let stpmax = params.max_step_size;
        let xtol = params.xtol;
        let gtest = params.c1 * ginit;
        let curvature_bound = params.c2 * -ginit;

        let half = <T as Scalar>::from_f64(0.5);
        let p66 = <T as Scalar>::from_f64(0.66);
        let xtrapl = <T as Scalar>::from_f64(1.1);
        let xtrapu = <T as Scalar>::from_f64(4.0);

        let mut bracket = Bracket {
            stx: T::zero(),
            fx: finit,
            gx: ginit,
            sty: T::zero(),
            fy: finit,
            gy: ginit,
            bracketed: false,
        };
        let mut sufficient_decrease_stage = true;
        let mut width = stpmax - stpmin;
        let mut width1 = width / half;

        let mut stp = params.initial_step_size;
        let mut stmin = T::zero();
        let mut stmax = stp + xtrapu * stp;

        // The first budget slot is spent on setting up the interval.
        for _ in 1..params.max_iterations {
            let (f, g) = phi.value_and_slope(stp)?;
            let ftest = finit + stp * gtest;

            if sufficient_decrease_stage && f <= ftest && g >= T::zero() {
                sufficient_decrease_stage = false;
            }

            // Later checks take precedence, convergence over every warning.
            let mut stop = None;
            if bracket.bracketed && (stp <= stmin || stp >= stmax) {
                stop = Some(FailureReason::RoundingErrors);
            }
            if bracket.bracketed && stmax - stmin <= xtol * stmax {
                stop = Some(FailureReason::IntervalTooSmall);
            }
            if stp == stpmax && f <= ftest && g <= gtest {
                stop = Some(FailureReason::StepAtMaximum);
            }
            if stp == stpmin && (f > ftest || g >= gtest) {
                stop = Some(FailureReason::StepAtMinimum);
            }
            if f <= ftest && Float::abs(g) <= curvature_bound {
                return Ok(phi.success(stp, f));
            }
            if let Some(reason) = stop {
                return Ok(phi.failure(reason, stp));
            }

            stp = if sufficient_decrease_stage && f <= bracket.fx && f > ftest {
                // Work on ψ(α) = φ(α) - φ(0) - c₁αφ'(0).
                let mut modified = Bracket {
                    fx: bracket.fx - bracket.stx * gtest,
                    gx: bracket.gx - gtest,
                    fy: bracket.fy - bracket.sty * gtest,
                    gy: bracket.gy - gtest,
                    ..bracket
                };
                let next = modified.safeguarded_step(stp, f - stp * gtest, g - gtest, stmin, stmax);
                bracket = Bracket {
                    fx: modified.fx + modified.stx * gtest,
                    gx: modified.gx + gtest,
                    fy: modified.fy + modified.sty * gtest,
                    gy: modified.gy + gtest,
                    ..modified
                };
                next
            } else {
                bracket.safeguarded_step(stp, f, g, stmin, stmax)
            };

            if bracket.bracketed {
                let span = Float::abs(bracket.sty - bracket.stx);
                if span >= p66 * width1 {
                    stp = bracket.stx + half * (bracket.sty - bracket.stx);
                }
                width1 = width;
                width = span;
            }

            if bracket.bracketed {
                stmin = Float::min(bracket.stx, bracket.sty);
                stmax = Float::max(bracket.stx, bracket.sty);
            } else {
                stmin = stp + xtrapl * (stp - bracket.stx);
                stmax = stp + xtrapu * (stp - bracket.stx);
            }

            stp = Float::min(Float::max(stp, stpmin), stpmax);

            if bracket.bracketed && (stp <= stmin || stp >= stmax || stmax - stmin <= xtol * stmax) {
                stp = bracket.stx;
            }
        }

        Ok(phi.failure(FailureReason::BudgetExhausted, stp))
    }
}

impl<T> LineSearch<T> for StrongWolfeLineSearch
where
    T: Scalar,
{
    /// Searches along `direction` from a freshly evaluated φ'(0).
    ///
    /// The gradient at `point` is recomputed through `cost_fn` and counted as
    /// one of the search's gradient evaluations; the `gradient` argument is
    /// not read. Use [`search_with_deriv`](LineSearch::search_with_deriv) to
    /// supply φ'(0) without that evaluation.
    fn search<C, D>(
        &mut self,
        cost_fn: &C,
        point: &Point<T, D>,
        value: T,
        _gradient: &Direction<T, D>,
        direction: &Direction<T, D>,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchOutcome<T>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        params.validate()?;

        let mut phi = LineFunction::new(cost_fn, point, direction);
        let directional_deriv = phi.initial_slope()?;
        Self::run(&mut phi, value, directional_deriv, params)
    }

    fn search_with_deriv<C, D>(
        &mut self,
        cost_fn: &C,
        point: &Point<T, D>,
        value: T,
        direction: &Direction<T, D>,
        directional_deriv: T,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchOutcome<T>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        params.validate()?;

        let mut phi = LineFunction::new(cost_fn, point, direction);
        Self::run(&mut phi, value, directional_deriv, params)
    }

    fn name(&self) -> &str {
        "StrongWolfe"
    }
}

/// Closed set of line-search strategies, selectable by name.
///
/// Names are matched case-insensitively: `"armijo"` selects
/// [`LineSearchMethod::Armijo`]; `"wolfe"` and `"armijo_wolfe"` select
/// [`LineSearchMethod::Wolfe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum LineSearchMethod {
    /// Armijo backtracking
    Armijo,
    /// Moré–Thuente strong Wolfe search
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "armijo_wolfe"))]
    Wolfe,
}

impl LineSearchMethod {
    /// Resolves a strategy name.
    pub fn parse(name: &str) -> OptimizerResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "armijo" => Ok(Self::Armijo),
            "wolfe" | "armijo_wolfe" => Ok(Self::Wolfe),
            _ => Err(OptimizerError::unsupported_method(name)),
        }
    }

    /// The line search implementing this strategy.
    pub fn strategy(self) -> LineSearchStrategy {
        match self {
            Self::Armijo => LineSearchStrategy::Backtracking(BacktrackingLineSearch::new()),
            Self::Wolfe => LineSearchStrategy::StrongWolfe(StrongWolfeLineSearch::new()),
        }
    }

    /// Default parameters for this strategy.
    pub fn default_params<T: Scalar>(self) -> LineSearchParams<T> {
        match self {
            Self::Armijo => LineSearchParams::armijo(),
            Self::Wolfe => LineSearchParams::strong_wolfe(),
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Armijo => "armijo",
            Self::Wolfe => "wolfe",
        }
    }
}

impl FromStr for LineSearchMethod {
    type Err = OptimizerError;

    fn from_str(s: &str) -> OptimizerResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for LineSearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved line search, dispatching to the concrete implementation.
#[derive(Debug, Clone, Copy)]
pub enum LineSearchStrategy {
    /// Armijo backtracking
    Backtracking(BacktrackingLineSearch),
    /// Strong Wolfe search
    StrongWolfe(StrongWolfeLineSearch),
}

impl<T> LineSearch<T> for LineSearchStrategy
where
    T: Scalar,
{
    fn search<C, D>(
        &mut self,
        cost_fn: &C,
        point: &Point<T, D>,
        value: T,
        gradient: &Direction<T, D>,
        direction: &Direction<T, D>,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchOutcome<T>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        match self {
            Self::Backtracking(search) => search.search(cost_fn, point, value, gradient, direction, params),
            Self::StrongWolfe(search) => search.search(cost_fn, point, value, gradient, direction, params),
        }
    }

    fn search_with_deriv<C, D>(
        &mut self,
        cost_fn: &C,
        point: &Point<T, D>,
        value: T,
        direction: &Direction<T, D>,
        directional_deriv: T,
        params: &LineSearchParams<T>,
    ) -> OptimizerResult<LineSearchOutcome<T>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        match self {
            Self::Backtracking(search) => {
                search.search_with_deriv(cost_fn, point, value, direction, directional_deriv, params)
            }
            Self::StrongWolfe(search) => {
                search.search_with_deriv(cost_fn, point, value, direction, directional_deriv, params)
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Backtracking(search) => LineSearch::<T>::name(search),
            Self::StrongWolfe(search) => LineSearch::<T>::name(search),
        }
    }
}
