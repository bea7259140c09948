//! Core optimizer traits and types for unconstrained minimization.
//!
//! This module provides the abstractions shared by descent algorithms:
//!
//! - **Optimizer trait**: interface for minimizing a [`CostFunction`] from an
//!   initial point
//! - **OptimizationResult**: final iterate with diagnostics
//! - **StoppingCriterion**: gradient tolerance and iteration budget
//! - **TerminationReason**: why a run stopped
//!
//! # Optimization Framework
//!
//! A descent run follows this structure:
//!
//! 1. **Initialization**: start with x₀, evaluate f(x₀) and ∇f(x₀)
//! 2. **Search direction**: choose pₖ (e.g., -∇f(xₖ))
//! 3. **Line search**: find a step size αₖ > 0
//! 4. **Update**: xₖ₊₁ = xₖ + αₖ pₖ
//! 5. **Convergence**: stop once ‖∇f(xₖ)‖ ≤ ε or k reaches the budget
//!
//! # Examples
//!
//! ```rust
//! use descentopt_core::optimizer::StoppingCriterion;
//!
//! let criterion = StoppingCriterion::<f64>::new()
//!     .with_gradient_tolerance(1e-10)
//!     .with_max_iterations(500);
//! assert!(criterion.validate().is_ok());
//! ```

use crate::{
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    types::{constants, Point, Scalar},
};
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim};
use std::fmt::{self, Debug};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of an optimization run.
///
/// # Diagnostics
///
/// - **Function evaluations**: total calls to f(x), line searches included
/// - **Gradient evaluations**: total calls to ∇f(x), line searches included
/// - **Fallback steps**: iterations whose step did not come from a successful
///   line search
/// - **Duration**: wall-clock time of the run
#[derive(Debug, Clone)]
pub struct OptimizationResult<T, P>
where
    T: Scalar,
{
    /// The final iterate xₖ
    pub point: P,

    /// The objective value f(xₖ) at the final point
    pub value: T,

    /// The gradient norm ‖∇f(xₖ)‖ at the final point
    pub gradient_norm: Option<T>,

    /// Number of completed iterations
    pub iterations: usize,

    /// Total number of objective evaluations
    pub function_evaluations: usize,

    /// Total number of gradient evaluations
    pub gradient_evaluations: usize,

    /// Iterations that used the fallback step size
    pub fallback_steps: usize,

    /// Wall-clock time elapsed during optimization
    pub duration: Duration,

    /// Reason for termination
    pub termination_reason: TerminationReason,

    /// True if the gradient tolerance was met
    pub converged: bool,
}

impl<T, P> OptimizationResult<T, P>
where
    T: Scalar,
{
    /// Creates a new optimization result.
    pub fn new(
        point: P,
        value: T,
        iterations: usize,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        Self {
            point,
            value,
            gradient_norm: None,
            iterations,
            function_evaluations: 0,
            gradient_evaluations: 0,
            fallback_steps: 0,
            duration,
            termination_reason,
            converged: termination_reason == TerminationReason::Converged,
        }
    }

    /// Sets the gradient norm at the final point.
    pub fn with_gradient_norm(mut self, norm: T) -> Self {
        self.gradient_norm = Some(norm);
        self
    }

    /// Sets the function evaluation count.
    pub fn with_function_evaluations(mut self, count: usize) -> Self {
        self.function_evaluations = count;
        self
    }

    /// Sets the gradient evaluation count.
    pub fn with_gradient_evaluations(mut self, count: usize) -> Self {
        self.gradient_evaluations = count;
        self
    }

    /// Sets the number of fallback steps.
    pub fn with_fallback_steps(mut self, count: usize) -> Self {
        self.fallback_steps = count;
        self
    }
}

/// Reasons for optimization termination.
///
/// # Normal Termination
/// - **Converged**: gradient norm at or below tolerance
/// - **MaxIterations**: iteration budget exhausted
///
/// # Early Termination
/// - **LineSearchFailed**: line search failed and no fallback step is configured
/// - **CallbackRequest**: a callback asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationReason {
    /// First-order condition satisfied: ‖∇f(x)‖ ≤ ε
    Converged,
    /// Maximum iteration count exhausted without convergence
    MaxIterations,
    /// Line search failed with no fallback step configured
    LineSearchFailed,
    /// Progress callback requested early termination
    CallbackRequest,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Converged => "converged",
            Self::MaxIterations => "maximum iterations reached",
            Self::LineSearchFailed => "line search failed",
            Self::CallbackRequest => "stopped by callback",
        };
        f.write_str(text)
    }
}

/// Stopping criteria for descent algorithms.
///
/// The loop continues while ‖∇f(xₖ)‖ > `gradient_tolerance` and
/// k < `max_iterations`. The comparison is strict, so a gradient whose norm
/// equals the tolerance stops the run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoppingCriterion<T>
where
    T: Scalar,
{
    /// Maximum number of iterations
    pub max_iterations: usize,

    /// Tolerance for the Euclidean gradient norm
    pub gradient_tolerance: T,
}

impl<T> Default for StoppingCriterion<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            max_iterations: constants::DEFAULT_MAX_ITERATIONS,
            gradient_tolerance: constants::gradient_tolerance(),
        }
    }
}

impl<T> StoppingCriterion<T>
where
    T: Scalar,
{
    /// Creates a new stopping criterion with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Sets the gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tol: T) -> Self {
        self.gradient_tolerance = tol;
        self
    }

    /// Checks that the tolerance is a non-negative number.
    ///
    /// A budget of zero iterations is valid and returns the starting point.
    pub fn validate(&self) -> OptimizerResult<()> {
        if !(self.gradient_tolerance >= T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "Gradient tolerance must be non-negative",
                "gradient_tolerance",
                self.gradient_tolerance.to_string(),
            ));
        }
        Ok(())
    }

    /// True while the loop should keep iterating.
    pub fn should_continue(&self, iteration: usize, gradient_norm: T) -> bool {
        gradient_norm > self.gradient_tolerance && iteration < self.max_iterations
    }

    /// Termination reason for a loop that stopped at `gradient_norm`.
    ///
    /// Only a norm within tolerance counts as converged. A NaN norm also ends
    /// the loop, and is reported as [`TerminationReason::MaxIterations`].
    pub fn termination_reason(&self, gradient_norm: T) -> TerminationReason {
        if gradient_norm <= self.gradient_tolerance {
            TerminationReason::Converged
        } else {
            TerminationReason::MaxIterations
        }
    }
}

/// Interface for unconstrained minimization algorithms.
pub trait Optimizer<T>: Debug
where
    T: Scalar,
{
    /// Returns a human-readable name identifying the algorithm.
    fn name(&self) -> &str;

    /// Minimizes `cost_fn` starting from `initial_point`.
    ///
    /// # Errors
    ///
    /// Returns errors for invalid configuration and for objective evaluation
    /// failures. Exhausting the iteration budget is a normal outcome reported
    /// through [`TerminationReason::MaxIterations`].
    fn optimize<C, D>(
        &mut self,
        cost_fn: &C,
        initial_point: &Point<T, D>,
        stopping_criterion: &StoppingCriterion<T>,
    ) -> OptimizerResult<OptimizationResult<T, Point<T, D>>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>;
}
