//! Steepest descent with line search.
//!
//! # Algorithm Overview
//!
//! Starting from x₀ the optimizer repeats:
//! 1. Take the search direction pₖ = -∇f(xₖ)
//! 2. Ask the line search for a step size αₖ along pₖ
//! 3. Update xₖ₊₁ = xₖ + αₖ pₖ and re-evaluate f and ∇f
//!
//! until ‖∇f(xₖ)‖ ≤ ε or the iteration budget is spent.
//!
//! # Line search failure
//!
//! When the line search cannot find an acceptable step the optimizer uses a
//! fixed fallback step (1 by default) and carries on. The fallback ignores the
//! acceptance conditions, so it may increase the objective or diverge on
//! badly scaled problems. Setting the fallback to `None` ends the run with
//! [`TerminationReason::LineSearchFailed`] instead.

use descentopt_core::{
    callback::{IterationInfo, NoOpCallback, OptimizationCallback},
    cost_function::CostFunction,
    error::{OptimizerError, OptimizerResult},
    line_search::{step_along, LineSearch, LineSearchMethod, LineSearchOutcome, LineSearchParams},
    optimizer::{OptimizationResult, Optimizer, StoppingCriterion, TerminationReason},
    types::{constants, Point, Scalar},
};
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim};
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the gradient descent optimizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GradientDescentConfig<T>
where
    T: Scalar,
{
    /// Line search strategy
    pub method: LineSearchMethod,

    /// Armijo constant c₁
    pub c1: T,

    /// Curvature constant c₂ (used by the Wolfe search)
    pub c2: T,

    /// Step used when the line search fails (None = stop instead)
    pub fallback_step: Option<T>,
}

impl<T> Default for GradientDescentConfig<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self {
            method: LineSearchMethod::default(),
            c1: <T as Scalar>::from_f64(constants::DEFAULT_C1),
            c2: <T as Scalar>::from_f64(constants::DEFAULT_C2),
            fallback_step: Some(<T as Scalar>::from_f64(constants::FALLBACK_STEP_SIZE)),
        }
    }
}

impl<T> GradientDescentConfig<T>
where
    T: Scalar,
{
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the line search strategy.
    pub fn with_method(mut self, method: LineSearchMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the Armijo constant.
    pub fn with_c1(mut self, c1: T) -> Self {
        self.c1 = c1;
        self
    }

    /// Sets the curvature constant.
    pub fn with_c2(mut self, c2: T) -> Self {
        self.c2 = c2;
        self
    }

    /// Sets the step used when the line search fails.
    pub fn with_fallback_step(mut self, step: T) -> Self {
        self.fallback_step = Some(step);
        self
    }

    /// Stops the run on the first line search failure.
    pub fn without_fallback(mut self) -> Self {
        self.fallback_step = None;
        self
    }

    /// Line search parameters for the configured strategy.
    pub fn line_search_params(&self) -> LineSearchParams<T> {
        self.method.default_params().with_c1(self.c1).with_c2(self.c2)
    }

    /// Validates the configuration.
    ///
    /// c₁ and c₂ must satisfy 0 < c₁ < c₂ < 1 whichever strategy is selected.
    pub fn validate(&self) -> OptimizerResult<()> {
        self.line_search_params().validate()?;
        if let Some(step) = self.fallback_step {
            if !(step > T::zero()) {
                return Err(OptimizerError::invalid_configuration(
                    "Fallback step must be positive",
                    "fallback_step",
                    step.to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Steepest descent optimizer.
///
/// # Examples
///
/// ```rust
/// use descentopt_core::prelude::*;
/// use descentopt_core::test_functions::Booth;
/// use descentopt_optim::{GradientDescent, GradientDescentConfig};
///
/// let cost_fn = CountingCostFunction::new(Booth);
/// let mut optimizer = GradientDescent::new(
///     GradientDescentConfig::new().with_method(LineSearchMethod::Armijo),
/// );
///
/// let x0 = Booth::starting_point::<f64>();
/// let result = optimizer.optimize(&cost_fn, &x0, &StoppingCriterion::new())?;
///
/// assert!(result.converged);
/// assert_eq!(result.function_evaluations, cost_fn.function_evaluations());
/// # Ok::<(), OptimizerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GradientDescent<T>
where
    T: Scalar,
{
    config: GradientDescentConfig<T>,
}

impl<T> GradientDescent<T>
where
    T: Scalar,
{
    /// Creates a new optimizer with the given configuration.
    pub fn new(config: GradientDescentConfig<T>) -> Self {
        Self { config }
    }

    /// Creates an optimizer using the given line search and default constants.
    pub fn with_method(method: LineSearchMethod) -> Self {
        Self::new(GradientDescentConfig::new().with_method(method))
    }

    /// Returns the optimizer configuration.
    pub fn config(&self) -> &GradientDescentConfig<T> {
        &self.config
    }

    /// Minimizes `cost_fn` from `initial_point`, reporting progress to
    /// `callback`.
    ///
    /// The callback sees the starting point, every iterate, and the final
    /// iterate. Returning `false` from
    /// [`on_iteration_end`](OptimizationCallback::on_iteration_end) stops the
    /// run with [`TerminationReason::CallbackRequest`].
    pub fn optimize_with_callback<C, D, CB>(
        &mut self,
        cost_fn: &C,
        initial_point: &Point<T, D>,
        stopping_criterion: &StoppingCriterion<T>,
        callback: &mut CB,
    ) -> OptimizerResult<OptimizationResult<T, Point<T, D>>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>,
        CB: OptimizationCallback<T, D>,
    {
        stopping_criterion.validate()?;
        self.config.validate()?;

        let start_time = Instant::now();
        let params = self.config.line_search_params();
        let mut line_search = self.config.method.strategy();

        let mut point = initial_point.clone();
        let mut value = cost_fn.cost(&point)?;
        let mut gradient = cost_fn.gradient(&point)?;
        let mut gradient_norm = gradient.norm();
        let mut function_evaluations = 1;
        let mut gradient_evaluations = 1;

        let mut iteration = 0;
        let mut fallback_steps = 0;
        let mut previous_value = None;
        let mut last_step = None;
        let mut last_used_fallback = false;

        callback.on_optimization_start(&IterationInfo {
            iteration,
            point: &point,
            value,
            previous_value,
            gradient_norm,
            step_size: last_step,
            used_fallback: false,
        })?;

        let termination_reason = loop {
            if !stopping_criterion.should_continue(iteration, gradient_norm) {
                break stopping_criterion.termination_reason(gradient_norm);
            }

            let direction = -&gradient;
            let outcome = line_search.search(cost_fn, &point, value, &gradient, &direction, &params)?;
            function_evaluations += outcome.function_evals();
            gradient_evaluations += outcome.gradient_evals();

            let (step_size, used_fallback) = match outcome {
                LineSearchOutcome::Success(result) => (result.step_size, false),
                LineSearchOutcome::Failed(failure) => match self.config.fallback_step {
                    Some(step) => {
                        tracing::warn!(
                            iteration,
                            reason = %failure.reason,
                            fallback_step = Scalar::to_f64(step),
                            "line search failed, using fallback step"
                        );
                        fallback_steps += 1;
                        (step, true)
                    }
                    None => {
                        tracing::warn!(iteration, reason = %failure.reason, "line search failed, stopping");
                        break TerminationReason::LineSearchFailed;
                    }
                },
            };

            point = step_along(&point, &direction, step_size);
            previous_value = Some(value);
            value = cost_fn.cost(&point)?;
            gradient = cost_fn.gradient(&point)?;
            gradient_norm = gradient.norm();
            function_evaluations += 1;
            gradient_evaluations += 1;
            iteration += 1;
            last_step = Some(step_size);
            last_used_fallback = used_fallback;

            tracing::debug!(
                iteration,
                value = Scalar::to_f64(value),
                gradient_norm = Scalar::to_f64(gradient_norm),
                step_size = Scalar::to_f64(step_size),
                used_fallback,
                "gradient descent iteration"
            );

            let keep_going = callback.on_iteration_end(&IterationInfo {
                iteration,
                point: &point,
                value,
                previous_value,
                gradient_norm,
                step_size: last_step,
                used_fallback,
            })?;
            if !keep_going {
                break TerminationReason::CallbackRequest;
            }
        };

        callback.on_optimization_end(&IterationInfo {
            iteration,
            point: &point,
            value,
            previous_value,
            gradient_norm,
            step_size: last_step,
            used_fallback: last_used_fallback,
        })?;

        tracing::info!(
            method = %self.config.method,
            reason = %termination_reason,
            iterations = iteration,
            value = Scalar::to_f64(value),
            gradient_norm = Scalar::to_f64(gradient_norm),
            function_evaluations,
            gradient_evaluations,
            fallback_steps,
            "gradient descent finished"
        );

        Ok(OptimizationResult::new(
            point,
            value,
            iteration,
            start_time.elapsed(),
            termination_reason,
        )
        .with_gradient_norm(gradient_norm)
        .with_function_evaluations(function_evaluations)
        .with_gradient_evaluations(gradient_evaluations)
        .with_fallback_steps(fallback_steps))
    }
}

impl<T> Default for GradientDescent<T>
where
    T: Scalar,
{
    fn default() -> Self {
        Self::new(GradientDescentConfig::default())
    }
}

impl<T> Optimizer<T> for GradientDescent<T>
where
    T: Scalar,
{
    fn name(&self) -> &str {
        match self.config.method {
            LineSearchMethod::Armijo => "Gradient Descent (Armijo)",
            LineSearchMethod::Wolfe => "Gradient Descent (Wolfe)",
        }
    }

    fn optimize<C, D>(
        &mut self,
        cost_fn: &C,
        initial_point: &Point<T, D>,
        stopping_criterion: &StoppingCriterion<T>,
    ) -> OptimizerResult<OptimizationResult<T, Point<T, D>>>
    where
        C: CostFunction<T, D>,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        self.optimize_with_callback(cost_fn, initial_point, stopping_criterion, &mut NoOpCallback)
    }
}

/// Minimizes `cost_fn` by steepest descent from `x0`.
///
/// `method` names the line search, case-insensitively: `"armijo"`, or
/// `"wolfe"` / `"armijo_wolfe"` for the strong Wolfe search. The run stops
/// once ‖∇f‖ ≤ `tol` or after `max_iter` iterations, and returns the final
/// point with the number of iterations performed. Evaluation counts are read
/// from `cost_fn` afterwards, e.g. through a
/// [`CountingCostFunction`](descentopt_core::cost_function::CountingCostFunction).
///
/// # Errors
///
/// An unknown `method` fails with [`OptimizerError::UnsupportedMethod`]
/// before any evaluation. Constants outside 0 < c₁ < c₂ < 1 or a negative
/// tolerance fail with [`OptimizerError::InvalidConfiguration`].
///
/// # Examples
///
/// ```rust
/// use descentopt_core::cost_function::counted;
/// use descentopt_optim::gradient_descent;
/// use nalgebra::Vector2;
///
/// let cost_fn = counted(
///     |p: &Vector2<f64>| (p[0] - 1.0).powi(2) + (p[1] + 2.0).powi(2),
///     |p: &Vector2<f64>| Vector2::new(2.0 * (p[0] - 1.0), 2.0 * (p[1] + 2.0)),
/// );
///
/// let (x, iterations) =
///     gradient_descent(&Vector2::new(0.0, 0.0), &cost_fn, "wolfe", 1e-10, 100, 1e-3, 0.9)?;
///
/// assert!((x - Vector2::new(1.0, -2.0)).norm() < 1e-9);
/// assert!(iterations < 100);
/// # Ok::<(), descentopt_core::OptimizerError>(())
/// ```
#[allow(clippy::too_many_arguments)]
pub fn gradient_descent<T, D, C>(
    x0: &Point<T, D>,
    cost_fn: &C,
    method: &str,
    tol: T,
    max_iter: usize,
    c1: T,
    c2: T,
) -> OptimizerResult<(Point<T, D>, usize)>
where
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
    C: CostFunction<T, D>,
{
    let method = LineSearchMethod::parse(method)?;
    let mut optimizer = GradientDescent::new(
        GradientDescentConfig::new()
            .with_method(method)
            .with_c1(c1)
            .with_c2(c2),
    );
    let criterion = StoppingCriterion::new()
        .with_gradient_tolerance(tol)
        .with_max_iterations(max_iter);

    let result = optimizer.optimize(cost_fn, x0, &criterion)?;
    Ok((result.point, result.iterations))
}
