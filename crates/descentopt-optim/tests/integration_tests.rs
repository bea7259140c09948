//! Integration tests for the gradient descent driver.
//!
//! These runs go through the public API only: the free `gradient_descent`
//! function, the `GradientDescent` optimizer and its callbacks.

use approx::assert_relative_eq;
use descentopt_core::{
    callback::{IterationInfo, OptimizationCallback, TrajectoryRecorder},
    cost_function::{counted, CostFunction, CountingCostFunction, EvaluationCounts},
    error::{OptimizerError, OptimizerResult},
    line_search::LineSearchMethod,
    optimizer::{Optimizer, StoppingCriterion, TerminationReason},
    test_functions::{Booth, Rosenbrock},
};
use descentopt_optim::{gradient_descent, GradientDescent, GradientDescentConfig, RunSummary};
use nalgebra::{Vector2, U2};

const METHODS: [&str; 3] = ["armijo", "wolfe", "armijo_wolfe"];

/// Records the iterates and checks sufficient decrease on accepted steps.
#[derive(Debug, Default)]
struct DecreaseMonitor {
    c1: f64,
    points: Vec<Vector2<f64>>,
    step_sizes: Vec<f64>,
    last_gradient_norm: f64,
    accepted_steps: usize,
    violations: usize,
}

impl DecreaseMonitor {
    fn new(c1: f64) -> Self {
        Self {
            c1,
            ..Self::default()
        }
    }
}

impl OptimizationCallback<f64, U2> for DecreaseMonitor {
    fn on_optimization_start(&mut self, info: &IterationInfo<'_, f64, U2>) -> OptimizerResult<()> {
        self.points.push(*info.point);
        self.last_gradient_norm = info.gradient_norm;
        Ok(())
    }

    fn on_iteration_end(&mut self, info: &IterationInfo<'_, f64, U2>) -> OptimizerResult<bool> {
        let step = info.step_size.unwrap_or_default();
        if !info.used_fallback {
            self.accepted_steps += 1;
            // gᵀp = -‖g‖² along the steepest descent direction
            let previous = info.previous_value.unwrap_or(f64::INFINITY);
            let required = self.c1 * step * self.last_gradient_norm.powi(2);
            if info.value > previous - required * (1.0 - 1e-9) {
                self.violations += 1;
            }
        }
        self.points.push(*info.point);
        self.step_sizes.push(step);
        self.last_gradient_norm = info.gradient_norm;
        Ok(true)
    }
}

/// Asks to stop after a fixed number of iterations.
#[derive(Debug)]
struct StopAfter(usize);

impl OptimizationCallback<f64, U2> for StopAfter {
    fn on_iteration_end(&mut self, info: &IterationInfo<'_, f64, U2>) -> OptimizerResult<bool> {
        Ok(info.iteration < self.0)
    }
}

/// ‖x‖² paired with a gradient of the wrong sign, so no line search can
/// satisfy its acceptance conditions.
fn misleading_objective() -> CountingCostFunction<impl CostFunction<f64, U2>> {
    counted(
        |p: &Vector2<f64>| p.norm_squared(),
        |p: &Vector2<f64>| p * -2.0,
    )
}

#[test]
fn test_booth_converges_for_every_method_name() {
    for method in METHODS {
        let cost_fn = CountingCostFunction::new(Booth);
        let x0 = Booth::starting_point::<f64>();

        let (point, iterations) = gradient_descent(&x0, &cost_fn, method, 1e-13, 10_001, 1e-3, 0.9).unwrap();

        assert!(iterations > 0, "{method}: no iterations");
        assert!(iterations < 10_001, "{method}: hit the iteration budget");
        assert_relative_eq!(point, Booth::minimizer(), epsilon = 1e-10);
        assert!(Booth.gradient(&point).unwrap().norm() <= 1e-13);
    }
}

#[test]
fn test_booth_result_diagnostics() {
    for method in [LineSearchMethod::Armijo, LineSearchMethod::Wolfe] {
        let cost_fn = CountingCostFunction::new(Booth);
        let mut optimizer = GradientDescent::with_method(method);

        let result = optimizer
            .optimize(&cost_fn, &Booth::starting_point::<f64>(), &StoppingCriterion::new())
            .unwrap();

        assert!(result.converged);
        assert_eq!(result.termination_reason, TerminationReason::Converged);
        assert_eq!(result.fallback_steps, 0);
        assert!(result.gradient_norm.unwrap() <= 1e-13);
        assert!(result.value < 1e-20);
        assert_eq!(result.function_evaluations, cost_fn.function_evaluations());
        assert_eq!(result.gradient_evaluations, cost_fn.gradient_evaluations());

        match method {
            // Backtracking never evaluates the gradient at trial points.
            LineSearchMethod::Armijo => assert_eq!(result.gradient_evaluations, result.iterations + 1),
            // The Wolfe search evaluates both at every trial, plus ∇f(xₖ) once.
            LineSearchMethod::Wolfe => assert_eq!(
                result.gradient_evaluations,
                result.function_evaluations + result.iterations
            ),
        }
    }
}

#[test]
fn test_zero_iteration_budget_returns_start() {
    for method in METHODS {
        let cost_fn = CountingCostFunction::new(Booth);
        let x0 = Booth::starting_point::<f64>();

        let (point, iterations) = gradient_descent(&x0, &cost_fn, method, 1e-13, 0, 1e-3, 0.9).unwrap();

        assert_eq!(point, x0);
        assert_eq!(iterations, 0);
        assert_eq!(
            cost_fn.counts(),
            EvaluationCounts {
                function_evaluations: 1,
                gradient_evaluations: 1,
            }
        );
    }
}

#[test]
fn test_start_at_minimizer_needs_no_iterations() {
    let cost_fn = CountingCostFunction::new(Booth);
    let (point, iterations) =
        gradient_descent(&Booth::minimizer::<f64>(), &cost_fn, "wolfe", 1e-13, 10_001, 1e-3, 0.9).unwrap();

    assert_eq!(point, Booth::minimizer());
    assert_eq!(iterations, 0);
    assert_eq!(cost_fn.counts().function_evaluations, 1);
}

#[test]
fn test_unsupported_method_fails_before_evaluating() {
    for name in ["newton", "bfgs", "", "wolfe "] {
        let cost_fn = CountingCostFunction::new(Booth);
        let result = gradient_descent(&Booth::starting_point::<f64>(), &cost_fn, name, 1e-13, 10, 1e-3, 0.9);

        match result {
            Err(OptimizerError::UnsupportedMethod { method }) => assert_eq!(method, name),
            other => panic!("expected UnsupportedMethod for {name:?}, got {other:?}"),
        }
        assert_eq!(cost_fn.counts(), EvaluationCounts::default());
    }
}

#[test]
fn test_invalid_constants_are_rejected() {
    let cost_fn = CountingCostFunction::new(Booth);
    let x0 = Booth::starting_point::<f64>();

    let result = gradient_descent(&x0, &cost_fn, "wolfe", 1e-13, 10, 0.9, 0.1);
    assert!(matches!(result, Err(OptimizerError::InvalidConfiguration { .. })));

    let result = gradient_descent(&x0, &cost_fn, "armijo", -1.0, 10, 1e-3, 0.9);
    assert!(matches!(result, Err(OptimizerError::InvalidConfiguration { .. })));

    assert_eq!(cost_fn.counts(), EvaluationCounts::default());
}

#[test]
fn test_sufficient_decrease_and_steepest_direction() {
    for method in [LineSearchMethod::Armijo, LineSearchMethod::Wolfe] {
        let mut optimizer = GradientDescent::with_method(method);
        let mut monitor = DecreaseMonitor::new(1e-3);

        let result = optimizer
            .optimize_with_callback(
                &Booth,
                &Booth::starting_point::<f64>(),
                &StoppingCriterion::new(),
                &mut monitor,
            )
            .unwrap();

        assert_eq!(monitor.violations, 0);
        assert_eq!(monitor.accepted_steps, result.iterations);
        assert_eq!(monitor.points.len(), result.iterations + 1);

        // Each step moves along -∇f at the previous iterate.
        for (k, window) in monitor.points.windows(2).enumerate() {
            let gradient = Booth.gradient(&window[0]).unwrap();
            let expected = window[0] - gradient * monitor.step_sizes[k];
            assert_relative_eq!(window[1], expected, epsilon = 1e-12);
            assert!(monitor.step_sizes[k] > 0.0);
        }
    }
}

#[test]
fn test_fallback_step_is_taken_when_line_search_fails() {
    for method in [LineSearchMethod::Armijo, LineSearchMethod::Wolfe] {
        let cost_fn = misleading_objective();
        let mut optimizer = GradientDescent::with_method(method);
        let criterion = StoppingCriterion::new().with_max_iterations(3);

        let result = optimizer
            .optimize(&cost_fn, &Vector2::new(1.0, 2.0), &criterion)
            .unwrap();

        // x + 1·(2x) triples the point on every iteration.
        assert_eq!(result.termination_reason, TerminationReason::MaxIterations);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.fallback_steps, 3);
        assert_eq!(result.point, Vector2::new(27.0, 54.0));
        assert_eq!(result.function_evaluations, cost_fn.function_evaluations());
    }
}

#[test]
fn test_run_stops_on_line_search_failure_without_fallback() {
    let cost_fn = misleading_objective();
    let mut optimizer = GradientDescent::new(
        GradientDescentConfig::new()
            .with_method(LineSearchMethod::Wolfe)
            .without_fallback(),
    );

    let result = optimizer
        .optimize(&cost_fn, &Vector2::new(1.0, 2.0), &StoppingCriterion::new())
        .unwrap();

    assert_eq!(result.termination_reason, TerminationReason::LineSearchFailed);
    assert!(!result.converged);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.point, Vector2::new(1.0, 2.0));
}

#[test]
fn test_callback_can_stop_the_run() {
    let mut optimizer = GradientDescent::with_method(LineSearchMethod::Armijo);
    let result = optimizer
        .optimize_with_callback(
            &Booth,
            &Booth::starting_point::<f64>(),
            &StoppingCriterion::new(),
            &mut StopAfter(2),
        )
        .unwrap();

    assert_eq!(result.termination_reason, TerminationReason::CallbackRequest);
    assert_eq!(result.iterations, 2);
}

#[test]
fn test_trajectory_recorder_sees_every_iterate() {
    let mut optimizer = GradientDescent::with_method(LineSearchMethod::Wolfe);
    let mut recorder = TrajectoryRecorder::new();
    let x0 = Booth::starting_point::<f64>();

    let result = optimizer
        .optimize_with_callback(&Booth, &x0, &StoppingCriterion::new(), &mut recorder)
        .unwrap();

    let log = recorder.into_log();
    assert_eq!(log.len(), result.iterations + 1);
    assert_eq!(log.first().unwrap().as_slice(), x0.as_slice());
    assert_eq!(log.last().unwrap().as_slice(), result.point.as_slice());
}

#[test]
fn test_rosenbrock_exhausts_budget_while_decreasing() {
    for method in [LineSearchMethod::Armijo, LineSearchMethod::Wolfe] {
        let rosenbrock = Rosenbrock::<f64>::default();
        let x0 = Vector2::new(-1.2, 1.0);
        let initial_value = rosenbrock.cost(&x0).unwrap();
        let mut optimizer = GradientDescent::with_method(method);

        let result = optimizer
            .optimize(&rosenbrock, &x0, &StoppingCriterion::new().with_max_iterations(200))
            .unwrap();

        assert_eq!(result.termination_reason, TerminationReason::MaxIterations);
        assert_eq!(result.iterations, 200);
        assert!(result.value < initial_value);
    }
}

#[test]
fn test_nan_gradient_is_not_convergence() {
    for method in [LineSearchMethod::Armijo, LineSearchMethod::Wolfe] {
        let cost_fn = counted(
            |p: &Vector2<f64>| p.norm_squared(),
            |_: &Vector2<f64>| Vector2::new(f64::NAN, 0.0),
        );
        let x0 = Vector2::new(1.0, 2.0);
        let mut optimizer = GradientDescent::with_method(method);

        let result = optimizer.optimize(&cost_fn, &x0, &StoppingCriterion::new()).unwrap();

        assert_eq!(result.termination_reason, TerminationReason::MaxIterations);
        assert!(!result.converged);
        assert!(result.gradient_norm.unwrap().is_nan());
        assert_eq!(result.iterations, 0);
        assert_eq!(result.point, x0);
        assert_eq!(
            cost_fn.counts(),
            EvaluationCounts {
                function_evaluations: 1,
                gradient_evaluations: 1,
            }
        );
    }
}

#[test]
fn test_fresh_counters_per_run() {
    let x0 = Booth::starting_point::<f64>();

    let first = CountingCostFunction::new(Booth);
    let (armijo_point, armijo_iterations) =
        gradient_descent(&x0, &first, "armijo", 1e-13, 10_001, 1e-3, 0.9).unwrap();
    let armijo_summary = RunSummary::new("Armijo", &armijo_point, armijo_iterations, first.counts());

    let second = CountingCostFunction::new(Booth);
    let (wolfe_point, wolfe_iterations) =
        gradient_descent(&x0, &second, "wolfe", 1e-13, 10_001, 1e-3, 0.9).unwrap();
    let wolfe_summary = RunSummary::new("Wolfe", &wolfe_point, wolfe_iterations, second.counts());

    // Both runs through one wrapper accumulate.
    let shared = CountingCostFunction::new(Booth);
    gradient_descent(&x0, &shared, "armijo", 1e-13, 10_001, 1e-3, 0.9).unwrap();
    gradient_descent(&x0, &shared, "wolfe", 1e-13, 10_001, 1e-3, 0.9).unwrap();

    for summary in [&armijo_summary, &wolfe_summary] {
        assert_relative_eq!(summary.point[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(summary.point[1], 3.0, epsilon = 1e-10);
    }
    assert_eq!(armijo_summary.counts.gradient_evaluations, armijo_iterations + 1);
    assert_eq!(
        wolfe_summary.counts,
        EvaluationCounts {
            function_evaluations: 52,
            gradient_evaluations: 69,
        }
    );
    assert_eq!(wolfe_iterations, 17);
    assert_ne!(wolfe_summary.counts, shared.counts());
    assert_eq!(
        shared.counts(),
        EvaluationCounts {
            function_evaluations: armijo_summary.counts.function_evaluations + 52,
            gradient_evaluations: armijo_summary.counts.gradient_evaluations + 69,
        }
    );
}
