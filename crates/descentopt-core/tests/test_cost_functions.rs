//! Tests for cost functions and evaluation counting.

use descentopt_core::{
    cost_function::{counted, CostFunction, CountingCostFunction, EvaluationCounts},
    error::{ObjectiveError, Result},
    test_functions::{Booth, SumOfSquares},
};
use nalgebra::{DVector, Dyn, Vector2};
use proptest::prelude::*;

/// Objective defined only on points with non-negative coordinates.
#[derive(Debug)]
struct SqrtSum;

impl CostFunction<f64, Dyn> for SqrtSum {
    fn cost(&self, point: &DVector<f64>) -> Result<f64> {
        if point.iter().any(|&x| x < 0.0) {
            return Err(ObjectiveError::evaluation_failed("negative coordinate"));
        }
        Ok(point.iter().map(|x| x.sqrt()).sum())
    }

    fn gradient(&self, point: &DVector<f64>) -> Result<DVector<f64>> {
        if point.iter().any(|&x| x <= 0.0) {
            return Err(ObjectiveError::evaluation_failed("gradient undefined"));
        }
        Ok(point.map(|x| 0.5 / x.sqrt()))
    }
}

#[test]
fn test_failed_evaluations_are_still_counted() {
    let cost_fn = CountingCostFunction::new(SqrtSum);
    let point = DVector::from_vec(vec![4.0, -1.0]);

    assert!(cost_fn.cost(&point).is_err());
    assert!(cost_fn.gradient(&point).is_err());
    assert_eq!(
        cost_fn.counts(),
        EvaluationCounts {
            function_evaluations: 1,
            gradient_evaluations: 1,
        }
    );
}

#[test]
fn test_wrapper_forwards_values() {
    let cost_fn = CountingCostFunction::new(Booth);
    let point = Vector2::new(0.5, -2.0);

    assert_eq!(cost_fn.cost(&point).unwrap(), Booth.cost(&point).unwrap());
    assert_eq!(cost_fn.gradient(&point).unwrap(), Booth.gradient(&point).unwrap());

    let inner = cost_fn.into_inner();
    assert_eq!(inner.cost(&point).unwrap(), Booth.cost(&point).unwrap());
}

#[test]
fn test_non_finite_values_propagate() {
    let cost_fn = counted(|_: &Vector2<f64>| f64::NAN, |p: &Vector2<f64>| p * f64::INFINITY);
    let point = Vector2::new(1.0, 0.0);

    assert!(cost_fn.cost(&point).unwrap().is_nan());
    assert!(cost_fn.gradient(&point).unwrap()[0].is_infinite());
    assert_eq!(cost_fn.function_evaluations(), 1);
    assert_eq!(cost_fn.gradient_evaluations(), 1);
}

#[test]
fn test_nested_counting_wrappers() {
    let outer = CountingCostFunction::new(CountingCostFunction::new(SumOfSquares));
    let point = DVector::from_vec(vec![1.0, 2.0, 3.0]);

    let (value, _) = outer.cost_and_gradient(&point).unwrap();
    assert_eq!(value, 14.0);

    let counts = outer.counts();
    assert_eq!(counts, outer.into_inner().counts());
}

proptest! {
    #[test]
    fn counters_track_every_call(calls in prop::collection::vec(0u8..3, 0..64)) {
        let cost_fn = CountingCostFunction::new(Booth);
        let point = Vector2::new(1.5, -0.5);
        let mut expected = EvaluationCounts::default();

        for call in calls {
            let before = cost_fn.counts();
            match call {
                0 => {
                    cost_fn.cost(&point).unwrap();
                    expected.function_evaluations += 1;
                }
                1 => {
                    cost_fn.gradient(&point).unwrap();
                    expected.gradient_evaluations += 1;
                }
                _ => {
                    cost_fn.cost_and_gradient(&point).unwrap();
                    expected.function_evaluations += 1;
                    expected.gradient_evaluations += 1;
                }
            }
            let after = cost_fn.counts();
            prop_assert!(after.function_evaluations >= before.function_evaluations);
            prop_assert!(after.gradient_evaluations >= before.gradient_evaluations);
        }

        prop_assert_eq!(cost_fn.counts(), expected);
    }

    #[test]
    fn steepest_direction_is_deterministic(x in -100.0..100.0_f64, y in -100.0..100.0_f64) {
        let point = Vector2::new(x, y);
        let first = -Booth.gradient(&point).unwrap();
        let second = -Booth.gradient(&point).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, Vector2::new(-(10.0 * x + 8.0 * y - 34.0), -(8.0 * x + 10.0 * y - 38.0)));
    }
}
