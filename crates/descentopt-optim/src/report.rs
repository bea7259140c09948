//! Human-readable run summaries.

use descentopt_core::{
    cost_function::EvaluationCounts,
    optimizer::OptimizationResult,
    types::{Point, Scalar},
};
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim};
use std::fmt;

/// Final point, iteration count and evaluation counts of one run.
///
/// Displays as
///
/// ```text
/// Armijo
/// Point: 1.00000000000002442491 2.99999999999997557509
/// Iter: 17
/// function eval: 52, grad eval: 18
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Heading line, typically the line search name
    pub label: String,

    /// Coordinates of the final point
    pub point: Vec<f64>,

    /// Iterations performed
    pub iterations: usize,

    /// Objective and gradient evaluations
    pub counts: EvaluationCounts,
}

impl RunSummary {
    /// Builds a summary from a final point and externally read counts.
    pub fn new<T, D>(
        label: impl Into<String>,
        point: &Point<T, D>,
        iterations: usize,
        counts: EvaluationCounts,
    ) -> Self
    where
        T: Scalar,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        Self {
            label: label.into(),
            point: point.iter().map(|&value| Scalar::to_f64(value)).collect(),
            iterations,
            counts,
        }
    }

    /// Builds a summary from an optimization result and its own counts.
    pub fn from_result<T, D>(label: impl Into<String>, result: &OptimizationResult<T, Point<T, D>>) -> Self
    where
        T: Scalar,
        D: Dim,
        DefaultAllocator: Allocator<D>,
    {
        let counts = EvaluationCounts {
            function_evaluations: result.function_evaluations,
            gradient_evaluations: result.gradient_evaluations,
        };
        Self::new(label, &result.point, result.iterations, counts)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        write!(f, "Point:")?;
        for value in &self.point {
            write!(f, " {value:.20}")?;
        }
        writeln!(f)?;
        writeln!(f, "Iter: {}", self.iterations)?;
        write!(
            f,
            "function eval: {}, grad eval: {}",
            self.counts.function_evaluations, self.counts.gradient_evaluations
        )
    }
}
