//! Callback support for optimization algorithms.
//!
//! This module provides traits and types for implementing callbacks that can
//! monitor and control the optimization process.

use crate::error::OptimizerResult;
use crate::trajectory::TrajectoryLog;
use crate::types::{Point, Scalar};
use nalgebra::allocator::Allocator;
use nalgebra::{DVector, DefaultAllocator, Dim};

/// Information passed to callbacks during optimization.
#[derive(Debug)]
pub struct IterationInfo<'a, T: Scalar, D: Dim>
where
    DefaultAllocator: Allocator<D>,
{
    /// Completed iterations; 0 for the starting point
    pub iteration: usize,

    /// Current iterate
    pub point: &'a Point<T, D>,

    /// Objective value at the current iterate
    pub value: T,

    /// Objective value at the previous iterate
    pub previous_value: Option<T>,

    /// Euclidean norm of the gradient at the current iterate
    pub gradient_norm: T,

    /// Step size used to reach the current iterate
    pub step_size: Option<T>,

    /// Whether that step came from the fallback rather than the line search
    pub used_fallback: bool,
}

/// Trait for optimization callbacks.
///
/// Callbacks allow monitoring and controlling the optimization process.
/// They can be used for logging, trajectory recording, early stopping, etc.
pub trait OptimizationCallback<T: Scalar, D: Dim>: Send
where
    DefaultAllocator: Allocator<D>,
{
    /// Called once with the starting point, before the first iteration.
    fn on_optimization_start(&mut self, info: &IterationInfo<'_, T, D>) -> OptimizerResult<()> {
        let _ = info; // Unused by default
        Ok(())
    }

    /// Called at the end of each iteration.
    ///
    /// Returns `true` to continue optimization, `false` to stop early.
    fn on_iteration_end(&mut self, info: &IterationInfo<'_, T, D>) -> OptimizerResult<bool> {
        let _ = info; // Unused by default
        Ok(true)
    }

    /// Called at the end of optimization with the final iterate.
    fn on_optimization_end(&mut self, info: &IterationInfo<'_, T, D>) -> OptimizerResult<()> {
        let _ = info; // Unused by default
        Ok(())
    }
}

/// A no-op callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl<T: Scalar, D: Dim> OptimizationCallback<T, D> for NoOpCallback where DefaultAllocator: Allocator<D> {}

/// A callback that prints progress to stdout.
#[derive(Debug, Clone)]
pub struct PrintProgressCallback {
    print_every: usize,
}

impl PrintProgressCallback {
    /// Create a new progress printing callback.
    pub fn new(print_every: usize) -> Self {
        Self {
            print_every: print_every.max(1),
        }
    }
}

impl<T: Scalar, D: Dim> OptimizationCallback<T, D> for PrintProgressCallback
where
    DefaultAllocator: Allocator<D>,
{
    fn on_optimization_start(&mut self, info: &IterationInfo<'_, T, D>) -> OptimizerResult<()> {
        println!(
            "Starting optimization: cost = {}, gradient norm = {}",
            info.value, info.gradient_norm
        );
        Ok(())
    }

    fn on_iteration_end(&mut self, info: &IterationInfo<'_, T, D>) -> OptimizerResult<bool> {
        if info.iteration % self.print_every == 0 {
            println!(
                "Iteration {}: cost = {}, gradient norm = {}, step = {:?}{}",
                info.iteration,
                info.value,
                info.gradient_norm,
                info.step_size,
                if info.used_fallback { " (fallback)" } else { "" }
            );
        }
        Ok(true)
    }

    fn on_optimization_end(&mut self, info: &IterationInfo<'_, T, D>) -> OptimizerResult<()> {
        println!(
            "Optimization complete after {} iterations. Final cost: {}",
            info.iteration, info.value
        );
        Ok(())
    }
}

/// Records every visited point into a [`TrajectoryLog`].
#[derive(Debug, Clone, Default)]
pub struct TrajectoryRecorder {
    log: TrajectoryLog,
}

impl TrajectoryRecorder {
    /// Creates a recorder with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The points recorded so far.
    pub fn log(&self) -> &TrajectoryLog {
        &self.log
    }

    /// Consumes the recorder, returning its log.
    pub fn into_log(self) -> TrajectoryLog {
        self.log
    }

    fn record<T: Scalar, D: Dim>(&mut self, point: &Point<T, D>)
    where
        DefaultAllocator: Allocator<D>,
    {
        let coordinates = DVector::from_iterator(point.len(), point.iter().map(|&value| Scalar::to_f64(value)));
        self.log.push(coordinates);
    }
}

impl<T: Scalar, D: Dim> OptimizationCallback<T, D> for TrajectoryRecorder
where
    DefaultAllocator: Allocator<D>,
{
    fn on_optimization_start(&mut self, info: &IterationInfo<'_, T, D>) -> OptimizerResult<()> {
        self.record(info.point);
        Ok(())
    }

    fn on_iteration_end(&mut self, info: &IterationInfo<'_, T, D>) -> OptimizerResult<bool> {
        self.record(info.point);
        Ok(true)
    }
}
