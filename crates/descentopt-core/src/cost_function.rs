//! Cost function interface for optimization algorithms.
//!
//! This module provides the trait that line searches and optimizers use to
//! evaluate an objective and its gradient, an adapter turning a pair of
//! closures into a cost function, and a wrapper that counts evaluations.
//!
//! # Evaluation counting
//!
//! [`CountingCostFunction`] owns its two counters. A fresh wrapper starts at
//! zero and every underlying call bumps the matching counter by exactly one;
//! there is no way to decrement or reset them. Two runs that must report
//! independent counts need two wrappers.
//!
//! ```rust
//! use descentopt_core::cost_function::{counted, CostFunction};
//! use nalgebra::Vector2;
//!
//! let cost_fn = counted(
//!     |p: &Vector2<f64>| p.norm_squared(),
//!     |p: &Vector2<f64>| p * 2.0,
//! );
//! let _ = cost_fn.cost(&Vector2::new(1.0, 2.0));
//! assert_eq!(cost_fn.counts().function_evaluations, 1);
//! assert_eq!(cost_fn.counts().gradient_evaluations, 0);
//! ```

use crate::{
    error::Result,
    types::{Direction, Point, Scalar},
};
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim};
use std::cell::Cell;
use std::fmt::{self, Debug};

/// Trait for differentiable objectives.
///
/// This is the main trait that optimization algorithms use to evaluate
/// the objective function and its derivative.
pub trait CostFunction<T, D>: Debug
where
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    /// Evaluates the cost function at a point.
    fn cost(&self, point: &Point<T, D>) -> Result<T>;

    /// Computes the gradient at a point.
    fn gradient(&self, point: &Point<T, D>) -> Result<Direction<T, D>>;

    /// Evaluates the cost and the gradient at a point.
    ///
    /// # Default Implementation
    ///
    /// Calls [`cost`](Self::cost) then [`gradient`](Self::gradient).
    fn cost_and_gradient(&self, point: &Point<T, D>) -> Result<(T, Direction<T, D>)> {
        let cost = self.cost(point)?;
        let gradient = self.gradient(point)?;
        Ok((cost, gradient))
    }
}

/// Cost function built from a pair of closures `f` and `grad_f`.
pub struct FnCost<F, G> {
    cost_fn: F,
    gradient_fn: G,
}

impl<F, G> FnCost<F, G> {
    /// Wraps an objective and its closed-form gradient.
    pub fn new(cost_fn: F, gradient_fn: G) -> Self {
        Self {
            cost_fn,
            gradient_fn,
        }
    }
}

impl<F, G> Debug for FnCost<F, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCost").finish_non_exhaustive()
    }
}

impl<T, D, F, G> CostFunction<T, D> for FnCost<F, G>
where
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
    F: Fn(&Point<T, D>) -> T,
    G: Fn(&Point<T, D>) -> Direction<T, D>,
{
    fn cost(&self, point: &Point<T, D>) -> Result<T> {
        Ok((self.cost_fn)(point))
    }

    fn gradient(&self, point: &Point<T, D>) -> Result<Direction<T, D>> {
        Ok((self.gradient_fn)(point))
    }
}

/// Snapshot of the evaluation counters of a [`CountingCostFunction`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationCounts {
    /// Number of cost evaluations
    pub function_evaluations: usize,
    /// Number of gradient evaluations
    pub gradient_evaluations: usize,
}

/// Cost function wrapper that counts evaluations.
///
/// The counters live in [`Cell`]s, so the wrapper is usable through a shared
/// reference but cannot be shared across threads. The wrapped function is
/// only reachable through the counters, or by giving them up with
/// [`into_inner`](Self::into_inner):
///
/// ```compile_fail
/// use descentopt_core::cost_function::CountingCostFunction;
/// use descentopt_core::test_functions::Booth;
///
/// let cost_fn = CountingCostFunction::new(Booth);
/// let _uncounted = &cost_fn.inner;
/// ```
#[derive(Debug)]
pub struct CountingCostFunction<C> {
    inner: C,
    cost_count: Cell<usize>,
    gradient_count: Cell<usize>,
}

impl<C> CountingCostFunction<C> {
    /// Creates a new counting wrapper with both counters at zero.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cost_count: Cell::new(0),
            gradient_count: Cell::new(0),
        }
    }

    /// Returns the current evaluation counts.
    pub fn counts(&self) -> EvaluationCounts {
        EvaluationCounts {
            function_evaluations: self.cost_count.get(),
            gradient_evaluations: self.gradient_count.get(),
        }
    }

    /// Number of cost evaluations so far.
    pub fn function_evaluations(&self) -> usize {
        self.cost_count.get()
    }

    /// Number of gradient evaluations so far.
    pub fn gradient_evaluations(&self) -> usize {
        self.gradient_count.get()
    }

    /// Unwraps the inner cost function, dropping the counters.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C, T, D> CostFunction<T, D> for CountingCostFunction<C>
where
    C: CostFunction<T, D>,
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    fn cost(&self, point: &Point<T, D>) -> Result<T> {
        self.cost_count.set(self.cost_count.get() + 1);
        self.inner.cost(point)
    }

    fn gradient(&self, point: &Point<T, D>) -> Result<Direction<T, D>> {
        self.gradient_count.set(self.gradient_count.get() + 1);
        self.inner.gradient(point)
    }

    fn cost_and_gradient(&self, point: &Point<T, D>) -> Result<(T, Direction<T, D>)> {
        self.cost_count.set(self.cost_count.get() + 1);
        self.gradient_count.set(self.gradient_count.get() + 1);
        self.inner.cost_and_gradient(point)
    }
}

/// Builds a fresh counted objective from a pair of closures.
pub fn counted<F, G>(cost_fn: F, gradient_fn: G) -> CountingCostFunction<FnCost<F, G>> {
    CountingCostFunction::new(FnCost::new(cost_fn, gradient_fn))
}
