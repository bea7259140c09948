//! Type definitions and aliases for gradient-based optimization.
//!
//! This module provides the scalar trait shared by every algorithm in the
//! workspace, vector aliases built on nalgebra, and the numerical constants
//! used as defaults.

use nalgebra::{Const, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
///
/// This trait combines all the numeric traits required by the line searches
/// and the descent driver.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default tolerance for gradient norm convergence.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Smallest step the Wolfe search may return.
    const MIN_STEP_SIZE: Self;

    /// Largest step the Wolfe search may return.
    const MAX_STEP_SIZE: Self;

    /// Relative width below which a Wolfe bracket is considered collapsed.
    const INTERVAL_TOLERANCE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    ///
    /// Returns None if the conversion fails.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_to_f64` for a non-panicking version.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Try to convert to f64.
    fn try_to_f64(self) -> Option<f64> {
        num_traits::cast(self)
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-6;
    const MIN_STEP_SIZE: Self = 1e-8;
    const MAX_STEP_SIZE: Self = 50.0;
    const INTERVAL_TOLERANCE: Self = 1e-6;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-13;
    const MIN_STEP_SIZE: Self = 1e-8;
    const MAX_STEP_SIZE: Self = 50.0;
    const INTERVAL_TOLERANCE: Self = 1e-14;
}

/// Type alias for a general vector.
pub type Vector<T, D> = OVector<T, D>;

/// Type alias for a statically-sized vector.
pub type SVector<T, const N: usize> = OVector<T, Const<N>>;

/// A point of the search space.
pub type Point<T, D> = OVector<T, D>;

/// A gradient or search direction at a point.
pub type Direction<T, D> = OVector<T, D>;

/// Numerical constants for different precision levels.
pub mod constants {
    use super::Scalar;

    /// Get machine epsilon for the given scalar type.
    pub fn epsilon<T: Scalar>() -> T {
        T::EPSILON
    }

    /// Get default gradient convergence tolerance.
    pub fn gradient_tolerance<T: Scalar>() -> T {
        T::DEFAULT_GRADIENT_TOLERANCE
    }

    /// Default iteration budget of the descent driver.
    pub const DEFAULT_MAX_ITERATIONS: usize = 10_001;

    /// Default Armijo constant.
    pub const DEFAULT_C1: f64 = 1e-3;

    /// Default curvature constant.
    pub const DEFAULT_C2: f64 = 0.9;

    /// Step substituted when a line search fails.
    pub const FALLBACK_STEP_SIZE: f64 = 1.0;
}
