//! Reference objectives with closed-form gradients.
//!
//! These are used by the demos, the benchmarks and the test suites.

use crate::{
    cost_function::CostFunction,
    error::Result,
    types::{Direction, Point, Scalar},
};
use nalgebra::{allocator::Allocator, DefaultAllocator, Dim, Vector2, U2};

/// Booth function `f(x, y) = (x + 2y - 7)² + (2x + y - 5)²`.
///
/// Convex quadratic with the unique minimizer `(1, 3)` where `f = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Booth;

impl Booth {
    /// The unique minimizer.
    pub fn minimizer<T: Scalar>() -> Vector2<T> {
        Vector2::new(T::one(), <T as Scalar>::from_f64(3.0))
    }

    /// The customary starting point `(-4, -10)`.
    pub fn starting_point<T: Scalar>() -> Vector2<T> {
        Vector2::new(
            <T as Scalar>::from_f64(-4.0),
            <T as Scalar>::from_f64(-10.0),
        )
    }
}

impl<T: Scalar> CostFunction<T, U2> for Booth {
    fn cost(&self, point: &Vector2<T>) -> Result<T> {
        let (x, y) = (point[0], point[1]);
        let two = <T as Scalar>::from_f64(2.0);
        let first = x + two * y - <T as Scalar>::from_f64(7.0);
        let second = two * x + y - <T as Scalar>::from_f64(5.0);
        Ok(first * first + second * second)
    }

    fn gradient(&self, point: &Vector2<T>) -> Result<Vector2<T>> {
        let (x, y) = (point[0], point[1]);
        let eight = <T as Scalar>::from_f64(8.0);
        let ten = <T as Scalar>::from_f64(10.0);
        Ok(Vector2::new(
            ten * x + eight * y - <T as Scalar>::from_f64(34.0),
            eight * x + ten * y - <T as Scalar>::from_f64(38.0),
        ))
    }
}

/// Sum of squares `f(x) = ‖x‖²`, minimized at the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumOfSquares;

impl<T, D> CostFunction<T, D> for SumOfSquares
where
    T: Scalar,
    D: Dim,
    DefaultAllocator: Allocator<D>,
{
    fn cost(&self, point: &Point<T, D>) -> Result<T> {
        Ok(point.norm_squared())
    }

    fn gradient(&self, point: &Point<T, D>) -> Result<Direction<T, D>> {
        Ok(point * <T as Scalar>::from_f64(2.0))
    }
}

/// Rosenbrock function `f(x, y) = (a - x)² + b (y - x²)²`.
///
/// Non-convex with a narrow curved valley; the minimizer is `(a, a²)`.
#[derive(Debug, Clone, Copy)]
pub struct Rosenbrock<T> {
    /// Location parameter
    pub a: T,
    /// Valley steepness
    pub b: T,
}

impl<T: Scalar> Default for Rosenbrock<T> {
    fn default() -> Self {
        Self {
            a: T::one(),
            b: <T as Scalar>::from_f64(100.0),
        }
    }
}

impl<T: Scalar> CostFunction<T, U2> for Rosenbrock<T> {
    fn cost(&self, point: &Vector2<T>) -> Result<T> {
        let (x, y) = (point[0], point[1]);
        let first = self.a - x;
        let second = y - x * x;
        Ok(first * first + self.b * second * second)
    }

    fn gradient(&self, point: &Vector2<T>) -> Result<Vector2<T>> {
        let (x, y) = (point[0], point[1]);
        let two = <T as Scalar>::from_f64(2.0);
        let four = <T as Scalar>::from_f64(4.0);
        let valley = y - x * x;
        Ok(Vector2::new(
            -two * (self.a - x) - four * self.b * x * valley,
            two * self.b * valley,
        ))
    }
}
