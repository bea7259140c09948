//! Descent algorithms built on `descentopt-core`.
//!
//! This crate provides the steepest descent driver, parameterized by the
//! line search used to pick each step, and reporting helpers.
//!
//! # Available Optimizers
//!
//! - **GradientDescent**: pₖ = -∇f(xₖ) with Armijo backtracking or a strong
//!   Wolfe line search, falling back to a fixed step when the search fails
//!
//! # Examples
//!
//! ```rust
//! use descentopt_core::prelude::*;
//! use descentopt_core::test_functions::Booth;
//! use descentopt_optim::{GradientDescent, RunSummary};
//!
//! let cost_fn = CountingCostFunction::new(Booth);
//! let mut optimizer = GradientDescent::with_method(LineSearchMethod::Wolfe);
//!
//! let stopping_criterion = StoppingCriterion::new()
//!     .with_max_iterations(10_001)
//!     .with_gradient_tolerance(1e-13);
//!
//! let result = optimizer.optimize(&cost_fn, &Booth::starting_point::<f64>(), &stopping_criterion)?;
//! println!("{}", RunSummary::new("Wolfe", &result.point, result.iterations, cost_fn.counts()));
//! # Ok::<(), OptimizerError>(())
//! ```

pub mod gradient_descent;
pub mod report;

// Re-export main optimizers for convenience
pub use gradient_descent::{gradient_descent, GradientDescent, GradientDescentConfig};
pub use report::RunSummary;
