//! Gradient descent with Armijo and Wolfe line searches.
//!
//! This crate bundles [`descentopt_core`] (objective interface, evaluation
//! counting, line searches, trajectory logs) and [`descentopt_optim`] (the
//! descent driver and run summaries) behind a single dependency.
//!
//! # Quick start
//!
//! ```rust
//! use descentopt::prelude::*;
//! use descentopt::nalgebra::Vector2;
//!
//! let cost_fn = counted(
//!     |p: &Vector2<f64>| (p[0] + 2.0 * p[1] - 7.0).powi(2) + (2.0 * p[0] + p[1] - 5.0).powi(2),
//!     |p: &Vector2<f64>| Vector2::new(10.0 * p[0] + 8.0 * p[1] - 34.0, 8.0 * p[0] + 10.0 * p[1] - 38.0),
//! );
//!
//! let (point, iterations) =
//!     gradient_descent(&Vector2::new(-4.0, -10.0), &cost_fn, "armijo", 1e-13, 10_001, 1e-3, 0.9)?;
//!
//! println!("{}", RunSummary::new("Armijo", &point, iterations, cost_fn.counts()));
//! # Ok::<(), OptimizerError>(())
//! ```

pub use descentopt_core as core;
pub use descentopt_optim as optim;
pub use nalgebra;

pub use descentopt_core::{ObjectiveError, OptimizerError, OptimizerResult, TrajectoryError};
pub use descentopt_optim::{gradient_descent, GradientDescent, GradientDescentConfig, RunSummary};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use descentopt_core::prelude::*;
    pub use descentopt_optim::{gradient_descent, GradientDescent, GradientDescentConfig, RunSummary};
}
