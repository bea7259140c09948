//! Core traits and types for gradient-based optimization.
//!
//! This crate provides the building blocks of a descent method: the
//! objective interface with evaluation counting, the line searches that pick
//! a step length along a descent direction, and the vocabulary shared by
//! optimizers (stopping criteria, results, callbacks).
//!
//! # Key Concepts
//!
//! - **Cost functions**: an objective f and its closed-form gradient ∇f
//! - **Evaluation counting**: every call to f or ∇f is tallied per wrapper
//! - **Line searches**: step lengths satisfying Armijo or strong Wolfe conditions
//! - **Trajectories**: the sequence of iterates, loggable as text
//!
//! # Modules
//!
//! - [`callback`]: Progress monitoring and trajectory recording
//! - [`cost_function`]: Cost function interface and counting wrapper
//! - [`error`]: Error types
//! - [`line_search`]: Line search algorithms
//! - [`optimizer`]: Optimizer trait, stopping criteria and results
//! - [`test_functions`]: Reference objectives
//! - [`trajectory`]: Plain-text trajectory log
//! - [`types`]: Scalar trait, vector aliases and numerical constants

pub mod callback;
pub mod cost_function;
pub mod error;
pub mod line_search;
pub mod optimizer;
pub mod test_functions;
pub mod trajectory;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{ObjectiveError, OptimizerError, OptimizerResult, Result, TrajectoryError};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use descentopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{
        IterationInfo, NoOpCallback, OptimizationCallback, PrintProgressCallback, TrajectoryRecorder,
    };
    pub use crate::cost_function::{counted, CostFunction, CountingCostFunction, EvaluationCounts, FnCost};
    pub use crate::error::{ObjectiveError, OptimizerError, OptimizerResult, Result, TrajectoryError};
    pub use crate::line_search::{
        BacktrackingLineSearch, FailureReason, LineSearch, LineSearchFailure, LineSearchMethod,
        LineSearchOutcome, LineSearchParams, LineSearchResult, LineSearchStrategy, StrongWolfeLineSearch,
    };
    pub use crate::optimizer::{OptimizationResult, Optimizer, StoppingCriterion, TerminationReason};
    pub use crate::trajectory::{DecimalSeparator, TrajectoryFormat, TrajectoryLog};
    pub use crate::types::{constants, Direction, Point, SVector, Scalar, Vector};
}
