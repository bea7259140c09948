//! Error types for objective evaluation and optimization.
//!
//! This module defines the error types used throughout the library for
//! objective evaluation, optimizer configuration and trajectory logging.

use thiserror::Error;

/// Errors that can occur while evaluating an objective or its gradient.
#[derive(Debug, Clone, Error)]
pub enum ObjectiveError {
    /// Dimension mismatch between a point and the objective.
    ///
    /// This error occurs when an objective is evaluated at a point whose
    /// dimension differs from the one it was defined for.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// The user-supplied function reported a failure.
    #[error("Objective evaluation failed: {reason}")]
    EvaluationFailed {
        /// Description of the failure
        reason: String,
    },
}

impl ObjectiveError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an EvaluationFailed error with a custom reason.
    pub fn evaluation_failed<S: Into<String>>(reason: S) -> Self {
        Self::EvaluationFailed {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during optimization.
#[derive(Debug, Clone, Error)]
pub enum OptimizerError {
    /// The requested line-search strategy does not exist.
    ///
    /// Raised when resolving a strategy name, before any evaluation happens.
    #[error("Unsupported line search method: '{method}' (expected one of: armijo, wolfe, armijo_wolfe)")]
    UnsupportedMethod {
        /// The name that could not be resolved
        method: String,
    },

    /// Invalid optimizer configuration.
    ///
    /// This error occurs when the optimizer or a line search is configured
    /// with invalid parameters (e.g., c2 <= c1, negative tolerance).
    #[error("Invalid optimizer configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// Propagated objective error.
    #[error("Objective evaluation failed: {0}")]
    Objective(#[from] ObjectiveError),
}

impl OptimizerError {
    /// Create an UnsupportedMethod error.
    pub fn unsupported_method<S: Into<String>>(method: S) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }
}

/// Errors that can occur while reading or writing a trajectory log.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    /// Underlying I/O failure.
    #[error("Trajectory I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the log could not be parsed.
    #[error("Malformed trajectory line {line}: {reason}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        reason: String,
    },
}

impl TrajectoryError {
    /// Create a Parse error for a 1-based line number.
    pub fn parse<S: Into<String>>(line: usize, reason: S) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for operations that can produce ObjectiveError.
pub type Result<T> = std::result::Result<T, ObjectiveError>;

/// Result type alias for optimizer operations.
pub type OptimizerResult<T> = std::result::Result<T, OptimizerError>;
