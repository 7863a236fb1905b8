//! Application-level errors (wraps domain errors)

use std::fmt;

use thiserror::Error;

use crate::domain::{DomainError, Operation};

/// How the packaging tool failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolExit {
    /// Non-zero exit code
    Code(i32),
    /// Killed after exceeding the timeout
    TimedOut,
    /// Ended by a signal without an exit code
    Terminated,
}

impl fmt::Display for ToolExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolExit::Code(code) => write!(f, "exit code {}", code),
            ToolExit::TimedOut => f.write_str("timed out"),
            ToolExit::Terminated => f.write_str("terminated by signal"),
        }
    }
}

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{} failed: packaging tool {exit}", .operation.name())]
    PackagingToolFailure { operation: Operation, exit: ToolExit },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Tool exit code, if the tool exited with one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ApplicationError::PackagingToolFailure {
                exit: ToolExit::Code(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
