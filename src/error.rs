use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum VsyscError {
    #[error("Invalid syntax (line:{line})")]
    SyntaxError { line: usize },

    #[error("Unknown variable '{name}' (line:{line})")]
    UnknownVariable { name: String, line: usize },

    #[error("Unknown keyword '{keyword}' (line:{line})")]
    UnknownKeyword { keyword: String, line: usize },

    #[error("Array '{identifier}' does not exist, failed to add '{content}'")]
    ArrayNotFound { identifier: String, content: String },

    #[error("{identifier} is not a number (line:{line})")]
    NotANumber { identifier: String, line: usize },

    #[error("Keyword '{keyword}' is not implemented (line:{line})")]
    NotImplemented { keyword: String, line: usize },

    #[error("File '{name}' already exists")]
    DuplicateExport { name: String },

    #[error("Keyword '{keyword}' failed: {message}")]
    HandlerRejection { keyword: String, message: String },

    #[error("Keyword '{keyword}' timed out after {millis}ms")]
    HandlerTimeout { keyword: String, millis: u128 },

    #[error("Import '{name}' not found")]
    ImportNotFound { name: String },

    #[error("Import cycle detected: {}", .chain.join(" -> "))]
    ImportCycle { chain: Vec<String> },

    #[error("Import depth limit of {depth} exceeded")]
    ImportDepthExceeded { depth: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl VsyscError {
    /// Source line the error was staged at, for classification errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            VsyscError::SyntaxError { line }
            | VsyscError::UnknownVariable { line, .. }
            | VsyscError::UnknownKeyword { line, .. }
            | VsyscError::NotANumber { line, .. }
            | VsyscError::NotImplemented { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VsyscError>;
