//! Custom error types for heap-usage analysis

use std::fmt;
use thiserror::Error;

/// Main error type for introspection and analysis operations
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Unresolved symbol: {0}")]
    UnresolvedSymbol(String),

    #[error("Failed to evaluate expression '{expr}': {reason}")]
    EvalFailed { expr: String, reason: String },

    #[error("Value is inaccessible: {0}")]
    InaccessibleValue(String),

    #[error("Allocator query failed at {address}: {reason}")]
    AllocatorQuery { address: String, reason: String },

    #[error("Introspection failure: {0}")]
    Introspection(String),

    #[error("Failed to select thread {thread}: {reason}")]
    ThreadSelect { thread: u32, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for introspection operations
pub type InspectResult<T> = Result<T, InspectError>;

impl InspectError {
    /// Creates an unresolved symbol error
    pub fn unresolved(name: impl Into<String>) -> Self {
        InspectError::UnresolvedSymbol(name.into())
    }

    /// Creates an evaluation failure error
    pub fn eval_failed(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        InspectError::EvalFailed {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    /// Creates an allocator query failure error
    pub fn allocator_query(address: impl fmt::Display, reason: impl Into<String>) -> Self {
        InspectError::AllocatorQuery {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an introspection failure error
    pub fn introspection(reason: impl Into<String>) -> Self {
        InspectError::Introspection(reason.into())
    }

    /// Creates a thread selection failure error
    pub fn thread_select(thread: u32, reason: impl Into<String>) -> Self {
        InspectError::ThreadSelect {
            thread,
            reason: reason.into(),
        }
    }
}
