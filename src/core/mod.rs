//! Core module containing fundamental types for heapscope
//!
//! This module provides the foundational building blocks used
//! throughout the analyzer: address handling, type descriptors, heap
//! block metadata, and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{Address, Field, HeapBlock, HeapUsage, InspectError, InspectResult, TypeKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
