//! Core type definitions for heapscope
//!
//! This module contains all fundamental types used throughout the
//! analyzer, including address wrappers, type descriptors, heap block
//! metadata, usage accumulators, and error types.

mod address;
mod error;
mod heap_block;
mod type_info;
mod usage;

// Re-export all public types
pub use address::Address;
pub use error::{InspectError, InspectResult};
pub use heap_block::HeapBlock;
pub use type_info::{Field, TypeKind};
pub use usage::HeapUsage;

// Common type aliases
pub type ThreadId = u32;
pub type Size = usize;
