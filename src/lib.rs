//! Heapscope: heap-usage attribution for debugger-inspected processes
//!
//! Given an introspection host (a debugger plugin or core-file
//! reader implementing the traits in [`host`]), heapscope computes
//! the heap memory transitively reachable from any root variable and
//! ranks the variables of a whole process by heap footprint.

pub mod analyze;
pub mod command;
pub mod config;
pub mod core;
pub mod host;
pub mod report;

// Re-export main types from core module
pub use crate::core::types::{
    Address, Field, HeapBlock, HeapUsage, InspectError, InspectResult, ThreadId, TypeKind,
};

// Re-export the analysis entry points
pub use crate::analyze::{ProcessScanner, Traverser, VisitedBlocks, VisitedValues, MIN_EXPAND_SIZE};
pub use crate::host::{DebugHost, GlobalVariable};
pub use crate::report::{ExprUsage, RootUsage, ScanReport};
