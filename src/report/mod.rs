//! Ranking and formatting of analysis results

mod blocks;

pub use blocks::{collect_block_stats, write_walk, BlockStats};

use crate::core::types::{HeapUsage, InspectResult};
use serde::Serialize;
use std::io::{self, Write};

/// Heap usage attributed to one root variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootUsage {
    /// Where the root lives: `thread 2 frame [1] conn` or
    /// `server.c g_sessions`
    pub label: String,
    pub bytes: u64,
    pub blocks: u64,
}

/// All measured roots of one scan plus grand totals
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub entries: Vec<RootUsage>,
    pub total: HeapUsage,
}

impl ScanReport {
    pub fn new() -> Self {
        ScanReport::default()
    }

    /// Records one root's usage and folds it into the totals
    pub fn push(&mut self, label: String, usage: HeapUsage) {
        self.entries.push(RootUsage {
            label,
            bytes: usage.bytes,
            blocks: usage.blocks,
        });
        self.total += usage;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by heap bytes, largest first
    pub fn ranked(&self) -> Vec<&RootUsage> {
        let mut ranked: Vec<&RootUsage> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.bytes.cmp(&a.bytes));
        ranked
    }

    /// Writes the ranked top-N listing and the grand total
    pub fn write_summary<W: Write>(&self, out: &mut W, top_n: usize) -> io::Result<()> {
        writeln!(out, "===================================================")?;
        for (index, entry) in self.ranked().iter().take(top_n).enumerate() {
            writeln!(
                out,
                "[{}] {} size={} count={}",
                index, entry.label, entry.bytes, entry.blocks
            )?;
        }
        writeln!(
            out,
            "Total heap usage: {} count: {}",
            self.total.bytes, self.total.blocks
        )
    }

    /// Machine-readable form of the full report
    pub fn to_json(&self) -> InspectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result row for one analyzed expression
#[derive(Debug, Clone, Serialize)]
pub struct ExprUsage {
    pub expr: String,
    pub type_name: String,
    pub static_size: usize,
    pub usage: HeapUsage,
}

impl ExprUsage {
    /// Writes the single-expression result line
    pub fn write_row<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "expr={} type={} size={} heap={} count={}",
            self.expr, self.type_name, self.static_size, self.usage.bytes, self.usage.blocks
        )
    }
}
