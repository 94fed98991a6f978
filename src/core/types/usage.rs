//! Accumulated heap usage attributed to a root value

use super::heap_block::HeapBlock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

/// Total heap bytes and block count reachable from a root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapUsage {
    pub bytes: u64,
    pub blocks: u64,
}

impl HeapUsage {
    /// Creates an empty accumulator
    pub const fn new() -> Self {
        HeapUsage { bytes: 0, blocks: 0 }
    }

    /// Charges one heap block to this total
    pub fn add_block(&mut self, block: &HeapBlock) {
        self.bytes += block.size as u64;
        self.blocks += 1;
    }

    /// Whether nothing has been charged
    pub fn is_zero(&self) -> bool {
        self.bytes == 0 && self.blocks == 0
    }
}

impl AddAssign for HeapUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.bytes += rhs.bytes;
        self.blocks += rhs.blocks;
    }
}

impl fmt::Display for HeapUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes in {} blocks", self.bytes, self.blocks)
    }
}
