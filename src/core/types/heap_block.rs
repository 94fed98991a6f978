//! Allocator-tracked heap block metadata

use super::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A contiguous allocator-tracked region of heap memory
///
/// Block identity is the base address alone: two blocks with equal
/// bases are the same block regardless of the size or in-use flag a
/// host happens to report. The analyzer only ever reads block
/// metadata; the allocator owns it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeapBlock {
    /// Base address of the block
    pub base: Address,
    /// Size of the block in bytes
    pub size: usize,
    /// Whether the block is currently allocated
    pub in_use: bool,
}

impl HeapBlock {
    /// Creates block metadata for a live allocation
    pub const fn in_use(base: Address, size: usize) -> Self {
        HeapBlock {
            base,
            size,
            in_use: true,
        }
    }

    /// Creates block metadata for a free block
    pub const fn free(base: Address, size: usize) -> Self {
        HeapBlock {
            base,
            size,
            in_use: false,
        }
    }

    /// Get the end address of the block (exclusive)
    pub fn end_address(&self) -> Address {
        Address::new(self.base.as_usize() + self.size)
    }

    /// Check if an address is within this block
    pub fn contains(&self, address: Address) -> bool {
        address >= self.base && address < self.end_address()
    }
}

impl PartialEq for HeapBlock {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl Eq for HeapBlock {}

impl Hash for HeapBlock {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base.hash(state);
    }
}

impl fmt::Display for HeapBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} size={} {}",
            self.base,
            self.size,
            if self.in_use { "inuse" } else { "free" }
        )
    }
}
