//! Heap-block statistics and walk listing
//!
//! Thin wrappers over the allocator's walk cursor: a size-class
//! histogram of in-use blocks and a plain block-by-block listing.

use crate::core::types::{Address, InspectResult};
use crate::host::HeapInspect;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Size-class histogram of the in-use heap
#[derive(Debug, Clone, Default)]
pub struct BlockStats {
    /// In-use block count per block size
    classes: BTreeMap<usize, usize>,
    pub total_in_use: usize,
    pub total_in_use_bytes: u64,
}

impl BlockStats {
    /// Number of distinct in-use block sizes
    pub fn size_classes(&self) -> usize {
        self.classes.len()
    }

    /// Writes totals, the top-N biggest blocks, and the top-N size
    /// classes by population
    pub fn write_top<W: Write>(&self, out: &mut W, n: usize) -> io::Result<()> {
        writeln!(
            out,
            "Total inuse blocks: {} total bytes: {} number of size classes: {}",
            self.total_in_use,
            self.total_in_use_bytes,
            self.size_classes()
        )?;

        writeln!(out, "Top {} blocks by size", n)?;
        let mut remaining = n;
        'sizes: for (&size, &count) in self.classes.iter().rev() {
            for _ in 0..count {
                if remaining == 0 {
                    break 'sizes;
                }
                writeln!(out, "\t{}", size)?;
                remaining -= 1;
            }
        }

        writeln!(out, "Top {} block sizes by count", n)?;
        let mut by_count: Vec<(usize, usize)> =
            self.classes.iter().map(|(&s, &c)| (s, c)).collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1));
        for (size, count) in by_count.into_iter().take(n) {
            writeln!(out, "\tsize {} count: {}", size, count)?;
        }
        Ok(())
    }
}

/// Walks the whole heap and buckets in-use blocks by size
pub fn collect_block_stats<H: HeapInspect>(host: &H) -> InspectResult<BlockStats> {
    let mut stats = BlockStats::default();
    let mut cursor: Option<Address> = None;
    while let Some(block) = host.next_block(cursor)? {
        if block.in_use {
            *stats.classes.entry(block.size).or_insert(0) += 1;
            stats.total_in_use += 1;
            stats.total_in_use_bytes += block.size as u64;
        }
        cursor = Some(block.base);
    }
    Ok(stats)
}

/// Lists heap blocks from `start`, at most `limit` of them, followed
/// by in-use/free totals
pub fn write_walk<W: Write, H: HeapInspect>(
    host: &H,
    out: &mut W,
    start: Option<Address>,
    limit: Option<usize>,
) -> InspectResult<()> {
    let mut total = 0usize;
    let mut in_use = 0usize;
    let mut in_use_bytes = 0u64;
    let mut free = 0usize;
    let mut free_bytes = 0u64;

    let mut cursor = start;
    while let Some(block) = host.next_block(cursor)? {
        total += 1;
        if block.in_use {
            in_use += 1;
            in_use_bytes += block.size as u64;
        } else {
            free += 1;
            free_bytes += block.size as u64;
        }
        writeln!(out, "[{}] {}", total, block)?;
        if let Some(limit) = limit {
            if total >= limit {
                break;
            }
        }
        cursor = Some(block.base);
    }

    writeln!(out, "Total {} inuse blocks of {} bytes", in_use, in_use_bytes)?;
    writeln!(out, "Total {} free blocks of {} bytes", free, free_bytes)?;
    Ok(())
}
