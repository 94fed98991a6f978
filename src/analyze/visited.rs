//! Visited-set bookkeeping for cycle- and aliasing-safe traversal

use crate::core::types::Address;
use std::collections::HashSet;

/// Value addresses already expanded during one traversal
///
/// An address is claimed at most once per traversal run. A claim can
/// be released again when later analysis shows the address was
/// pre-claimed by a container whose first member aliases it.
#[derive(Debug, Default)]
pub struct VisitedValues {
    addresses: HashSet<Address>,
}

impl VisitedValues {
    pub fn new() -> Self {
        VisitedValues::default()
    }

    /// Claims an address; returns false if it was already claimed
    pub fn claim(&mut self, address: Address) -> bool {
        self.addresses.insert(address)
    }

    /// Releases a previously claimed address so an aliasing child can
    /// claim it for itself
    pub fn release(&mut self, address: Address) {
        self.addresses.remove(&address);
    }

    pub fn contains(&self, address: Address) -> bool {
        self.addresses.contains(&address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Heap block bases already charged to a running total
///
/// Grows monotonically for its whole lifetime: a block's bytes are
/// billed exactly once per ledger, no matter how many pointers reach
/// the block or how many roots share the ledger.
#[derive(Debug, Default)]
pub struct VisitedBlocks {
    bases: HashSet<Address>,
}

impl VisitedBlocks {
    pub fn new() -> Self {
        VisitedBlocks::default()
    }

    /// Claims a block base; returns true exactly once per base
    pub fn claim(&mut self, base: Address) -> bool {
        self.bases.insert(base)
    }

    pub fn contains(&self, base: Address) -> bool {
        self.bases.contains(&base)
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}
