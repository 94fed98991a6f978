//! Memory address wrapper type with hex parsing and validation

use super::error::{InspectError, InspectResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents an address in the inspected process with type-safe operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

impl FromStr for Address {
    type Err = InspectError;

    fn from_str(s: &str) -> InspectResult<Self> {
        let s = s.trim();

        // Handle hex prefix variations
        let value = if s.starts_with("0x") || s.starts_with("0X") {
            usize::from_str_radix(&s[2..], 16)
        } else if s.starts_with('$') {
            usize::from_str_radix(&s[1..], 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            // Assume hex if contains letters
            usize::from_str_radix(s, 16)
        } else {
            // Try decimal first, then hex
            s.parse::<usize>().or_else(|_| usize::from_str_radix(s, 16))
        };

        value
            .map(Address::new)
            .map_err(|_| InspectError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value as usize)
    }
}
