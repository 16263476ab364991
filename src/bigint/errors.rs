//! Error types for the integer engine
//!
//! Everything except [`BigIntError::Parse`] and [`BigIntError::Unsupported`]
//! is fatal to the operation that raised it: the interpreter does not try to
//! recover from a failed allocation or a broken resize.

use crate::memory::heap::Address;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BigIntError {
    /// The underlying allocation could not be satisfied
    AllocationFailure { requested: usize },

    /// Growth would exceed the hard limb limit
    CapacityExceeded { requested: usize, limit: usize },

    /// Attempted to shrink by at least the current length
    ShrinkUnderflow { by: usize, len: usize },

    /// Malformed numeral
    Parse { input: String, message: String },

    /// Release of a block absent from the allocation table
    UntrackedFree { address: Address },

    /// Fractional storage and arithmetic
    Unsupported { feature: &'static str },
}

impl fmt::Display for BigIntError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BigIntError::AllocationFailure { requested } => {
                write!(f, "Failed to allocate {} bytes", requested)
            }
            BigIntError::CapacityExceeded { requested, limit } => {
                write!(
                    f,
                    "Cannot grow to {} limbs as {} is the upper limit",
                    requested, limit
                )
            }
            BigIntError::ShrinkUnderflow { by, len } => {
                write!(f, "Cannot shrink by {} when {} is all it has", by, len)
            }
            BigIntError::Parse { input, message } => {
                write!(f, "Cannot parse '{}': {}", input, message)
            }
            BigIntError::UntrackedFree { address } => {
                write!(f, "Free called on a non-existent heap pointer 0x{:x}", address)
            }
            BigIntError::Unsupported { feature } => {
                write!(f, "{} is unimplemented", feature)
            }
        }
    }
}

impl std::error::Error for BigIntError {}
