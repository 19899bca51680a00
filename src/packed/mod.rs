//! Fixed-capacity open-addressing tables that pack a two-part key and a count
//! into a single machine word.
//!
//! An all-zero word marks an empty slot, so a stored value is never 0.
//! Tables never delete and never grow: the capacity is fixed at construction
//! as the next prime after `initial_capacity / load_factor`.

mod approximate;
mod exact;
mod hash;
mod layout;

pub use approximate::ApproxPackedMap;
pub use exact::PackedMap;
pub use layout::{ChecksumLayout, Field, PackedLayout};

pub(crate) use hash::table_capacity;

use debug_unsafe::slice::SliceGetter;
use thiserror::Error;

/// Counting interface shared by [`PackedMap`] and [`ApproxPackedMap`]
pub trait CountTable {
    /// Stored value of `(key1, key2)`, 0 if absent
    fn get(&self, key1: u32, key2: u32) -> u32;

    /// Adds `delta` to the value of `(key1, key2)`, creating the slot if needed.
    /// Returns the updated value.
    fn adjust_or_put(&mut self, key1: u32, key2: u32, delta: u32) -> Result<u32, PackedMapError>;

    /// Number of populated slots
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all stored values, full table scan
    fn sum(&self) -> u64;

    /// Largest stored value, full table scan
    fn max_value(&self) -> u32;

    fn capacity(&self) -> usize;

    fn memory_bytes(&self) -> usize;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackedMapError {
    #[error("{field} {value} does not fit into {bits} bits")]
    CapacityExceeded { field: Field, value: u64, bits: u32 },
    #[error("Table of capacity {capacity} is full")]
    TableFull { capacity: usize },
    #[error("Stored value must be at least 1")]
    ZeroValue,
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
    #[error("Capacity {0} can not be addressed by a 32-bit hash")]
    CapacityTooLarge(usize),
}

/// Linear probing from `start`, wrapping at the end of `slots`.
/// Stops at the first empty slot or the first slot accepted by `is_match`.
#[inline]
pub(crate) fn probe<W: Copy + Default + PartialEq>(
    slots: &[W],
    start: usize,
    is_match: impl Fn(W) -> bool,
) -> Result<usize, PackedMapError> {
    let capacity = slots.len();
    let empty = W::default();
    let mut index = start;
    for _ in 0..capacity {
        let slot = *slots.get_safe_unchecked(index);
        if slot == empty || is_match(slot) {
            return Ok(index);
        }
        index += 1;
        if index == capacity {
            index = 0;
        }
    }

    Err(PackedMapError::TableFull { capacity })
}

#[cfg(test)]
mod tests {
    use super::{probe, PackedMapError};

    #[test]
    fn test_probe_wraps() {
        let slots = [0u64, 7, 8, 9];
        assert_eq!(probe(&slots, 2, |s| s == 100), Ok(0));
        assert_eq!(probe(&slots, 1, |s| s == 9), Ok(3));
    }

    #[test]
    fn test_probe_full() {
        let slots = [1u32, 2, 3];
        assert_eq!(
            probe(&slots, 1, |s| s == 100),
            Err(PackedMapError::TableFull { capacity: 3 })
        );
    }
}
