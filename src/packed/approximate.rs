use super::{
    hash::{checksum, slot_index},
    layout::{check_width, ChecksumLayout, Field},
    probe, table_capacity, CountTable, PackedMapError,
};
use ::std::{fmt, mem::size_of};
use debug_unsafe::slice::SliceGetter;

/// Lossy packed map on 32-bit slots.
///
/// A slot keeps a short checksum of the key instead of the key itself, so two
/// keys with the same checksum on the same probe chain share one counter.
/// Half the memory of [`PackedMap`](super::PackedMap), at the price of
/// occasional merged counts.
pub struct ApproxPackedMap {
    slots: Vec<u32>,
    len: usize,
    layout: ChecksumLayout,
}

impl fmt::Debug for ApproxPackedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApproxPackedMap")
            .field("capacity", &self.slots.len())
            .field("len", &self.len)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

#[inline(always)]
fn pack(key1: u32, key2: u32) -> u64 {
    (u64::from(key1) << 32) | u64::from(key2)
}

impl ApproxPackedMap {
    pub fn new(
        initial_capacity: usize,
        load_factor: f32,
        layout: ChecksumLayout,
    ) -> Result<Self, PackedMapError> {
        layout.validate()?;
        let capacity = table_capacity(initial_capacity, load_factor)?;
        tracing::debug!(
            capacity,
            bytes = capacity * size_of::<u32>(),
            "Allocating approximate packed map"
        );

        Ok(Self {
            slots: vec![0; capacity],
            len: 0,
            layout,
        })
    }

    #[inline(always)]
    pub fn layout(&self) -> ChecksumLayout {
        self.layout
    }

    /// Checksum of the key, shifted into its slot position
    #[inline(always)]
    pub(crate) fn tag(&self, key1: u32, key2: u32) -> u32 {
        checksum(pack(key1, key2), self.layout.checksum_bits()) << self.layout.value_bits()
    }

    #[inline(always)]
    pub(crate) fn first_slot(&self, key1: u32, key2: u32) -> usize {
        slot_index(pack(key1, key2), self.slots.len())
    }

    #[inline]
    fn locate(&self, key1: u32, key2: u32) -> Result<(usize, u32), PackedMapError> {
        let tag = self.tag(key1, key2);
        let checksum_mask = self.layout.checksum_mask();
        let location = probe(&self.slots, self.first_slot(key1, key2), |slot| {
            slot & checksum_mask == tag
        })?;
        Ok((location, tag))
    }
}

impl CountTable for ApproxPackedMap {
    #[inline]
    fn get(&self, key1: u32, key2: u32) -> u32 {
        match self.locate(key1, key2) {
            Ok((location, _)) => {
                *self.slots.get_safe_unchecked(location) & self.layout.value_mask()
            }
            Err(_) => 0,
        }
    }

    fn adjust_or_put(&mut self, key1: u32, key2: u32, delta: u32) -> Result<u32, PackedMapError> {
        let (location, tag) = self.locate(key1, key2)?;
        let value_mask = self.layout.value_mask();

        let slot = self.slots.get_safe_unchecked_mut(location);
        let current = *slot & value_mask;
        let value = u64::from(current) + u64::from(delta);
        if value == 0 {
            return Err(PackedMapError::ZeroValue);
        }
        check_width(Field::Value, value, self.layout.value_bits())?;

        *slot = tag | value as u32;
        if current == 0 {
            self.len += 1;
        }
        Ok(value as u32)
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.len
    }

    fn sum(&self) -> u64 {
        let value_mask = self.layout.value_mask();
        self.slots
            .iter()
            .map(|slot| u64::from(slot & value_mask))
            .sum()
    }

    fn max_value(&self) -> u32 {
        let value_mask = self.layout.value_mask();
        self.slots
            .iter()
            .map(|slot| slot & value_mask)
            .max()
            .unwrap_or_default()
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn memory_bytes(&self) -> usize {
        self.slots.capacity() * size_of::<u32>()
    }
}
