use super::{
    hash::slot_index,
    layout::{check_width, Field, PackedLayout},
    probe, table_capacity, CountTable, PackedMapError,
};
use ::std::{fmt, mem::size_of};
use debug_unsafe::slice::SliceGetter;

/// Exact packed map. The whole key is kept in the slot, lookups are exact.
pub struct PackedMap {
    slots: Vec<u64>,
    len: usize,
    layout: PackedLayout,
}

impl fmt::Debug for PackedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedMap")
            .field("capacity", &self.slots.len())
            .field("len", &self.len)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl PackedMap {
    pub fn new(
        initial_capacity: usize,
        load_factor: f32,
        layout: PackedLayout,
    ) -> Result<Self, PackedMapError> {
        layout.validate()?;
        let capacity = table_capacity(initial_capacity, load_factor)?;
        tracing::debug!(
            capacity,
            bytes = capacity * size_of::<u64>(),
            "Allocating packed map"
        );

        Ok(Self {
            slots: vec![0; capacity],
            len: 0,
            layout,
        })
    }

    #[inline(always)]
    pub fn layout(&self) -> PackedLayout {
        self.layout
    }

    #[inline]
    fn locate(&self, key: u64) -> Result<usize, PackedMapError> {
        let key_mask = self.layout.key_mask();
        probe(
            &self.slots,
            slot_index(key, self.slots.len()),
            |slot| slot & key_mask == key,
        )
    }
}

impl CountTable for PackedMap {
    #[inline]
    fn get(&self, key1: u32, key2: u32) -> u32 {
        let Ok(key) = self.layout.pack_key(key1, key2) else {
            return 0;
        };
        match self.locate(key) {
            Ok(location) => {
                (*self.slots.get_safe_unchecked(location) & self.layout.value_mask()) as u32
            }
            Err(_) => 0,
        }
    }

    fn adjust_or_put(&mut self, key1: u32, key2: u32, delta: u32) -> Result<u32, PackedMapError> {
        let key = self.layout.pack_key(key1, key2)?;
        let location = self.locate(key)?;
        let value_mask = self.layout.value_mask();

        let slot = self.slots.get_safe_unchecked_mut(location);
        let current = *slot & value_mask;
        let value = current + u64::from(delta);
        if value == 0 {
            return Err(PackedMapError::ZeroValue);
        }
        check_width(Field::Value, value, self.layout.value_bits())?;

        *slot = key | value;
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
        self.slots.iter().map(|slot| slot & value_mask).sum()
    }

    fn max_value(&self) -> u32 {
        let value_mask = self.layout.value_mask();
        self.slots
            .iter()
            .map(|slot| (slot & value_mask) as u32)
            .max()
            .unwrap_or_default()
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn memory_bytes(&self) -> usize {
        self.slots.capacity() * size_of::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;

    fn small_map(initial_capacity: usize) -> PackedMap {
        PackedMap::new(initial_capacity, 0.75, PackedLayout::TRIGRAM_COUNTER).unwrap()
    }

    #[test]
    fn test_get_absent() {
        let map = small_map(16);
        assert_eq!(map.get(1, 2), 0);
        assert!(map.is_empty());
        assert_eq!(map.sum(), 0);
    }

    #[test]
    fn test_adjust_or_put_accumulates() {
        let mut map = small_map(16);
        assert_eq!(map.adjust_or_put(3, 4, 1), Ok(1));
        assert_eq!(map.adjust_or_put(3, 4, 5), Ok(6));
        assert_eq!(map.adjust_or_put(4, 3, 2), Ok(2));

        assert_eq!(map.get(3, 4), 6);
        assert_eq!(map.get(4, 3), 2);
        assert_eq!(map.get(3, 3), 0);
        assert_eq!(map.len(), 2);
        assert_eq!(map.sum(), 8);
        assert_eq!(map.max_value(), 6);
    }

    #[test]
    fn test_matches_reference_counts() {
        let mut map = small_map(2_000);
        let mut reference: AHashMap<(u32, u32), u32> = AHashMap::new();
        for i in 0..5_000u32 {
            let key = (i % 37, (i * 7) % 41);
            let delta = i % 3 + 1;
            *reference.entry(key).or_default() += delta;
            let value = map.adjust_or_put(key.0, key.1, delta).unwrap();
            assert_eq!(value, reference[&key]);
        }

        assert_eq!(map.len(), reference.len());
        for (&(k1, k2), &count) in reference.iter() {
            assert_eq!(map.get(k1, k2), count);
        }
        assert_eq!(map.sum(), reference.values().map(|&v| u64::from(v)).sum::<u64>());
        assert_eq!(map.get(100, 100), 0);
    }

    #[test]
    fn test_prime_capacity() {
        let map = small_map(100);
        assert_eq!(map.capacity(), 137);
        assert_eq!(map.memory_bytes(), 137 * 8);
    }

    #[test]
    fn test_zero_value_rejected() {
        let mut map = small_map(16);
        assert_eq!(map.adjust_or_put(1, 1, 0), Err(PackedMapError::ZeroValue));
        assert!(map.is_empty());
    }

    #[test]
    fn test_field_overflow() {
        let mut map = small_map(16);
        let layout = PackedLayout::TRIGRAM_COUNTER;
        assert_eq!(
            map.adjust_or_put(1 << layout.key1_bits(), 0, 1),
            Err(PackedMapError::CapacityExceeded {
                field: Field::Key1,
                value: 1 << layout.key1_bits(),
                bits: layout.key1_bits(),
            })
        );
        assert_eq!(
            map.adjust_or_put(0, 1 << layout.key2_bits(), 1),
            Err(PackedMapError::CapacityExceeded {
                field: Field::Key2,
                value: 1 << layout.key2_bits(),
                bits: layout.key2_bits(),
            })
        );

        let max_value = (1 << layout.value_bits()) - 1;
        assert_eq!(map.adjust_or_put(2, 2, max_value), Ok(max_value));
        assert!(matches!(
            map.adjust_or_put(2, 2, 1),
            Err(PackedMapError::CapacityExceeded {
                field: Field::Value,
                ..
            })
        ));
        assert_eq!(map.get(2, 2), max_value);
        assert_eq!(map.get(1 << layout.key1_bits(), 0), 0);
    }

    #[test]
    fn test_table_full() {
        // capacity 2
        let mut map = PackedMap::new(2, 1.0, PackedLayout::TRIGRAM_COUNTER).unwrap();
        assert_eq!(map.capacity(), 2);
        map.adjust_or_put(1, 1, 1).unwrap();
        map.adjust_or_put(2, 2, 1).unwrap();
        assert_eq!(
            map.adjust_or_put(3, 3, 1),
            Err(PackedMapError::TableFull { capacity: 2 })
        );
        assert_eq!(map.get(3, 3), 0);
        assert_eq!(map.adjust_or_put(1, 1, 1), Ok(2));
    }
}
