use crate::{
    bigram_index::BigramId,
    packed::{ApproxPackedMap, ChecksumLayout, CountTable, PackedLayout, PackedMap, PackedMapError},
    vocabulary::WordId,
};
use ::std::fmt;
use serde::{
    de::{Error, Unexpected, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Serialized as its name, a plain string in EnCom
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
pub enum TableKind {
    /// Full keys, exact counts
    #[default]
    Exact,
    /// Checksummed keys, half the memory, counts of colliding keys merge
    Approximate,
}

impl Serialize for TableKind {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(<&'static str>::from(*self))
    }
}

struct TableKindVisitor;

impl Visitor<'_> for TableKindVisitor {
    type Value = TableKind;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a table kind, 'Exact' or 'Approximate'")
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse()
            .map_err(|_| Error::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for TableKind {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(TableKindVisitor)
    }
}

/// Counts `(bigram id, word3)` occurrences
#[derive(Debug)]
pub enum TrigramCounter {
    Exact(PackedMap),
    Approximate(ApproxPackedMap),
}

impl TrigramCounter {
    pub fn new(
        kind: TableKind,
        initial_capacity: usize,
        load_factor: f32,
        exact_layout: PackedLayout,
        approx_layout: ChecksumLayout,
    ) -> Result<Self, PackedMapError> {
        Ok(match kind {
            TableKind::Exact => {
                Self::Exact(PackedMap::new(initial_capacity, load_factor, exact_layout)?)
            }
            TableKind::Approximate => Self::Approximate(ApproxPackedMap::new(
                initial_capacity,
                load_factor,
                approx_layout,
            )?),
        })
    }

    #[inline]
    pub fn kind(&self) -> TableKind {
        match self {
            Self::Exact(_) => TableKind::Exact,
            Self::Approximate(_) => TableKind::Approximate,
        }
    }

    /// Returns the count after the increment, 1 on the first occurrence
    #[inline]
    pub fn increase_count(
        &mut self,
        bigram: BigramId,
        word3: WordId,
    ) -> Result<u32, PackedMapError> {
        self.adjust_or_put(bigram, word3, 1)
    }

    #[inline(always)]
    fn table(&self) -> &dyn CountTable {
        match self {
            Self::Exact(map) => map,
            Self::Approximate(map) => map,
        }
    }
}

impl CountTable for TrigramCounter {
    #[inline]
    fn get(&self, key1: u32, key2: u32) -> u32 {
        match self {
            Self::Exact(map) => map.get(key1, key2),
            Self::Approximate(map) => map.get(key1, key2),
        }
    }

    #[inline]
    fn adjust_or_put(&mut self, key1: u32, key2: u32, delta: u32) -> Result<u32, PackedMapError> {
        match self {
            Self::Exact(map) => map.adjust_or_put(key1, key2, delta),
            Self::Approximate(map) => map.adjust_or_put(key1, key2, delta),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.table().len()
    }

    fn sum(&self) -> u64 {
        self.table().sum()
    }

    fn max_value(&self) -> u32 {
        self.table().max_value()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.table().capacity()
    }

    #[inline]
    fn memory_bytes(&self) -> usize {
        self.table().memory_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn counter(kind: TableKind) -> TrigramCounter {
        TrigramCounter::new(
            kind,
            100,
            0.75,
            PackedLayout::TRIGRAM_COUNTER,
            ChecksumLayout::TRIGRAM_COUNTER,
        )
        .unwrap()
    }

    #[rstest(kind, case(TableKind::Exact), case(TableKind::Approximate))]
    fn test_increase_count(kind: TableKind) {
        let mut counter = counter(kind);
        assert_eq!(counter.kind(), kind);
        assert_eq!(counter.increase_count(1, 7), Ok(1));
        assert_eq!(counter.increase_count(1, 7), Ok(2));
        assert_eq!(counter.increase_count(1, 7), Ok(3));
        assert_eq!(counter.get(1, 7), 3);
        assert_eq!(counter.len(), 1);
        assert_eq!(counter.sum(), 3);
        assert_eq!(counter.max_value(), 3);
    }

    #[test]
    fn test_first_occurrence_per_key() {
        let mut counter = counter(TableKind::Exact);
        for bigram in 1..=10 {
            for word3 in 0..5 {
                assert_eq!(counter.increase_count(bigram, word3), Ok(1));
            }
        }
        assert_eq!(counter.len(), 50);
        assert_eq!(counter.increase_count(4, 4), Ok(2));
    }

    #[rstest(kind, case(TableKind::Exact), case(TableKind::Approximate))]
    fn test_table_kind_encom(kind: TableKind) {
        let serialized = serde_encom::to_string(&kind).unwrap();
        assert_eq!(serialized, format!("{}={kind}", kind.to_string().len()));
        assert_eq!(serde_encom::from_str::<TableKind>(&serialized).unwrap(), kind);
        assert!(serde_encom::from_str::<TableKind>("5=Fuzzy").is_err());
    }

    #[test]
    fn test_approximate_uses_less_memory() {
        assert!(
            counter(TableKind::Approximate).memory_bytes()
                < counter(TableKind::Exact).memory_bytes()
        );
    }
}
