use crate::{
    packed::{CountTable, PackedLayout, PackedMap, PackedMapError},
    vocabulary::WordId,
};

/// Dense 1-based bigram id, 0 means an unseen bigram
pub type BigramId = u32;

/// Assigns dense ids to `(word1, word2)` pairs in first-seen order.
///
/// The ids index flat count arrays directly, so they are never reassigned
/// and have no gaps.
#[derive(Debug)]
pub struct BigramIndex {
    ids: PackedMap,
}

impl BigramIndex {
    pub fn new(
        initial_capacity: usize,
        load_factor: f32,
        layout: PackedLayout,
    ) -> Result<Self, PackedMapError> {
        Ok(Self {
            ids: PackedMap::new(initial_capacity, load_factor, layout)?,
        })
    }

    pub fn add_and_get_index(
        &mut self,
        word1: WordId,
        word2: WordId,
    ) -> Result<BigramId, PackedMapError> {
        let id = self.ids.get(word1, word2);
        if id > 0 {
            return Ok(id);
        }
        let next = self.ids.len() as BigramId + 1;
        self.ids.adjust_or_put(word1, word2, next)
    }

    #[inline]
    pub fn get(&self, word1: WordId, word2: WordId) -> BigramId {
        self.ids.get(word1, word2)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn memory_bytes(&self) -> usize {
        self.ids.memory_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> BigramIndex {
        BigramIndex::new(100, 0.75, PackedLayout::BIGRAM_INDEX).unwrap()
    }

    #[test]
    fn test_dense_first_seen_order() {
        let mut index = index();
        let pairs = [(1, 2), (2, 1), (5, 5), (0, 3)];
        for (expected, &(w1, w2)) in (1..).zip(pairs.iter()) {
            assert_eq!(index.add_and_get_index(w1, w2), Ok(expected));
        }
        assert_eq!(index.len(), pairs.len());
    }

    #[test]
    fn test_idempotent() {
        let mut index = index();
        let first = index.add_and_get_index(3, 4).unwrap();
        index.add_and_get_index(4, 3).unwrap();
        assert_eq!(index.add_and_get_index(3, 4), Ok(first));
        assert_eq!(index.get(3, 4), first);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_unseen_is_zero() {
        let mut index = index();
        assert_eq!(index.get(1, 1), 0);
        index.add_and_get_index(1, 2).unwrap();
        assert_eq!(index.get(2, 1), 0);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_word_id_overflow() {
        let mut index = index();
        assert!(matches!(
            index.add_and_get_index(1 << PackedLayout::BIGRAM_INDEX.key1_bits(), 0),
            Err(PackedMapError::CapacityExceeded { .. })
        ));
        assert!(index.is_empty());
    }
}
