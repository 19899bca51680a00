use ::core::hash::BuildHasher;
use ::std::{collections::HashMap, fmt};
use compact_str::CompactString;

pub type WordId = u32;

/// Sentence start marker
pub const START: &str = "<s>";
/// Sentence end marker
pub const STOP: &str = "</s>";

/// Word to id mapping the model is built and queried with.
///
/// Ids are assigned monotonically from 0 and never change. `START` and `STOP`
/// ids are stable for the lifetime of the vocabulary.
pub trait Vocabulary {
    /// Id of `word`, interning it if new
    fn id_of(&mut self, word: &str) -> WordId;

    fn start_id(&self) -> WordId;

    fn stop_id(&self) -> WordId;

    /// Number of interned words
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn word(&self, id: WordId) -> Option<&str>;
}

/// Hash map backed [`Vocabulary`], `START` is 0 and `STOP` is 1
pub struct WordIndexer<H: BuildHasher + Default = rustc_hash::FxBuildHasher> {
    ids: HashMap<CompactString, WordId, H>,
    words: Vec<CompactString>,
}

impl<H: BuildHasher + Default> fmt::Debug for WordIndexer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordIndexer")
            .field("len", &self.words.len())
            .finish_non_exhaustive()
    }
}

impl<H: BuildHasher + Default> Default for WordIndexer<H> {
    #[inline]
    fn default() -> Self {
        Self::with_capacity(2)
    }
}

impl WordIndexer {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: BuildHasher + Default> WordIndexer<H> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut indexer = Self {
            ids: HashMap::with_capacity_and_hasher(capacity, H::default()),
            words: Vec::with_capacity(capacity),
        };
        indexer.intern(START);
        indexer.intern(STOP);
        indexer
    }

    fn intern(&mut self, word: &str) -> WordId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = self.words.len() as WordId;
        let word = CompactString::from(word);
        self.words.push(word.clone());
        self.ids.insert(word, id);
        id
    }

    /// Id of an already interned word
    #[inline]
    pub fn get(&self, word: &str) -> Option<WordId> {
        self.ids.get(word).copied()
    }

    /// Ids of already interned words, unknown words map to `None`
    pub fn ids<'a>(
        &'a self,
        words: impl IntoIterator<Item = &'a str> + 'a,
    ) -> impl Iterator<Item = Option<WordId>> + 'a {
        words.into_iter().map(|w| self.get(w))
    }
}

impl<H: BuildHasher + Default> Vocabulary for WordIndexer<H> {
    #[inline]
    fn id_of(&mut self, word: &str) -> WordId {
        self.intern(word)
    }

    #[inline(always)]
    fn start_id(&self) -> WordId {
        0
    }

    #[inline(always)]
    fn stop_id(&self) -> WordId {
        1
    }

    #[inline(always)]
    fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    fn word(&self, id: WordId) -> Option<&str> {
        self.words.get(id as usize).map(CompactString::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_ids() {
        let mut indexer = WordIndexer::new();
        assert_eq!(indexer.len(), 2);
        assert_eq!(indexer.id_of(START), indexer.start_id());
        assert_eq!(indexer.id_of(STOP), indexer.stop_id());
        assert_eq!(indexer.word(indexer.start_id()), Some(START));
        assert_eq!(indexer.word(indexer.stop_id()), Some(STOP));
    }

    #[test]
    fn test_monotonic_ids() {
        let mut indexer = WordIndexer::new();
        assert_eq!(indexer.id_of("the"), 2);
        assert_eq!(indexer.id_of("cat"), 3);
        assert_eq!(indexer.id_of("the"), 2);
        assert_eq!(indexer.len(), 4);
        assert_eq!(indexer.word(3), Some("cat"));
        assert_eq!(indexer.word(4), None);
        assert_eq!(indexer.get("dog"), None);
        assert_eq!(
            indexer.ids(["cat", "dog"]).collect::<Vec<_>>(),
            vec![Some(3), None]
        );
    }

    #[test]
    fn test_hasher_change() {
        let mut indexer = WordIndexer::<ahash::RandomState>::with_capacity(16);
        assert_eq!(indexer.id_of("a"), 2);
        assert_eq!(indexer.get("a"), Some(2));
    }
}
