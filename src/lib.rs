//! # Memory-compact trigram language model
//!
//! Kneser-Ney smoothed trigram probabilities from a sentence corpus, with all
//! ngram counts kept in open-addressing tables that pack a two-part key and a
//! count into a single machine word.
//!
//! - [`PackedMap`]: exact table, 64-bit slots `[key1 | key2 | value]`.
//! - [`ApproxPackedMap`]: lossy table, 32-bit slots `[checksum | value]`.
//! - [`BigramIndex`]: dense 1-based ids for word pairs.
//! - [`TrigramCounter`]: `(bigram id, word) -> count`, exact or approximate.
//! - [`KneserNeyLm`]: the model, built by [`KneserNeyBuilder`] in one pass.
//!
//! # Example
//! ```rust
//! use packed_lm::{KneserNeyLm, LmConfig, NgramLanguageModel, Vocabulary, WordIndexer};
//!
//! let corpus = [vec!["the", "cat", "sat"], vec!["the", "cat", "ran"]];
//! let mut vocabulary = WordIndexer::new();
//! let lm = KneserNeyLm::train(LmConfig::small(), &mut vocabulary, corpus).unwrap();
//!
//! let the = vocabulary.id_of("the");
//! let cat = vocabulary.id_of("cat");
//! let sat = vocabulary.id_of("sat");
//! assert_eq!(lm.get_count(&[the, cat]), 2);
//!
//! let ngram = [the, cat, sat];
//! let log_probability = lm.ngram_log_probability(&ngram, 0..ngram.len());
//! assert!(log_probability.is_finite());
//! ```

#[cfg(test)]
#[allow(unused_macros)]
macro_rules! ahashmap {
    (@single $($x:tt)*) => (());
    (@count $($rest:expr),*) => (<[()]>::len(&[$(ahashmap!(@single $rest)),*]));

    ($($key:expr => $value:expr,)+) => { ahashmap!($($key => $value),+) };
    ($($key:expr => $value:expr),*) => {
        {
            let _cap = ahashmap!(@count $($key),*);
            let mut _map = ::ahash::AHashMap::with_capacity(_cap);
            $(
                let _ = _map.insert($key, $value);
            )*
            _map
        }
    };
}

mod bigram_index;
mod lm;
mod ngram_order;
pub mod packed;
mod trigram_counter;
mod vocabulary;

pub use bigram_index::{BigramId, BigramIndex};
pub use lm::{
    KneserNeyBuilder, KneserNeyLm, LmConfig, LmError, LmStats, NgramLanguageModel,
    SENTINEL_PROBABILITY,
};
pub use ngram_order::NgramOrder;
pub use packed::{ApproxPackedMap, CountTable, PackedMap, PackedMapError};
pub use trigram_counter::{TableKind, TrigramCounter};
pub use vocabulary::{Vocabulary, WordId, WordIndexer, START, STOP};
