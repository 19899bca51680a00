use crate::{
    ngram_order::{NgramOrder, NGRAM_MAX_LEN},
    packed::CountTable,
    vocabulary::Vocabulary,
    WordId,
};
use ::std::ops::Range;
use debug_unsafe::slice::SliceGetter;
use builder::Counts;

mod builder;
mod config;
mod error;

pub use builder::KneserNeyBuilder;
pub use config::LmConfig;
pub use error::LmError;

/// Stands in for a missing continuation count, and is the probability of a
/// window the model can not score
pub const SENTINEL_PROBABILITY: f64 = 1e-6;

/// Read-only scoring interface of an ngram language model
pub trait NgramLanguageModel {
    /// Maximum ngram length
    fn order(&self) -> usize;

    /// Natural log probability of the last word of `ngram[window]` given the
    /// words before it. Never fails: unknown ids fall back to small
    /// probabilities.
    fn ngram_log_probability(&self, ngram: &[WordId], window: Range<usize>) -> f64;

    /// Raw count of a unigram, bigram or trigram, 0 if unknown
    fn get_count(&self, ngram: &[WordId]) -> u64;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LmStats {
    pub sentences: usize,
    pub unigrams: usize,
    pub bigrams: usize,
    pub trigrams: usize,
    pub top_trigram_count: u32,
    pub unseen_bigram_log_probability: f64,
    pub unseen_trigram_log_probability: f64,
    pub memory_bytes: usize,
}

/// Trigram model with interpolated Kneser-Ney smoothing.
///
/// Immutable once built, safe to share between threads.
pub struct KneserNeyLm {
    config: LmConfig,
    counts: Counts,
    num_unigrams: usize,
    num_bigrams: usize,
    sentences: usize,
    unseen_bigram_log_probability: f64,
    unseen_trigram_log_probability: f64,
}

impl ::std::fmt::Debug for KneserNeyLm {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        f.debug_struct("KneserNeyLm")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[inline(always)]
fn floored(counts: &[u32], index: u32) -> f64 {
    counts.get(index as usize).map_or(1.0, |&c| f64::from(c))
}

impl KneserNeyLm {
    /// Builds a model from `corpus` in a single pass
    pub fn train<V: Vocabulary, S: AsRef<str>, I: IntoIterator<Item = S>>(
        config: LmConfig,
        vocabulary: &mut V,
        corpus: impl IntoIterator<Item = I>,
    ) -> Result<Self, LmError> {
        let mut builder = KneserNeyBuilder::new(config, vocabulary)?;
        builder.add_corpus(corpus)?;
        Ok(builder.finish())
    }

    #[inline(always)]
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    #[inline(always)]
    pub fn unseen_bigram_log_probability(&self) -> f64 {
        self.unseen_bigram_log_probability
    }

    #[inline(always)]
    pub fn unseen_trigram_log_probability(&self) -> f64 {
        self.unseen_trigram_log_probability
    }

    #[inline]
    pub fn memory_bytes(&self) -> usize {
        self.counts.memory_bytes()
    }

    pub fn stats(&self) -> LmStats {
        LmStats {
            sentences: self.sentences,
            unigrams: self.num_unigrams,
            bigrams: self.num_bigrams,
            trigrams: self.counts.trigrams.len(),
            top_trigram_count: self.counts.trigrams.max_value(),
            unseen_bigram_log_probability: self.unseen_bigram_log_probability,
            unseen_trigram_log_probability: self.unseen_trigram_log_probability,
            memory_bytes: self.memory_bytes(),
        }
    }

    fn trigram_log_probability(&self, word1: WordId, word2: WordId, word3: WordId) -> f64 {
        let discount = self.config.discount;
        let counts = &self.counts;
        let word1word2 = counts.bigram_index.get(word1, word2);
        let word2word3 = counts.bigram_index.get(word2, word3);

        let word1word2_count = if word1word2 > 0 {
            floored(&counts.bigrams, word1word2)
        } else {
            1.0
        };

        let mut probability = 0.0;
        if word1word2 > 0 && word2word3 > 0 {
            let trigram_count = counts.trigrams.get(word1word2, word3);
            if trigram_count > 0 {
                probability = (f64::from(trigram_count) - discount).max(0.0) / word1word2_count;
            }
        }

        let bigram_x = if word1word2 > 0 {
            floored(&counts.bigram_x, word1word2)
        } else {
            SENTINEL_PROBABILITY
        };
        let x_bigram = if word2word3 > 0 {
            floored(&counts.x_bigram, word2word3)
        } else {
            SENTINEL_PROBABILITY
        };
        let x_unigram_x = floored(&counts.x_unigram_x, word2);

        probability += discount * bigram_x * x_bigram / x_unigram_x / word1word2_count;

        probability.ln()
    }

    /// Sentence start, only a bigram context exists.
    ///
    /// An unseen bigram reads the continuation count of id 0, which
    /// finalization floors to 1.
    fn bigram_log_probability(&self, word1: WordId, word2: WordId) -> f64 {
        let counts = &self.counts;
        let word1word2 = counts.bigram_index.get(word1, word2);
        let mut x_bigram = if floored(&counts.bigrams, word1word2) > 0.0 {
            floored(&counts.x_bigram, word1word2)
        } else {
            SENTINEL_PROBABILITY
        };

        let word1_count = floored(&counts.x_unigram_x, word1);
        if word1_count <= 0.0 {
            return SENTINEL_PROBABILITY.ln();
        }
        if x_bigram <= 0.0 {
            x_bigram = SENTINEL_PROBABILITY;
        }

        (x_bigram / word1_count).ln()
    }
}

impl NgramLanguageModel for KneserNeyLm {
    #[inline(always)]
    fn order(&self) -> usize {
        NGRAM_MAX_LEN
    }

    fn ngram_log_probability(&self, ngram: &[WordId], window: Range<usize>) -> f64 {
        match ngram.get(window) {
            Some(&[word1, word2]) => self.bigram_log_probability(word1, word2),
            Some(&[.., word1, word2, word3]) => {
                self.trigram_log_probability(word1, word2, word3)
            }
            _ => SENTINEL_PROBABILITY.ln(),
        }
    }

    fn get_count(&self, ngram: &[WordId]) -> u64 {
        let counts = &self.counts;
        let count = match NgramOrder::from_len(ngram.len()) {
            Some(NgramOrder::Uni) => {
                let word = *ngram.get_safe_unchecked(0);
                if (word as usize) < self.num_unigrams {
                    counts.unigrams.get(word as usize).copied().unwrap_or(0)
                } else {
                    0
                }
            }
            Some(NgramOrder::Bi) => {
                let id = counts
                    .bigram_index
                    .get(*ngram.get_safe_unchecked(0), *ngram.get_safe_unchecked(1));
                if id > 0 && id as usize <= self.num_bigrams {
                    counts.bigrams.get(id as usize).copied().unwrap_or(0)
                } else {
                    0
                }
            }
            Some(NgramOrder::Tri) => {
                let id = counts
                    .bigram_index
                    .get(*ngram.get_safe_unchecked(0), *ngram.get_safe_unchecked(1));
                if id > 0 {
                    counts.trigrams.get(id, *ngram.get_safe_unchecked(2))
                } else {
                    0
                }
            }
            None => 0,
        };

        u64::from(count)
    }
}
