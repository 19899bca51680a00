use super::{KneserNeyLm, LmConfig, LmError};
use crate::{
    bigram_index::BigramIndex,
    packed::CountTable,
    trigram_counter::{TableKind, TrigramCounter},
    vocabulary::{Vocabulary, WordId},
    NgramOrder,
};
use ::std::mem;
use itertools::Itertools;

const PROGRESS_INTERVAL: usize = 1_000_000;

/// Counts gathered in one pass over the corpus.
///
/// Count arrays are sized from the capacity hints, bigram arrays have one
/// extra slot since bigram ids start at 1.
pub(super) struct Counts {
    pub(super) unigrams: Vec<u32>,
    pub(super) bigram_index: BigramIndex,
    pub(super) bigrams: Vec<u32>,
    pub(super) trigrams: TrigramCounter,
    /// N1+(•, w2, •), by word id
    pub(super) x_unigram_x: Vec<u32>,
    /// N1+(w1, w2, •), by bigram id
    pub(super) bigram_x: Vec<u32>,
    /// N1+(•, w2, w3), by bigram id
    pub(super) x_bigram: Vec<u32>,
}

impl Counts {
    fn new(config: &LmConfig) -> Result<Self, LmError> {
        Ok(Self {
            unigrams: vec![0; config.unigram_capacity],
            bigram_index: BigramIndex::new(
                config.bigram_capacity,
                config.load_factor,
                config.bigram_layout,
            )?,
            bigrams: vec![0; config.bigram_capacity + 1],
            trigrams: TrigramCounter::new(
                config.table_kind,
                config.trigram_capacity,
                config.load_factor,
                config.trigram_layout,
                config.approx_layout,
            )?,
            x_unigram_x: vec![0; config.unigram_capacity],
            bigram_x: vec![0; config.bigram_capacity + 1],
            x_bigram: vec![0; config.bigram_capacity + 1],
        })
    }

    pub(super) fn memory_bytes(&self) -> usize {
        [
            &self.unigrams,
            &self.bigrams,
            &self.x_unigram_x,
            &self.bigram_x,
            &self.x_bigram,
        ]
        .into_iter()
        .map(|counts| counts.capacity() * mem::size_of::<u32>())
        .sum::<usize>()
            + self.bigram_index.memory_bytes()
            + self.trigrams.memory_bytes()
    }

    /// Replaces zero counts with 1, so queries never divide by zero
    fn floor_to_one(&mut self) {
        for counts in [
            &mut self.unigrams,
            &mut self.bigrams,
            &mut self.x_unigram_x,
            &mut self.bigram_x,
            &mut self.x_bigram,
        ] {
            counts.iter_mut().filter(|c| **c == 0).for_each(|c| *c = 1);
        }
    }
}

#[inline]
fn increment(counts: &mut [u32], id: u32, order: NgramOrder) -> Result<(), LmError> {
    let capacity = counts.len();
    let count = counts
        .get_mut(id as usize)
        .ok_or(LmError::CapacityExceeded {
            order,
            id,
            capacity,
        })?;
    *count = count.saturating_add(1);
    Ok(())
}

/// Single streaming pass over a corpus, finished into a [`KneserNeyLm`].
///
/// Words are interned through `vocabulary`, which keeps being the source of
/// word ids for queries against the finished model.
pub struct KneserNeyBuilder<'v, V: Vocabulary> {
    config: LmConfig,
    vocabulary: &'v mut V,
    counts: Counts,
    sentences: usize,
    sentence_ids: Vec<WordId>,
}

impl<'v, V: Vocabulary> KneserNeyBuilder<'v, V> {
    pub fn new(config: LmConfig, vocabulary: &'v mut V) -> Result<Self, LmError> {
        config.validate()?;
        if config.table_kind == TableKind::Approximate {
            tracing::warn!("Approximate trigram counter, counts of colliding trigrams will merge");
        }
        let counts = Counts::new(&config)?;
        tracing::debug!(
            bytes = counts.memory_bytes(),
            "Allocated language model counts"
        );

        Ok(Self {
            config,
            vocabulary,
            counts,
            sentences: 0,
            sentence_ids: Vec::new(),
        })
    }

    #[inline(always)]
    pub fn sentences(&self) -> usize {
        self.sentences
    }

    /// Counts one sentence, padded with `START` and `STOP`
    pub fn add_sentence<S: AsRef<str>>(
        &mut self,
        sentence: impl IntoIterator<Item = S>,
    ) -> Result<(), LmError> {
        self.sentences += 1;
        if self.sentences % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                sentences = self.sentences,
                unigrams = self.vocabulary.len(),
                bigrams = self.counts.bigram_index.len(),
                trigrams = self.counts.trigrams.len(),
                "Building language model"
            );
        }

        let mut ids = mem::take(&mut self.sentence_ids);
        ids.clear();
        ids.push(self.vocabulary.start_id());
        for word in sentence {
            ids.push(self.vocabulary.id_of(word.as_ref()));
        }
        ids.push(self.vocabulary.stop_id());

        let counted = self.count_sentence(&ids);
        self.sentence_ids = ids;
        counted
    }

    pub fn add_corpus<S: AsRef<str>, I: IntoIterator<Item = S>>(
        &mut self,
        corpus: impl IntoIterator<Item = I>,
    ) -> Result<(), LmError> {
        corpus
            .into_iter()
            .try_for_each(|sentence| self.add_sentence(sentence))
    }

    fn count_sentence(&mut self, ids: &[WordId]) -> Result<(), LmError> {
        let &[word1, word2, ..] = ids else {
            return Ok(());
        };
        let counts = &mut self.counts;

        increment(&mut counts.unigrams, word1, NgramOrder::Uni)?;
        increment(&mut counts.unigrams, word2, NgramOrder::Uni)?;
        let mut word1word2 = counts.bigram_index.add_and_get_index(word1, word2)?;
        increment(&mut counts.bigrams, word1word2, NgramOrder::Bi)?;

        for (_, word2, word3) in ids.iter().copied().tuple_windows() {
            increment(&mut counts.unigrams, word3, NgramOrder::Uni)?;
            let word2word3 = counts.bigram_index.add_and_get_index(word2, word3)?;
            increment(&mut counts.bigrams, word2word3, NgramOrder::Bi)?;

            if counts.trigrams.increase_count(word1word2, word3)? == 1 {
                increment(&mut counts.x_unigram_x, word2, NgramOrder::Uni)?;
                increment(&mut counts.bigram_x, word1word2, NgramOrder::Bi)?;
                increment(&mut counts.x_bigram, word2word3, NgramOrder::Bi)?;
            }

            word1word2 = word2word3;
        }

        Ok(())
    }

    /// Computes the unseen ngram probabilities and floors every count to 1
    pub fn finish(self) -> KneserNeyLm {
        let Self {
            config,
            vocabulary,
            mut counts,
            sentences,
            ..
        } = self;

        let total_bigrams: u64 = counts.bigrams.iter().map(|&c| u64::from(c)).sum();
        let unseen_bigram_log_probability = (1.0 / (total_bigrams as f64 + 1.0)).ln();
        let unseen_trigram_log_probability =
            (1.0 / (counts.trigrams.sum() as f64 + 1.0)).ln();
        tracing::info!(
            unseen_bigram_log_probability,
            unseen_trigram_log_probability,
            "Unseen ngram probabilities"
        );

        counts.floor_to_one();

        let lm = KneserNeyLm {
            config,
            num_unigrams: vocabulary.len(),
            num_bigrams: counts.bigram_index.len(),
            counts,
            sentences,
            unseen_bigram_log_probability,
            unseen_trigram_log_probability,
        };
        tracing::info!(stats = ?lm.stats(), "Done building language model");

        lm
    }
}
