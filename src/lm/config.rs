use super::LmError;
use crate::{
    packed::{ChecksumLayout, PackedLayout},
    trigram_counter::TableKind,
};
use serde::{Deserialize, Serialize};

/// Build parameters of a [`KneserNeyLm`](super::KneserNeyLm).
///
/// Capacities are hints for the expected number of distinct unigrams, bigrams
/// and trigrams. Tables are sized from them once and never grow, so a corpus
/// larger than the hints fails the build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LmConfig {
    pub unigram_capacity: usize,
    pub bigram_capacity: usize,
    pub trigram_capacity: usize,
    /// Hash table load factor, in (0, 1]
    pub load_factor: f32,
    /// Absolute discount, in (0, 1)
    pub discount: f64,
    pub table_kind: TableKind,
    pub bigram_layout: PackedLayout,
    pub trigram_layout: PackedLayout,
    pub approx_layout: ChecksumLayout,
}

impl Default for LmConfig {
    /// Sized for ~500k unigrams, ~8.4M bigrams and ~42M trigrams
    #[inline]
    fn default() -> Self {
        Self {
            unigram_capacity: 495_200,
            bigram_capacity: 8_375_000,
            trigram_capacity: 42_000_000,
            load_factor: 0.75,
            discount: 0.9,
            table_kind: TableKind::Exact,
            bigram_layout: PackedLayout::BIGRAM_INDEX,
            trigram_layout: PackedLayout::TRIGRAM_COUNTER,
            approx_layout: ChecksumLayout::TRIGRAM_COUNTER,
        }
    }
}

impl LmConfig {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// 50k of each, for tests and small corpora
    #[inline]
    pub fn small() -> Self {
        Self::new().capacities(50_000, 50_000, 50_000)
    }

    #[inline]
    pub fn capacities(mut self, unigrams: usize, bigrams: usize, trigrams: usize) -> Self {
        self.unigram_capacity = unigrams;
        self.bigram_capacity = bigrams;
        self.trigram_capacity = trigrams;
        self
    }

    #[inline]
    pub fn load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    #[inline]
    pub fn discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    #[inline]
    pub fn table_kind(mut self, table_kind: TableKind) -> Self {
        self.table_kind = table_kind;
        self
    }

    /// Lossy trigram counter, about half the memory
    #[inline]
    pub fn approximate(self) -> Self {
        self.table_kind(TableKind::Approximate)
    }

    #[inline]
    pub fn bigram_layout(mut self, layout: PackedLayout) -> Self {
        self.bigram_layout = layout;
        self
    }

    #[inline]
    pub fn trigram_layout(mut self, layout: PackedLayout) -> Self {
        self.trigram_layout = layout;
        self
    }

    #[inline]
    pub fn approx_layout(mut self, layout: ChecksumLayout) -> Self {
        self.approx_layout = layout;
        self
    }

    pub fn validate(&self) -> Result<(), LmError> {
        if self.unigram_capacity == 0 || self.bigram_capacity == 0 || self.trigram_capacity == 0
        {
            return Err(LmError::InvalidConfig(
                "capacities must be positive".to_owned(),
            ));
        }
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(LmError::InvalidConfig(format!(
                "load factor {} not in (0, 1]",
                self.load_factor
            )));
        }
        if !(self.discount > 0.0 && self.discount < 1.0) {
            return Err(LmError::InvalidConfig(format!(
                "discount {} not in (0, 1)",
                self.discount
            )));
        }
        self.bigram_layout.validate()?;
        self.trigram_layout.validate()?;
        self.approx_layout.validate()?;

        Ok(())
    }

    /// Parses and validates a config in EnCom format
    pub fn from_encom(s: &str) -> Result<Self, LmError> {
        let config: Self =
            serde_encom::from_str(s).map_err(|e| LmError::ConfigFormat(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_encom(&self) -> Result<String, LmError> {
        serde_encom::to_string(self).map_err(|e| LmError::ConfigFormat(e.to_string()))
    }
}
