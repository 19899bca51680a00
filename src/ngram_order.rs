use strum_macros::{Display, EnumCount, EnumIter};

pub(crate) const NGRAM_MAX_LEN: usize = NgramOrder::Tri.len();

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumCount, EnumIter,
)]
#[repr(usize)]
pub enum NgramOrder {
    #[strum(serialize = "unigram")]
    Uni = 1,
    #[strum(serialize = "bigram")]
    Bi = 2,
    #[strum(serialize = "trigram")]
    Tri = 3,
}

impl NgramOrder {
    /// Order of an ngram with `len` words, if the model knows it
    #[inline]
    pub const fn from_len(len: usize) -> Option<Self> {
        match len {
            1 => Some(Self::Uni),
            2 => Some(Self::Bi),
            3 => Some(Self::Tri),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn len(self) -> usize {
        self as usize
    }
}
