use super::PackedMapError;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Field {
    #[strum(serialize = "first key")]
    Key1,
    #[strum(serialize = "second key")]
    Key2,
    #[strum(serialize = "value")]
    Value,
}

/// Bit widths of a 64-bit slot: `[key1 | key2 | value]`, value in the low bits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedLayout {
    key1_bits: u32,
    key2_bits: u32,
    value_bits: u32,
}

impl PackedLayout {
    pub const WORD_BITS: u32 = u64::BITS;

    /// 19-bit word ids on both sides, 26-bit bigram ids
    pub const BIGRAM_INDEX: Self = Self {
        key1_bits: 19,
        key2_bits: 19,
        value_bits: 26,
    };

    /// 23-bit bigram id, 19-bit word id, 22-bit count
    pub const TRIGRAM_COUNTER: Self = Self {
        key1_bits: 23,
        key2_bits: 19,
        value_bits: 22,
    };

    pub fn new(key1_bits: u32, key2_bits: u32, value_bits: u32) -> Result<Self, PackedMapError> {
        let layout = Self {
            key1_bits,
            key2_bits,
            value_bits,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), PackedMapError> {
        if self.key1_bits == 0 || self.key2_bits == 0 || self.value_bits == 0 {
            return Err(PackedMapError::InvalidLayout(format!(
                "zero width field in {self:?}"
            )));
        }
        if self.key1_bits > u32::BITS || self.key2_bits > u32::BITS || self.value_bits > u32::BITS
        {
            return Err(PackedMapError::InvalidLayout(format!(
                "field wider than 32 bits in {self:?}"
            )));
        }
        if self.key1_bits + self.key2_bits + self.value_bits != Self::WORD_BITS {
            return Err(PackedMapError::InvalidLayout(format!(
                "fields of {self:?} do not sum to {} bits",
                Self::WORD_BITS
            )));
        }

        Ok(())
    }

    #[inline(always)]
    pub fn key1_bits(&self) -> u32 {
        self.key1_bits
    }

    #[inline(always)]
    pub fn key2_bits(&self) -> u32 {
        self.key2_bits
    }

    #[inline(always)]
    pub fn value_bits(&self) -> u32 {
        self.value_bits
    }

    #[inline(always)]
    pub(super) fn value_mask(&self) -> u64 {
        low_mask(self.value_bits)
    }

    #[inline(always)]
    pub(super) fn key_mask(&self) -> u64 {
        !self.value_mask()
    }

    /// `((key1 << key2_bits) | key2) << value_bits`
    #[inline]
    pub(super) fn pack_key(&self, key1: u32, key2: u32) -> Result<u64, PackedMapError> {
        check_width(Field::Key1, u64::from(key1), self.key1_bits)?;
        check_width(Field::Key2, u64::from(key2), self.key2_bits)?;
        Ok(((u64::from(key1) << self.key2_bits) | u64::from(key2)) << self.value_bits)
    }
}

/// Bit widths of a 32-bit slot: `[checksum | value]`, value in the low bits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumLayout {
    checksum_bits: u32,
    value_bits: u32,
}

impl Default for ChecksumLayout {
    #[inline]
    fn default() -> Self {
        Self::TRIGRAM_COUNTER
    }
}

impl ChecksumLayout {
    pub const WORD_BITS: u32 = u32::BITS;

    pub const TRIGRAM_COUNTER: Self = Self {
        checksum_bits: 9,
        value_bits: 23,
    };

    pub fn new(checksum_bits: u32, value_bits: u32) -> Result<Self, PackedMapError> {
        let layout = Self {
            checksum_bits,
            value_bits,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), PackedMapError> {
        if self.checksum_bits == 0 || self.value_bits == 0 {
            return Err(PackedMapError::InvalidLayout(format!(
                "zero width field in {self:?}"
            )));
        }
        if self.checksum_bits + self.value_bits != Self::WORD_BITS {
            return Err(PackedMapError::InvalidLayout(format!(
                "fields of {self:?} do not sum to {} bits",
                Self::WORD_BITS
            )));
        }

        Ok(())
    }

    #[inline(always)]
    pub fn checksum_bits(&self) -> u32 {
        self.checksum_bits
    }

    #[inline(always)]
    pub fn value_bits(&self) -> u32 {
        self.value_bits
    }

    #[inline(always)]
    pub(super) fn value_mask(&self) -> u32 {
        low_mask(self.value_bits) as u32
    }

    #[inline(always)]
    pub(super) fn checksum_mask(&self) -> u32 {
        !self.value_mask()
    }
}

#[inline(always)]
fn low_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

#[inline(always)]
pub(super) fn check_width(field: Field, value: u64, bits: u32) -> Result<(), PackedMapError> {
    if value > low_mask(bits) {
        return Err(PackedMapError::CapacityExceeded { field, value, bits });
    }
    Ok(())
}
