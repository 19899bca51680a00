use super::PackedMapError;

const CHECKSUM_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// 64-bit finalizer of MurmurHash3
#[inline(always)]
fn mix(mut key: u64) -> u64 {
    key ^= key >> 33;
    key = key.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    key ^= key >> 33;
    key = key.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    key ^ (key >> 33)
}

#[inline(always)]
pub(super) fn hash(key: u64) -> i32 {
    mix(key) as i32
}

/// Top `bits` bits of an independently seeded mix of `key`
#[inline(always)]
pub(super) fn checksum(key: u64, bits: u32) -> u32 {
    debug_assert!((1..32).contains(&bits), "checksum bits {bits} not in 1..32");
    (mix(key ^ CHECKSUM_SEED) >> (64 - bits)) as u32
}

/// First probe position of `key`.
///
/// Signed remainder, negated when negative. `capacity` must fit in `i32`.
#[inline(always)]
pub(super) fn slot_index(key: u64, capacity: usize) -> usize {
    let mut index = hash(key) % capacity as i32;
    if index < 0 {
        index = -index;
    }
    index as usize
}

fn is_prime(n: usize) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut d = 5;
    while d * d <= n {
        if n % d == 0 || n % (d + 2) == 0 {
            return false;
        }
        d += 6;
    }
    true
}

#[inline]
pub(super) fn next_prime(n: usize) -> usize {
    (n.max(2)..).find(|&c| is_prime(c)).unwrap_or(n)
}

/// Next prime >= `ceil(initial_capacity / load_factor)`
pub(crate) fn table_capacity(
    initial_capacity: usize,
    load_factor: f32,
) -> Result<usize, PackedMapError> {
    if !(load_factor > 0.0 && load_factor <= 1.0) {
        return Err(PackedMapError::InvalidLayout(format!(
            "load factor {load_factor} not in (0, 1]"
        )));
    }
    let length = (initial_capacity as f64 / f64::from(load_factor)).ceil() as usize;
    let capacity = next_prime(length);
    if capacity > i32::MAX as usize {
        return Err(PackedMapError::CapacityTooLarge(capacity));
    }

    Ok(capacity)
}
