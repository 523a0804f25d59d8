//! Table sizing and hash mixing.
//!
//! These are pure functions shared by every table instance: they turn an
//! expected element count into a power-of-two table size, compute the fill
//! threshold for a size, and scramble raw hash codes before they are masked
//! down to a slot index.

use crate::error::Error;

/// Number of elements a table is sized for when no capacity is given.
///
/// Also the floor below which a table never shrinks on removal.
pub const DEFAULT_MIN_CAPACITY: usize = 16;

/// Default fraction of the table that may be occupied before it grows.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Load factor trading memory for shorter probe sequences.
pub const FAST_LOAD_FACTOR: f32 = 0.5;

/// Load factor trading a lot of memory for very short probe sequences.
pub const VERY_FAST_LOAD_FACTOR: f32 = 0.25;

/// Largest table size (number of regular slots) a table can be created with.
pub const MAX_TABLE_SIZE: usize = 1 << 30;

/// 2^64 divided by the golden ratio, rounded to odd.
const GOLDEN_RATIO_64: u64 = 0x9E37_79B9_7F4A_7C15;

/// Scrambles a raw hash code so that every input bit influences the low bits.
///
/// Slot indices are taken from the low bits of the mixed hash. Without this
/// step, hash codes that only differ in their high bits (sequential integers
/// shifted left, pointers with large alignment) would all land in the same
/// few slots.
#[inline(always)]
pub const fn mix(hash: u64) -> u64 {
    let h = hash.wrapping_mul(GOLDEN_RATIO_64);
    let h = h ^ (h >> 32);
    h ^ (h >> 16)
}

/// Returns the number of slots needed to hold `expected` elements at
/// `load_factor`, rounded up to a power of two.
///
/// The result is at least 2 and at most [`MAX_TABLE_SIZE`].
///
/// # Examples
///
/// ```rust
/// use shift_map::sizing::array_size;
///
/// assert_eq!(array_size(12, 0.75), 16);
/// assert_eq!(array_size(13, 0.75), 32);
/// assert_eq!(array_size(0, 0.75), 2);
/// ```
pub fn array_size(expected: usize, load_factor: f32) -> usize {
    let wanted = slots_for(expected, load_factor);
    if wanted >= MAX_TABLE_SIZE as f64 {
        return MAX_TABLE_SIZE;
    }
    (wanted as usize).next_power_of_two().clamp(2, MAX_TABLE_SIZE)
}

/// Like [`array_size`], but reports an error instead of clamping when the
/// table would exceed [`MAX_TABLE_SIZE`].
pub fn try_array_size(expected: usize, load_factor: f32) -> Result<usize, Error> {
    let wanted = slots_for(expected, load_factor);
    if wanted > MAX_TABLE_SIZE as f64 {
        return Err(Error::CapacityOverflow {
            capacity: expected,
            load_factor,
        });
    }
    Ok((wanted as usize).next_power_of_two().max(2))
}

/// Returns the number of elements a table of `table_size` slots holds before
/// it must grow.
///
/// At least one slot always stays empty, so probe sequences terminate.
///
/// # Examples
///
/// ```rust
/// use shift_map::sizing::max_fill;
///
/// assert_eq!(max_fill(16, 0.75), 12);
/// assert_eq!(max_fill(2, 0.75), 1);
/// ```
pub fn max_fill(table_size: usize, load_factor: f32) -> usize {
    let fill = ceil(table_size as f64 * load_factor as f64) as usize;
    fill.min(table_size - 1)
}

#[inline]
pub(crate) fn slots_for(expected: usize, load_factor: f32) -> f64 {
    ceil(expected as f64 / load_factor as f64)
}

/// `f64::ceil` for non-negative inputs that only needs `core`. Saturates past
/// `u64::MAX`, far beyond [`MAX_TABLE_SIZE`].
#[inline]
fn ceil(x: f64) -> f64 {
    let truncated = x as u64 as f64;
    if truncated < x { truncated + 1.0 } else { truncated }
}
