use thiserror::Error;

/// Result type alias for fallible map operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by map construction and cursor operations.
///
/// Lookups never fail: absence is reported through `Option`, a slot
/// insertion point, or the map's default return value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The load factor is not strictly between 0 and 1.
    #[error("load factor must be greater than 0 and smaller than 1, got {0}")]
    InvalidLoadFactor(f32),

    /// The requested capacity needs a table larger than
    /// [`MAX_TABLE_SIZE`](crate::sizing::MAX_TABLE_SIZE).
    #[error("capacity {capacity} at load factor {load_factor} exceeds the maximum table size")]
    CapacityOverflow {
        /// Requested number of elements.
        capacity: usize,
        /// Requested load factor.
        load_factor: f32,
    },

    /// Parallel key and value slices passed to a bulk constructor differ in
    /// length.
    #[error("key and value arrays differ in length: {keys} keys, {values} values")]
    LengthMismatch {
        /// Number of keys supplied.
        keys: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// A cursor operation needs a current entry, but `next` has not returned
    /// one or it was already removed.
    #[error("cursor has no current entry")]
    NoCurrentEntry,
}
