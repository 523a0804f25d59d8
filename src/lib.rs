#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Errors reported by fallible constructors and cursor operations.
pub mod error;

/// A HashMap with primitive values and a sentinel default return value.
///
/// This module provides a `HashMap` that wraps the `HashTable` and adds the
/// full map contract: sentinel accessors, compute and merge operations,
/// accumulation, trimming and views.
pub mod hash_map;

pub mod hash_table;
pub mod iter;
pub mod sizing;
pub mod strategy;
pub mod value;
pub mod views;

pub use error::Error;
pub use error::Result;
pub use hash_map::HashMap;
pub use hash_table::HashTable;
pub use iter::Cursor;
pub use iter::EntryRef;
pub use iter::MapEntry;
pub use strategy::DefaultStrategy;
pub use strategy::HashStrategy;
pub use value::Numeric;
pub use value::Value;
