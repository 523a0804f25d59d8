//! The open-addressing table engine.
//!
//! Keys and values live in two parallel arrays of `table_size + 1` slots.
//! Regular slots `0..table_size` are probed linearly starting from the mixed
//! hash of a key; slot `table_size` is reserved for the strategy's null key,
//! which never takes part in a probe sequence. Removal uses backward-shift
//! deletion, so the table never holds tombstones.

use alloc::boxed::Box;
#[cfg(any(test, feature = "stats"))]
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::ControlFlow;

use crate::error::Error;
use crate::sizing;
use crate::strategy::HashStrategy;
use crate::value::Value;

/// Allocates the key and value arrays for `table_size` regular slots plus the
/// null slot.
/// Slot arrays and population handed out by [`HashTable::take_all`].
pub(crate) type TakenSlots<K, V> = (Box<[Option<K>]>, Box<[V]>, usize);

fn allocate<K, V: Value>(table_size: usize) -> (Box<[Option<K>]>, Box<[V]>) {
    let keys = (0..=table_size).map(|_| None).collect();
    let values = alloc::vec![V::default(); table_size + 1].into_boxed_slice();
    (keys, values)
}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries, including the null key
    pub populated: usize,
    /// Number of entries the table holds before it grows
    pub max_fill: usize,
    /// Number of regular slots
    pub table_size: usize,
    /// Size the table never shrinks below on removal
    pub min_capacity: usize,
    /// Configured load factor
    pub load_factor: f32,
    /// Slot utilization (populated / table_size)
    pub slot_utilization: f64,
    /// Longest distance between a key's home slot and its actual slot
    pub longest_probe: usize,
    /// Mean distance between a key's home slot and its actual slot
    pub mean_probe: f64,
    /// Total memory in bytes used by the key and value arrays
    pub total_bytes: usize,
    /// Memory in bytes held by empty slots
    pub wasted_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% of max fill, load factor {})",
            self.populated,
            self.max_fill,
            if self.max_fill == 0 {
                0.0
            } else {
                self.populated as f64 / self.max_fill as f64 * 100.0
            },
            self.load_factor
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization, minimum {})",
            self.populated,
            self.table_size,
            self.slot_utilization * 100.0,
            self.min_capacity
        );
        println!(
            "Probe Distance: longest {}, mean {:.3}",
            self.longest_probe, self.mean_probe
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// Number of keys at each distance from their home slot.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    /// `counts[d]` is the number of keys stored `d` slots past their home
    /// slot.
    pub counts: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Total number of keys in regular slots.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Pretty-print the histogram.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let total = self.total();
        println!("=== Probe Length Histogram ===");
        for (distance, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let share = count as f64 / total.max(1) as f64;
            let bar = "#".repeat((share * 60.0).ceil() as usize);
            println!("{distance:>4}: {count:>10} ({:>6.2}%) {bar}", share * 100.0);
        }
    }
}

/// An open-addressing hash table with linear probing and backward-shift
/// deletion.
///
/// `HashTable<K, V, S>` is the engine behind [`HashMap`](crate::HashMap). It
/// owns the slot arrays and exposes slot-level operations: resolve a key to
/// its slot (or to the slot it would be inserted at), insert at a resolved
/// slot, and remove at a slot. Growth, shrinking and the backward shift that
/// keeps every probe sequence unbroken happen inside these operations.
///
/// ## Slot indices
///
/// [`find_index`](Self::find_index) returns `Ok(slot)` when the key is present
/// and `Err(slot)` with the insertion point otherwise, so a caller can look up
/// a key once and then read, overwrite or insert without probing again. An
/// index is only meaningful until the next mutation of the table.
///
/// # Examples
///
/// ```rust
/// use shift_map::hash_table::HashTable;
/// use shift_map::strategy::DefaultStrategy;
///
/// let mut table: HashTable<&str, i32, DefaultStrategy> =
///     HashTable::try_with_capacity_and_load_factor(8, 0.75, DefaultStrategy::new()).unwrap();
///
/// match table.find_index(&"apples") {
///     Ok(_) => unreachable!(),
///     Err(slot) => table.insert_at(slot, "apples", 3),
/// }
/// let slot = table.find_index(&"apples").unwrap();
/// assert_eq!(table.value_at(slot), 3);
/// assert_eq!(table.remove_at(slot), Some(("apples", 3)));
/// assert!(table.is_empty());
/// ```
pub struct HashTable<K, V, S> {
    pub(crate) keys: Box<[Option<K>]>,
    pub(crate) values: Box<[V]>,

    pub(crate) null_index: usize,
    mask: usize,
    max_fill: usize,
    min_capacity: usize,
    load_factor: f32,

    pub(crate) contains_null: bool,
    pub(crate) len: usize,

    strategy: S,
}

impl<K, V, S> Debug for HashTable<K, V, S>
where
    K: Debug,
    V: Value + Debug,
    S: HashStrategy<K>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::string::ToString;
        use alloc::vec::Vec;

        let slots = self.keys[..self.null_index]
            .chunks(16)
            .enumerate()
            .map(|(row, chunk)| {
                let cells = chunk
                    .iter()
                    .enumerate()
                    .map(|(offset, key)| match key {
                        None => "...".to_string(),
                        Some(key) => {
                            let distance = (row * 16 + offset).wrapping_sub(self.home_slot(key))
                                & self.mask;
                            format!("+{distance:02}")
                        }
                    })
                    .collect::<Vec<_>>();
                cells.join(" ")
            })
            .collect::<Vec<String>>();

        f.debug_struct("HashTable")
            .field("slots", &slots)
            .field(
                "null",
                &self.keys[self.null_index]
                    .as_ref()
                    .map(|key| (key, &self.values[self.null_index])),
            )
            .field("len", &self.len)
            .field("table_size", &self.null_index)
            .field("max_fill", &self.max_fill)
            .finish()
    }
}

impl<K, V, S> Clone for HashTable<K, V, S>
where
    K: Clone,
    V: Value,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            values: self.values.clone(),
            null_index: self.null_index,
            mask: self.mask,
            max_fill: self.max_fill,
            min_capacity: self.min_capacity,
            load_factor: self.load_factor,
            contains_null: self.contains_null,
            len: self.len,
            strategy: self.strategy.clone(),
        }
    }
}

impl<K, V: Value, S> HashTable<K, V, S> {
    /// Creates a table able to hold `capacity` entries at `load_factor`
    /// without growing.
    ///
    /// The table never shrinks below the size chosen here on removal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLoadFactor`] unless `0 < load_factor < 1`, and
    /// [`Error::CapacityOverflow`] if the table would exceed
    /// [`MAX_TABLE_SIZE`](sizing::MAX_TABLE_SIZE).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::Error;
    /// use shift_map::hash_table::HashTable;
    /// use shift_map::strategy::DefaultStrategy;
    ///
    /// let table: HashTable<u32, u8, DefaultStrategy> =
    ///     HashTable::try_with_capacity_and_load_factor(100, 0.5, DefaultStrategy::new())?;
    /// assert_eq!(table.table_size(), 256);
    /// assert!(table.capacity() >= 100);
    ///
    /// let err = HashTable::<u32, u8, DefaultStrategy>::try_with_capacity_and_load_factor(100, 0.0, DefaultStrategy::new());
    /// assert!(matches!(err, Err(Error::InvalidLoadFactor(_))));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn try_with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f32,
        strategy: S,
    ) -> Result<Self, Error> {
        if !(load_factor > 0.0 && load_factor < 1.0) {
            return Err(Error::InvalidLoadFactor(load_factor));
        }
        let table_size = sizing::try_array_size(capacity, load_factor)?;
        let (keys, values) = allocate(table_size);

        Ok(Self {
            keys,
            values,
            null_index: table_size,
            mask: table_size - 1,
            max_fill: sizing::max_fill(table_size, load_factor),
            min_capacity: table_size,
            load_factor,
            contains_null: false,
            len: 0,
            strategy,
        })
    }

    /// Returns the number of entries, including the null key.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of entries the table holds before it grows.
    pub fn capacity(&self) -> usize {
        self.max_fill
    }

    /// Returns the number of regular slots. Always a power of two.
    pub fn table_size(&self) -> usize {
        self.null_index
    }

    /// Returns the size the table never shrinks below.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Returns the configured load factor.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the hash strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Returns `true` if the null key is present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::hash_table::HashTable;
    /// use shift_map::strategy::DefaultStrategy;
    /// use shift_map::strategy::Nullable;
    ///
    /// let mut table: HashTable<Option<u8>, u8, Nullable<DefaultStrategy>> =
    ///     HashTable::try_with_capacity_and_load_factor(4, 0.75, Nullable::default()).unwrap();
    /// let slot = table.find_index(&None).unwrap_err();
    /// assert_eq!(slot, table.table_size());
    /// table.insert_at(slot, None, 1);
    /// assert!(table.contains_null_key());
    /// ```
    pub fn contains_null_key(&self) -> bool {
        self.contains_null
    }

    /// Returns the key stored at `index`, if any.
    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.keys.get(index)?.as_ref()
    }

    /// Returns the value stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > table_size()`.
    pub fn value_at(&self, index: usize) -> V {
        self.values[index]
    }

    /// Returns a mutable reference to the value stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > table_size()`.
    pub fn value_at_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    /// Removes every entry without changing the table size.
    pub fn clear(&mut self) {
        if self.len == 0 {
            return;
        }
        self.keys.iter_mut().for_each(|key| *key = None);
        self.values.fill(V::default());
        self.contains_null = false;
        self.len = 0;
    }

    /// Removes every entry and shrinks the table to the size needed for
    /// `capacity` entries, but never below the minimum capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::hash_table::HashTable;
    /// use shift_map::strategy::DefaultStrategy;
    ///
    /// let mut table: HashTable<u32, u32, DefaultStrategy> =
    ///     HashTable::try_with_capacity_and_load_factor(16, 0.75, DefaultStrategy::new()).unwrap();
    /// table.reserve(5000);
    /// table.clear_and_trim(0);
    /// assert!(table.is_empty());
    /// assert_eq!(table.table_size(), table.min_capacity());
    /// ```
    pub fn clear_and_trim(&mut self, capacity: usize) {
        let request = self.trim_request(capacity);
        if request >= self.null_index {
            self.clear();
            return;
        }
        let (keys, values) = allocate(request);
        self.keys = keys;
        self.values = values;
        self.resized(request);
        self.contains_null = false;
        self.len = 0;
    }

    /// Visits every entry in scan order: the null key first, then the
    /// regular slots from the highest index down to zero.
    pub(crate) fn scan<'t, B>(
        &'t self,
        mut f: impl FnMut(&'t K, V) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        if self.contains_null
            && let Some(key) = &self.keys[self.null_index]
        {
            f(key, self.values[self.null_index])?;
        }
        for index in (0..self.null_index).rev() {
            if let Some(key) = &self.keys[index] {
                f(key, self.values[index])?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Clears the null slot without shrinking.
    fn take_null(&mut self) -> Option<(K, V)> {
        let key = self.keys[self.null_index].take()?;
        let value = core::mem::take(&mut self.values[self.null_index]);
        self.contains_null = false;
        self.len -= 1;
        Some((key, value))
    }

    /// Empties the table in place and hands back the old slot arrays.
    pub(crate) fn take_all(&mut self) -> TakenSlots<K, V> {
        let (keys, values) = allocate(self.null_index);
        let keys = core::mem::replace(&mut self.keys, keys);
        let values = core::mem::replace(&mut self.values, values);
        let len = core::mem::take(&mut self.len);
        self.contains_null = false;
        (keys, values, len)
    }

    fn trim_request(&self, capacity: usize) -> usize {
        (sizing::slots_for(capacity, self.load_factor) as usize)
            .min(sizing::MAX_TABLE_SIZE)
            .next_power_of_two()
            .max(2)
            .max(self.min_capacity)
    }

    fn resized(&mut self, table_size: usize) {
        self.null_index = table_size;
        self.mask = table_size - 1;
        self.max_fill = sizing::max_fill(table_size, self.load_factor);
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    V: Value,
    S: HashStrategy<K>,
{
    #[inline(always)]
    fn home_slot(&self, key: &K) -> usize {
        sizing::mix(self.strategy.hash(key)) as usize & self.mask
    }

    /// Resolves `key` to its slot.
    ///
    /// Returns `Ok(slot)` if the key is present and `Err(slot)` with the slot
    /// it would be inserted at otherwise. The null key resolves to
    /// [`table_size()`](Self::table_size) either way.
    pub fn find_index(&self, key: &K) -> Result<usize, usize> {
        if self.strategy.is_null_key(key) {
            return if self.contains_null {
                Ok(self.null_index)
            } else {
                Err(self.null_index)
            };
        }

        let mut pos = self.home_slot(key);
        loop {
            match &self.keys[pos] {
                None => return Err(pos),
                Some(current) if self.strategy.equals(current, key) => return Ok(pos),
                Some(_) => pos = (pos + 1) & self.mask,
            }
        }
    }

    /// Inserts `key` and `value` at `slot`, growing the table if it is full.
    ///
    /// `slot` must be the `Err` result of a [`find_index`](Self::find_index)
    /// for `key` with no mutation in between; any other slot corrupts the
    /// table.
    pub fn insert_at(&mut self, slot: usize, key: K, value: V) {
        debug_assert!(self.keys[slot].is_none());
        if slot == self.null_index {
            self.contains_null = true;
        }
        self.keys[slot] = Some(key);
        self.values[slot] = value;

        let grow = self.len >= self.max_fill;
        self.len += 1;
        if grow {
            match sizing::try_array_size(self.len + 1, self.load_factor) {
                Ok(table_size) => self.rehash(table_size),
                Err(err) => panic!("{err}"),
            }
        }
    }

    /// Removes the entry at `index`, shrinking the table once it falls below
    /// a quarter of its fill threshold.
    ///
    /// `index` should be an `Ok` result of [`find_index`](Self::find_index)
    /// with no mutation in between. Returns `None` if the slot is empty.
    pub fn remove_at(&mut self, index: usize) -> Option<(K, V)> {
        let removed = self.take_at(index, |_| {});
        if removed.is_some() {
            self.maybe_shrink();
        }
        removed
    }

    /// Removes the entry at `index` without shrinking. Keys moved across the
    /// end of the table by the backward shift are passed to `on_wrap`.
    pub(crate) fn take_at(&mut self, index: usize, on_wrap: impl FnMut(&K)) -> Option<(K, V)> {
        if index == self.null_index {
            return self.take_null();
        }
        let key = self.keys.get_mut(index)?.take()?;
        let value = self.values[index];
        self.len -= 1;
        self.shift_keys(index, on_wrap);
        Some((key, value))
    }

    /// Closes the gap at `pos` by sliding later entries of the probe run
    /// backwards.
    ///
    /// An entry may only move into the gap if the gap is not before its home
    /// slot; otherwise a lookup starting at the home slot would never reach
    /// it. `on_wrap` sees every key that moves from a lower index to a higher
    /// one across the end of the table.
    pub(crate) fn shift_keys(&mut self, mut pos: usize, mut on_wrap: impl FnMut(&K)) {
        loop {
            let last = pos;
            pos = (last + 1) & self.mask;
            loop {
                let Some(current) = &self.keys[pos] else {
                    self.keys[last] = None;
                    self.values[last] = V::default();
                    return;
                };
                // Cyclic distances measured backwards from `pos`. The entry
                // can fill the gap unless its home lies strictly after `last`.
                let from_home = pos.wrapping_sub(self.home_slot(current)) & self.mask;
                let from_gap = pos.wrapping_sub(last) & self.mask;
                if from_home >= from_gap {
                    break;
                }
                pos = (pos + 1) & self.mask;
            }

            if pos < last
                && let Some(moved) = &self.keys[pos]
            {
                on_wrap(moved);
            }
            self.keys[last] = self.keys[pos].take();
            self.values[last] = self.values[pos];
        }
    }

    fn maybe_shrink(&mut self) {
        if self.null_index > self.min_capacity
            && self.len < self.max_fill / 4
            && self.null_index > sizing::DEFAULT_MIN_CAPACITY
        {
            self.rehash(self.null_index / 2);
        }
    }

    /// Rebuilds the table with `table_size` regular slots.
    ///
    /// Entries are reinserted by plain linear probing, scanning the old slots
    /// from the highest index down. The null slot moves over unchanged.
    pub(crate) fn rehash(&mut self, table_size: usize) {
        let mask = table_size - 1;
        let (mut keys, mut values) = allocate::<K, V>(table_size);

        let mut remaining = self.len - usize::from(self.contains_null);
        let mut index = self.null_index;
        while remaining > 0 {
            index -= 1;
            let Some(key) = self.keys[index].take() else {
                continue;
            };
            let mut pos = sizing::mix(self.strategy.hash(&key)) as usize & mask;
            while keys[pos].is_some() {
                pos = (pos + 1) & mask;
            }
            keys[pos] = Some(key);
            values[pos] = self.values[index];
            remaining -= 1;
        }
        keys[table_size] = self.keys[self.null_index].take();
        values[table_size] = self.values[self.null_index];

        self.keys = keys;
        self.values = values;
        self.resized(table_size);
    }

    /// Grows the table so that `additional` more entries fit without another
    /// resize.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::hash_table::HashTable;
    /// use shift_map::strategy::DefaultStrategy;
    ///
    /// let mut table: HashTable<u32, u32, DefaultStrategy> =
    ///     HashTable::try_with_capacity_and_load_factor(0, 0.75, DefaultStrategy::new()).unwrap();
    /// table.reserve(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let table_size = sizing::array_size(self.len.saturating_add(additional), self.load_factor);
        if table_size > self.null_index {
            self.rehash(table_size);
        }
    }

    /// Shrinks the table to the smallest size that holds `capacity` entries,
    /// never below the minimum capacity.
    ///
    /// Returns `true` if the table was rebuilt, `false` if it is already
    /// small enough or its entries would not fit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::hash_table::HashTable;
    /// use shift_map::strategy::DefaultStrategy;
    ///
    /// let mut table: HashTable<u32, u32, DefaultStrategy> =
    ///     HashTable::try_with_capacity_and_load_factor(0, 0.75, DefaultStrategy::new()).unwrap();
    /// table.reserve(1000);
    /// for k in 0..10 {
    ///     let slot = table.find_index(&k).unwrap_err();
    ///     table.insert_at(slot, k, k);
    /// }
    /// assert!(table.trim_to(20));
    /// assert_eq!(table.table_size(), 32);
    /// assert!(!table.trim_to(20));
    /// assert!(!table.trim_to(2), "10 entries do not fit 4 slots");
    /// ```
    pub fn trim_to(&mut self, capacity: usize) -> bool {
        let request = self.trim_request(capacity);
        if request >= self.null_index || self.len >= sizing::max_fill(request, self.load_factor) {
            return false;
        }
        self.rehash(request);
        true
    }

    /// Returns the number of keys at each distance from their home slot.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut counts = Vec::new();
        for (index, key) in self.keys[..self.null_index].iter().enumerate() {
            if let Some(key) = key {
                let distance = index.wrapping_sub(self.home_slot(key)) & self.mask;
                if counts.len() <= distance {
                    counts.resize(distance + 1, 0);
                }
                counts[distance] += 1;
            }
        }
        ProbeHistogram { counts }
    }

    /// Collects statistics describing the table's occupancy and probe lengths.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let probed = histogram.total();
        let distance_sum: usize = histogram
            .counts
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();
        let slot_bytes = core::mem::size_of::<Option<K>>() + core::mem::size_of::<V>();
        let total_slots = self.null_index + 1;

        DebugStats {
            populated: self.len,
            max_fill: self.max_fill,
            table_size: self.null_index,
            min_capacity: self.min_capacity,
            load_factor: self.load_factor,
            slot_utilization: self.len as f64 / self.null_index as f64,
            longest_probe: histogram.counts.len().saturating_sub(1),
            mean_probe: if probed == 0 {
                0.0
            } else {
                distance_sum as f64 / probed as f64
            },
            total_bytes: total_slots * slot_bytes,
            wasted_bytes: (total_slots - self.len) * slot_bytes,
        }
    }

    /// Panics unless the table's structural invariants hold.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert!(self.null_index.is_power_of_two());
        assert_eq!(self.keys.len(), self.null_index + 1);
        assert_eq!(self.values.len(), self.null_index + 1);
        assert_eq!(self.contains_null, self.keys[self.null_index].is_some());
        assert!(self.len <= self.max_fill, "{} > {}", self.len, self.max_fill);
        assert!(self.null_index >= self.min_capacity);

        let mut occupied = usize::from(self.contains_null);
        for (index, key) in self.keys[..self.null_index].iter().enumerate() {
            let Some(key) = key else { continue };
            occupied += 1;
            assert!(!self.strategy.is_null_key(key));
            let mut pos = self.home_slot(key);
            while pos != index {
                assert!(
                    self.keys[pos].is_some(),
                    "empty slot {pos} on the probe path to slot {index}"
                );
                pos = (pos + 1) & self.mask;
            }
            assert_eq!(self.find_index(key), Ok(index));
        }
        assert_eq!(occupied, self.len);
    }
}
