use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::ControlFlow;

use crate::error::Error;
use crate::error::Result;
#[cfg(feature = "stats")]
use crate::hash_table::DebugStats;
use crate::hash_table::HashTable;
#[cfg(feature = "stats")]
use crate::hash_table::ProbeHistogram;
use crate::iter::Cursor;
use crate::iter::Drain;
use crate::iter::IntoIter;
use crate::iter::Iter;
use crate::iter::ValuesMut;
use crate::sizing;
use crate::strategy::DefaultStrategy;
use crate::strategy::HashStrategy;
use crate::value::Numeric;
use crate::value::Value;
use crate::views::EntrySet;
use crate::views::EntrySetMut;
use crate::views::KeySet;
use crate::views::KeySetMut;
use crate::views::ValueCollection;
use crate::views::ValueCollectionMut;

/// A hash map from keys to primitive values, backed by an open-addressing
/// [`HashTable`].
///
/// `HashMap<K, V, S>` hashes and compares keys through the [`HashStrategy`]
/// `S`, so `K` itself needs neither `Hash` nor `Eq`. Values are plain `Copy`
/// data.
///
/// # Default return value
///
/// Accessors such as [`get`](Self::get), [`put`](Self::put) and
/// [`remove`](Self::remove) return a configurable *default return value* for
/// absent keys instead of an `Option`. It starts out as `V::default()`. Use
/// [`find`](Self::find), [`insert`](Self::insert) or
/// [`remove_entry`](Self::remove_entry) when absence and a stored default
/// must be told apart.
///
/// ```rust
/// use shift_map::HashMap;
///
/// let mut scores: HashMap<&str, i32> = HashMap::new();
/// scores.set_default_return_value(-1);
///
/// assert_eq!(scores.put("alice", 10), -1);
/// assert_eq!(scores.put("alice", 12), 10);
/// assert_eq!(scores.get(&"bob"), -1);
/// assert_eq!(scores.find(&"bob"), None);
/// ```
///
/// # Performance Characteristics
///
/// - **Memory**: one `Option<K>` and one `V` per slot, with the table kept
///   between a quarter of and `load_factor` full
/// - **Lookups**: linear probing from the key's mixed hash; removal shifts
///   the rest of the probe run back, so there are no tombstones
pub struct HashMap<K, V, S = DefaultStrategy> {
    pub(crate) table: HashTable<K, V, S>,
    default_return_value: V,
}

impl<K, V, S> Clone for HashMap<K, V, S>
where
    K: Clone,
    V: Value,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            default_return_value: self.default_return_value,
        }
    }
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Value + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, &v);
        }
        map.finish()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    V: Value,
{
    /// Creates an empty map using `strategy`, sized for
    /// [`DEFAULT_MIN_CAPACITY`](sizing::DEFAULT_MIN_CAPACITY) entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::rc::Rc;
    ///
    /// use shift_map::HashMap;
    /// use shift_map::strategy::IdentityStrategy;
    ///
    /// let a = Rc::new("same");
    /// let b = Rc::new("same");
    ///
    /// let mut map: HashMap<Rc<&str>, u8, IdentityStrategy> = HashMap::with_strategy(IdentityStrategy);
    /// map.put(Rc::clone(&a), 1);
    /// assert_eq!(map.get(&a), 1);
    /// assert_eq!(map.get(&b), 0);
    /// ```
    pub fn with_strategy(strategy: S) -> Self {
        Self::with_capacity_and_strategy(sizing::DEFAULT_MIN_CAPACITY, strategy)
    }

    /// Creates an empty map using `strategy` that holds at least `capacity`
    /// entries before it grows.
    ///
    /// The table never shrinks below this size on removal.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` needs a table larger than
    /// [`MAX_TABLE_SIZE`](sizing::MAX_TABLE_SIZE).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    /// use shift_map::strategy::CaseInsensitive;
    ///
    /// let mut map: HashMap<&str, u8, CaseInsensitive> =
    ///     HashMap::with_capacity_and_strategy(100, CaseInsensitive::new());
    /// assert!(map.capacity() >= 100);
    ///
    /// map.put("Key", 1);
    /// assert_eq!(map.get(&"kEY"), 1);
    /// ```
    pub fn with_capacity_and_strategy(capacity: usize, strategy: S) -> Self {
        match Self::try_with_capacity_and_load_factor(
            capacity,
            sizing::DEFAULT_LOAD_FACTOR,
            strategy,
        ) {
            Ok(map) => map,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates an empty map using `strategy` that holds at least `capacity`
    /// entries at `load_factor` before it grows.
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
    /// use shift_map::HashMap;
    /// use shift_map::Error;
    /// use shift_map::sizing::FAST_LOAD_FACTOR;
    /// use shift_map::strategy::DefaultStrategy;
    ///
    /// let map: HashMap<u64, f32> =
    ///     HashMap::try_with_capacity_and_load_factor(64, FAST_LOAD_FACTOR, DefaultStrategy::new())?;
    /// assert_eq!(map.table_size(), 128);
    ///
    /// let err = HashMap::<u64, f32>::try_with_capacity_and_load_factor(64, 1.0, DefaultStrategy::new());
    /// assert_eq!(err.unwrap_err(), Error::InvalidLoadFactor(1.0));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn try_with_capacity_and_load_factor(
        capacity: usize,
        load_factor: f32,
        strategy: S,
    ) -> Result<Self> {
        Ok(Self {
            table: HashTable::try_with_capacity_and_load_factor(capacity, load_factor, strategy)?,
            default_return_value: V::default(),
        })
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of entries the map holds before it grows.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of slots in the underlying table.
    pub fn table_size(&self) -> usize {
        self.table.table_size()
    }

    /// Returns the load factor the map was created with.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the hash strategy.
    pub fn strategy(&self) -> &S {
        self.table.strategy()
    }

    /// Returns the value reported for absent keys.
    pub fn default_return_value(&self) -> V {
        self.default_return_value
    }

    /// Sets the value reported for absent keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u32, i64> = HashMap::new();
    /// map.set_default_return_value(-1);
    /// assert_eq!(map.get(&1), -1);
    /// assert_eq!(map.remove(&1), -1);
    /// ```
    pub fn set_default_return_value(&mut self, value: V) {
        self.default_return_value = value;
    }

    /// Removes every entry, keeping the table size.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes every entry and shrinks the table to the size needed for
    /// `capacity` entries, never below the size the map was created with.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = (0..1000).map(|k| (k, k)).collect();
    /// map.clear_and_trim(0);
    /// assert!(map.is_empty());
    /// assert_eq!(map.table_size(), HashMap::<u32, u32>::new().table_size());
    /// ```
    pub fn clear_and_trim(&mut self, capacity: usize) {
        self.table.clear_and_trim(capacity);
    }

    /// Returns `true` if some key maps to `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let map: HashMap<u8, char> = [(1, 'x'), (2, 'y')].into_iter().collect();
    /// assert!(map.contains_value('y'));
    /// assert!(!map.contains_value('z'));
    /// ```
    pub fn contains_value(&self, value: V) -> bool {
        self.table
            .scan(|_, v| {
                if v == value {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .is_break()
    }

    /// Calls `f` on every entry in scan order.
    pub fn for_each(&self, mut f: impl FnMut(&K, V)) {
        let _ = self.table.scan::<()>(|k, v| {
            f(k, v);
            ControlFlow::Continue(())
        });
    }

    /// Replaces every value with `f(key, value)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = (1..=3).map(|k| (k, k)).collect();
    /// map.replace_all(|k, v| k * 10 + v);
    /// assert_eq!(map.get(&2), 22);
    /// ```
    pub fn replace_all(&mut self, mut f: impl FnMut(&K, V) -> V) {
        for (key, value) in self.table.keys.iter().zip(self.table.values.iter_mut()) {
            if let Some(key) = key {
                *value = f(key, *value);
            }
        }
    }

    /// Returns an iterator over `(&K, V)` in scan order: the null key first,
    /// then the table from its last slot down.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let map: HashMap<u32, u32> = (0..4).map(|k| (k, k * k)).collect();
    /// let total: u32 = map.iter().map(|(_, v)| v).sum();
    /// assert_eq!(total, 14);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.table)
    }

    /// Returns a live view of the keys.
    pub fn keys(&self) -> KeySet<'_, K, V, S> {
        KeySet::new(&self.table)
    }

    /// Returns a live view of the values.
    pub fn values(&self) -> ValueCollection<'_, K, V, S> {
        ValueCollection::new(&self.table)
    }

    /// Returns a live view of the entries.
    pub fn entry_set(&self) -> EntrySet<'_, K, V, S> {
        EntrySet::new(&self.table)
    }

    /// Returns a live view of the keys that can remove entries.
    pub fn keys_mut(&mut self) -> KeySetMut<'_, K, V, S> {
        KeySetMut::new(&mut self.table)
    }

    /// Returns a live view of the values that can remove entries.
    pub fn values_view_mut(&mut self) -> ValueCollectionMut<'_, K, V, S> {
        ValueCollectionMut::new(&mut self.table)
    }

    /// Returns a live view of the entries that can remove entries.
    pub fn entry_set_mut(&mut self) -> EntrySetMut<'_, K, V, S> {
        EntrySetMut::new(&mut self.table)
    }

    /// Returns an iterator over mutable references to the values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<&str, f64> = [("a", 1.5), ("b", 2.5)].into_iter().collect();
    /// for value in map.values_mut() {
    ///     *value *= 2.0;
    /// }
    /// assert_eq!(map.get(&"b"), 5.0);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut::new(&mut self.table)
    }

    /// Empties the map, returning the removed entries as an iterator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, u8> = (0..5).map(|k| (k, k)).collect();
    /// let mut drained: Vec<_> = map.drain().collect();
    /// drained.sort();
    /// assert_eq!(drained, [(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
    /// assert!(map.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain::new(&mut self.table)
    }

    /// Returns debug statistics for the underlying table.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> DebugStats
    where
        S: HashStrategy<K>,
    {
        self.table.debug_stats()
    }

    /// Returns the probe length histogram of the underlying table.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> ProbeHistogram
    where
        S: HashStrategy<K>,
    {
        self.table.probe_histogram()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    V: Value,
    S: HashStrategy<K>,
{
    /// Builds a map from parallel key and value vectors.
    ///
    /// Later duplicates of a key overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the vectors differ in length, and
    /// the errors of
    /// [`try_with_capacity_and_load_factor`](Self::try_with_capacity_and_load_factor).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    /// use shift_map::strategy::DefaultStrategy;
    ///
    /// let map: HashMap<char, u8> =
    ///     HashMap::from_arrays(vec!['a', 'b', 'a'], vec![1, 2, 3], 0.75, DefaultStrategy::new())?;
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&'a'), 3);
    /// # Ok::<(), shift_map::Error>(())
    /// ```
    pub fn from_arrays(keys: Vec<K>, values: Vec<V>, load_factor: f32, strategy: S) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(Error::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        let mut map = Self::try_with_capacity_and_load_factor(keys.len(), load_factor, strategy)?;
        map.put_all(keys.into_iter().zip(values));
        Ok(map)
    }

    /// Builds a map holding the entries of `other`, rehashed under `strategy`.
    ///
    /// Keys that `other` keeps apart but `strategy` considers equal collapse
    /// into one entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    /// use shift_map::strategy::CaseInsensitive;
    ///
    /// let mut exact: HashMap<&str, u32> = HashMap::new();
    /// exact.put("Rust", 1);
    /// exact.put("rust", 2);
    ///
    /// let folded: HashMap<&str, u32, CaseInsensitive> = HashMap::from_map(&exact, CaseInsensitive::new());
    /// assert_eq!(folded.len(), 1);
    /// ```
    pub fn from_map<S2>(other: &HashMap<K, V, S2>, strategy: S) -> Self
    where
        K: Clone,
    {
        let mut map = Self::with_capacity_and_strategy(other.len(), strategy);
        map.put_all(other.iter().map(|(k, v)| (k.clone(), v)));
        map
    }

    /// Returns the value for `key`, or the default return value if it is
    /// absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<&str, u16> = HashMap::new();
    /// map.put("port", 8080);
    /// assert_eq!(map.get(&"port"), 8080);
    /// assert_eq!(map.get(&"missing"), 0);
    /// ```
    pub fn get(&self, key: &K) -> V {
        self.find(key).unwrap_or(self.default_return_value)
    }

    /// Returns the value for `key`, or `default` if it is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<&str, u16> = HashMap::new();
    /// map.put("port", 0);
    /// assert_eq!(map.get_or_default(&"port", 80), 0);
    /// assert_eq!(map.get_or_default(&"timeout", 30), 30);
    /// ```
    pub fn get_or_default(&self, key: &K, default: V) -> V {
        self.find(key).unwrap_or(default)
    }

    /// Returns the value for `key`, if present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, i32> = HashMap::new();
    /// map.put(1, 0);
    /// assert_eq!(map.find(&1), Some(0));
    /// assert_eq!(map.find(&2), None);
    /// ```
    pub fn find(&self, key: &K) -> Option<V> {
        self.table
            .find_index(key)
            .ok()
            .map(|index| self.table.value_at(index))
    }

    /// Returns a mutable reference to the value for `key`, if present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, i32> = HashMap::new();
    /// map.put(1, 10);
    /// if let Some(value) = map.get_mut(&1) {
    ///     *value += 5;
    /// }
    /// assert_eq!(map.get(&1), 15);
    /// assert!(map.get_mut(&2).is_none());
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = self.table.find_index(key).ok()?;
        Some(self.table.value_at_mut(index))
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.table.find_index(key).is_ok()
    }

    /// Maps `key` to `value` and returns the previous value, or the default
    /// return value if the key was absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u16, i8> = HashMap::new();
    /// assert_eq!(map.put(7, 1), 0);
    /// assert_eq!(map.put(7, 2), 1);
    /// ```
    pub fn put(&mut self, key: K, value: V) -> V {
        self.insert(key, value).unwrap_or(self.default_return_value)
    }

    /// Maps `key` to `value` and returns the previous value, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, i32> = HashMap::new();
    /// assert_eq!(map.insert(1, 0), None);
    /// assert_eq!(map.insert(1, 5), Some(0));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.table.find_index(&key) {
            Ok(index) => Some(core::mem::replace(self.table.value_at_mut(index), value)),
            Err(slot) => {
                self.table.insert_at(slot, key, value);
                None
            }
        }
    }

    /// Puts every entry of `entries` into the map.
    pub fn put_all(&mut self, entries: impl IntoIterator<Item = (K, V)>) {
        let entries = entries.into_iter();
        self.table.reserve(entries.size_hint().0);
        for (key, value) in entries {
            self.put(key, value);
        }
    }

    /// Maps `key` to `value` unless it already maps to something other than
    /// the default return value. Returns the value that was there before.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<&str, u32> = HashMap::new();
    /// assert_eq!(map.put_if_absent("a", 1), 0);
    /// assert_eq!(map.put_if_absent("a", 2), 1);
    ///
    /// // A stored default return value counts as absent.
    /// map.put("b", 0);
    /// assert_eq!(map.put_if_absent("b", 3), 0);
    /// assert_eq!(map.get(&"b"), 3);
    /// ```
    pub fn put_if_absent(&mut self, key: K, value: V) -> V {
        match self.table.find_index(&key) {
            Ok(index) => {
                let current = self.table.value_at(index);
                if current == self.default_return_value {
                    *self.table.value_at_mut(index) = value;
                }
                current
            }
            Err(slot) => {
                self.table.insert_at(slot, key, value);
                self.default_return_value
            }
        }
    }

    /// Adds `value` to the value of `key`, inserting `value` if the key is
    /// absent. Returns the previous value, or the default return value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut totals: HashMap<&str, f64> = HashMap::new();
    /// totals.add_to("fees", 2.5);
    /// assert_eq!(totals.add_to("fees", 1.0), 2.5);
    /// assert_eq!(totals.get(&"fees"), 3.5);
    /// ```
    pub fn add_to(&mut self, key: K, value: V) -> V
    where
        V: Numeric,
    {
        match self.table.find_index(&key) {
            Ok(index) => {
                let slot = self.table.value_at_mut(index);
                let old = *slot;
                *slot = old.add_value(value);
                old
            }
            Err(slot) => {
                self.table.insert_at(slot, key, value);
                self.default_return_value
            }
        }
    }

    /// Subtracts `value` from the value of `key`. Returns the previous value,
    /// or the default return value if the key is absent.
    ///
    /// The entry is removed once the result reaches the default return value
    /// from the direction of the subtraction: at or below it for a positive
    /// `value`, at or above it for a negative one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut stock: HashMap<&str, i32> = HashMap::new();
    /// stock.add_to("bolts", 5);
    /// assert_eq!(stock.sub_from("bolts", 3), 5);
    /// assert_eq!(stock.sub_from("bolts", 3), 2);
    /// assert!(!stock.contains_key(&"bolts"));
    /// ```
    pub fn sub_from(&mut self, key: K, value: V) -> V
    where
        V: Numeric,
    {
        let Ok(index) = self.table.find_index(&key) else {
            return self.default_return_value;
        };
        let old = self.table.value_at(index);
        let new = old.sub_value(value);
        let exhausted = if value < V::ZERO {
            new >= self.default_return_value
        } else {
            new <= self.default_return_value
        };
        if exhausted {
            self.table.remove_at(index);
        } else {
            *self.table.value_at_mut(index) = new;
        }
        old
    }

    /// Removes `key` and returns its value, or the default return value if it
    /// was absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// map.put(4, 16);
    /// assert_eq!(map.remove(&4), 16);
    /// assert_eq!(map.remove(&4), 0);
    /// ```
    pub fn remove(&mut self, key: &K) -> V {
        self.remove_or_default(key, self.default_return_value)
    }

    /// Removes `key` and returns its value, or `default` if it was absent.
    pub fn remove_or_default(&mut self, key: &K, default: V) -> V {
        self.remove_entry(key).map_or(default, |(_, value)| value)
    }

    /// Removes `key` and returns the stored key and value, if present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<String, u8> = HashMap::new();
    /// map.put("zero".to_string(), 0);
    /// assert_eq!(map.remove_entry(&"zero".to_string()), Some(("zero".to_string(), 0)));
    /// assert_eq!(map.remove_entry(&"zero".to_string()), None);
    /// ```
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let index = self.table.find_index(key).ok()?;
        self.table.remove_at(index)
    }

    /// Removes `key` only if it maps to `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, u8> = HashMap::new();
    /// map.put(1, 7);
    /// assert!(!map.remove_if_value(&1, 8));
    /// assert!(map.remove_if_value(&1, 7));
    /// assert!(map.is_empty());
    /// ```
    pub fn remove_if_value(&mut self, key: &K, value: V) -> bool {
        match self.table.find_index(key) {
            Ok(index) if self.table.value_at(index) == value => {
                self.table.remove_at(index);
                true
            }
            _ => false,
        }
    }

    /// Replaces the value of `key` if present. Returns the old value, or the
    /// default return value if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, u8> = HashMap::new();
    /// assert_eq!(map.replace(&1, 5), 0);
    /// assert!(!map.contains_key(&1));
    ///
    /// map.put(1, 2);
    /// assert_eq!(map.replace(&1, 5), 2);
    /// assert_eq!(map.get(&1), 5);
    /// ```
    pub fn replace(&mut self, key: &K, value: V) -> V {
        match self.get_mut(key) {
            Some(slot) => core::mem::replace(slot, value),
            None => self.default_return_value,
        }
    }

    /// Replaces the value of `key` with `new` only if it currently maps to
    /// `old`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, u8> = HashMap::new();
    /// map.put(1, 2);
    /// assert!(!map.replace_if(&1, 3, 9));
    /// assert!(map.replace_if(&1, 2, 9));
    /// assert_eq!(map.get(&1), 9);
    /// ```
    pub fn replace_if(&mut self, key: &K, old: V, new: V) -> bool {
        match self.get_mut(key) {
            Some(slot) if *slot == old => {
                *slot = new;
                true
            }
            _ => false,
        }
    }

    /// Stores `f(key, current)` for `key` and returns it. An absent key is
    /// passed the default return value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut hits: HashMap<&str, u32> = HashMap::new();
    /// assert_eq!(hits.compute("home", |_, n| n + 1), 1);
    /// assert_eq!(hits.compute("home", |_, n| n + 1), 2);
    ///
    /// // Plain forms store the default like any other value.
    /// assert_eq!(hits.compute("home", |_, _| 0), 0);
    /// assert!(hits.contains_key(&"home"));
    /// ```
    pub fn compute(&mut self, key: K, f: impl FnOnce(&K, V) -> V) -> V {
        match self.table.find_index(&key) {
            Ok(index) => {
                let value = f(&key, self.table.value_at(index));
                *self.table.value_at_mut(index) = value;
                value
            }
            Err(slot) => {
                let value = f(&key, self.default_return_value);
                self.table.insert_at(slot, key, value);
                value
            }
        }
    }

    /// Like [`compute`](Self::compute), but a result equal to the default
    /// return value is never stored: it removes an existing entry instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut hits: HashMap<&str, u32> = HashMap::new();
    /// hits.put("home", 3);
    /// assert_eq!(hits.compute_non_default("home", |_, n| n - 3), 0);
    /// assert!(!hits.contains_key(&"home"));
    /// ```
    pub fn compute_non_default(&mut self, key: K, f: impl FnOnce(&K, V) -> V) -> V {
        match self.table.find_index(&key) {
            Ok(index) => {
                let value = f(&key, self.table.value_at(index));
                if value == self.default_return_value {
                    self.table.remove_at(index);
                } else {
                    *self.table.value_at_mut(index) = value;
                }
                value
            }
            Err(slot) => {
                let value = f(&key, self.default_return_value);
                if value != self.default_return_value {
                    self.table.insert_at(slot, key, value);
                }
                value
            }
        }
    }

    /// Returns the value of `key`, first storing `f(key)` if the key is
    /// absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut lengths: HashMap<&str, usize> = HashMap::new();
    /// assert_eq!(lengths.compute_if_absent("four", |k| k.len()), 4);
    /// assert_eq!(lengths.compute_if_absent("four", |_| 99), 4);
    /// ```
    pub fn compute_if_absent(&mut self, key: K, f: impl FnOnce(&K) -> V) -> V {
        match self.table.find_index(&key) {
            Ok(index) => self.table.value_at(index),
            Err(slot) => {
                let value = f(&key);
                self.table.insert_at(slot, key, value);
                value
            }
        }
    }

    /// Like [`compute_if_absent`](Self::compute_if_absent), but a stored
    /// default return value counts as absent and a computed one is never
    /// stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, u8> = HashMap::new();
    /// map.put(1, 0);
    ///
    /// assert_eq!(map.compute_if_absent(1, |_| 9), 0);
    /// assert_eq!(map.compute_if_absent_non_default(1, |_| 9), 9);
    /// assert_eq!(map.compute_if_absent_non_default(2, |_| 0), 0);
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn compute_if_absent_non_default(&mut self, key: K, f: impl FnOnce(&K) -> V) -> V {
        self.fill_non_default(key, f)
    }

    /// Returns the value of `key`, first storing `f()` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut ids: HashMap<&str, u32> = HashMap::new();
    /// let mut next = 100;
    /// let mut fresh = || {
    ///     next += 1;
    ///     next
    /// };
    /// assert_eq!(ids.supply_if_absent("a", &mut fresh), 101);
    /// assert_eq!(ids.supply_if_absent("a", &mut fresh), 101);
    /// assert_eq!(ids.supply_if_absent("b", &mut fresh), 102);
    /// ```
    pub fn supply_if_absent(&mut self, key: K, f: impl FnOnce() -> V) -> V {
        self.compute_if_absent(key, |_| f())
    }

    /// Like [`supply_if_absent`](Self::supply_if_absent), with the default
    /// return value treated as absent.
    pub fn supply_if_absent_non_default(&mut self, key: K, f: impl FnOnce() -> V) -> V {
        self.fill_non_default(key, |_| f())
    }

    fn fill_non_default(&mut self, key: K, f: impl FnOnce(&K) -> V) -> V {
        match self.table.find_index(&key) {
            Ok(index) => {
                let current = self.table.value_at(index);
                if current != self.default_return_value {
                    return current;
                }
                let value = f(&key);
                if value != self.default_return_value {
                    *self.table.value_at_mut(index) = value;
                }
                value
            }
            Err(slot) => {
                let value = f(&key);
                if value != self.default_return_value {
                    self.table.insert_at(slot, key, value);
                }
                value
            }
        }
    }

    /// Stores `f(key, current)` if `key` is present and returns it. Returns
    /// the default return value for an absent key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, i32> = HashMap::new();
    /// assert_eq!(map.compute_if_present(&1, |_, v| v * 2), 0);
    /// assert!(!map.contains_key(&1));
    ///
    /// map.put(1, 21);
    /// assert_eq!(map.compute_if_present(&1, |_, v| v * 2), 42);
    /// ```
    pub fn compute_if_present(&mut self, key: &K, f: impl FnOnce(&K, V) -> V) -> V {
        let Ok(index) = self.table.find_index(key) else {
            return self.default_return_value;
        };
        let value = f(key, self.table.value_at(index));
        *self.table.value_at_mut(index) = value;
        value
    }

    /// Like [`compute_if_present`](Self::compute_if_present), but a stored
    /// default return value counts as absent and a computed one removes the
    /// entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u8, i32> = HashMap::new();
    /// map.put(1, 0);
    /// assert_eq!(map.compute_if_present_non_default(&1, |_, v| v + 1), 0);
    /// assert_eq!(map.get(&1), 0);
    ///
    /// map.put(2, 5);
    /// assert_eq!(map.compute_if_present_non_default(&2, |_, _| 0), 0);
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn compute_if_present_non_default(&mut self, key: &K, f: impl FnOnce(&K, V) -> V) -> V {
        let index = match self.table.find_index(key) {
            Ok(index) if self.table.value_at(index) != self.default_return_value => index,
            _ => return self.default_return_value,
        };
        let value = f(key, self.table.value_at(index));
        if value == self.default_return_value {
            self.table.remove_at(index);
        } else {
            *self.table.value_at_mut(index) = value;
        }
        value
    }

    /// Merges `value` into the entry for `key` and returns the result.
    ///
    /// If `key` is absent or maps to the default return value, the result is
    /// `value`; otherwise it is `f(current, value)`. A result equal to the
    /// default return value removes the entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     counts.merge(word, 1, |old, new| old + new);
    /// }
    /// assert_eq!(counts.get(&"a"), 2);
    ///
    /// counts.merge("a", 0, |_, _| 0);
    /// assert!(!counts.contains_key(&"a"));
    /// ```
    pub fn merge(&mut self, key: K, value: V, f: impl FnOnce(V, V) -> V) -> V {
        let found = self.table.find_index(&key);
        let merged = match found {
            Ok(index) if self.table.value_at(index) != self.default_return_value => {
                f(self.table.value_at(index), value)
            }
            _ => value,
        };

        match found {
            Ok(index) if merged == self.default_return_value => {
                self.table.remove_at(index);
            }
            Ok(index) => *self.table.value_at_mut(index) = merged,
            Err(slot) if merged != self.default_return_value => {
                self.table.insert_at(slot, key, merged);
            }
            Err(_) => {}
        }
        merged
    }

    /// [`merge`](Self::merge)s every entry of `entries` with `f`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut counts: HashMap<char, u32> = HashMap::new();
    /// counts.merge_all("hello".chars().map(|c| (c, 1)), |a, b| a + b);
    /// assert_eq!(counts.get(&'l'), 2);
    /// assert_eq!(counts.len(), 4);
    /// ```
    pub fn merge_all(&mut self, entries: impl IntoIterator<Item = (K, V)>, mut f: impl FnMut(V, V) -> V) {
        for (key, value) in entries {
            self.merge(key, value, &mut f);
        }
    }

    /// Grows the table so that `additional` more entries fit without another
    /// resize.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// map.reserve(1000);
    /// let size = map.table_size();
    /// map.put_all((0..1000).map(|k| (k, k)));
    /// assert_eq!(map.table_size(), size);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Shrinks the table to the smallest size that holds the current entries,
    /// never below the size the map was created with. Returns `true` if the
    /// table was rebuilt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// map.reserve(10_000);
    /// map.put(1, 1);
    /// assert!(map.trim());
    /// assert_eq!(map.table_size(), HashMap::<u32, u32>::new().table_size());
    /// assert!(!map.trim());
    /// ```
    pub fn trim(&mut self) -> bool {
        self.trim_to(self.len())
    }

    /// Shrinks the table to the smallest size that holds `capacity` entries,
    /// never below the size the map was created with.
    ///
    /// Returns `true` if the table was rebuilt, `false` if it is already small
    /// enough or the current entries would not fit.
    pub fn trim_to(&mut self, capacity: usize) -> bool {
        self.table.trim_to(capacity)
    }

    /// Returns a cursor positioned before the first entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = (0..8).map(|k| (k, k)).collect();
    /// let mut cursor = map.cursor();
    /// while let Some((key, _)) = cursor.next() {
    ///     if *key >= 4 {
    ///         cursor.remove()?;
    ///     }
    /// }
    /// assert_eq!(map.len(), 4);
    /// # Ok::<(), shift_map::Error>(())
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, K, V, S>
    where
        K: Clone,
    {
        Cursor::new(&mut self.table)
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let mut map: HashMap<u32, u32> = (0..10).map(|k| (k, k * k)).collect();
    /// map.retain(|_, v| v % 2 == 0);
    /// assert_eq!(map.len(), 5);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&K, V) -> bool)
    where
        K: Clone,
    {
        self.cursor().remove_matching(|key, value| !f(key, value));
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    V: Value,
    S: Default,
{
    /// Creates an empty map sized for
    /// [`DEFAULT_MIN_CAPACITY`](sizing::DEFAULT_MIN_CAPACITY) entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shift_map::HashMap;
    ///
    /// let map: HashMap<String, u64> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 16);
    /// ```
    pub fn new() -> Self {
        Self::with_strategy(S::default())
    }

    /// Creates an empty map that holds at least `capacity` entries before it
    /// grows.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` needs a table larger than
    /// [`MAX_TABLE_SIZE`](sizing::MAX_TABLE_SIZE).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_strategy(capacity, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    V: Value,
    S: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, S2> PartialEq<HashMap<K, V, S2>> for HashMap<K, V, S>
where
    V: Value,
    S: HashStrategy<K>,
{
    fn eq(&self, other: &HashMap<K, V, S2>) -> bool {
        self.len() == other.len() && other.iter().all(|(k, v)| self.find(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    V: Value + Eq,
    S: HashStrategy<K>,
{
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    V: Value,
    S: HashStrategy<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.put_all(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    V: Value,
    S: HashStrategy<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.put_all(iter);
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S>
where
    V: Value,
{
    type Item = (&'a K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S>
where
    V: Value,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let (keys, values, len) = self.table.take_all();
        IntoIter::new(keys, values, len)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::strategy::CaseInsensitive;
    use crate::strategy::FnStrategy;
    use crate::strategy::IdentityStrategy;
    use crate::strategy::Nullable;

    #[derive(Clone, Default)]
    struct SipHashBuilder {
        k0: u64,
        k1: u64,
    }

    impl SipHashBuilder {
        fn random() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap_or(0),
                k1: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> SipHasher {
            SipHasher::new_with_keys(self.k0, self.k1)
        }
    }

    type SipMap<K, V> = HashMap<K, V, DefaultStrategy<SipHashBuilder>>;

    fn sip_map<K, V: Value>() -> SipMap<K, V> {
        HashMap::with_strategy(DefaultStrategy::with_hasher(SipHashBuilder::random()))
    }

    #[test]
    fn put_get_remove() {
        let mut map: SipMap<u32, i32> = sip_map();
        assert!(map.is_empty());
        assert_eq!(map.put(1, 10), 0);
        assert_eq!(map.put(2, 20), 0);
        assert_eq!(map.put(1, 11), 10);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), 11);
        assert_eq!(map.get(&3), 0);
        assert_eq!(map.find(&3), None);
        assert!(map.contains_key(&2));
        assert!(map.contains_value(20));
        assert!(!map.contains_value(10));

        assert_eq!(map.remove(&1), 11);
        assert_eq!(map.remove(&1), 0);
        assert_eq!(map.remove_entry(&2), Some((2, 20)));
        assert!(map.is_empty());
        map.table.check_invariants();
    }

    #[test]
    fn grows_at_thirteenth_key() {
        let mut map: SipMap<u32, u8> =
            HashMap::with_capacity_and_strategy(12, DefaultStrategy::default());
        assert_eq!(map.table_size(), 16);
        for k in 0..12 {
            map.put(k, 1);
        }
        assert_eq!(map.table_size(), 16);
        map.put(12, 1);
        assert_eq!(map.table_size(), 32);
        for k in 0..13 {
            assert_eq!(map.get(&k), 1);
        }
    }

    #[test]
    fn case_insensitive_keys() {
        let mut map: HashMap<String, i32, CaseInsensitive> = HashMap::new();
        map.put("Key".to_string(), 1);
        map.put("kEY".to_string(), 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"KEY".to_string()), 2);
        // The first spelling is kept.
        assert_eq!(map.keys().iter().next().map(String::as_str), Some("Key"));
    }

    #[test]
    fn null_key_round_trip() {
        let mut map: HashMap<Option<u32>, i32, Nullable<DefaultStrategy>> =
            HashMap::with_strategy(Nullable::default());
        map.put(None, 5);
        assert_eq!(map.get(&None), 5);
        assert_eq!(map.len(), 1);
        assert!(map.table.contains_null_key());
        assert_eq!(map.table.find_index(&None), Ok(map.table_size()));

        for k in 0..100 {
            map.put(Some(k), k as i32);
        }
        assert_eq!(map.get(&None), 5);
        assert_eq!(map.remove(&None), 5);
        assert!(!map.contains_key(&None));
        assert_eq!(map.len(), 100);
        map.table.check_invariants();
    }

    #[test]
    fn colliding_keys_survive_middle_removal() {
        let strategy = FnStrategy::new(|_: &&str| 42, |a: &&str, b: &&str| a == b);
        let mut map: HashMap<&str, i32, _> = HashMap::with_strategy(strategy);
        map.put("a", 1);
        map.put("b", 2);
        map.put("c", 3);
        assert_eq!(map.remove(&"b"), 2);
        assert_eq!(map.get(&"a"), 1);
        assert_eq!(map.get(&"c"), 3);
        assert_eq!(map.find(&"b"), None);
        map.table.check_invariants();
    }

    #[test]
    fn identity_keys() {
        let a = String::from("same");
        let b = String::from("same");
        let mut map: HashMap<&String, u8, IdentityStrategy> = HashMap::new();
        map.put(&a, 1);
        map.put(&b, 2);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&&a), 1);
        assert_eq!(map.get(&&b), 2);
    }

    #[test]
    fn stored_default_is_an_ordinary_value_for_plain_forms() {
        let mut map: SipMap<u32, i32> = sip_map();
        map.put(1, 0);
        assert!(map.contains_key(&1));
        assert_eq!(map.find(&1), Some(0));

        assert_eq!(map.compute_if_absent(1, |_| 7), 0);
        assert_eq!(map.supply_if_absent(1, || 7), 0);
        assert_eq!(map.get(&1), 0);

        assert_eq!(map.compute_if_present(&1, |_, v| v + 3), 3);
        assert_eq!(map.compute(1, |_, _| 0), 0);
        assert!(map.contains_key(&1));
        assert_eq!(map.compute(2, |_, v| v), 0);
        assert!(map.contains_key(&2));
    }

    #[test]
    fn non_default_forms_treat_default_as_absent() {
        let mut map: SipMap<u32, i32> = sip_map();
        map.put(1, 0);

        assert_eq!(map.compute_if_present_non_default(&1, |_, _| 5), 0);
        assert_eq!(map.get(&1), 0);
        assert_eq!(map.compute_if_absent_non_default(1, |_| 7), 7);
        assert_eq!(map.get(&1), 7);
        assert_eq!(map.compute_if_absent_non_default(1, |_| 8), 7);

        assert_eq!(map.compute_non_default(1, |_, _| 0), 0);
        assert!(!map.contains_key(&1));
        assert_eq!(map.compute_non_default(3, |_, _| 0), 0);
        assert!(!map.contains_key(&3));
        assert_eq!(map.compute_non_default(3, |_, v| v + 4), 4);
        assert_eq!(map.compute_if_present_non_default(&3, |_, _| 0), 0);
        assert!(!map.contains_key(&3));

        assert_eq!(map.supply_if_absent_non_default(4, || 0), 0);
        assert!(!map.contains_key(&4));
        map.put(4, 0);
        assert_eq!(map.supply_if_absent_non_default(4, || 2), 2);
        assert_eq!(map.get(&4), 2);
    }

    #[test]
    fn custom_default_return_value() {
        let mut map: SipMap<u32, i32> = sip_map();
        map.set_default_return_value(-1);
        assert_eq!(map.default_return_value(), -1);
        assert_eq!(map.get(&9), -1);
        assert_eq!(map.put(9, 0), -1);
        assert_eq!(map.get(&9), 0);
        assert_eq!(map.remove(&8), -1);
        assert_eq!(map.replace(&8, 3), -1);
        assert!(!map.contains_key(&8));
        assert_eq!(map.get_or_default(&8, 42), 42);
        assert_eq!(map.remove_or_default(&8, 42), 42);
        assert_eq!(map.put_if_absent(9, 5), 0);
        assert_eq!(map.get(&9), 0);
    }

    #[test]
    fn accumulate() {
        let mut map: SipMap<&str, i64> = sip_map();
        assert_eq!(map.add_to("x", 5), 0);
        assert_eq!(map.add_to("x", 5), 5);
        assert_eq!(map.get(&"x"), 10);

        assert_eq!(map.sub_from("x", 4), 10);
        assert_eq!(map.sub_from("missing", 4), 0);
        assert!(!map.contains_key(&"missing"));
        assert_eq!(map.sub_from("x", 6), 6);
        assert!(!map.contains_key(&"x"));

        map.put("y", -10);
        assert_eq!(map.sub_from("y", -4), -10);
        assert_eq!(map.get(&"y"), -6);
        assert_eq!(map.sub_from("y", -7), -6);
        assert!(!map.contains_key(&"y"));

        let mut floats: SipMap<u8, f64> = sip_map();
        floats.add_to(1, 0.5);
        floats.add_to(1, 0.25);
        assert_eq!(floats.get(&1), 0.75);
    }

    #[test]
    fn merge_rules() {
        let mut map: SipMap<u32, i32> = sip_map();
        assert_eq!(map.merge(1, 5, |_, _| unreachable!()), 5);
        assert_eq!(map.merge(1, 5, |a, b| a * b), 25);
        map.put(2, 0);
        assert_eq!(map.merge(2, 3, |_, _| unreachable!()), 3);
        assert_eq!(map.merge(2, 3, |a, b| a - b), 0);
        assert!(!map.contains_key(&2));
        assert_eq!(map.merge(7, 0, |a, b| a + b), 0);
        assert!(!map.contains_key(&7));

        map.merge_all([(1, 1), (3, 3), (3, 4)], |a, b| a + b);
        assert_eq!(map.get(&1), 26);
        assert_eq!(map.get(&3), 7);
    }

    #[test]
    fn replace_forms() {
        let mut map: SipMap<u32, u32> = sip_map();
        map.put(1, 1);
        assert_eq!(map.replace(&1, 2), 1);
        assert!(!map.replace_if(&1, 1, 3));
        assert!(map.replace_if(&1, 2, 3));
        assert!(!map.replace_if(&9, 0, 3));
        assert!(!map.contains_key(&9));
        assert_eq!(map.get(&1), 3);

        map.put_all((10..20).map(|k| (k, k)));
        map.replace_all(|k, v| k + v);
        assert_eq!(map.get(&15), 30);
        assert_eq!(map.get(&1), 4);

        assert!(!map.remove_if_value(&15, 29));
        assert!(map.remove_if_value(&15, 30));
        assert!(!map.contains_key(&15));
    }

    #[test]
    fn get_mut_and_for_each() {
        let mut map: SipMap<u32, u32> = sip_map();
        map.put_all((0..10).map(|k| (k, k)));
        if let Some(v) = map.get_mut(&3) {
            *v = 300;
        }
        assert!(map.get_mut(&99).is_none());
        let mut sum = 0;
        map.for_each(|_, v| sum += v);
        assert_eq!(sum, 45 - 3 + 300);
    }

    #[test]
    fn constructors() {
        assert!(matches!(
            SipMap::<u32, u32>::try_with_capacity_and_load_factor(16, 0.0, DefaultStrategy::default()),
            Err(Error::InvalidLoadFactor(_))
        ));
        assert!(matches!(
            SipMap::<u32, u32>::from_arrays(
                alloc::vec![1, 2],
                alloc::vec![1],
                0.75,
                DefaultStrategy::default()
            ),
            Err(Error::LengthMismatch { keys: 2, values: 1 })
        ));

        let map = SipMap::<u32, u32>::from_arrays(
            alloc::vec![1, 2, 3],
            alloc::vec![4, 5, 6],
            0.5,
            DefaultStrategy::default(),
        )
        .unwrap();
        assert_eq!(map.load_factor(), 0.5);
        assert_eq!(map.get(&2), 5);

        let copy: HashMap<u32, u32, FnStrategy<_, _>> = HashMap::from_map(
            &map,
            FnStrategy::new(|k: &u32| u64::from(*k), |a: &u32, b: &u32| a == b),
        );
        assert_eq!(copy, map);
        assert_eq!(map, copy);
    }

    #[test]
    #[should_panic(expected = "exceeds the maximum table size")]
    fn oversized_capacity_panics() {
        let _ = SipMap::<u32, u32>::with_capacity_and_strategy(usize::MAX, DefaultStrategy::default());
    }

    #[test]
    fn trim_and_reserve() {
        let mut map: SipMap<u32, u32> = sip_map();
        let initial = map.table_size();
        map.reserve(10_000);
        assert!(map.capacity() >= 10_000);
        map.put_all((0..100).map(|k| (k, k)));
        assert!(map.trim());
        assert!(!map.trim());
        assert!(map.table_size() >= initial);
        assert!(map.capacity() >= 100);
        assert!(!map.trim_to(10), "100 entries do not fit a table for 10");
        for k in 0..100 {
            assert_eq!(map.get(&k), k);
        }
        map.table.check_invariants();
    }

    #[test]
    fn resizing_keeps_configuration() {
        let strategy = DefaultStrategy::with_hasher(SipHashBuilder::random());
        let mut map: SipMap<u32, i32> =
            HashMap::try_with_capacity_and_load_factor(16, 0.5, strategy).unwrap();
        map.set_default_return_value(-7);
        let initial = map.table_size();
        let hash_before = map.strategy().hash(&12_345u32);

        for k in 0..1000 {
            map.put(k, k as i32);
        }
        assert!(map.table_size() >= 2048);
        assert_eq!(map.load_factor(), 0.5);
        assert_eq!(map.default_return_value(), -7);

        for k in 0..1000 {
            assert_eq!(map.remove(&k), k as i32);
        }
        assert!(map.is_empty());
        assert_eq!(map.table_size(), initial);
        assert_eq!(map.load_factor(), 0.5);
        assert_eq!(map.default_return_value(), -7);
        assert_eq!(map.strategy().hash(&12_345u32), hash_before);
        assert_eq!(map.get(&5), -7);
        assert_eq!(map.remove(&5), -7);
        map.table.check_invariants();
    }

    #[test]
    fn clone_and_equality() {
        let mut map: SipMap<u32, u32> = sip_map();
        map.put_all((0..64).map(|k| (k, k * 2)));
        let mut copy = map.clone();
        assert_eq!(copy, map);

        copy.put(0, 1);
        assert_ne!(copy, map);
        copy.put(0, 0);
        assert_eq!(copy, map);
        copy.remove(&63);
        assert_ne!(copy, map);
        assert_eq!(map.len(), 64);
    }

    #[test]
    fn retain_filters() {
        let mut map: SipMap<u32, u32> = sip_map();
        map.put_all((0..1000).map(|k| (k, k)));
        map.retain(|k, _| k % 10 == 0);
        assert_eq!(map.len(), 100);
        assert!(map.keys().matches_all(|k| k % 10 == 0));
        map.table.check_invariants();
    }

    #[test]
    fn debug_output() {
        let mut map: HashMap<u32, u32> = HashMap::new();
        map.put(1, 2);
        assert_eq!(alloc::format!("{map:?}"), "{1: 2}");
        let table = alloc::format!("{:?}", map.table);
        assert!(table.contains("len: 1"));
    }

    #[test]
    fn randomized_against_model() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut map: SipMap<u32, i32> = sip_map();
        let mut model = hashbrown::HashMap::new();
        for step in 0..50_000 {
            let key = rng.random_range(0..2000u32);
            match rng.random_range(0..4) {
                0 | 1 => assert_eq!(map.insert(key, step), model.insert(key, step)),
                2 => assert_eq!(map.remove_entry(&key).map(|(_, v)| v), model.remove(&key)),
                _ => assert_eq!(map.find(&key), model.get(&key).copied()),
            }
        }
        assert_eq!(map.len(), model.len());
        let mut entries: Vec<_> = map.iter().map(|(k, v)| (*k, v)).collect();
        let mut expected: Vec<_> = model.into_iter().collect();
        entries.sort();
        expected.sort();
        assert_eq!(entries, expected);
        map.table.check_invariants();
    }
}
