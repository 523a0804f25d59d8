//! Live views over the keys, values and entries of a map.
//!
//! A view borrows the map, so it always reflects the map's current contents.
//! The shared views ([`KeySet`], [`ValueCollection`], [`EntrySet`]) are
//! `Copy` and read-only. Their `_mut` counterparts borrow the map exclusively
//! and can also remove entries through the view. The bulk operations run
//! directly on the table scan and never allocate.

use core::ops::ControlFlow;

use crate::hash_table::HashTable;
use crate::iter::Cursor;
use crate::iter::Entries;
use crate::iter::EntryRef;
use crate::iter::FastEntries;
use crate::iter::Keys;
use crate::iter::Values;
use crate::strategy::HashStrategy;
use crate::value::Value;

/// Runs `f` over the table scan until it breaks, returning the break value.
fn scan_until<'a, K, V: Value, S, B>(
    table: &'a HashTable<K, V, S>,
    f: impl FnMut(&'a K, V) -> ControlFlow<B>,
) -> Option<B> {
    match table.scan(f) {
        ControlFlow::Break(found) => Some(found),
        ControlFlow::Continue(()) => None,
    }
}

/// Counts the scanned entries satisfying `f`.
fn scan_count<'a, K, V: Value, S>(
    table: &'a HashTable<K, V, S>,
    mut f: impl FnMut(&'a K, V) -> bool,
) -> usize {
    let mut count = 0;
    let _ = table.scan::<()>(|k, v| {
        count += usize::from(f(k, v));
        ControlFlow::Continue(())
    });
    count
}

/// A view of the keys of a map.
///
/// # Examples
///
/// ```rust
/// use shift_map::HashMap;
///
/// let map: HashMap<u32, u8> = (1..=4).map(|k| (k, 0)).collect();
/// let keys = map.keys();
/// assert!(keys.contains(&3));
/// assert_eq!(keys.fold(0, |sum, k| sum + k), 10);
/// assert_eq!(keys.count(|k| k % 2 == 0), 2);
/// ```
pub struct KeySet<'a, K, V, S> {
    table: &'a HashTable<K, V, S>,
}

impl<K, V, S> Clone for KeySet<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for KeySet<'_, K, V, S> {}

impl<'a, K, V: Value, S> KeySet<'a, K, V, S> {
    pub(crate) fn new(table: &'a HashTable<K, V, S>) -> Self {
        Self { table }
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains(&self, key: &K) -> bool
    where
        S: HashStrategy<K>,
    {
        self.table.find_index(key).is_ok()
    }

    /// Returns an iterator over the keys.
    pub fn iter(&self) -> Keys<'a, K, V> {
        Keys::new(self.table)
    }

    /// Calls `f` on every key.
    pub fn for_each(&self, mut f: impl FnMut(&'a K)) {
        let _ = self.table.scan::<()>(|k, _| {
            f(k);
            ControlFlow::Continue(())
        });
    }

    /// Returns `true` if `f` holds for some key.
    pub fn matches_any(&self, f: impl FnMut(&'a K) -> bool) -> bool {
        self.find_first(f).is_some()
    }

    /// Returns `true` if `f` holds for no key.
    pub fn matches_none(&self, f: impl FnMut(&'a K) -> bool) -> bool {
        !self.matches_any(f)
    }

    /// Returns `true` if `f` holds for every key.
    pub fn matches_all(&self, mut f: impl FnMut(&'a K) -> bool) -> bool {
        self.find_first(|k| !f(k)).is_none()
    }

    /// Returns the first key in scan order satisfying `f`.
    pub fn find_first(&self, mut f: impl FnMut(&'a K) -> bool) -> Option<&'a K> {
        scan_until(self.table, |k, _| {
            if f(k) {
                ControlFlow::Break(k)
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Returns the number of keys satisfying `f`.
    pub fn count(&self, mut f: impl FnMut(&'a K) -> bool) -> usize {
        scan_count(self.table, |k, _| f(k))
    }

    /// Folds every key into an accumulator.
    pub fn fold<A>(&self, init: A, f: impl FnMut(A, &'a K) -> A) -> A {
        self.iter().fold(init, f)
    }

    /// Reduces the keys to one with `f`. Returns `None` if there are none.
    pub fn reduce(&self, mut f: impl FnMut(&'a K, &'a K) -> &'a K) -> Option<&'a K> {
        self.fold(None, |acc, k| Some(acc.map_or(k, |acc| f(acc, k))))
    }
}

impl<'a, K, V: Value, S> IntoIterator for KeySet<'a, K, V, S> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view of the values of a map.
///
/// # Examples
///
/// ```rust
/// use shift_map::HashMap;
///
/// let map: HashMap<&str, i32> = [("a", 3), ("b", -2), ("c", 3)].into_iter().collect();
/// let values = map.values();
/// assert!(values.contains(-2));
/// assert_eq!(values.reduce(i32::max), Some(3));
/// assert_eq!(values.count(|v| v == 3), 2);
/// ```
pub struct ValueCollection<'a, K, V, S> {
    table: &'a HashTable<K, V, S>,
}

impl<K, V, S> Clone for ValueCollection<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for ValueCollection<'_, K, V, S> {}

impl<'a, K, V: Value, S> ValueCollection<'a, K, V, S> {
    pub(crate) fn new(table: &'a HashTable<K, V, S>) -> Self {
        Self { table }
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if some key maps to `value`.
    pub fn contains(&self, value: V) -> bool {
        self.matches_any(|v| v == value)
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> Values<'a, K, V> {
        Values::new(self.table)
    }

    /// Calls `f` on every value.
    pub fn for_each(&self, mut f: impl FnMut(V)) {
        let _ = self.table.scan::<()>(|_, v| {
            f(v);
            ControlFlow::Continue(())
        });
    }

    /// Returns `true` if `f` holds for some value.
    pub fn matches_any(&self, f: impl FnMut(V) -> bool) -> bool {
        self.find_first(f).is_some()
    }

    /// Returns `true` if `f` holds for no value.
    pub fn matches_none(&self, f: impl FnMut(V) -> bool) -> bool {
        !self.matches_any(f)
    }

    /// Returns `true` if `f` holds for every value.
    pub fn matches_all(&self, mut f: impl FnMut(V) -> bool) -> bool {
        self.find_first(|v| !f(v)).is_none()
    }

    /// Returns the first value in scan order satisfying `f`.
    pub fn find_first(&self, mut f: impl FnMut(V) -> bool) -> Option<V> {
        scan_until(self.table, |_, v| {
            if f(v) {
                ControlFlow::Break(v)
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Returns the number of values satisfying `f`.
    pub fn count(&self, mut f: impl FnMut(V) -> bool) -> usize {
        scan_count(self.table, |_, v| f(v))
    }

    /// Folds every value into an accumulator.
    pub fn fold<A>(&self, init: A, f: impl FnMut(A, V) -> A) -> A {
        self.iter().fold(init, f)
    }

    /// Reduces the values to one with `f`. Returns `None` if there are none.
    pub fn reduce(&self, mut f: impl FnMut(V, V) -> V) -> Option<V> {
        self.fold(None, |acc, v| Some(acc.map_or(v, |acc| f(acc, v))))
    }
}

impl<'a, K, V: Value, S> IntoIterator for ValueCollection<'a, K, V, S> {
    type Item = V;
    type IntoIter = Values<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A view of the entries of a map.
///
/// [`iter`](Self::iter) yields owned [`MapEntry`](crate::iter::MapEntry)
/// snapshots; [`fast_iter`](Self::fast_iter) and the bulk operations hand out
/// borrowed [`EntryRef`]s instead and never allocate.
pub struct EntrySet<'a, K, V, S> {
    table: &'a HashTable<K, V, S>,
}

impl<K, V, S> Clone for EntrySet<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for EntrySet<'_, K, V, S> {}

impl<'a, K, V: Value, S> EntrySet<'a, K, V, S> {
    pub(crate) fn new(table: &'a HashTable<K, V, S>) -> Self {
        Self { table }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if `key` is present and maps to `value`.
    pub fn contains(&self, key: &K, value: V) -> bool
    where
        S: HashStrategy<K>,
    {
        self.table
            .find_index(key)
            .is_ok_and(|index| self.table.value_at(index) == value)
    }

    /// Returns an iterator over owned entry snapshots.
    pub fn iter(&self) -> Entries<'a, K, V>
    where
        K: Clone,
    {
        Entries::new(self.table)
    }

    /// Returns an iterator over borrowed entries.
    pub fn fast_iter(&self) -> FastEntries<'a, K, V> {
        FastEntries::new(self.table)
    }

    /// Calls `f` on every entry.
    pub fn for_each(&self, mut f: impl FnMut(EntryRef<'a, K, V>)) {
        let _ = self.table.scan::<()>(|k, v| {
            f(EntryRef::new(k, v));
            ControlFlow::Continue(())
        });
    }

    /// Returns `true` if `f` holds for some entry.
    pub fn matches_any(&self, f: impl FnMut(EntryRef<'a, K, V>) -> bool) -> bool {
        self.find_first(f).is_some()
    }

    /// Returns `true` if `f` holds for no entry.
    pub fn matches_none(&self, f: impl FnMut(EntryRef<'a, K, V>) -> bool) -> bool {
        !self.matches_any(f)
    }

    /// Returns `true` if `f` holds for every entry.
    pub fn matches_all(&self, mut f: impl FnMut(EntryRef<'a, K, V>) -> bool) -> bool {
        self.find_first(|e| !f(e)).is_none()
    }

    /// Returns the first entry in scan order satisfying `f`.
    pub fn find_first(
        &self,
        mut f: impl FnMut(EntryRef<'a, K, V>) -> bool,
    ) -> Option<EntryRef<'a, K, V>> {
        scan_until(self.table, |k, v| {
            let entry = EntryRef::new(k, v);
            if f(entry) {
                ControlFlow::Break(entry)
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Returns the number of entries satisfying `f`.
    pub fn count(&self, mut f: impl FnMut(EntryRef<'a, K, V>) -> bool) -> usize {
        scan_count(self.table, |k, v| f(EntryRef::new(k, v)))
    }

    /// Folds every entry into an accumulator.
    pub fn fold<A>(&self, init: A, f: impl FnMut(A, EntryRef<'a, K, V>) -> A) -> A {
        self.fast_iter().fold(init, f)
    }

    /// Reduces the entries to one with `f`. Returns `None` if there are none.
    pub fn reduce(
        &self,
        mut f: impl FnMut(EntryRef<'a, K, V>, EntryRef<'a, K, V>) -> EntryRef<'a, K, V>,
    ) -> Option<EntryRef<'a, K, V>> {
        self.fold(None, |acc, e| Some(acc.map_or(e, |acc| f(acc, e))))
    }
}

impl<'a, K, V: Value, S> IntoIterator for EntrySet<'a, K, V, S> {
    type Item = EntryRef<'a, K, V>;
    type IntoIter = FastEntries<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.fast_iter()
    }
}

/// A view of the keys of a map that can remove entries by key.
///
/// Read-only bulk operations go through [`view`](Self::view).
///
/// # Examples
///
/// ```rust
/// use shift_map::HashMap;
///
/// let mut map: HashMap<u32, i32> = (0..10).map(|k| (k, 1)).collect();
/// let mut keys = map.keys_mut();
/// assert!(keys.remove(&3));
/// assert!(!keys.remove(&3));
/// assert!(keys.remove_if(|k| k % 2 == 0));
/// assert_eq!(keys.view().fold(0, |sum, k| sum + k), 1 + 5 + 7 + 9);
/// keys.clear();
/// assert!(map.is_empty());
/// ```
pub struct KeySetMut<'a, K, V, S> {
    table: &'a mut HashTable<K, V, S>,
}

impl<'a, K, V: Value, S> KeySetMut<'a, K, V, S> {
    pub(crate) fn new(table: &'a mut HashTable<K, V, S>) -> Self {
        Self { table }
    }

    /// Returns a shared view for the read-only bulk operations.
    pub fn view(&self) -> KeySet<'_, K, V, S> {
        KeySet::new(&*self.table)
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains(&self, key: &K) -> bool
    where
        S: HashStrategy<K>,
    {
        self.view().contains(key)
    }

    /// Returns an iterator over the keys.
    pub fn iter(&self) -> Keys<'_, K, V> {
        Keys::new(&*self.table)
    }

    /// Removes `key` from the map. Returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool
    where
        S: HashStrategy<K>,
    {
        match self.table.find_index(key) {
            Ok(index) => self.table.remove_at(index).is_some(),
            Err(_) => false,
        }
    }

    /// Removes every key satisfying `f`. Returns `true` if any was removed.
    pub fn remove_if(&mut self, mut f: impl FnMut(&K) -> bool) -> bool
    where
        K: Clone,
        S: HashStrategy<K>,
    {
        Cursor::new(&mut *self.table).remove_matching(|k, _| f(k)) > 0
    }

    /// Removes every entry of the map.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

/// A view of the values of a map that can remove entries by value.
///
/// Read-only bulk operations go through [`view`](Self::view).
///
/// # Examples
///
/// ```rust
/// use shift_map::HashMap;
///
/// let mut map: HashMap<&str, i32> = [("a", 1), ("b", 2), ("c", 2)].into_iter().collect();
/// let mut values = map.values_view_mut();
/// assert!(values.remove(2));
/// assert_eq!(values.view().count(|v| v == 2), 1);
/// assert!(!values.remove_if(|v| v > 5));
/// assert_eq!(map.len(), 2);
/// ```
pub struct ValueCollectionMut<'a, K, V, S> {
    table: &'a mut HashTable<K, V, S>,
}

impl<'a, K, V: Value, S> ValueCollectionMut<'a, K, V, S> {
    pub(crate) fn new(table: &'a mut HashTable<K, V, S>) -> Self {
        Self { table }
    }

    /// Returns a shared view for the read-only bulk operations.
    pub fn view(&self) -> ValueCollection<'_, K, V, S> {
        ValueCollection::new(&*self.table)
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if some key maps to `value`.
    pub fn contains(&self, value: V) -> bool {
        self.view().contains(value)
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> Values<'_, K, V> {
        Values::new(&*self.table)
    }

    /// Removes the first entry in scan order that maps to `value`. Returns
    /// `true` if one was found.
    pub fn remove(&mut self, value: V) -> bool
    where
        K: Clone,
        S: HashStrategy<K>,
    {
        let mut cursor = Cursor::new(&mut *self.table);
        while let Some((_, v)) = cursor.next() {
            if v == value {
                return cursor.remove().is_ok();
            }
        }
        false
    }

    /// Removes every entry whose value satisfies `f`. Returns `true` if any
    /// was removed.
    pub fn remove_if(&mut self, mut f: impl FnMut(V) -> bool) -> bool
    where
        K: Clone,
        S: HashStrategy<K>,
    {
        Cursor::new(&mut *self.table).remove_matching(|_, v| f(v)) > 0
    }

    /// Removes every entry of the map.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

/// A view of the entries of a map that can remove entries.
///
/// Read-only bulk operations go through [`view`](Self::view).
pub struct EntrySetMut<'a, K, V, S> {
    table: &'a mut HashTable<K, V, S>,
}

impl<'a, K, V: Value, S> EntrySetMut<'a, K, V, S> {
    pub(crate) fn new(table: &'a mut HashTable<K, V, S>) -> Self {
        Self { table }
    }

    /// Returns a shared view for the read-only bulk operations.
    pub fn view(&self) -> EntrySet<'_, K, V, S> {
        EntrySet::new(&*self.table)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns `true` if `key` is present and maps to `value`.
    pub fn contains(&self, key: &K, value: V) -> bool
    where
        S: HashStrategy<K>,
    {
        self.view().contains(key, value)
    }

    /// Returns an iterator over borrowed entries.
    pub fn fast_iter(&self) -> FastEntries<'_, K, V> {
        FastEntries::new(&*self.table)
    }

    /// Removes the entry `key -> value`. Returns `true` if it was present.
    pub fn remove(&mut self, key: &K, value: V) -> bool
    where
        S: HashStrategy<K>,
    {
        match self.table.find_index(key) {
            Ok(index) if self.table.value_at(index) == value => {
                self.table.remove_at(index).is_some()
            }
            _ => false,
        }
    }

    /// Removes every entry satisfying `f`. Returns `true` if any was removed.
    pub fn remove_if(&mut self, mut f: impl FnMut(EntryRef<'_, K, V>) -> bool) -> bool
    where
        K: Clone,
        S: HashStrategy<K>,
    {
        Cursor::new(&mut *self.table).remove_matching(|k, v| f(EntryRef::new(k, v))) > 0
    }

    /// Removes every entry of the map.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}
