//! Iterators and the removal-capable [`Cursor`].
//!
//! Every iterator walks the table in scan order: the null key first, then the
//! regular slots from the highest index down to zero.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::iter::FusedIterator;
use core::iter::Rev;
use core::iter::Zip;
use core::marker::PhantomData;
use core::slice;

use crate::error::Error;
use crate::error::Result;
use crate::hash_table::HashTable;
use crate::strategy::HashStrategy;
use crate::value::Value;

/// A borrowed view of one entry.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EntryRef<'a, K, V> {
    key: &'a K,
    value: V,
}

impl<K, V: Copy> Clone for EntryRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V: Copy> Copy for EntryRef<'_, K, V> {}

impl<'a, K, V: Copy> EntryRef<'a, K, V> {
    pub(crate) fn new(key: &'a K, value: V) -> Self {
        Self { key, value }
    }

    /// Returns the key.
    pub fn key(&self) -> &'a K {
        self.key
    }

    /// Returns the value.
    pub fn value(&self) -> V {
        self.value
    }
}

/// An owned snapshot of one entry.
///
/// Changing the map after the snapshot was taken does not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapEntry<K, V> {
    key: K,
    value: V,
}

impl<K, V: Copy> MapEntry<K, V> {
    /// Creates an entry from its parts.
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Returns the key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the value.
    pub fn value(&self) -> V {
        self.value
    }

    /// Splits the entry into key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for MapEntry<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self { key, value }
    }
}

/// An iterator over the entries of a map, yielding `(&K, V)`.
pub struct Iter<'a, K, V> {
    slots: Rev<Zip<slice::Iter<'a, Option<K>>, slice::Iter<'a, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new<S>(table: &'a HashTable<K, V, S>) -> Self {
        Self {
            slots: table.keys.iter().zip(table.values.iter()).rev(),
            remaining: table.len,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V: Copy> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (key, value) in self.slots.by_ref() {
            if let Some(key) = key {
                self.remaining -= 1;
                return Some((key, *value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V: Copy> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V: Copy> FusedIterator for Iter<'_, K, V> {}

/// An iterator over the keys of a map.
#[derive(Clone)]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new<S>(table: &'a HashTable<K, V, S>) -> Self {
        Self {
            inner: Iter::new(table),
        }
    }
}

impl<'a, K, V: Copy> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V: Copy> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V: Copy> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a map.
#[derive(Clone)]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new<S>(table: &'a HashTable<K, V, S>) -> Self {
        Self {
            inner: Iter::new(table),
        }
    }
}

impl<K, V: Copy> Iterator for Values<'_, K, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V: Copy> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V: Copy> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a map.
pub struct ValuesMut<'a, K, V> {
    slots: Rev<Zip<slice::Iter<'a, Option<K>>, slice::IterMut<'a, V>>>,
    remaining: usize,
}

impl<'a, K, V> ValuesMut<'a, K, V> {
    pub(crate) fn new<S>(table: &'a mut HashTable<K, V, S>) -> Self {
        let remaining = table.len;
        Self {
            slots: table.keys.iter().zip(table.values.iter_mut()).rev(),
            remaining,
        }
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (key, value) in self.slots.by_ref() {
            if key.is_some() {
                self.remaining -= 1;
                return Some(value);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// An iterator over owned [`MapEntry`] snapshots.
#[derive(Clone)]
pub struct Entries<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) fn new<S>(table: &'a HashTable<K, V, S>) -> Self {
        Self {
            inner: Iter::new(table),
        }
    }
}

impl<K: Clone, V: Copy> Iterator for Entries<'_, K, V> {
    type Item = MapEntry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| MapEntry::new(key.clone(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Clone, V: Copy> ExactSizeIterator for Entries<'_, K, V> {}

impl<K: Clone, V: Copy> FusedIterator for Entries<'_, K, V> {}

/// An iterator over borrowed [`EntryRef`]s. Never allocates.
#[derive(Clone)]
pub struct FastEntries<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> FastEntries<'a, K, V> {
    pub(crate) fn new<S>(table: &'a HashTable<K, V, S>) -> Self {
        Self {
            inner: Iter::new(table),
        }
    }
}

impl<'a, K, V: Copy> Iterator for FastEntries<'a, K, V> {
    type Item = EntryRef<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| EntryRef { key, value })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V: Copy> ExactSizeIterator for FastEntries<'_, K, V> {}

impl<K, V: Copy> FusedIterator for FastEntries<'_, K, V> {}

/// An owning iterator over the entries of a map.
pub struct IntoIter<K, V> {
    slots: Rev<Zip<alloc::vec::IntoIter<Option<K>>, alloc::vec::IntoIter<V>>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(keys: Box<[Option<K>]>, values: Box<[V]>, len: usize) -> Self {
        Self {
            slots: keys.into_vec().into_iter().zip(values.into_vec()).rev(),
            remaining: len,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (key, value) in self.slots.by_ref() {
            if let Some(key) = key {
                self.remaining -= 1;
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

/// A draining iterator over the entries of a map.
///
/// The map is empty as soon as the iterator is created; its table size is
/// kept. Entries not consumed are dropped with the iterator.
pub struct Drain<'a, K, V> {
    inner: IntoIter<K, V>,
    marker: PhantomData<&'a mut (K, V)>,
}

impl<'a, K, V: Value> Drain<'a, K, V> {
    pub(crate) fn new<S>(table: &'a mut HashTable<K, V, S>) -> Self {
        let (keys, values, len) = table.take_all();
        Self {
            inner: IntoIter::new(keys, values, len),
            marker: PhantomData,
        }
    }
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V> FusedIterator for Drain<'_, K, V> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    /// Found by the descending scan.
    Slot(usize),
    /// Re-resolved from the replay buffer.
    Replayed(usize),
}

/// A cursor over the entries of a map that can update and remove the entry
/// it is positioned on.
///
/// Removing an entry shifts later members of its probe run backwards. When
/// such a shift carries an entry from the start of the table past the end,
/// into the part the cursor has already passed, the cursor remembers the key
/// and visits it after the scan. Every entry present when the cursor was
/// created, and not removed through it, is visited exactly once.
///
/// # Examples
///
/// ```rust
/// use shift_map::HashMap;
///
/// let mut map: HashMap<u32, i32> = (0..100).map(|k| (k, k as i32)).collect();
/// let mut cursor = map.cursor();
/// while let Some((key, _)) = cursor.next() {
///     if key % 3 == 0 {
///         cursor.remove().unwrap();
///     } else {
///         cursor.set_value(-1).unwrap();
///     }
/// }
/// assert_eq!(map.len(), 66);
/// assert!(map.values().matches_all(|v| v == -1));
/// ```
pub struct Cursor<'a, K, V, S> {
    table: &'a mut HashTable<K, V, S>,
    pending_null: bool,
    pos: usize,
    wrapped: Vec<K>,
    replayed: usize,
    current: Option<Position>,
}

impl<'a, K, V, S> Cursor<'a, K, V, S>
where
    K: Clone,
    V: Value,
    S: HashStrategy<K>,
{
    pub(crate) fn new(table: &'a mut HashTable<K, V, S>) -> Self {
        let pos = table.null_index;
        Self {
            table,
            pending_null: true,
            pos,
            wrapped: Vec::new(),
            replayed: 0,
            current: None,
        }
    }

    /// Advances to the next entry and returns it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, V)> {
        self.current = self.advance();
        let index = self.index()?;
        let key = self.table.keys[index].as_ref()?;
        Some((key, self.table.values[index]))
    }

    fn advance(&mut self) -> Option<Position> {
        if self.pending_null {
            self.pending_null = false;
            if self.table.contains_null {
                return Some(Position::Slot(self.table.null_index));
            }
        }
        while self.pos > 0 {
            self.pos -= 1;
            if self.table.keys[self.pos].is_some() {
                return Some(Position::Slot(self.pos));
            }
        }
        while let Some(key) = self.wrapped.get(self.replayed) {
            self.replayed += 1;
            // A wrapped key sits behind the scan, so only a replay can
            // remove it and each key is buffered at most once.
            match self.table.find_index(key) {
                Ok(index) => return Some(Position::Replayed(index)),
                Err(_) => unreachable!("wrapped key left the table before its replay"),
            }
        }
        None
    }

    fn index(&self) -> Option<usize> {
        match self.current? {
            Position::Slot(index) | Position::Replayed(index) => Some(index),
        }
    }

    /// Returns the key of the current entry.
    pub fn key(&self) -> Option<&K> {
        self.table.key_at(self.index()?)
    }

    /// Returns the value of the current entry.
    pub fn value(&self) -> Option<V> {
        self.index().map(|index| self.table.values[index])
    }

    /// Replaces the value of the current entry and returns the old one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCurrentEntry`] if the cursor is not positioned on an
    /// entry.
    pub fn set_value(&mut self, value: V) -> Result<V> {
        let index = self.index().ok_or(Error::NoCurrentEntry)?;
        Ok(core::mem::replace(self.table.value_at_mut(index), value))
    }

    /// Removes the current entry and returns it.
    ///
    /// The cursor stays between entries until the next call to
    /// [`next`](Self::next).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCurrentEntry`] if the cursor is not positioned on an
    /// entry.
    pub fn remove(&mut self) -> Result<(K, V)> {
        let removed = match self.current.take().ok_or(Error::NoCurrentEntry)? {
            Position::Slot(index) => {
                let wrapped = &mut self.wrapped;
                self.table.take_at(index, |key| wrapped.push(key.clone()))
            }
            // The scan is over, so shrinking can no longer hide entries.
            Position::Replayed(index) => self.table.remove_at(index),
        };
        removed.ok_or(Error::NoCurrentEntry)
    }

    /// Removes every remaining entry for which `f` returns `true` and returns
    /// how many were removed.
    pub(crate) fn remove_matching(mut self, mut f: impl FnMut(&K, V) -> bool) -> usize {
        let mut removed = 0;
        while let Some((key, value)) = self.next() {
            if f(key, value) && self.remove().is_ok() {
                removed += 1;
            }
        }
        removed
    }
}
