//! Pluggable hashing and equality.
//!
//! A [`HashStrategy`] decides which keys a map considers equal and where in
//! the table they are probed for. Keys never need to implement `Hash` or `Eq`
//! themselves, so one key type can be used with identity semantics in one map
//! and content semantics in another.

use alloc::rc::Rc;
use alloc::sync::Arc;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::hash::Hasher;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hash builder used by the content-hashing strategies when none is
        /// given.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// Hash builder used by the content-hashing strategies when none is
        /// given.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder for a missing default hash builder.
        ///
        /// Neither the `foldhash` nor the `std` feature is enabled, so a hash
        /// builder must be supplied explicitly.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}

/// Hashing and equality for the keys of a map.
///
/// Implementations must be consistent: whenever `equals(a, b)` holds,
/// `hash(a) == hash(b)` and `is_null_key(a) == is_null_key(b)` must hold too.
/// A strategy that breaks this leaves keys unreachable, but never causes
/// undefined behavior.
pub trait HashStrategy<K: ?Sized> {
    /// Returns the hash code of `key`.
    fn hash(&self, key: &K) -> u64;

    /// Returns `true` if `a` and `b` denote the same key.
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Returns `true` if `key` is the null key.
    ///
    /// The null key is kept in a dedicated slot outside the probed part of the
    /// table and is never hashed. Most strategies have no null key.
    #[inline]
    fn is_null_key(&self, key: &K) -> bool {
        let _ = key;
        false
    }
}

/// Content hashing through the key's own `Hash` and `Eq` implementations.
#[derive(Clone)]
pub struct DefaultStrategy<B = DefaultHashBuilder> {
    hash_builder: B,
}

impl<B> DefaultStrategy<B> {
    /// Creates a strategy hashing keys with `hash_builder`.
    pub fn with_hasher(hash_builder: B) -> Self {
        Self { hash_builder }
    }

    /// Returns the hash builder in use.
    pub fn hasher(&self) -> &B {
        &self.hash_builder
    }
}

impl<B: Default> DefaultStrategy<B> {
    /// Creates a strategy with a default-constructed hash builder.
    pub fn new() -> Self {
        Self::with_hasher(B::default())
    }
}

impl<B: Default> Default for DefaultStrategy<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Debug for DefaultStrategy<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultStrategy").finish_non_exhaustive()
    }
}

impl<K, B> HashStrategy<K> for DefaultStrategy<B>
where
    K: Hash + Eq + ?Sized,
    B: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Reference identity: two keys are equal only if they point at the same
/// object.
///
/// Implemented for shared references, `Rc` and `Arc`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityStrategy;

#[inline]
fn address<T: ?Sized>(ptr: *const T) -> u64 {
    ptr.cast::<()>() as usize as u64
}

impl<T: ?Sized> HashStrategy<&T> for IdentityStrategy {
    #[inline]
    fn hash(&self, key: &&T) -> u64 {
        address(*key)
    }

    #[inline]
    fn equals(&self, a: &&T, b: &&T) -> bool {
        core::ptr::eq(*a, *b)
    }
}

impl<T: ?Sized> HashStrategy<Rc<T>> for IdentityStrategy {
    #[inline]
    fn hash(&self, key: &Rc<T>) -> u64 {
        address(Rc::as_ptr(key))
    }

    #[inline]
    fn equals(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
        Rc::ptr_eq(a, b)
    }
}

impl<T: ?Sized> HashStrategy<Arc<T>> for IdentityStrategy {
    #[inline]
    fn hash(&self, key: &Arc<T>) -> u64 {
        address(Arc::as_ptr(key))
    }

    #[inline]
    fn equals(&self, a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

/// Case-insensitive comparison of string keys.
///
/// Both hashing and equality run over the Unicode lowercase mapping of each
/// character, so `"Straße"` and `"STRASSE"` are different keys while `"Key"`
/// and `"kEY"` are the same one.
#[derive(Clone)]
pub struct CaseInsensitive<B = DefaultHashBuilder> {
    hash_builder: B,
}

impl<B> CaseInsensitive<B> {
    /// Creates a strategy hashing folded keys with `hash_builder`.
    pub fn with_hasher(hash_builder: B) -> Self {
        Self { hash_builder }
    }
}

impl<B: Default> CaseInsensitive<B> {
    /// Creates a strategy with a default-constructed hash builder.
    pub fn new() -> Self {
        Self::with_hasher(B::default())
    }
}

impl<B: Default> Default for CaseInsensitive<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Debug for CaseInsensitive<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CaseInsensitive").finish_non_exhaustive()
    }
}

impl<K, B> HashStrategy<K> for CaseInsensitive<B>
where
    K: AsRef<str> + ?Sized,
    B: BuildHasher,
{
    fn hash(&self, key: &K) -> u64 {
        let mut hasher = self.hash_builder.build_hasher();
        for c in key.as_ref().chars().flat_map(char::to_lowercase) {
            hasher.write_u32(c as u32);
        }
        hasher.finish()
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        let a = a.as_ref();
        let b = b.as_ref();
        a == b
            || a.chars()
                .flat_map(char::to_lowercase)
                .eq(b.chars().flat_map(char::to_lowercase))
    }
}

/// Lifts a strategy to `Option<K>` keys, with `None` as the null key.
///
/// # Examples
///
/// ```rust
/// use shift_map::HashMap;
/// use shift_map::strategy::DefaultStrategy;
/// use shift_map::strategy::Nullable;
///
/// let strategy: Nullable<DefaultStrategy> = Nullable::default();
/// let mut map: HashMap<Option<&str>, i32, _> = HashMap::with_strategy(strategy);
/// map.put(None, 5);
/// map.put(Some("a"), 1);
/// assert_eq!(map.get(&None), 5);
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Nullable<S> {
    inner: S,
}

impl<S> Nullable<S> {
    /// Wraps `inner`, which handles every `Some` key.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Returns the wrapped strategy.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<K, S> HashStrategy<Option<K>> for Nullable<S>
where
    S: HashStrategy<K>,
{
    #[inline]
    fn hash(&self, key: &Option<K>) -> u64 {
        key.as_ref().map_or(0, |k| self.inner.hash(k))
    }

    #[inline]
    fn equals(&self, a: &Option<K>, b: &Option<K>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.inner.equals(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    #[inline]
    fn is_null_key(&self, key: &Option<K>) -> bool {
        key.is_none()
    }
}

/// A strategy assembled from a hash closure and an equality closure.
///
/// # Examples
///
/// ```rust
/// use shift_map::HashMap;
/// use shift_map::strategy::FnStrategy;
///
/// // Keys compare by their last digit only.
/// let strategy = FnStrategy::new(|k: &u32| u64::from(k % 10), |a: &u32, b: &u32| a % 10 == b % 10);
/// let mut map: HashMap<u32, i64, _> = HashMap::with_strategy(strategy);
/// map.put(13, 1);
/// assert_eq!(map.get(&23), 1);
/// ```
#[derive(Clone)]
pub struct FnStrategy<H, E> {
    hash: H,
    equals: E,
}

impl<H, E> FnStrategy<H, E> {
    /// Creates a strategy from `hash` and `equals`.
    pub fn new<K>(hash: H, equals: E) -> Self
    where
        K: ?Sized,
        H: Fn(&K) -> u64,
        E: Fn(&K, &K) -> bool,
    {
        Self { hash, equals }
    }
}

impl<H, E> Debug for FnStrategy<H, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnStrategy").finish_non_exhaustive()
    }
}

impl<K, H, E> HashStrategy<K> for FnStrategy<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> u64,
    E: Fn(&K, &K) -> bool,
{
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.equals)(a, b)
    }
}
