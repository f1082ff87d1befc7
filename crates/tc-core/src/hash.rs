//! Fast hash map and hash set type aliases.
//!
//! Keys in this workspace are glob patterns, configuration keys, and step
//! names: short strings from trusted input. The Fx hash from `rustc-hash`
//! is a good fit and avoids SipHash's denial-of-service resistance cost.
//!
//! # Examples
//!
//! ```
//! use tc_core::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
//!
//! let mut map: FxHashMap<String, i32> = FxHashMap::default();
//! map.insert("key".to_owned(), 42);
//!
//! let set: FxHashSet<&str> = fx_hash_set();
//! assert!(set.is_empty());
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// The hasher used by [`FxHashMap`] and [`FxHashSet`].
pub type FxBuildHasher = rustc_hash::FxBuildHasher;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}

/// Creates a new empty [`FxHashSet`].
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}

/// Creates a new [`FxHashMap`] with at least the given capacity.
///
/// # Examples
///
/// ```
/// use tc_core::fx_hash_map_with_capacity;
///
/// let map: tc_core::FxHashMap<String, i32> = fx_hash_map_with_capacity(16);
/// assert!(map.capacity() >= 16);
/// ```
#[inline]
#[must_use]
pub fn fx_hash_map_with_capacity<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_operations() {
        let mut map: FxHashMap<String, i32> = fx_hash_map();
        map.insert("a".to_owned(), 1);
        map.insert("b".to_owned(), 2);
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_set_deduplicates() {
        let mut set: FxHashSet<&str> = fx_hash_set();
        assert!(set.insert("step"));
        assert!(!set.insert("step"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_with_capacity() {
        let map: FxHashMap<u32, u32> = fx_hash_map_with_capacity(64);
        assert!(map.capacity() >= 64);
        assert!(map.is_empty());
    }
}
