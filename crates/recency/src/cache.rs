//! LRU (Least Recently Used) cache
//!
//! Couples a hash index with an [`OrderedNodeList`] for O(1) lookups and
//! O(1) eviction. When full, the tail node is recycled for the new key
//! instead of being freed and reallocated.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::list::{self, NodeHandle, OrderedNodeList};

/// Key/value pair stored in a list node
struct Entry<K, V> {
    key: K,
    value: V,
}

/// LRU cache with fixed capacity
pub struct LruCache<K, V> {
    /// Key -> node holding that key
    index: HashMap<K, NodeHandle, RandomState>,

    /// Recency order, head is most recently used
    list: OrderedNodeList<Entry<K, V>>,

    max_size: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache holding at most `max_size` entries
    ///
    /// # Errors
    /// * [`Error::InvalidArgument`] if `max_size` is zero
    pub fn new(max_size: usize) -> Result<Self> {
        if max_size == 0 {
            return Err(Error::InvalidArgument(
                "max_size must be greater than 0".to_string(),
            ));
        }

        debug!(max_size, "Created LRU cache");

        Ok(Self {
            index: HashMap::with_capacity_and_hasher(max_size, RandomState::new()),
            list: OrderedNodeList::with_capacity(max_size),
            max_size,
        })
    }

    /// Get a value and mark its key as most recently used
    ///
    /// # Errors
    /// * [`Error::NotFound`] if the key is absent
    pub fn get<Q>(&mut self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.promote(key)?;
        self.list
            .get(handle)
            .map(|entry| &entry.value)
            .ok_or(Error::NotFound)
    }

    /// Mutable variant of [`get`](Self::get), also promotes the key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.promote(key)?;
        self.list
            .get_mut(handle)
            .map(|entry| &mut entry.value)
            .ok_or(Error::NotFound)
    }

    /// Get a value without touching the recency order
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.get(key)?;
        self.list.get(handle).map(|entry| &entry.value)
    }

    /// Check for a key without touching the recency order
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Insert or overwrite a key, marking it as most recently used
    ///
    /// When the cache is full and `key` is new, the least recently used
    /// entry is evicted and its node reused for `key`.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(handle) {
                entry.value = value;
            }
            self.list.move_to_front(handle);
            return;
        }

        match self.list.tail() {
            Some(victim) if self.index.len() >= self.max_size => {
                self.recycle(victim, key, value);
            }
            _ => {
                let handle = self.list.prepend(Entry {
                    key: key.clone(),
                    value,
                });
                self.index.insert(key, handle);
            }
        }
    }

    /// Remove a key, returning its value
    ///
    /// # Errors
    /// * [`Error::NotFound`] if the key is absent
    pub fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.remove(key).ok_or(Error::NotFound)?;
        self.list
            .remove(handle)
            .map(|entry| entry.value)
            .ok_or(Error::NotFound)
    }

    fn promote<Q>(&mut self, key: &Q) -> Result<NodeHandle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = *self.index.get(key).ok_or(Error::NotFound)?;
        self.list.move_to_front(handle);
        Ok(handle)
    }

    /// Evict the tail entry and reuse its node for `key`
    fn recycle(&mut self, victim: NodeHandle, key: K, value: V) {
        // Unindex the old key before its node is overwritten
        if let Some(old) = self.list.get(victim) {
            self.index.remove(&old.key);
        }

        self.list.replace(
            victim,
            Entry {
                key: key.clone(),
                value,
            },
        );
        self.list.move_to_front(victim);
        self.index.insert(key, victim);

        trace!(max_size = self.max_size, "Recycled tail node");
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        self.list.assert_consistent();
        assert_eq!(self.index.len(), self.list.len());
        assert!(self.list.len() <= self.max_size);
        for (key, &handle) in &self.index {
            let entry = self.list.get(handle).expect("index points at vacant node");
            assert!(entry.key == *key, "index key does not match node key");
        }
    }
}

impl<K, V> LruCache<K, V> {
    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Least recently used entry, the next eviction victim
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let tail = self.list.tail()?;
        self.list.get(tail).map(|entry| (&entry.key, &entry.value))
    }

    /// Clear the cache. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.index.clear();
        self.list.clear();
    }

    /// Keys from most to least recently used
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys {
            inner: self.list.iter(),
        }
    }

    /// Entries from most to least recently used, without promoting them
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.list.iter(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over cache keys, most recently used first
pub struct Keys<'a, K, V> {
    inner: list::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| &entry.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a, K, V> {
    inner: list::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
