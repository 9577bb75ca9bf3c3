//! Generic, thread-safe, capacity-bound LRU cache.
//!
//! Used to cache FFT plans and per-filter frequency-domain representations so
//! repeated zoom/rotation/translation calls on blocks of the same size don't
//! pay FFT-plan construction cost on every call.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::hash::Hash;
use std::sync::Mutex;

struct Inner<K, V> {
    elements: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> Inner<K, V> {
    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            let k = self.order.remove(pos).unwrap();
            self.order.push_front(k);
        }
    }

    fn evict_if_needed(&mut self) {
        while self.elements.len() > self.capacity {
            if let Some(oldest) = self.order.pop_back() {
                self.elements.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

/// A thread-safe LRU cache keyed by `K`, bounded to `capacity` entries.
///
/// Eviction order matches the original LRUCache: most recently touched key
/// moves to the front, least recently used key is evicted first.
pub struct LruCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                elements: HashMap::new(),
                order: VecDeque::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().expect("lru cache mutex poisoned");
        let value = inner.elements.get(key).cloned();
        if value.is_some() {
            inner.touch(key);
        }
        value
    }

    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.lock().expect("lru cache mutex poisoned");
        if inner.elements.insert(key.clone(), value).is_some() {
            inner.touch(&key);
        } else {
            inner.order.push_front(key);
        }
        inner.evict_if_needed();
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock().expect("lru cache mutex poisoned");
        let removed = inner.elements.remove(key);
        if removed.is_some() {
            if let Some(pos) = inner.order.iter().position(|k| k == key) {
                inner.order.remove(pos);
            }
        }
        removed
    }

    pub fn contains(&self, key: &K) -> bool {
        let inner = self.inner.lock().expect("lru cache mutex poisoned");
        inner.elements.contains_key(key)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("lru cache mutex poisoned");
        inner.elements.clear();
        inner.order.clear();
    }

    pub fn size(&self) -> usize {
        let inner = self.inner.lock().expect("lru cache mutex poisoned");
        inner.elements.len()
    }
}

/// Convenience accessor for a cache entry, computing and inserting on miss.
impl<K: Eq + Hash + Clone, V: Clone> LruCache<K, V> {
    pub fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = make();
        self.insert(key.clone(), value.clone());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let cache: LruCache<i32, i32> = LruCache::new(3);
        cache.insert(1, 10);
        cache.insert(2, 20);
        cache.insert(3, 30);
        // touch 1 so 2 becomes the least recently used
        assert_eq!(cache.get(&1), Some(10));
        cache.insert(4, 40);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&3), Some(30));
        assert_eq!(cache.get(&4), Some(40));
    }

    #[test]
    fn insert_same_key_updates_value_without_growing() {
        let cache: LruCache<&str, i32> = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get(&"a"), Some(2));
    }

    #[test]
    fn remove_and_contains() {
        let cache: LruCache<i32, i32> = LruCache::new(4);
        cache.insert(1, 1);
        assert!(cache.contains(&1));
        assert_eq!(cache.remove(&1), Some(1));
        assert!(!cache.contains(&1));
        assert_eq!(cache.remove(&1), None);
    }

    #[test]
    fn clear_empties_cache() {
        let cache: LruCache<i32, i32> = LruCache::new(4);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.clear();
        assert_eq!(cache.size(), 0);
        assert!(!cache.contains(&1));
    }

    #[test]
    fn get_or_insert_with_only_computes_once() {
        let cache: LruCache<i32, i32> = LruCache::new(4);
        let mut calls = 0;
        let mut compute = || {
            calls += 1;
            99
        };
        assert_eq!(cache.get_or_insert_with(1, &mut compute), 99);
        assert_eq!(cache.get_or_insert_with(1, &mut compute), 99);
        assert_eq!(calls, 1);
    }
}
