// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A keyed cache of immutable state objects shared by everything created on a device.

use crate::utils::sync::lock;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Mutex;

/// Maps a state description to the single object created for it.
///
/// The first lookup of a description constructs the object; every later lookup of
/// an equal description returns a clone of it (typically an `Arc`). Entries are
/// never evicted. Lookups and insertions are serialized by one lock.
pub struct StateCache<K, V> {
    name: &'static str,
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> StateCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache. `name` only appears in log messages.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the object for `key`, creating it with `create` on a miss.
    ///
    /// A failed creation is not cached; the next lookup tries again.
    pub fn get_or_create<E>(
        &self,
        key: &K,
        create: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        let mut entries = lock(&self.entries);
        if let Some(value) = entries.get(key) {
            return Ok(value.clone());
        }
        let value = create(key)?;
        entries.insert(key.clone(), value.clone());
        log::debug!(
            "{} cache miss, {} distinct entries",
            self.name,
            entries.len()
        );
        Ok(value)
    }

    /// Returns the object for `key` without creating it.
    pub fn get(&self, key: &K) -> Option<V> {
        lock(&self.entries).get(key).cloned()
    }

    /// Number of distinct descriptions seen so far.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Returns `true` if nothing has been created yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> fmt::Debug for StateCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = lock(&self.entries).len();
        f.debug_struct("StateCache")
            .field("name", &self.name)
            .field("len", &len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_equal_keys_share_one_object() {
        let cache: StateCache<(u32, bool), Arc<String>> = StateCache::new("test");
        let created = AtomicUsize::new(0);
        let create = |key: &(u32, bool)| -> Result<_, ()> {
            created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(format!("{key:?}")))
        };

        let a = cache.get_or_create(&(1, true), create).unwrap();
        let b = cache.get_or_create(&(1, true), create).unwrap();
        let c = cache.get_or_create(&(2, true), create).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_creation_is_not_cached() {
        let cache: StateCache<u32, Arc<u32>> = StateCache::new("test");
        let result = cache.get_or_create(&7, |_| Err("backend refused"));
        assert_eq!(result.unwrap_err(), "backend refused");
        assert!(cache.is_empty());
        assert!(cache.get(&7).is_none());

        let value = cache.get_or_create(&7, |k| Ok::<_, ()>(Arc::new(*k))).unwrap();
        assert_eq!(*value, 7);
        assert_eq!(cache.get(&7).map(|v| *v), Some(7));
    }

    #[test]
    fn test_concurrent_lookups_create_once() {
        let cache: Arc<StateCache<u32, Arc<u32>>> = Arc::new(StateCache::new("test"));
        let created = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let created = Arc::clone(&created);
                std::thread::spawn(move || {
                    cache
                        .get_or_create(&42, |k| {
                            created.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ()>(Arc::new(*k))
                        })
                        .unwrap()
                })
            })
            .collect();
        let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert!(values.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
