use cachekit::policy::arc::ARCCore;
use cachekit::traits::{CoreCache, MutableCache, ReadOnlyCache};
use parking_lot::Mutex;

use crate::store::BoundedStore;

/// Provides a store which uses an adaptive replacement cache (ARC) to determine which entry
/// to evict.
///
/// The replacement itself is performed by **cachekit**: entries seen once live in a "recent"
/// list, entries seen at least twice in a "frequent" list. Keys evicted from either list are
/// remembered as ghosts, and re-adding such a key shifts the target size of the "recent" list.
/// This store merely puts the cache behind a lock and adapts it to string keys.
///
/// # Examples
/// ```
/// # use memocache::store::{ArcStore, BoundedStore};
/// let store = ArcStore::new(2);
///
/// store.add("a".to_owned(), 1);
/// store.add("b".to_owned(), 2);
/// assert_eq!(store.get("a"), Some(1));
///
/// // Adding a third key evicts exactly one of the others...
/// assert_eq!(store.add("c".to_owned(), 3), true);
/// assert_eq!(store.get("c"), Some(3));
/// assert_eq!(store.len(), 2);
/// ```
pub struct ArcStore<V> {
    capacity: usize,
    core: Mutex<ARCCore<String, V>>,
}

impl<V> ArcStore<V> {
    /// Creates a new store which keeps up to **capacity** entries.
    ///
    /// Note that the ghost lists may remember up to **capacity** additional keys each.
    pub fn new(capacity: usize) -> Self {
        ArcStore {
            capacity,
            core: Mutex::new(ARCCore::new(capacity)),
        }
    }

    /// Returns the current adaptive target size of the "recent" list.
    pub fn target(&self) -> usize {
        self.core.lock().p_value()
    }
}

impl<V: Clone + Send> BoundedStore<V> for ArcStore<V> {
    fn add(&self, key: String, value: V) -> bool {
        let mut core = self.core.lock();

        // Only a new key can push another entry out...
        let evicts = !core.contains(&key) && core.len() >= self.capacity;
        let _ = core.insert(key, value);

        evicts
    }

    fn get(&self, key: &str) -> Option<V> {
        self.core.lock().get(&key.to_owned()).cloned()
    }

    fn remove(&self, key: &str) {
        let _ = self.core.lock().remove(&key.to_owned());
    }

    fn purge(&self) {
        self.core.lock().clear()
    }

    fn len(&self) -> usize {
        self.core.lock().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
