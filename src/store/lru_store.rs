use linked_hash_map::LinkedHashMap;
use parking_lot::Mutex;

use crate::store::BoundedStore;

/// Provides a size constrained LRU store.
///
/// A store behaves just like a **Map** as long as there is no shortage in storage. However, once
/// the max number of entries is reached, old (least recently used) entries will be evicted - hence
/// the name LRU.
///
/// # Examples
/// ```
/// # use memocache::store::{BoundedStore, LruStore};
/// // Specifies a store which can keep up to 2 entries...
/// let lru = LruStore::new(2);
///
/// lru.add("Foo".to_owned(), "Bar".to_owned());
/// lru.add("Foo1".to_owned(), "Bar1".to_owned());
/// assert_eq!(lru.get("Foo").unwrap(), "Bar");
///
/// // "Foo" has just been used, therefore "Foo1" is evicted...
/// lru.add("Foo2".to_owned(), "Bar2".to_owned());
/// assert_eq!(lru.get("Foo").is_some(), true);
/// assert_eq!(lru.get("Foo1").is_some(), false);
/// assert_eq!(lru.get("Foo2").is_some(), true);
///```
pub struct LruStore<V> {
    capacity: usize,
    map: Mutex<LinkedHashMap<String, V>>,
}

impl<V> LruStore<V> {
    /// Creates a new store which can keep up to **capacity** entries.
    pub fn new(capacity: usize) -> Self {
        LruStore {
            capacity,
            map: Mutex::new(LinkedHashMap::with_capacity(capacity)),
        }
    }

    fn enforce_constraints(&self, map: &mut LinkedHashMap<String, V>) -> bool {
        let mut evicted = false;
        while map.len() > self.capacity {
            match map.pop_front() {
                Some(_) => evicted = true,
                None => break,
            }
        }

        evicted
    }
}

impl<V: Clone + Send> BoundedStore<V> for LruStore<V> {
    fn add(&self, key: String, value: V) -> bool {
        let mut map = self.map.lock();
        let _ = map.insert(key, value);
        self.enforce_constraints(&mut map)
    }

    fn get(&self, key: &str) -> Option<V> {
        self.map.lock().get_refresh(key).map(|value| value.clone())
    }

    fn remove(&self, key: &str) {
        let _ = self.map.lock().remove(key);
    }

    fn purge(&self) {
        self.map.lock().clear();
    }

    fn len(&self) -> usize {
        self.map.lock().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use crate::store::{BoundedStore, LruStore};

    #[test]
    fn capacity_is_enforced() {
        // Creates a store which only permits four entries at the same time...
        let lru = LruStore::new(4);

        // We expect 4 entries to fully fit in the store....
        let _ = lru.add("Hello".to_owned(), "World".to_owned());
        let _ = lru.add("Hello1".to_owned(), "World1".to_owned());
        let _ = lru.add("Hello2".to_owned(), "World2".to_owned());
        assert_eq!(lru.add("Hello3".to_owned(), "World3".to_owned()), false);
        assert_eq!(lru.len(), 4);
        assert_eq!(lru.get("Hello").unwrap(), "World");
        assert_eq!(lru.get("Hello1").unwrap(), "World1");
        assert_eq!(lru.get("Hello2").unwrap(), "World2");
        assert_eq!(lru.get("Hello3").unwrap(), "World3");

        // Now if another entry is added, the LRU (least recently used/inserted)
        // will be dropped...
        assert_eq!(lru.add("Hello4".to_owned(), "World4".to_owned()), true);
        assert_eq!(lru.get("Hello"), None);
        assert_eq!(lru.get("Hello1").unwrap(), "World1");
        assert_eq!(lru.get("Hello2").unwrap(), "World2");
        assert_eq!(lru.get("Hello3").unwrap(), "World3");
        assert_eq!(lru.get("Hello4").unwrap(), "World4");

        // Now if we "use" another entry, it gets "saved" and another one will
        // be evicted upon an insertion...
        let _ = lru.get("Hello1");
        let _ = lru.add("Hello5".to_owned(), "World5".to_owned());
        assert_eq!(lru.get("Hello1").unwrap(), "World1");
        assert_eq!(lru.get("Hello2"), None);
        assert_eq!(lru.get("Hello3").unwrap(), "World3");
        assert_eq!(lru.get("Hello4").unwrap(), "World4");
        assert_eq!(lru.get("Hello5").unwrap(), "World5");

        // Removing an entry will make room to permit inserting yet another
        // entry without removing any entries...
        assert_eq!(lru.len(), 4);
        lru.remove("Hello5");
        assert_eq!(lru.len(), 3);
        assert_eq!(lru.add("Hello6".to_owned(), "World6".to_owned()), false);
        assert_eq!(lru.get("Hello1").unwrap(), "World1");
        assert_eq!(lru.get("Hello3").unwrap(), "World3");
        assert_eq!(lru.get("Hello4").unwrap(), "World4");
        assert_eq!(lru.get("Hello6").unwrap(), "World6");
        assert_eq!(lru.len(), 4);
    }

    #[test]
    fn purge_removes_everything() {
        let lru = LruStore::new(4);
        let _ = lru.add("Foo".to_owned(), 1);
        let _ = lru.add("Bar".to_owned(), 2);

        lru.purge();
        assert_eq!(lru.is_empty(), true);
        assert_eq!(lru.get("Foo"), None);
    }
}
