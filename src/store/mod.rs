//! Provides the bounded stores which keep the actual cache entries.
//!
//! A store behaves just like a **Map** as long as there is room left. Once its capacity (the max
//! number of entries) is reached, each insertion of a new key evicts exactly one other entry. Which
//! entry is dropped is up to the [Policy](Policy) of the store:
//!
//! * **Adaptive** (the default) uses an adaptive replacement cache (ARC), which balances between
//!   entries which have been used recently and entries which are used frequently. It therefore
//!   survives scans (a bunch of keys which are only read once) without losing its "hot" entries.
//!   See [ArcStore](ArcStore).
//! * **Lru** evicts the least recently used entry. See [LruStore](LruStore).
//!
//! All stores are internally synchronized, therefore they can be shared across threads and tasks
//! without any external locking.
//!
//! # Examples
//! ```
//! # use memocache::store::{create, Policy};
//! let store = create::<String>(Policy::Adaptive, 2).unwrap();
//!
//! store.add("a".to_owned(), "A".to_owned());
//! store.add("b".to_owned(), "B".to_owned());
//! assert_eq!(store.get("a").unwrap(), "A");
//!
//! // Adding a third key evicts one of the others...
//! assert_eq!(store.add("c".to_owned(), "C".to_owned()), true);
//! assert_eq!(store.len(), 2);
//! ```
use std::fmt::{Display, Formatter};
use std::str::FromStr;

mod arc_store;
mod lru_store;

pub use arc_store::ArcStore;
pub use lru_store::LruStore;

/// Describes the contract of a fixed capacity store.
///
/// Note that all methods operate on a shared reference, as each store provides its own internal
/// synchronization.
pub trait BoundedStore<V>: Send + Sync {
    /// Inserts or replaces the value for the given key.
    ///
    /// If this would grow the store beyond its capacity, exactly one entry is evicted, as
    /// determined by the replacement policy. Returns **true** if an entry was evicted.
    fn add(&self, key: String, value: V) -> bool;

    /// Returns a copy of the value stored for the given key.
    ///
    /// Note that this counts as "usage" of the entry and therefore updates the bookkeeping of the
    /// replacement policy.
    fn get(&self, key: &str) -> Option<V>;

    /// Removes the entry for the given key if present.
    fn remove(&self, key: &str);

    /// Removes all entries and resets the internal bookkeeping.
    fn purge(&self);

    /// Returns the number of entries in the store.
    fn len(&self) -> usize;

    /// Determines if the store is completely empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximal number of entries permitted in this store.
    fn capacity(&self) -> usize;
}

/// Enumerates the available replacement policies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Policy {
    /// Adaptive replacement which balances recency and frequency.
    #[default]
    Adaptive,
    /// Evicts the least recently used entry.
    Lru,
}

impl FromStr for Policy {
    type Err = anyhow::Error;

    /// Parses a policy name as found in the settings.
    ///
    /// # Examples
    /// ```
    /// # use memocache::store::Policy;
    /// assert_eq!("arc".parse::<Policy>().unwrap(), Policy::Adaptive);
    /// assert_eq!("Adaptive".parse::<Policy>().unwrap(), Policy::Adaptive);
    /// assert_eq!("LRU".parse::<Policy>().unwrap(), Policy::Lru);
    /// assert_eq!("fifo".parse::<Policy>().is_err(), true);
    /// ```
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "arc" | "adaptive" => Ok(Policy::Adaptive),
            "lru" => Ok(Policy::Lru),
            _ => Err(anyhow::anyhow!(
                "Unknown replacement policy '{}'. Expected either 'arc' or 'lru'.",
                value
            )),
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::Adaptive => write!(f, "arc"),
            Policy::Lru => write!(f, "lru"),
        }
    }
}

/// Creates a new store using the given policy which keeps up to **capacity** entries.
///
/// # Errors
/// Fails if the capacity is zero, as such a store couldn't keep anything at all.
pub fn create<V: Clone + Send + 'static>(
    policy: Policy,
    capacity: usize,
) -> anyhow::Result<Box<dyn BoundedStore<V>>> {
    if capacity == 0 {
        return Err(anyhow::anyhow!(
            "Cannot create a store with a capacity of 0. Please provide a positive size."
        ));
    }

    Ok(match policy {
        Policy::Adaptive => Box::new(ArcStore::new(capacity)),
        Policy::Lru => Box::new(LruStore::new(capacity)),
    })
}
