//! Provides a memoizing cache which computes missing or stale values on demand.
//!
//! The idea is quite simple: Imagine the cache stores data which is kind of hard to compute
//! (takes some time), but we still want to refresh the contents from time to time. Therefore each
//! call to [Cache::get](Cache::get) provides a **loader** along with the key. If a fresh value is
//! present, it is returned right away. Otherwise the loader is invoked and its result is stored
//! along with an expiry timestamp (as determined by the given **ttl**).
//!
//! As we most probably serve many callers at the same time, we do not want each of them to run
//! the computation in parallel. Therefore, while a value is being loaded, all other callers for the
//! same key wait for this computation and receive its result (or its error).
//!
//! For data where using stale (or potentially stale) values doesn't lead to disaster, a stale entry
//! can also be delivered right away, while a refresh runs in the background (pass **true** as
//! **background_update**). This leads to super fast response times along with a nice way of
//! keeping the cache up to date by still using relatively short TTLs. Again, only one background
//! refresh per key is running at any given time.
//!
//! Note that errors are never cached. A failed load leaves the cache untouched, therefore a stale
//! value remains available until a refresh succeeds.
//!
//! # Examples
//! ```
//! # use memocache::cache::Cache;
//! # use std::time::Duration;
//! # #[tokio::main]
//! # async fn main() {
//! let cache = Cache::new(128).unwrap();
//!
//! // The first call computes the value...
//! let value = cache
//!     .get("greeting", || async { Ok("Hello".to_owned()) }, Duration::from_secs(60), false)
//!     .await
//!     .unwrap();
//! assert_eq!(value, "Hello");
//!
//! // ..all subsequent calls within the next 60s are served from the cache.
//! let value = cache
//!     .get("greeting", || async { Ok("World".to_owned()) }, Duration::from_secs(60), false)
//!     .await
//!     .unwrap();
//! assert_eq!(value, "Hello");
//! # }
//! ```
#[cfg(test)]
use mock_instant::thread_local::Instant;
#[cfg(not(test))]
use std::time::Instant;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::flight::{Group, LoadError};
use crate::fmt::format_duration;
use crate::spawn;
use crate::store::{BoundedStore, Policy};

/// Represents the materialized state of a single key.
///
/// An entry is never modified. A successful (re)load always creates a new entry which then
/// replaces the previous one as a whole.
///
/// We keep the load timestamp along with the TTL instead of an expiry timestamp, as any TTL
/// (up to **Duration::MAX**) is valid and must not overflow the clock.
struct Entry<V> {
    value: V,
    loaded_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Entry {
            value,
            loaded_at: Instant::now(),
            ttl,
        }
    }

    fn is_fresh(&self) -> bool {
        self.loaded_at.elapsed() < self.ttl
    }
}

/// We store entries as Arc so that readers can keep an entry while it is being replaced.
type Entries<V> = Arc<dyn BoundedStore<Arc<Entry<V>>>>;

/// Provides a size constrained and memoizing cache.
///
/// A cache can be shared across tasks and threads (e.g. by putting it into an **Arc**) without any
/// further synchronization.
///
/// # Examples
/// ```
/// # use memocache::cache::Cache;
/// # use std::time::Duration;
/// # #[tokio::main]
/// # async fn main() {
/// let cache = Cache::new(16).unwrap();
///
/// // A failing loader yields an error...
/// let result = cache
///     .get("key", || async { Err::<String, _>(anyhow::anyhow!("Not found")) }, Duration::from_secs(1), false)
///     .await;
/// assert_eq!(result.unwrap_err().to_string(), "Not found");
///
/// // ..which is not cached, therefore the next call invokes its loader.
/// let result = cache
///     .get("key", || async { Ok("Found".to_owned()) }, Duration::from_secs(1), false)
///     .await;
/// assert_eq!(result.unwrap(), "Found");
/// # }
/// ```
pub struct Cache<V> {
    policy: Policy,
    entries: Entries<V>,
    loads: Group<V>,
    refreshes: Group<V>,
}

impl<V: Clone + Send + Sync + 'static> Cache<V> {
    /// Creates a new cache which keeps up to **capacity** entries using adaptive replacement.
    ///
    /// # Errors
    /// Fails if the capacity is zero.
    pub fn new(capacity: usize) -> anyhow::Result<Self> {
        Cache::with_policy(capacity, Policy::Adaptive)
    }

    /// Creates a new cache which keeps up to **capacity** entries using the given replacement
    /// policy.
    ///
    /// # Errors
    /// Fails if the capacity is zero.
    pub fn with_policy(capacity: usize, policy: Policy) -> anyhow::Result<Self> {
        let entries: Entries<V> = Arc::from(crate::store::create::<Arc<Entry<V>>>(policy, capacity)?);

        Ok(Cache {
            policy,
            entries,
            loads: Group::new(),
            refreshes: Group::new(),
        })
    }

    /// Returns the value for the given key, invoking the **loader** if required.
    ///
    /// * If no entry is present, the loader is invoked and its value is stored so that it is
    ///   considered fresh for the given **ttl**.
    /// * If a fresh entry is present, its value is returned and the loader is not invoked at all.
    /// * If a stale entry is present and **background_update** is **false**, the loader is invoked
    ///   and the caller waits for its result, just like when no entry is present.
    /// * If a stale entry is present and **background_update** is **true**, the stale value is
    ///   returned immediately and the loader is executed in a background task. Its result will
    ///   be visible to subsequent calls once it completes.
    ///
    /// Note that a **ttl** of zero makes the value stale right away, therefore the next call will
    /// trigger a reload.
    ///
    /// While a value is being loaded, all other calls for the same key await this computation and
    /// return its result instead of invoking their own loader.
    ///
    /// # Errors
    /// Returns the error of the loader (or the error of the load being awaited). In this case the
    /// cache remains unchanged. Errors of background refreshes are only logged.
    pub async fn get<F, Fut>(
        &self,
        key: &str,
        loader: F,
        ttl: Duration,
        background_update: bool,
    ) -> Result<V, LoadError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let entries = self.entries.clone();
        let refreshes = self.refreshes.clone();
        let owned_key = key.to_owned();

        self.loads
            .work(key, async move {
                match entries.get(&owned_key) {
                    Some(entry) if entry.is_fresh() => Ok(entry.value.clone()),
                    Some(entry) if background_update => {
                        refresh_in_background(entries, refreshes, owned_key, loader, ttl);
                        Ok(entry.value.clone())
                    }
                    _ => load(entries.as_ref(), owned_key, loader, ttl).await,
                }
            })
            .await
    }

    /// Removes the entry for the given key.
    ///
    /// The next call to [get](Cache::get) for this key will invoke its loader.
    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Removes all entries of this cache.
    pub fn clean(&self) {
        log::debug!("Cleaning cache ({} entries)...", self.entries.len());
        self.entries.purge();
    }

    /// Returns the number of entries in the cache (including stale ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Determines if the cache is completely empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the overall capacity (max number of entries) of this cache.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Returns the replacement policy used by this cache.
    pub fn policy(&self) -> Policy {
        self.policy
    }
}

/// Invokes the loader and stores its value.
///
/// Note that the expiry is computed once the loader has completed.
async fn load<V, F, Fut>(
    entries: &dyn BoundedStore<Arc<Entry<V>>>,
    key: String,
    loader: F,
    ttl: Duration,
) -> anyhow::Result<V>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<V>>,
{
    log::debug!("Loading '{}'...", key);
    let value = loader().await?;

    log::debug!(
        "Loaded '{}', which remains fresh for {}.",
        key,
        format_duration(ttl)
    );
    let _ = entries.add(key, Arc::new(Entry::new(value.clone(), ttl)));

    Ok(value)
}

/// Forks a task which reloads the given key.
///
/// If a refresh for this key is already running, we do not start another one. As nobody waits for
/// the outcome, errors are only logged.
fn refresh_in_background<V, F, Fut>(
    entries: Entries<V>,
    refreshes: Group<V>,
    key: String,
    loader: F,
    ttl: Duration,
) where
    V: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
{
    // Only a shortcut to skip spawning a task. Refreshes which pass this check concurrently are
    // still coalesced by the group...
    if refreshes.is_running(&key) {
        return;
    }

    spawn!(async move {
        let work = {
            let key = key.clone();
            async move { load(entries.as_ref(), key, loader, ttl).await }
        };

        if let Err(error) = refreshes.work(&key, work).await {
            log::warn!("Failed to refresh '{}' in the background: {}", key, error);
        }
    });
}
