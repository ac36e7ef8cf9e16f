//! Coalesces concurrent computations for the same key.
//!
//! A [Group](Group) keeps track of all computations which are currently running. If another
//! caller asks for a key which is already being computed, it doesn't start any work on its own
//! but rather awaits the result of the running computation. All callers therefore observe the
//! very same outcome, be it a value or an error.
//!
//! Once a computation completes, it is removed from the group. Results are never kept around,
//! therefore the next call for the same key will start a new computation.
//!
//! # Examples
//! ```
//! # use memocache::flight::Group;
//! # #[tokio::main]
//! # async fn main() {
//! let group = Group::new();
//!
//! let value = group.work("answer", async { Ok(42) }).await.unwrap();
//! assert_eq!(value, 42);
//!
//! // Errors are delivered to each waiting caller...
//! let error = group
//!     .work("failure", async { Err::<i32, _>(anyhow::anyhow!("Not found")) })
//!     .await
//!     .unwrap_err();
//! assert_eq!(error.to_string(), "Not found");
//! # }
//! ```
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;

/// Represents the error of a failed computation.
///
/// As the same error has to be delivered to each caller waiting for a computation, the original
/// error is shared via an **Arc**. The message as well as the chain of causes are left untouched,
/// and [downcast_ref](LoadError::downcast_ref) provides access to the original error.
#[derive(Clone)]
pub struct LoadError {
    error: Arc<anyhow::Error>,
}

impl LoadError {
    /// Provides access to the error as reported by the computation.
    pub fn inner(&self) -> &anyhow::Error {
        &self.error
    }

    /// Tries to downcast the original error into the given type.
    ///
    /// # Examples
    /// ```
    /// # use memocache::flight::LoadError;
    /// let error = LoadError::from(anyhow::Error::new(std::fmt::Error));
    /// assert_eq!(error.downcast_ref::<std::fmt::Error>().is_some(), true);
    /// assert_eq!(error.downcast_ref::<std::io::Error>().is_some(), false);
    /// ```
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + Debug + Send + Sync + 'static,
    {
        self.error.downcast_ref::<E>()
    }
}

impl From<anyhow::Error> for LoadError {
    fn from(error: anyhow::Error) -> Self {
        LoadError {
            error: Arc::new(error),
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&*self.error, f)
    }
}

impl Debug for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&*self.error, f)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&**self.error)
    }
}

/// Represents a computation which is shared by all callers of the same key.
type Computation<V> = Shared<BoxFuture<'static, Result<V, LoadError>>>;

/// Keeps track of the computations which are currently in flight.
///
/// A group is a cheap handle which can be cloned. All clones operate on the same set of
/// computations.
pub struct Group<V> {
    computations: Arc<Mutex<HashMap<String, Computation<V>>>>,
}

impl<V> Clone for Group<V> {
    fn clone(&self) -> Self {
        Group {
            computations: self.computations.clone(),
        }
    }
}

impl<V> Default for Group<V> {
    fn default() -> Self {
        Group {
            computations: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> Group<V> {
    /// Creates a new and empty group.
    pub fn new() -> Self {
        Group::default()
    }

    /// Runs the given computation unless another one is already running for the same key.
    ///
    /// If a computation for this key is in flight, the given **work** is dropped without ever
    /// being polled and the result of the running computation is returned instead. Otherwise
    /// **work** is registered for this key and executed.
    ///
    /// Note that the computation is driven by whoever awaits it. If all callers give up, it
    /// remains registered and the next caller for this key resumes it.
    ///
    /// A panic within **work** is reported as [LoadError](LoadError) so that the key is always
    /// released again.
    pub async fn work<F>(&self, key: &str, work: F) -> Result<V, LoadError>
    where
        F: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let computation = {
            let mut computations = self.computations.lock();
            match computations.get(key) {
                Some(computation) => computation.clone(),
                None => {
                    let computation = self.start(key.to_owned(), work);
                    let _ = computations.insert(key.to_owned(), computation.clone());
                    computation
                }
            }
        };

        computation.await
    }

    fn start<F>(&self, key: String, work: F) -> Computation<V>
    where
        F: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let computations = self.computations.clone();

        async move {
            let result = match AssertUnwindSafe(work).catch_unwind().await {
                Ok(result) => result.map_err(LoadError::from),
                Err(_) => {
                    log::error!("The computation for '{}' panicked!", key);
                    Err(LoadError::from(anyhow::anyhow!(
                        "The computation for '{}' panicked!",
                        key
                    )))
                }
            };

            let _ = computations.lock().remove(&key);

            result
        }
        .boxed()
        .shared()
    }

    /// Determines if a computation for the given key is currently in flight.
    pub fn is_running(&self, key: &str) -> bool {
        self.computations.lock().contains_key(key)
    }

    /// Returns the number of computations currently in flight.
    pub fn len(&self) -> usize {
        self.computations.lock().len()
    }

    /// Determines if no computation at all is in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::flight::Group;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn concurrent_callers_share_one_computation() {
        crate::testing::test_async(async {
            let group = Group::new();
            let counter = Arc::new(AtomicUsize::new(0));

            let mut handles = Vec::new();
            for _ in 0..16 {
                let group = group.clone();
                let counter = counter.clone();
                handles.push(tokio::spawn(async move {
                    group
                        .work("key", async move {
                            let _ = counter.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok("value".to_owned())
                        })
                        .await
                }));
            }

            for handle in handles {
                assert_eq!(handle.await.unwrap().unwrap(), "value");
            }

            assert_eq!(counter.load(Ordering::SeqCst), 1);
            assert_eq!(group.is_empty(), true);
        });
    }

    #[test]
    fn errors_are_shared_but_not_kept() {
        crate::testing::test_async(async {
            let group = Group::<String>::new();

            // Start a computation which fails after a while...
            let mut leader = Box::pin(group.work("key", async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err(anyhow::anyhow!("Backend unavailable"))
            }));
            assert_eq!(futures::poll!(&mut leader).is_pending(), true);
            assert_eq!(group.is_running("key"), true);

            // ..a second caller joins it instead of running its own work...
            let follower = group
                .work("key", async { Ok("never computed".to_owned()) })
                .await;
            assert_eq!(follower.unwrap_err().to_string(), "Backend unavailable");
            assert_eq!(leader.await.unwrap_err().to_string(), "Backend unavailable");

            // Once completed, the next call starts a new computation...
            assert_eq!(group.is_running("key"), false);
            let value = group.work("key", async { Ok("ok".to_owned()) }).await;
            assert_eq!(value.unwrap(), "ok");
        });
    }

    #[test]
    fn panics_are_reported_as_errors() {
        crate::testing::test_async(async {
            let group = Group::<String>::new();

            let result = group
                .work("key", async {
                    if group_should_panic() {
                        panic!("Boom");
                    }
                    Ok("unreachable".to_owned())
                })
                .await;
            assert_eq!(result.is_err(), true);
            assert_eq!(group.is_running("key"), false);

            let value = group.work("key", async { Ok("recovered".to_owned()) }).await;
            assert_eq!(value.unwrap(), "recovered");
        });
    }

    fn group_should_panic() -> bool {
        true
    }
}
