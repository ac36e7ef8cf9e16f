//! Memocache is a library which provides an in-process memoizing cache for values which are
//! expensive to compute.
//!
//! # Introduction
//! Many services have to provide data which is kind of hard to obtain. It might require a costly
//! computation, a query against a slow backend or a call to a remote service. Still, this data
//! doesn't change all too often, so caching it for a while is perfectly fine.
//!
//! **Memocache** wraps these computations (**loaders**) and keeps their results in a size
//! constrained store, along with a TTL which determines how long a value is considered **fresh**.
//! It also ensures that a loader for a given key runs only once at a time, no matter how many
//! callers request the value concurrently. Therefore a backend isn't flooded with identical
//! requests once a popular entry expires.
//!
//! # Features
//! * **Request coalescing** - all callers asking for a key which is currently being loaded await
//!   the very same computation and receive its value or its error. See [flight].
//! * **Stale-while-revalidate** - if desired, a stale value is delivered right away while a
//!   refresh runs in the background. See [cache].
//! * **Adaptive replacement** - the store balances recently and frequently used entries and
//!   therefore keeps its "hot" entries even when a bunch of keys is only read once. A plain LRU
//!   policy is available as well. See [store].
//! * **100% Async/Await** - everything builds upon [tokio](https://tokio.rs/) and async/await
//!   primitives as provided by Rust.
//!
//! # Examples
//! A short example on how to set up a cache can be found here [Builder](builder::Builder).
//!
//! ```
//! # use memocache::cache::Cache;
//! # use std::time::Duration;
//! # #[tokio::main]
//! # async fn main() {
//! let cache = Cache::new(1024).unwrap();
//!
//! let value = cache
//!     .get("answer", || async { Ok(42) }, Duration::from_secs(15 * 60), true)
//!     .await
//!     .unwrap();
//! assert_eq!(value, 42);
//! # }
//! ```
#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_results
)]
use simplelog::{format_description, ConfigBuilder, LevelFilter, SimpleLogger};
use std::sync::Once;

pub mod builder;
pub mod cache;
pub mod config;
pub mod flight;
pub mod fmt;
pub mod store;

pub use cache::Cache;
pub use flight::LoadError;
pub use store::Policy;

/// Initializes the logging system.
///
/// Note that most probably the simplest way is to use a [Builder](builder::Builder) to set up a
/// cache, which will also set up logging if enabled.
pub fn init_logging() {
    static INIT_LOGGING: Once = Once::new();

    // We need to do this as otherwise the tests might crash as the logging system
    // is initialized several times...
    INIT_LOGGING.call_once(|| {
        if let Err(error) = SimpleLogger::init(
            LevelFilter::Debug,
            ConfigBuilder::new()
                .set_time_format_custom(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
                ))
                .set_thread_level(LevelFilter::Trace)
                .set_target_level(LevelFilter::Error)
                .set_location_level(LevelFilter::Trace)
                .build(),
        ) {
            log::warn!("Failed to initialize logging system: {}", error);
        }
    });
}

/// Provides a simple macro to execute an async lambda within `tokio::spawn`.
///
/// Note that this also applies std::mem::drop on the returned closure to make
/// clippy happy.
///
/// # Example
/// ```rust
/// # #[macro_use] extern crate memocache;
/// # #[tokio::main]
/// # async fn main() {
/// spawn!(async move {
///     // perform some async stuff here...
/// });
/// # }
/// ```
#[macro_export]
macro_rules! spawn {
    ($e:expr) => {{
        std::mem::drop(tokio::spawn($e));
    }};
}

#[cfg(test)]
mod testing {
    /// Executes async code within a single threaded tokio runtime.
    pub fn test_async<F: std::future::Future>(future: F) {
        use tokio::runtime;

        let rt = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let _ = rt.block_on(future);
    }
}
