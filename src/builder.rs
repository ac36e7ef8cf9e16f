//! Provides a builder which can be used to setup and initialize a cache.
//!
//! Next to the capacity and the replacement policy of the cache, this also permits to initialize
//! the logging system so that all loads and refreshes can be observed.
//!
//! # Example
//! Setting up a cache using a settings file:
//! ```no_run
//! # use memocache::builder::Builder;
//! # use memocache::config::Settings;
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::load("config/settings.yml").await.unwrap();
//!     let cache = Builder::new()
//!         .enable_logging()
//!         .with_settings(&settings)
//!         .build::<String>()
//!         .unwrap();
//! }
//! ```
use crate::cache::Cache;
use crate::config::Settings;
use crate::init_logging;
use crate::store::Policy;

/// Contains the capacity being used if none is specified.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Initializes a cache along with the logging system (if enabled).
///
/// # Example
/// ```
/// # use memocache::builder::Builder;
/// # use memocache::store::Policy;
/// let cache = Builder::new()
///     .capacity(256)
///     .policy(Policy::Lru)
///     .build::<String>()
///     .unwrap();
///
/// assert_eq!(cache.capacity(), 256);
/// assert_eq!(cache.policy(), Policy::Lru);
/// ```
pub struct Builder {
    setup_logging: bool,
    capacity: usize,
    policy: Policy,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    /// Creates a new builder.
    ///
    /// Unless specified otherwise, the cache will keep up to [DEFAULT_CAPACITY](DEFAULT_CAPACITY)
    /// entries using adaptive replacement.
    pub fn new() -> Self {
        Builder {
            setup_logging: false,
            capacity: DEFAULT_CAPACITY,
            policy: Policy::Adaptive,
        }
    }

    /// Enables the automatic setup of the logging system.
    ///
    /// Using this, we properly initialize **simplelog** to log to stdout. The date format being
    /// used is digestible by established tools like **greylog**.
    pub fn enable_logging(mut self) -> Self {
        self.setup_logging = true;
        self
    }

    /// Disables the automatic setup of the logging system.
    pub fn disable_logging(mut self) -> Self {
        self.setup_logging = false;
        self
    }

    /// Specifies the max number of entries to keep.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Specifies the replacement policy to use.
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Applies the capacity and policy as given in the settings.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.capacity = settings.capacity;
        self.policy = settings.policy;
        self
    }

    /// Builds the cache as configured.
    ///
    /// # Errors
    /// Fails if the capacity is zero.
    pub fn build<V: Clone + Send + Sync + 'static>(self) -> anyhow::Result<Cache<V>> {
        if self.setup_logging {
            init_logging();
        }

        let cache = Cache::with_policy(self.capacity, self.policy)?;

        log::info!(
            "||. MEMOCACHE (v {}) keeping up to {} entries using '{}' replacement...",
            env!("CARGO_PKG_VERSION"),
            cache.capacity(),
            cache.policy()
        );

        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::{Builder, DEFAULT_CAPACITY};
    use crate::config::Settings;
    use crate::store::Policy;

    #[test]
    fn defaults_are_applied() {
        let cache = Builder::new().build::<String>().unwrap();
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
        assert_eq!(cache.policy(), Policy::Adaptive);
    }

    #[test]
    fn settings_are_applied() {
        let settings = Settings::parse("cache:\n    size: 8\n    policy: lru\n").unwrap();
        let cache = Builder::new()
            .enable_logging()
            .with_settings(&settings)
            .build::<String>()
            .unwrap();

        assert_eq!(cache.capacity(), 8);
        assert_eq!(cache.policy(), Policy::Lru);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(Builder::new().capacity(0).build::<String>().is_err(), true);
    }
}
