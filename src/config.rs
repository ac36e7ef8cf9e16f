//! Contains the settings which describe how a cache is to be set up.
//!
//! The settings are read from a YAML document like this:
//! ```yaml
//! cache:
//!     # Specifies the max number of entries to keep.
//!     size: 1024
//!     # Specifies the replacement policy. This is either "arc" (the default) which balances
//!     # recently and frequently used entries, or "lru" which simply evicts the least recently
//!     # used one.
//!     policy: arc
//! ```
//!
//! Use a [Builder](crate::builder::Builder) to create a cache based on these settings.
//!
//! # Examples
//!
//! ```
//! # use memocache::config::Settings;
//! # use memocache::store::Policy;
//! let settings = Settings::parse("
//! cache:
//!     size: 128
//!     policy: lru
//! ").unwrap();
//!
//! assert_eq!(settings.capacity, 128);
//! assert_eq!(settings.policy, Policy::Lru);
//! ```
use std::path::Path;

use anyhow::Context;
use yaml_rust::{Yaml, YamlLoader};

use crate::store::Policy;

/// Describes the setup of a cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Contains the max number of entries to keep.
    pub capacity: usize,

    /// Contains the replacement policy to use.
    pub policy: Policy,
}

impl Settings {
    /// Parses the settings from the given YAML document.
    ///
    /// # Errors
    /// Fails if the document cannot be parsed, if **cache.size** is missing or not a positive
    /// number or if an unknown **cache.policy** is given.
    pub fn parse(data: &str) -> anyhow::Result<Settings> {
        let docs = match YamlLoader::load_from_str(data) {
            Ok(docs) => docs,
            Err(error) => return Err(anyhow::anyhow!("Cannot parse settings: {}", error)),
        };

        let doc = docs.into_iter().next().unwrap_or(Yaml::BadValue);
        let cache = &doc["cache"];

        let capacity = match cache["size"].as_i64() {
            Some(size) if size > 0 => size as usize,
            Some(size) => {
                return Err(anyhow::anyhow!(
                    "Invalid cache size: {}. Please provide a positive number.",
                    size
                ))
            }
            None => {
                return Err(anyhow::anyhow!(
                    "Missing or invalid setting 'cache.size'. Please provide a positive number."
                ))
            }
        };

        let policy = match &cache["policy"] {
            Yaml::BadValue | Yaml::Null => Policy::default(),
            Yaml::String(policy) => policy.parse()?,
            other => {
                return Err(anyhow::anyhow!(
                    "Invalid setting 'cache.policy': {:?}. Expected either 'arc' or 'lru'.",
                    other
                ))
            }
        };

        Ok(Settings { capacity, policy })
    }

    /// Reads and parses the settings from the given file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or if its contents are invalid (see
    /// [parse](Settings::parse)).
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Settings> {
        let path = path.as_ref();
        log::info!("Loading settings from {}...", path.display());

        let data = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot load settings file {}", path.display()))?;

        Settings::parse(data.as_str())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Settings;
    use crate::store::Policy;

    #[test]
    fn the_policy_defaults_to_adaptive() {
        let settings = Settings::parse("cache:\n    size: 42\n").unwrap();
        assert_eq!(settings.capacity, 42);
        assert_eq!(settings.policy, Policy::Adaptive);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        // Missing size...
        assert_eq!(Settings::parse("cache:\n    policy: lru\n").is_err(), true);
        assert_eq!(Settings::parse("").is_err(), true);

        // Zero or negative sizes...
        assert_eq!(Settings::parse("cache:\n    size: 0\n").is_err(), true);
        assert_eq!(Settings::parse("cache:\n    size: -5\n").is_err(), true);

        // Unknown policies...
        assert_eq!(
            Settings::parse("cache:\n    size: 10\n    policy: fifo\n").is_err(),
            true
        );

        // Malformed YAML...
        assert_eq!(Settings::parse("cache: \"size").is_err(), true);
    }

    #[test]
    fn settings_can_be_loaded_from_disk() {
        crate::testing::test_async(async {
            let path = std::env::temp_dir().join("memocache_test_settings.yml");
            tokio::fs::write(&path, "cache:\n    size: 16\n    policy: LRU\n")
                .await
                .unwrap();

            let settings = Settings::load(&path).await.unwrap();
            assert_eq!(settings.capacity, 16);
            assert_eq!(settings.policy, Policy::Lru);

            let _ = tokio::fs::remove_file(&path).await;
        });
    }

    #[test]
    fn missing_files_are_reported() {
        crate::testing::test_async(async {
            let result = Settings::load("/this/path/does/not/exist.yml").await;
            assert_eq!(result.is_err(), true);
        });
    }
}
