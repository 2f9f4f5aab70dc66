/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Configuration for ndframe.
//!
//! Settings come from defaults, environment variables or a YAML file,
//! and a process-wide instance is available through [`global`].

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use std::sync::PoisonError;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;

const DEFAULT_MISSING_REPR: &str = "N/A";
const DEFAULT_MASKED_REPR: &str = "masked";

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text printed for missing elements.
    pub missing_repr: String,
    /// Text printed for masked elements.
    pub masked_repr: String,
    /// Allow assignment to copy positionally when the broadcast of the
    /// right-hand side is trivial.
    pub assign_fast_path: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            missing_repr: DEFAULT_MISSING_REPR.to_string(),
            masked_repr: DEFAULT_MASKED_REPR.to_string(),
            assign_fast_path: true,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables. Unset or
    /// unparsable variables leave the default in place.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = env::var("NDFRAME_MISSING_REPR") {
            config.missing_repr = val;
        }

        if let Ok(val) = env::var("NDFRAME_MASKED_REPR") {
            config.masked_repr = val;
        }

        if let Ok(val) = env::var("NDFRAME_ASSIGN_FAST_PATH") {
            if let Ok(parsed) = val.parse::<bool>() {
                config.assign_fast_path = parsed;
            }
        }

        config
    }

    /// Load configuration from a YAML file. Absent keys take their
    /// default.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), anyhow::Error> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Merge with another configuration. Every key `other` sets to a
    /// non-default value takes precedence.
    ///
    /// A key of `other` equal to its default is indistinguishable from
    /// an unset key and leaves the receiver's value in place. To force
    /// a default back, assign the field directly.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();
        if other.missing_repr != defaults.missing_repr {
            self.missing_repr = other.missing_repr.clone();
        }
        if other.masked_repr != defaults.masked_repr {
            self.masked_repr = other.masked_repr.clone();
        }
        if other.assign_fast_path != defaults.assign_fast_path {
            self.assign_fast_path = other.assign_fast_path;
        }
    }
}

/// The process-wide configuration.
///
/// Tests that change it take [`global::lock`] first, so that they run
/// one at a time, and override through the returned lock:
///
/// ```ignore rust
/// let lock = ndframe::config::global::lock();
/// let _guard = lock.override_config(Config {
///     assign_fast_path: false,
///     ..Config::default()
/// });
/// ```
pub mod global {
    use std::marker::PhantomData;
    use std::sync::Mutex;
    use std::sync::MutexGuard;

    use super::*;

    /// Global configuration instance, initialized from environment variables.
    static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::from_env()));

    /// A snapshot of the global configuration.
    pub fn get() -> Config {
        CONFIG
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the global configuration.
    pub fn set(config: Config) {
        *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    /// Initialize the global configuration from environment variables
    pub fn init_from_env() {
        set(Config::from_env());
    }

    /// Initialize the global configuration from a YAML file
    pub fn init_from_yaml<P: AsRef<Path>>(path: P) -> Result<(), anyhow::Error> {
        set(Config::from_yaml(path)?);
        Ok(())
    }

    /// Reset the global configuration to defaults.
    pub fn reset_to_defaults() {
        set(Config::default());
    }

    /// Acquire the global configuration lock. Overrides are only
    /// available through it.
    pub fn lock() -> ConfigLock {
        static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
        ConfigLock {
            _guard: MUTEX.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Holds the global configuration lock.
    pub struct ConfigLock {
        _guard: MutexGuard<'static, ()>,
    }

    impl ConfigLock {
        /// Install `config` until the returned guard is dropped. The
        /// guard cannot outlive this lock.
        pub fn override_config(&self, config: Config) -> ConfigGuard<'_> {
            let orig = std::mem::replace(
                &mut *CONFIG.write().unwrap_or_else(PoisonError::into_inner),
                config,
            );
            ConfigGuard {
                orig: Some(orig),
                _phantom: PhantomData,
            }
        }
    }

    /// Restores the previous global configuration when dropped.
    pub struct ConfigGuard<'a> {
        orig: Option<Config>,
        _phantom: PhantomData<&'a ()>,
    }

    impl Drop for ConfigGuard<'_> {
        fn drop(&mut self) {
            if let Some(orig) = self.orig.take() {
                set(orig);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.missing_repr, "N/A");
        assert_eq!(config.masked_repr, "masked");
        assert!(config.assign_fast_path);
    }

    #[test]
    fn test_from_env() {
        let _lock = global::lock();
        std::env::set_var("NDFRAME_MISSING_REPR", "NaN");
        std::env::set_var("NDFRAME_ASSIGN_FAST_PATH", "false");

        let config = Config::from_env();
        assert_eq!(config.missing_repr, "NaN");
        assert!(!config.assign_fast_path);
        assert_eq!(config.masked_repr, "masked"); // Default value

        std::env::remove_var("NDFRAME_MISSING_REPR");
        std::env::remove_var("NDFRAME_ASSIGN_FAST_PATH");
    }

    #[test]
    fn test_merge() {
        let mut config1 = Config {
            masked_repr: "--".to_string(),
            ..Config::default()
        };
        let config2 = Config {
            missing_repr: "?".to_string(),
            assign_fast_path: false,
            ..Config::default()
        };
        config1.merge(&config2);
        assert_eq!(config1.missing_repr, "?");
        assert_eq!(config1.masked_repr, "--");
        assert!(!config1.assign_fast_path);

        // A default-valued key does not override.
        config1.merge(&Config::default());
        assert_eq!(config1.missing_repr, "?");
        assert!(!config1.assign_fast_path);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = std::env::temp_dir().join(format!("ndframe-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");

        let config = Config {
            missing_repr: "nan".to_string(),
            ..Config::default()
        };
        config.to_yaml(&path).unwrap();
        assert_eq!(Config::from_yaml(&path).unwrap(), config);

        std::fs::write(&path, "masked_repr: '*'\n").unwrap();
        let partial = Config::from_yaml(&path).unwrap();
        assert_eq!(partial.masked_repr, "*");
        assert_eq!(partial.missing_repr, "N/A");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_global_override() {
        let lock = global::lock();
        global::reset_to_defaults();
        assert_eq!(global::get(), Config::default());

        {
            let _guard = lock.override_config(Config {
                missing_repr: "-".to_string(),
                ..Config::default()
            });
            assert_eq!(global::get().missing_repr, "-");
        }

        assert_eq!(global::get(), Config::default());
    }
}
