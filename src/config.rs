//! Configuration handling for getterguard.
//!
//! Settings live under a `[getterguard]` table in `getterguard.toml`:
//!
//! ```toml
//! [getterguard]
//! accessor_prefix = "Get"
//! generated_marker = "Code generated"
//!
//! [getterguard.markers]
//! reflect = "ProtoReflect"
//! legacy = "ProtoMessage"
//! unsafe_generator = "MarshalToSizedBuffer"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use getterguard_core::GuardError;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "getterguard.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub getterguard: GuardConfig,
}

/// Rule settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Prefix of generated accessor methods.
    #[serde(default = "default_accessor_prefix")]
    pub accessor_prefix: String,

    /// Files with a comment starting with this text are skipped.
    #[serde(default = "default_generated_marker")]
    pub generated_marker: String,

    #[serde(default)]
    pub markers: MarkerConfig,
}

/// Method names that identify generated message families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Present on messages of the current generator.
    #[serde(default = "default_reflect_marker")]
    pub reflect: String,

    /// Present on messages of the legacy generator.
    #[serde(default = "default_legacy_marker")]
    pub legacy: String,

    /// Present on legacy-style messages whose accessors are not nil-safe.
    #[serde(default = "default_unsafe_generator_marker")]
    pub unsafe_generator: String,
}

fn default_accessor_prefix() -> String {
    "Get".to_string()
}

fn default_generated_marker() -> String {
    "Code generated".to_string()
}

fn default_reflect_marker() -> String {
    "ProtoReflect".to_string()
}

fn default_legacy_marker() -> String {
    "ProtoMessage".to_string()
}

fn default_unsafe_generator_marker() -> String {
    "MarshalToSizedBuffer".to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            accessor_prefix: default_accessor_prefix(),
            generated_marker: default_generated_marker(),
            markers: MarkerConfig::default(),
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            reflect: default_reflect_marker(),
            legacy: default_legacy_marker(),
            unsafe_generator: default_unsafe_generator_marker(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, GuardError> {
        let content = fs::read_to_string(path).map_err(|e| GuardError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| GuardError::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `getterguard.toml` from `dir` if present, else defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self, GuardError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Config::default())
        }
    }

    fn validate(&self) -> Result<(), GuardError> {
        let guard = &self.getterguard;
        let required = [
            ("accessor_prefix", &guard.accessor_prefix),
            ("markers.reflect", &guard.markers.reflect),
            ("markers.legacy", &guard.markers.legacy),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(GuardError::Config {
                    message: format!("getterguard.{} must not be empty", key),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.getterguard, GuardConfig::default());
        assert_eq!(config.getterguard.accessor_prefix, "Get");
        assert_eq!(config.getterguard.markers.unsafe_generator, "MarshalToSizedBuffer");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[getterguard]\naccessor_prefix = \"Fetch\"\n\n[getterguard.markers]\nlegacy = \"Message\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().getterguard;
        assert_eq!(config.accessor_prefix, "Fetch");
        assert_eq!(config.generated_marker, "Code generated");
        assert_eq!(config.markers.legacy, "Message");
        assert_eq!(config.markers.reflect, "ProtoReflect");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[getterguard\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, GuardError::Config { .. }));
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "[getterguard]\naccessor_prefix = \"\"\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("accessor_prefix"));
    }
}
