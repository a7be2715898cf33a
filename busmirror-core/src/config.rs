//! Mirror configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.busmirror/
//!   config.yaml   (optional; defaults apply when absent)
//! ```
//!
//! # API pattern
//!
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::ObjectPath;

/// Service mirrored when nothing else is configured.
pub const DEFAULT_SERVICE: &str = "com.victronenergy.settings";

/// Settings read from `config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Bus service whose object tree is mirrored.
    pub service: String,
    /// Path the tree is built from.
    pub root: ObjectPath,
    /// Fixture file backing the in-memory bus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `busmirror_tree=debug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_owned(),
            root: ObjectPath::root(),
            fixture: None,
            log_filter: None,
        }
    }
}

/// `<home>/.busmirror/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".busmirror").join("config.yaml")
}

/// Load the configuration under `home`, or defaults when no file exists.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<MirrorConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(MirrorConfig::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let mut config: MirrorConfig =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })?;
    // Relative fixture paths are relative to the config directory.
    if let Some(fixture) = config.fixture.take() {
        config.fixture = Some(if fixture.is_relative() {
            home.join(".busmirror").join(fixture)
        } else {
            fixture
        });
    }
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<MirrorConfig, ConfigError> {
    load_at(&home()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
