//! Layered settings: defaults, then `tessera.toml` (or `--config`), then
//! `TESSERA_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tessera::{calendar::CalendarConfig, engine::EngineConfig};

/// Settings of one CLI invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// SQLite database file.
    pub(crate) database: PathBuf,
    /// Default log filter when `RUST_LOG` is unset.
    pub(crate) log_level: String,
    /// Calendar bounds.
    pub(crate) calendar: CalendarConfig,
    /// Kernel options.
    pub(crate) engine: EngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("tessera.db"),
            log_level: "info".to_string(),
            calendar: CalendarConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `path` must exist; the default
    /// `tessera.toml` is optional.
    ///
    /// Nested keys are separated by a double underscore in the environment,
    /// e.g. `TESSERA_ENGINE__ANNUALIZATION=12`.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path),
            None => config::File::with_name("tessera").required(false),
        };
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("TESSERA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
