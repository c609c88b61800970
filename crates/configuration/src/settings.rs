use crate::error::ConfigError;
use core_types::{PlatformFormat, ViewMode};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so running without a config file is fine.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub import: ImportSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Config {
    /// Checks invariants the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.max_rows == 0 {
            return Err(ConfigError::ValidationError(
                "display.max_rows must be greater than zero".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Contains parameters for reading export files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportSettings {
    /// Format to fall back to when an export cannot be recognized.
    /// When unset, the user is asked to choose.
    #[serde(default)]
    pub format: Option<PlatformFormat>,
}

/// Contains parameters for rendering reports.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplaySettings {
    /// The view shown when none is requested on the command line.
    #[serde(default)]
    pub view: ViewMode,
    /// Upper bound on the number of trade rows printed.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            view: ViewMode::default(),
            max_rows: default_max_rows(),
        }
    }
}

fn default_max_rows() -> usize {
    50
}

/// Contains parameters for the tracing subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `importers=debug`.
    #[serde(default = "default_level")]
    pub level: String,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "tradebook.log".to_string()
}
