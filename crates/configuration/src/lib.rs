use crate::error::ConfigError;
use config::{Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, DisplaySettings, ImportSettings, LoggingSettings};

/// Looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tradebook.toml";

/// Loads the application configuration.
///
/// An explicit `path` must exist. Without one, `tradebook.toml` is read if present. Environment
/// variables such as `TRADEBOOK__DISPLAY__MAX_ROWS=20` are layered on top of either.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Toml).required(true),
        None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("TRADEBOOK")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{PlatformFormat, ViewMode};
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.import.format.is_none());
        assert_eq!(config.display.view, ViewMode::All);
        assert_eq!(config.display.max_rows, 50);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.directory.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_sections_from_file() {
        let file = write_config(
            r#"
[import]
format = "thinkorswim"

[display]
view = "week"
max_rows = 10

[logging]
level = "debug"
directory = "logs"
"#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.import.format, Some(PlatformFormat::ThinkOrSwim));
        assert_eq!(config.display.view, ViewMode::Week);
        assert_eq!(config.display.max_rows, 10);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory.as_deref(), Some(Path::new("logs")));
        assert_eq!(config.logging.file_prefix, "tradebook.log");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = write_config("[display]\nview = \"month\"\n");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.display.view, ViewMode::Month);
        assert_eq!(config.display.max_rows, 50);
        assert!(config.import.format.is_none());
    }

    #[test]
    fn rejects_zero_rows() {
        let file = write_config("[display]\nmax_rows = 0\n");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_unknown_format_tag() {
        let file = write_config("[import]\nformat = \"metatrader\"\n");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn empty_level_is_invalid() {
        let mut config = Config::default();
        config.logging.level = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
