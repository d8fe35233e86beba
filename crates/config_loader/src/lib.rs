//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Produce `FlightSyncConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("flight_sync.toml")).unwrap();
//! println!("Anchor: {}", config.anchor_stream);
//! ```

mod parser;
mod validator;

pub use contracts::FlightSyncConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<FlightSyncConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<FlightSyncConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Validate an already constructed configuration
    pub fn validate(config: &FlightSyncConfig) -> Result<(), ContractError> {
        validator::validate(config)
    }

    /// Serialize FlightSyncConfig to TOML string
    pub fn to_toml(config: &FlightSyncConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize FlightSyncConfig to JSON string
    pub fn to_json(config: &FlightSyncConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<FlightSyncConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        tracing::debug!(
            anchor = %config.anchor_stream,
            ordering = ?config.ordering,
            schemas = config.normalize.schemas.len(),
            "configuration loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
anchor_stream = "imu"
ordering = "reject"

[interpolation]
min_samples = 2

[normalize.schemas.event]
text = ["message"]

[normalize.schemas.gps]
numeric = ["lat", "lon", "alt", "vn", "ve", "vd"]

[logging]
format = "compact"
level = "info"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.anchor_stream, "imu");
        assert_eq!(config.normalize.schemas.len(), 2);
    }

    #[test]
    fn test_round_trip_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(config.anchor_stream, config2.anchor_stream);
        assert_eq!(config.normalize.schemas, config2.normalize.schemas);
        assert_eq!(config.normalize.time_keys, config2.normalize.time_keys);
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let config2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.anchor_stream, config2.anchor_stream);
        assert_eq!(config.logging.format, config2.logging.format);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[interpolation]
min_samples = 0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_samples"));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight_sync.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.normalize.schemas["gps"].numeric.len(), 6);
    }

    #[test]
    fn test_load_from_path_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight_sync.yaml");
        std::fs::write(&path, "anchor_stream: imu").unwrap();

        let err = ConfigLoader::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_demo_config_is_valid() {
        let content = include_str!("../../../demos/flight_sync.toml");
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        assert_eq!(config.normalize.time_keys.len(), 2);
        assert!(config.normalize.is_time_key("millis"));
    }

    #[test]
    fn test_load_from_missing_path() {
        let result = ConfigLoader::load_from_path(Path::new("/nonexistent/flight_sync.toml"));
        assert!(matches!(result, Err(ContractError::Io(_))));
    }
}
