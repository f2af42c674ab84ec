//! Layered engine configuration.
//!
//! Defaults < config file < environment < CLI, with each value tracking the
//! source it came from. The interesting part for the query engine is the
//! per-layer field alias table: source layers do not agree on property-name
//! casing, so attribute queries resolve a canonical field through declared
//! variants (or, failing that, casing permutations) once per evaluation.

use crate::error::{GeoqueryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Declared property-name variants, keyed by layer name and then by
/// canonical field name. `candidates("Towns", "name")` yields the variant
/// list to try, in order, against each feature of that layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldAliases(pub HashMap<String, HashMap<String, Vec<String>>>);

impl FieldAliases {
    pub fn candidates(&self, layer: &str, field: &str) -> Option<&[String]> {
        self.0.get(layer).and_then(|t| t.get(field)).map(Vec::as_slice)
    }
}

/// Layered configuration for the query engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default radius for buffer queries, meters.
    pub buffer_radius_m: ConfigValue<f64>,
    /// Radius used by the click-probe query, meters.
    pub probe_radius_m: ConfigValue<f64>,
    /// Default k for nearest queries.
    pub nearest_count: ConfigValue<usize>,
    /// Viewport padding fraction for zoom-fit operations.
    pub fit_padding: ConfigValue<f64>,
    /// Property names tried, in order, when labelling a feature.
    pub name_fields: ConfigValue<Vec<String>>,
    /// Per-layer field alias tables for attribute queries.
    pub field_aliases: ConfigValue<FieldAliases>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            buffer_radius_m: ConfigValue::new(1000.0, ConfigSource::Default),
            probe_radius_m: ConfigValue::new(500.0, ConfigSource::Default),
            nearest_count: ConfigValue::new(3, ConfigSource::Default),
            fit_padding: ConfigValue::new(0.2, ConfigSource::Default),
            name_fields: ConfigValue::new(
                ["Nom", "dept", "arr", "NOM", "name"].map(String::from).to_vec(),
                ConfigSource::Default,
            ),
            field_aliases: ConfigValue::new(FieldAliases::default(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeoqueryError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeoqueryError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(radius) = file_config.buffer_radius_m {
            self.buffer_radius_m.update(radius, ConfigSource::File);
        }

        if let Some(radius) = file_config.probe_radius_m {
            self.probe_radius_m.update(radius, ConfigSource::File);
        }

        if let Some(k) = file_config.nearest_count {
            self.nearest_count.update(k, ConfigSource::File);
        }

        if let Some(padding) = file_config.fit_padding {
            self.fit_padding.update(padding, ConfigSource::File);
        }

        if let Some(fields) = file_config.name_fields {
            self.name_fields.update(fields, ConfigSource::File);
        }

        if let Some(aliases) = file_config.field_aliases {
            self.field_aliases.update(FieldAliases(aliases), ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(raw) = env::var("GEOQUERY_BUFFER_RADIUS_M") {
            match raw.parse::<f64>() {
                Ok(v) => self.buffer_radius_m.update(v, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOQUERY_BUFFER_RADIUS_M value '{}': expected meters",
                    raw
                ),
            }
        }

        if let Ok(raw) = env::var("GEOQUERY_PROBE_RADIUS_M") {
            match raw.parse::<f64>() {
                Ok(v) => self.probe_radius_m.update(v, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOQUERY_PROBE_RADIUS_M value '{}': expected meters",
                    raw
                ),
            }
        }

        if let Ok(raw) = env::var("GEOQUERY_NEAREST_COUNT") {
            match raw.parse::<usize>() {
                Ok(v) => self.nearest_count.update(v, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOQUERY_NEAREST_COUNT value '{}': expected integer",
                    raw
                ),
            }
        }

        if let Ok(raw) = env::var("GEOQUERY_FIT_PADDING") {
            match raw.parse::<f64>() {
                Ok(v) => self.fit_padding.update(v, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOQUERY_FIT_PADDING value '{}': expected fraction",
                    raw
                ),
            }
        }

        if let Ok(raw) = env::var("GEOQUERY_NAME_FIELDS") {
            let fields: Vec<String> =
                raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect();
            if fields.is_empty() {
                tracing::warn!("Invalid GEOQUERY_NAME_FIELDS value '{}': expected field list", raw);
            } else {
                self.name_fields.update(fields, ConfigSource::Environment);
            }
        }

        self
    }

    /// Validate the resolved configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.buffer_radius_m.value > 0.0) {
            return Err(GeoqueryError::ConfigInvalid {
                key: "buffer_radius_m".to_string(),
                reason: "radius must be positive".to_string(),
            });
        }
        if !(self.probe_radius_m.value > 0.0) {
            return Err(GeoqueryError::ConfigInvalid {
                key: "probe_radius_m".to_string(),
                reason: "radius must be positive".to_string(),
            });
        }
        if self.nearest_count.value == 0 {
            return Err(GeoqueryError::ConfigInvalid {
                key: "nearest_count".to_string(),
                reason: "count must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.fit_padding.value) {
            return Err(GeoqueryError::ConfigInvalid {
                key: "fit_padding".to_string(),
                reason: "padding must be a fraction in [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}

/// TOML file shape for [`EngineConfig::load_from_file`].
#[derive(Debug, Deserialize)]
struct FileConfig {
    buffer_radius_m: Option<f64>,
    probe_radius_m: Option<f64>,
    nearest_count: Option<usize>,
    fit_padding: Option<f64>,
    name_fields: Option<Vec<String>>,
    field_aliases: Option<HashMap<String, HashMap<String, Vec<String>>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::with_defaults();
        assert_eq!(config.buffer_radius_m.value, 1000.0);
        assert_eq!(config.probe_radius_m.value, 500.0);
        assert_eq!(config.nearest_count.value, 3);
        assert_eq!(config.name_fields.value[0], "Nom");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
buffer_radius_m = 2500.0
nearest_count = 5

[field_aliases.Towns]
name = ["Nom", "NOM", "nom"]
"#
        )
        .unwrap();

        let config =
            EngineConfig::with_defaults().load_from_file(file.path()).unwrap();
        assert_eq!(config.buffer_radius_m.value, 2500.0);
        assert_eq!(config.buffer_radius_m.source, ConfigSource::File);
        assert_eq!(config.nearest_count.value, 5);
        // Untouched values keep their defaults.
        assert_eq!(config.probe_radius_m.source, ConfigSource::Default);

        let candidates = config.field_aliases.value.candidates("Towns", "name").unwrap();
        assert_eq!(candidates, ["Nom", "NOM", "nom"]);
        assert!(config.field_aliases.value.candidates("Roads", "name").is_none());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "buffer_radius_m = 2500.0").unwrap();

        env::set_var("GEOQUERY_BUFFER_RADIUS_M", "750");
        let config = EngineConfig::with_defaults()
            .load_from_file(file.path())
            .unwrap()
            .load_from_env();
        env::remove_var("GEOQUERY_BUFFER_RADIUS_M");

        assert_eq!(config.buffer_radius_m.value, 750.0);
        assert_eq!(config.buffer_radius_m.source, ConfigSource::Environment);
    }

    #[test]
    #[serial]
    fn test_invalid_env_value_is_ignored() {
        env::set_var("GEOQUERY_NEAREST_COUNT", "many");
        let config = EngineConfig::with_defaults().load_from_env();
        env::remove_var("GEOQUERY_NEAREST_COUNT");

        assert_eq!(config.nearest_count.value, 3);
        assert_eq!(config.nearest_count.source, ConfigSource::Default);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::with_defaults();
        config.fit_padding.update(1.5, ConfigSource::Cli);
        assert!(config.validate().is_err());
    }
}
