//! Configuration schema (rbridge.toml)

use serde::{Deserialize, Serialize};

/// Tokens the foreign side uses to spell "missing" inside text columns
pub const DEFAULT_NA_TOKENS: [&str; 5] = ["nan", "NaN", "NA", "na", ""];

/// Table comparison settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Absolute tolerance for numeric near-equality
    pub float_tol: f64,

    /// Compare row indexes and report `index_mismatch`
    pub check_index: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            float_tol: 1e-8,
            check_index: true,
        }
    }
}

/// Table repair settings; each step can be switched off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Replace the integer NA sentinel with missing
    pub integer_sentinel: bool,

    /// Reinterpret epoch-day numeric columns as dates
    pub epoch_days: bool,

    /// Lower bound (inclusive) for epoch-day detection
    pub epoch_day_min: f64,

    /// Upper bound (inclusive) for epoch-day detection
    pub epoch_day_max: f64,

    /// Drop timezones from datetime columns
    pub strip_timezone: bool,

    /// Replace string NA tokens with missing
    pub string_na: bool,

    /// Renumber a 1-based string index to zero-based positions
    pub renumber_index: bool,

    /// Tokens treated as missing in text columns
    pub na_tokens: Vec<String>,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            integer_sentinel: true,
            epoch_days: true,
            epoch_day_min: 10_000.0,
            epoch_day_max: 40_000.0,
            strip_timezone: true,
            string_na: true,
            renumber_index: true,
            na_tokens: DEFAULT_NA_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Foreign host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Rscript executable
    pub rscript: String,

    /// Activation script, relative to the project directory
    pub activate_script: String,

    /// Lockfile, relative to the project directory
    pub lockfile: String,

    /// Optional environment file, relative to the project directory
    pub renviron: String,

    /// Convert call results to native values by default
    pub auto_convert: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            rscript: "Rscript".to_string(),
            activate_script: "renv/activate.R".to_string(),
            lockfile: "renv.lock".to_string(),
            renviron: ".Renviron".to_string(),
            auto_convert: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Comparison settings
    #[serde(default)]
    pub compare: CompareConfig,

    /// Repair settings
    #[serde(default)]
    pub repair: RepairConfig,

    /// Foreign host settings
    #[serde(default)]
    pub host: HostConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: std::path::PathBuf,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.compare.float_tol, 1e-8);
        assert!(config.compare.check_index);
        assert_eq!(config.repair.na_tokens.len(), 5);
        assert_eq!(config.host.lockfile, "renv.lock");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [compare]
            float_tol = 0.001

            [repair]
            epoch_days = false
            "#,
        )
        .unwrap();

        assert_eq!(config.compare.float_tol, 0.001);
        assert!(config.compare.check_index);
        assert!(!config.repair.epoch_days);
        assert!(config.repair.integer_sentinel);
        assert_eq!(config.host.rscript, "Rscript");
    }

    #[test]
    fn config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rbridge.toml");

        let mut config = Config::default();
        config.compare.float_tol = 0.5;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.compare.float_tol, 0.5);
        assert_eq!(loaded.project_root, dir.path());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::from_toml("[compare\nfloat_tol = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
