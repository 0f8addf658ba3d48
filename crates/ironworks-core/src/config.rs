//! Engine configuration, loadable from RON, TOML or JSON.
//!
//! Every field has a default, so an empty file (or `{}`) is a valid
//! configuration. The format is chosen by file extension.

use crate::fixed::{Fixed64, Money};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file has an extension we don't support.
    #[error("unsupported config format: {file}")]
    UnsupportedFormat { file: PathBuf },

    #[error("parse error in {origin}: {detail}")]
    Parse { origin: String, detail: String },

    /// Parsed fine but describes an unusable engine.
    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

pub fn detect_format(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// SimConfig
// ===========================================================================

/// Grid size, starting funds, clock rates and determinism seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub rows: usize,
    pub cols: usize,
    pub starting_balance: Money,
    /// Game seconds per in-game day.
    pub day_length_secs: f64,
    /// Game seconds advanced by one `step_frame`.
    pub frame_secs: f64,
    /// Seeds cosmetic start offsets only.
    pub seed: u64,
    /// Ring buffer capacity per event kind.
    pub event_buffer_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows: 12,
            cols: 21,
            starting_balance: 15_000,
            day_length_secs: 60.0,
            frame_secs: 1.0 / 60.0,
            seed: 0x1A0_5EED,
            event_buffer_capacity: 1024,
        }
    }
}

/// Upper bound on `rows * cols`. The grid is allocated up front.
pub const MAX_CELLS: usize = 1 << 20;

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must have at least one cell, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.rows.checked_mul(self.cols).is_none_or(|cells| cells > MAX_CELLS) {
            return Err(ConfigError::Invalid(format!(
                "grid {}x{} exceeds {MAX_CELLS} cells",
                self.rows, self.cols
            )));
        }
        duration("day_length_secs", self.day_length_secs)?;
        duration("frame_secs", self.frame_secs)?;
        if self.starting_balance < 0 {
            return Err(ConfigError::Invalid(format!(
                "starting_balance must not be negative, got {}",
                self.starting_balance
            )));
        }
        Ok(())
    }

    /// Zero if `day_length_secs` does not pass [`SimConfig::validate`].
    pub fn day_length(&self) -> Fixed64 {
        duration("day_length_secs", self.day_length_secs).unwrap_or(Fixed64::ZERO)
    }

    /// Zero if `frame_secs` does not pass [`SimConfig::validate`].
    pub fn frame_dt(&self) -> Fixed64 {
        duration("frame_secs", self.frame_secs).unwrap_or(Fixed64::ZERO)
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s).map_err(|e| parse_error("ron", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| parse_error("toml", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(|e| parse_error("json", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        let parsed = match format {
            Format::Ron => Self::from_ron_str(&content),
            Format::Toml => Self::from_toml_str(&content),
            Format::Json => Self::from_json_str(&content),
        };
        parsed.map_err(|e| match e {
            ConfigError::Parse { detail, .. } => ConfigError::Parse {
                origin: path.display().to_string(),
                detail,
            },
            other => other,
        })
    }
}

/// A duration must survive conversion to `Fixed64` as a positive value.
/// Anything below the Q32.32 resolution rounds to zero and would stall
/// the clock.
fn duration(field: &str, secs: f64) -> Result<Fixed64, ConfigError> {
    match Fixed64::checked_from_num(secs) {
        Some(v) if secs.is_finite() && v > Fixed64::ZERO => Ok(v),
        _ => Err(ConfigError::Invalid(format!(
            "{field} must be a positive duration representable in game time, got {secs}"
        ))),
    }
}

fn parse_error(origin: &str, e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Parse {
        origin: origin.to_string(),
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_use_defaults() {
        assert_eq!(SimConfig::from_json_str("{}").unwrap(), SimConfig::default());
        assert_eq!(SimConfig::from_toml_str("").unwrap(), SimConfig::default());
        assert_eq!(SimConfig::from_ron_str("()").unwrap(), SimConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = SimConfig::from_toml_str("rows = 3\ncols = 5\nstarting_balance = 1000\n").unwrap();
        assert_eq!(config.rows, 3);
        assert_eq!(config.cols, 5);
        assert_eq!(config.starting_balance, 1000);
        assert_eq!(config.day_length_secs, 60.0);
    }

    #[test]
    fn ron_struct_syntax() {
        let config = SimConfig::from_ron_str("(rows: 4, day_length_secs: 10.0)").unwrap();
        assert_eq!(config.rows, 4);
        assert_eq!(config.day_length(), Fixed64::from_num(10));
    }

    #[test]
    fn zero_sized_grid_is_invalid() {
        let err = SimConfig::from_json_str(r#"{"rows": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_positive_durations_are_invalid() {
        assert!(SimConfig::from_json_str(r#"{"frame_secs": 0.0}"#).is_err());
        assert!(SimConfig::from_json_str(r#"{"day_length_secs": -1.0}"#).is_err());
    }

    #[test]
    fn durations_beyond_fixed_range_are_invalid() {
        for doc in [r#"{"day_length_secs": 1e10}"#, r#"{"frame_secs": 1e10}"#] {
            let err = SimConfig::from_json_str(doc).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{doc}");
        }
    }

    #[test]
    fn sub_resolution_frame_is_invalid() {
        // 1e-12 s is below 2^-32 and would round to a zero-length frame.
        let err = SimConfig::from_json_str(r#"{"frame_secs": 1e-12}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(SimConfig::from_json_str(r#"{"day_length_secs": 1e-12}"#).is_err());
    }

    #[test]
    fn oversized_grid_is_invalid() {
        let huge = format!(r#"{{"rows": {}, "cols": 2}}"#, usize::MAX);
        assert!(matches!(SimConfig::from_json_str(&huge), Err(ConfigError::Invalid(_))));
        let over = SimConfig {
            rows: MAX_CELLS,
            cols: 2,
            ..SimConfig::default()
        };
        assert!(matches!(over.validate(), Err(ConfigError::Invalid(_))));
        let edge = SimConfig {
            rows: MAX_CELLS,
            cols: 1,
            ..SimConfig::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        let err = SimConfig::from_json_str("{rows: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_extension_rejected() {
        let err = SimConfig::load(Path::new("factory.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
    }

    #[test]
    fn load_reads_file_by_extension() {
        let path = std::env::temp_dir().join(format!("ironworks-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"cols": 9}"#).unwrap();
        let config = SimConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.cols, 9);
    }
}
