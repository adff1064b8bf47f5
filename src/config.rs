//! Image pipeline configuration.
//!
//! Values default to the thresholds the upload flow has always used and can
//! be overridden through `CHURCHCORE_*` environment variables.

use std::env;

use crate::error::{ConfigError, ConfigResult};

/// Files smaller than this are not re-encoded unless forced (KB).
pub const DEFAULT_SMALL_FILE_THRESHOLD_KB: u64 = 500;

/// After the preset resize, files above this size go through the aggressive ladder.
pub const DEFAULT_AGGRESSIVE_THRESHOLD_BYTES: u64 = 1_992_294; // 1.9 MiB

/// Byte budget handed to the aggressive ladder (KB).
pub const DEFAULT_AGGRESSIVE_BUDGET_KB: u64 = 1800;

/// Upload ceiling used by size-limit checks.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Thresholds for the resize and upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub small_file_threshold_kb: u64,
    pub aggressive_threshold_bytes: u64,
    pub aggressive_budget_kb: u64,
    pub max_upload_bytes: u64,
}

impl PipelineConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> ConfigResult<Self> {
        let config = Self {
            small_file_threshold_kb: parse_env(
                "CHURCHCORE_SMALL_FILE_THRESHOLD_KB",
                DEFAULT_SMALL_FILE_THRESHOLD_KB,
            )?,
            aggressive_threshold_bytes: parse_env(
                "CHURCHCORE_AGGRESSIVE_THRESHOLD_BYTES",
                DEFAULT_AGGRESSIVE_THRESHOLD_BYTES,
            )?,
            aggressive_budget_kb: parse_env(
                "CHURCHCORE_AGGRESSIVE_BUDGET_KB",
                DEFAULT_AGGRESSIVE_BUDGET_KB,
            )?,
            max_upload_bytes: parse_env("CHURCHCORE_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject budgets that would make every upload fail.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.aggressive_budget_kb == 0 {
            return Err(ConfigError::Validation(
                "aggressive budget must be greater than zero".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "max upload size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn small_file_threshold_bytes(&self) -> u64 {
        self.small_file_threshold_kb.saturating_mul(1024)
    }

    pub fn aggressive_budget_bytes(&self) -> u64 {
        self.aggressive_budget_kb.saturating_mul(1024)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            small_file_threshold_kb: DEFAULT_SMALL_FILE_THRESHOLD_KB,
            aggressive_threshold_bytes: DEFAULT_AGGRESSIVE_THRESHOLD_BYTES,
            aggressive_budget_kb: DEFAULT_AGGRESSIVE_BUDGET_KB,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Parse an environment variable, using `default` when it is unset.
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{e}"))),
        Err(_) => Ok(default),
    }
}
