//! # Runtime Configuration
//!
//! All settings come from `WR_*` environment variables; anything unset
//! falls back to [`RuntimeConfig::default`].
//!
//! | Variable | Default |
//! |----------|---------|
//! | `WR_VALIDATORS` | 5 |
//! | `WR_THRESHOLD` | 4 |
//! | `WR_WORKERS` | 2 |
//! | `WR_MESSAGES_PER_WORKER` | 4 |
//! | `WR_OFFLINE_VALIDATORS` | (none) |
//! | `WR_SIGNATURE_CACHE_SIZE` | 500 |
//! | `WR_DATA_DIR` | (in-memory) |
//! | `WR_POLL_INTERVAL_MS` | 50 |
//! | `WR_MAX_POLL_ATTEMPTS` | 20 |
//! | `WR_SESSION_TIMEOUT_SECS` | 30 |
//! | `WR_LOG_LEVEL` | info |
//! | `WR_JSON_LOGS` | false |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use wr_01_signing_backend::DEFAULT_SIGNATURE_CACHE_SIZE;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}")]
    InvalidValue { var: &'static str, value: String },

    #[error("At least one validator is required")]
    NoValidators,

    #[error("Threshold must be at least 1")]
    ZeroThreshold,

    #[error("Threshold {threshold} exceeds validator count {validators}")]
    ThresholdTooHigh { threshold: usize, validators: usize },

    #[error("At least one delivery worker is required")]
    NoWorkers,

    #[error("Offline validator {index} is outside the validator set of {validators}")]
    OfflineOutOfRange { index: u32, validators: usize },

    #[error("Max poll attempts must be at least 1")]
    ZeroPollAttempts,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Devnet runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub validators: usize,
    pub threshold: usize,
    pub workers: usize,
    pub messages_per_worker: usize,
    /// Validator indices whose endpoints are unreachable for the whole run.
    pub offline_validators: Vec<u32>,
    pub signature_cache_size: usize,
    /// RocksDB root directory; in-memory stores when unset.
    pub data_dir: Option<PathBuf>,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    /// Cancel the session if quorum is not reached in time.
    pub session_timeout: Duration,
    pub log: LogConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            validators: 5,
            threshold: 4,
            workers: 2,
            messages_per_worker: 4,
            offline_validators: Vec::new(),
            signature_cache_size: DEFAULT_SIGNATURE_CACHE_SIZE,
            data_dir: None,
            poll_interval: Duration::from_millis(50),
            max_poll_attempts: 20,
            session_timeout: Duration::from_secs(30),
            log: LogConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let offline_validators = match lookup("WR_OFFLINE_VALIDATORS") {
            Some(raw) => parse_index_list(&raw)?,
            None => defaults.offline_validators,
        };

        Ok(Self {
            validators: parse_or(&lookup, "WR_VALIDATORS", defaults.validators)?,
            threshold: parse_or(&lookup, "WR_THRESHOLD", defaults.threshold)?,
            workers: parse_or(&lookup, "WR_WORKERS", defaults.workers)?,
            messages_per_worker: parse_or(
                &lookup,
                "WR_MESSAGES_PER_WORKER",
                defaults.messages_per_worker,
            )?,
            offline_validators,
            signature_cache_size: parse_or(
                &lookup,
                "WR_SIGNATURE_CACHE_SIZE",
                defaults.signature_cache_size,
            )?,
            data_dir: lookup("WR_DATA_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            poll_interval: Duration::from_millis(parse_or(&lookup, "WR_POLL_INTERVAL_MS", 50)?),
            max_poll_attempts: parse_or(&lookup, "WR_MAX_POLL_ATTEMPTS", defaults.max_poll_attempts)?,
            session_timeout: Duration::from_secs(parse_or(&lookup, "WR_SESSION_TIMEOUT_SECS", 30)?),
            log: LogConfig {
                level: lookup("WR_LOG_LEVEL").unwrap_or(defaults.log.level),
                json: lookup("WR_JSON_LOGS")
                    .map(|v| v.to_lowercase() == "true" || v == "1")
                    .unwrap_or(defaults.log.json),
            },
        })
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validators == 0 {
            return Err(ConfigError::NoValidators);
        }
        if self.threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.threshold > self.validators {
            return Err(ConfigError::ThresholdTooHigh {
                threshold: self.threshold,
                validators: self.validators,
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if let Some(&index) = self
            .offline_validators
            .iter()
            .find(|&&i| i as usize >= self.validators)
        {
            return Err(ConfigError::OfflineOutOfRange {
                index,
                validators: self.validators,
            });
        }
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::ZeroPollAttempts);
        }
        Ok(())
    }

    /// Signed messages the delivery workers consume in total.
    pub fn expected_messages(&self) -> usize {
        self.workers * self.messages_per_worker
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        None => Ok(default),
    }
}

fn parse_index_list(raw: &str) -> Result<Vec<u32>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::InvalidValue {
                var: "WR_OFFLINE_VALIDATORS",
                value: raw.to_string(),
            })
        })
        .collect()
}
