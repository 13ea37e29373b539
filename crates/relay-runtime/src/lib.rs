//! # Warp Relay Runtime
//!
//! Library half of the `relay-runtime` binary.
//!
//! - `config` - `RuntimeConfig` from `WR_*` environment variables
//! - `telemetry` - tracing subscriber setup
//! - `devnet` - in-process validators, relay session and delivery workers

pub mod config;
pub mod devnet;
pub mod telemetry;

pub use config::{ConfigError, LogConfig, RuntimeConfig};
pub use devnet::{DevnetError, DevnetReport};
pub use telemetry::{init_tracing, TelemetryError};
