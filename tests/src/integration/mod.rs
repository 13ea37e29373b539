//! # Integration Scenarios
//!
//! Cross-crate tests wiring real signing backends to relay sessions.

pub mod backend_restart;
pub mod fixtures;
pub mod relay_flows;
pub mod runtime_devnet;
