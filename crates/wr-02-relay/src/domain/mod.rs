//! # Domain Layer
//!
//! Pure aggregation logic: per-message state machine, share combination,
//! configuration and the relay's error taxonomy. No async, no I/O.

pub mod aggregation;
pub mod combine;
pub mod config;
pub mod entities;
pub mod errors;

pub use aggregation::{AggregationArena, MessageAggregation, RecordOutcome};
pub use combine::{combine_shares, verify_signed_message};
pub use config::{AggregatorConfig, ClientConfig, DeliveryConfig};
pub use entities::*;
pub use errors::{AggregationError, EndpointError, RelayError};
