//! # WR-02 Warp Relay
//!
//! Collects BLS signature shares for accepted warp messages from every
//! validator endpoint and emits one aggregate signature per message once a
//! threshold of distinct validators signed.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (Ports/Adapters) + single-owner event loop
//!
//! ## Task Layout
//!
//! | Task | Count | Owns |
//! |------|-------|------|
//! | `RelayClient` | one per endpoint | its message source, nothing shared |
//! | `RelayAggregator` | one per session | every message's aggregation state |
//! | delivery worker | `workers` | a nonce sequence |
//!
//! Clients only talk to the aggregator through the unbounded share
//! channel, so the aggregator needs no locks and a failing endpoint can
//! never stall it.
//!
//! ## Guarantees
//!
//! - At most one share per validator per message counts
//! - At most one aggregate per message is emitted
//! - No partial aggregate is ever synthesized
//!
//! ## Module Structure
//!
//! ```text
//! wr-02-relay/
//! ├── domain/        # arena state machine, combine, config, errors
//! ├── ports/         # MessageSource, SignatureClient
//! ├── adapters/      # LocalSignatureClient, ChannelMessageSource
//! ├── channel.rs     # ShareChannel
//! ├── aggregator.rs  # RelayAggregator loop
//! ├── client.rs      # RelayClient
//! ├── session.rs     # RelaySession wiring
//! └── delivery.rs    # DeliverySequence
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod aggregator;
pub mod channel;
pub mod client;
pub mod delivery;
pub mod domain;
pub mod ports;
pub mod session;
pub mod test_utils;

// Re-exports
pub use adapters::{ChannelMessageSource, LocalSignatureClient, MessageFeed};
pub use aggregator::{RelayAggregator, RelayHandle, SignedMessageStream};
pub use channel::{share_channel, ShareReceiver, ShareSender};
pub use client::RelayClient;
pub use delivery::{DeliverySequence, WorkerReport};
pub use domain::*;
pub use ports::{MessageSource, SignatureClient};
pub use session::{RelayEndpoint, RelaySession, RelaySessionBuilder, SessionOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
