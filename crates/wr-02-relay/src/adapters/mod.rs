//! # Adapters
//!
//! In-process implementations of the relay's outbound ports.

pub mod local_client;
pub mod message_feed;

pub use local_client::LocalSignatureClient;
pub use message_feed::{ChannelMessageSource, MessageFeed};
