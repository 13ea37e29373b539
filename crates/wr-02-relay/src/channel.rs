//! # Share Channel
//!
//! Unbounded, ordered conduit from relay clients to the aggregator. Shares
//! are never dropped for backpressure; the channel closes once every
//! client has released its sender.

use crate::domain::ShareEvent;
use tokio::sync::mpsc;

pub type ShareSender = mpsc::UnboundedSender<ShareEvent>;
pub type ShareReceiver = mpsc::UnboundedReceiver<ShareEvent>;

pub fn share_channel() -> (ShareSender, ShareReceiver) {
    mpsc::unbounded_channel()
}
