//! # Channel Message Source
//!
//! `MessageSource` fed through an in-process channel. The producing side
//! (`MessageFeed`) publishes accepted messages or breaks the subscription.

use crate::domain::EndpointError;
use crate::ports::outbound::MessageSource;
use async_trait::async_trait;
use shared_types::UnsignedMessage;
use tokio::sync::mpsc;

type FeedItem = Result<UnsignedMessage, EndpointError>;

/// Producer half; dropping every clone exhausts the source.
#[derive(Clone)]
pub struct MessageFeed {
    tx: mpsc::UnboundedSender<FeedItem>,
}

impl MessageFeed {
    /// Publish an accepted message. Returns false if the source is gone.
    pub fn publish(&self, message: UnsignedMessage) -> bool {
        self.tx.send(Ok(message)).is_ok()
    }

    /// Break the subscription with `error`.
    pub fn fail(&self, error: EndpointError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }
}

/// Consumer half handed to a relay client.
pub struct ChannelMessageSource {
    rx: mpsc::UnboundedReceiver<FeedItem>,
    failed: bool,
}

impl ChannelMessageSource {
    pub fn channel() -> (MessageFeed, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MessageFeed { tx }, Self { rx, failed: false })
    }
}

#[async_trait]
impl MessageSource for ChannelMessageSource {
    async fn next_message(&mut self) -> Result<Option<UnsignedMessage>, EndpointError> {
        if self.failed {
            return Err(EndpointError::SourceFailed("subscription closed".into()));
        }
        match self.rx.recv().await {
            Some(Ok(message)) => Ok(Some(message)),
            Some(Err(error)) => {
                self.failed = true;
                self.rx.close();
                Err(error)
            }
            None => Ok(None),
        }
    }
}
