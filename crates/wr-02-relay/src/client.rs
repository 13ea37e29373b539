//! # Relay Client
//!
//! One client per validator endpoint. Reads accepted messages from the
//! endpoint, fetches that validator's share and forwards it to the
//! aggregator.
//!
//! Errors stay inside the client: they are logged, reported on the
//! client's error channel and never reach the aggregator.
//!
//! | Failure | Effect |
//! |---------|--------|
//! | source error | reported, client stops |
//! | share fetch error | reported, next message |
//! | share not yet available | re-polled up to `max_attempts` |

use crate::channel::ShareSender;
use crate::domain::{
    ClientConfig, ClientError, ClientExit, ClientSummary, EndpointError, ShareEvent,
};
use crate::ports::outbound::{MessageSource, SignatureClient};
use shared_types::{MessageId, SignatureShare, ValidatorIndex};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sender half of a session's client error channel.
pub type ClientErrorSender = mpsc::UnboundedSender<ClientError>;

/// Fetches one validator's shares for every accepted message.
pub struct RelayClient {
    cancel: CancellationToken,
    source: Box<dyn MessageSource>,
    signatures: Arc<dyn SignatureClient>,
    shares: ShareSender,
    validator: ValidatorIndex,
    config: ClientConfig,
    errors: ClientErrorSender,
    shares_forwarded: usize,
    errors_reported: usize,
}

impl RelayClient {
    pub fn new(
        cancel: CancellationToken,
        source: Box<dyn MessageSource>,
        signatures: Arc<dyn SignatureClient>,
        shares: ShareSender,
        validator: ValidatorIndex,
        config: ClientConfig,
        errors: ClientErrorSender,
    ) -> Self {
        Self {
            cancel,
            source,
            signatures,
            shares,
            validator,
            config,
            errors,
            shares_forwarded: 0,
            errors_reported: 0,
        }
    }

    pub fn validator(&self) -> ValidatorIndex {
        self.validator
    }

    /// Run until cancelled or the source is exhausted or broken.
    pub async fn run(mut self) -> ClientSummary {
        debug!(validator = %self.validator, "[wr-02] Relay client started");

        let exit = loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break ClientExit::Cancelled,
                next = self.source.next_message() => next,
            };

            let message = match next {
                Ok(Some(message)) => message,
                Ok(None) => break ClientExit::SourceExhausted,
                Err(error) => {
                    self.report(error);
                    break ClientExit::SourceFailed;
                }
            };

            let message_id = message.id();
            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break ClientExit::Cancelled,
                fetched = self.fetch_share(&message_id) => fetched,
            };

            match fetched {
                Ok(share) => {
                    let event = ShareEvent {
                        message_id,
                        validator: self.validator,
                        share,
                    };
                    if self.shares.send(event).is_err() {
                        break ClientExit::ChannelClosed;
                    }
                    self.shares_forwarded += 1;
                }
                Err(error) => self.report(error),
            }
        };

        info!(
            validator = %self.validator,
            shares_forwarded = self.shares_forwarded,
            errors = self.errors_reported,
            exit = ?exit,
            "[wr-02] Relay client stopped"
        );

        ClientSummary {
            validator: self.validator,
            shares_forwarded: self.shares_forwarded,
            errors_reported: self.errors_reported,
            exit,
        }
    }

    /// Poll the endpoint until it yields a share or the attempts run out.
    async fn fetch_share(&self, message_id: &MessageId) -> Result<SignatureShare, EndpointError> {
        let attempts = self.config.max_attempts.max(1);

        for attempt in 1..=attempts {
            match self.signatures.get_signature(message_id).await {
                Ok(Some(share)) => return Ok(share),
                Ok(None) => {
                    debug!(validator = %self.validator, message_id = %message_id, attempt, "[wr-02] Share not available yet");
                }
                Err(error) if error.is_retryable() => {
                    debug!(validator = %self.validator, message_id = %message_id, attempt, error = %error, "[wr-02] Retryable fetch error");
                }
                Err(error) => return Err(error),
            }
            if attempt < attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        Err(EndpointError::SignatureUnavailable {
            id: *message_id,
            attempts,
        })
    }

    fn report(&mut self, error: EndpointError) {
        warn!(validator = %self.validator, error = %error, "[wr-02] Relay client error");
        self.errors_reported += 1;
        // Nobody listening is fine, the summary still counts it
        let _ = self.errors.send(ClientError {
            validator: self.validator,
            error,
        });
    }
}
