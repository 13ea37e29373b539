//! # Relay Aggregator
//!
//! Single consumption loop over the share channel. It owns the
//! `AggregationArena`, so every state mutation is serialized without
//! locks.
//!
//! ## Outputs
//!
//! | Output | Type | Fires |
//! |--------|------|-------|
//! | signed messages | `mpsc` of `SignedMessage` | once per message reaching threshold |
//! | completion | `watch<bool>` | when `expected_messages` messages are complete |
//! | report | `JoinHandle<SessionReport>` | when the loop exits |
//!
//! ## Shutdown
//!
//! The loop exits when the share channel closes or the cancellation token
//! fires. On cancellation the channel is closed and already-queued shares
//! are still applied before the report is produced.

use crate::channel::ShareReceiver;
use crate::domain::{
    AggregationArena, AggregatorConfig, RecordOutcome, RelayError, SessionReport, ShareEvent,
    SignedMessage,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace, warn, Instrument, Span};

/// Quorum-signed messages in emission order.
pub type SignedMessageStream = mpsc::UnboundedReceiver<SignedMessage>;

/// Handle on a running aggregator.
pub struct RelayHandle {
    signed_messages: Option<SignedMessageStream>,
    completed: watch::Receiver<bool>,
    join: JoinHandle<SessionReport>,
}

impl RelayHandle {
    /// Take the signed-message stream. Returns `None` after the first call.
    pub fn take_signed_messages(&mut self) -> Option<SignedMessageStream> {
        self.signed_messages.take()
    }

    /// Watch on the completion signal.
    pub fn completion(&self) -> watch::Receiver<bool> {
        self.completed.clone()
    }

    /// Wait until the expected number of messages completed.
    ///
    /// Returns `false` if the aggregator exited first.
    pub async fn completed(&self) -> bool {
        let mut completion = self.completed.clone();
        let completed = completion.wait_for(|done| *done).await.is_ok();
        completed
    }

    /// Wait for the loop to exit and return its report.
    pub async fn join(self) -> Result<SessionReport, RelayError> {
        self.join
            .await
            .map_err(|e| RelayError::TaskFailed(e.to_string()))
    }
}

/// Entry point for starting the aggregation loop.
pub struct RelayAggregator;

impl RelayAggregator {
    /// Validate `config` and spawn the loop on the current runtime, inside the
    /// caller's current span.
    pub fn spawn(
        cancel: CancellationToken,
        config: AggregatorConfig,
        shares: ShareReceiver,
    ) -> Result<RelayHandle, RelayError> {
        let (aggregator, handle) = AggregatorLoop::new(cancel, config, shares)?;
        Ok(handle.attach(tokio::spawn(aggregator.run().instrument(Span::current()))))
    }

    /// Like [`RelayAggregator::spawn`], tracked by `tracker`.
    pub fn spawn_tracked(
        tracker: &TaskTracker,
        cancel: CancellationToken,
        config: AggregatorConfig,
        shares: ShareReceiver,
    ) -> Result<RelayHandle, RelayError> {
        let (aggregator, handle) = AggregatorLoop::new(cancel, config, shares)?;
        Ok(handle.attach(tracker.spawn(aggregator.run().instrument(Span::current()))))
    }
}

struct PendingHandle {
    signed_messages: SignedMessageStream,
    completed: watch::Receiver<bool>,
}

impl PendingHandle {
    fn attach(self, join: JoinHandle<SessionReport>) -> RelayHandle {
        RelayHandle {
            signed_messages: Some(self.signed_messages),
            completed: self.completed,
            join,
        }
    }
}

struct AggregatorLoop {
    cancel: CancellationToken,
    config: AggregatorConfig,
    shares: ShareReceiver,
    arena: AggregationArena,
    output: mpsc::UnboundedSender<SignedMessage>,
    completed: watch::Sender<bool>,
}

impl AggregatorLoop {
    fn new(
        cancel: CancellationToken,
        config: AggregatorConfig,
        shares: ShareReceiver,
    ) -> Result<(Self, PendingHandle), RelayError> {
        config.validate()?;

        let (output, signed_messages) = mpsc::unbounded_channel();
        let (completed, completed_rx) = watch::channel(false);
        let aggregator = Self {
            cancel,
            config,
            shares,
            arena: AggregationArena::new(&config),
            output,
            completed,
        };
        Ok((
            aggregator,
            PendingHandle {
                signed_messages,
                completed: completed_rx,
            },
        ))
    }

    async fn run(mut self) -> SessionReport {
        info!(
            threshold = self.config.threshold,
            validators = self.config.validator_count,
            expected_messages = self.config.expected_messages,
            "[wr-02] Aggregator started"
        );
        self.check_completion();

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("[wr-02] Aggregator cancelled, draining queued shares");
                    break;
                }
                event = self.shares.recv() => match event {
                    Some(event) => self.handle(event),
                    None => {
                        debug!("[wr-02] Share channel closed");
                        break;
                    }
                }
            }
        }

        self.shares.close();
        while let Ok(event) = self.shares.try_recv() {
            self.handle(event);
        }

        let report = self.arena.report();
        if report.completed.len() != self.config.expected_messages {
            warn!(
                completed = report.completed.len(),
                expected = self.config.expected_messages,
                "[wr-02] Completed message count differs from expected"
            );
        }
        info!(
            completed = report.completed.len(),
            collecting = report.collecting.len(),
            failed = report.failed.len(),
            "[wr-02] Aggregator stopped"
        );
        report
    }

    fn handle(&mut self, event: ShareEvent) {
        let message_id = event.message_id;
        let validator = event.validator;

        match self.arena.record(event) {
            RecordOutcome::Recorded { count } => {
                trace!(message_id = %message_id, validator = %validator, count, "[wr-02] Share recorded");
            }
            RecordOutcome::QuorumReached(signed) => {
                info!(
                    message_id = %message_id,
                    signers = signed.signer_count(),
                    "[wr-02] Quorum reached, aggregate emitted"
                );
                if self.output.send(signed).is_err() {
                    debug!(message_id = %message_id, "[wr-02] No consumer for signed message");
                }
                self.check_completion();
            }
            RecordOutcome::CombineFailed(error) => {
                warn!(message_id = %message_id, error = %error, "[wr-02] Aggregation failed");
            }
            RecordOutcome::Duplicate => {
                debug!(message_id = %message_id, validator = %validator, "[wr-02] Duplicate share discarded");
            }
            RecordOutcome::OutOfSet => {
                warn!(
                    message_id = %message_id,
                    validator = %validator,
                    validators = self.config.validator_count,
                    "[wr-02] Share from validator outside the set discarded"
                );
            }
            RecordOutcome::Terminal => {
                trace!(message_id = %message_id, validator = %validator, "[wr-02] Late share discarded");
            }
        }
    }

    fn check_completion(&self) {
        if *self.completed.borrow() {
            return;
        }
        if self.arena.completed_count() >= self.config.expected_messages {
            info!(
                completed = self.arena.completed_count(),
                "[wr-02] All expected messages signed"
            );
            self.completed.send_replace(true);
        }
    }
}
