//! # Delivery Sequence
//!
//! Consumer side of a relay session. `workers` independent delivery
//! workers share the signed-message stream; each owns a sending key with
//! its own nonce sequence and turns every signed message it takes into an
//! outbound transaction slot.
//!
//! Each worker stops after `messages_per_worker` deliveries, when the
//! stream closes, or on cancellation. Nonces are consecutive per worker,
//! starting at the worker's starting nonce.

use crate::aggregator::SignedMessageStream;
use crate::domain::{DeliveryConfig, OutboundDelivery, RelayError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

/// Deliveries made by one worker, in nonce order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub deliveries: Vec<OutboundDelivery>,
}

pub struct DeliverySequence {
    cancel: CancellationToken,
    config: DeliveryConfig,
    starting_nonces: Vec<u64>,
}

impl DeliverySequence {
    /// `starting_nonces[i]` is the next unused nonce of worker `i`'s key.
    pub fn new(
        cancel: CancellationToken,
        config: DeliveryConfig,
        starting_nonces: Vec<u64>,
    ) -> Result<Self, RelayError> {
        if config.workers == 0 {
            return Err(RelayError::NoWorkers);
        }
        if starting_nonces.len() != config.workers {
            return Err(RelayError::NonceCountMismatch {
                workers: config.workers,
                nonces: starting_nonces.len(),
            });
        }
        Ok(Self {
            cancel,
            config,
            starting_nonces,
        })
    }

    /// Signed messages this sequence will consume.
    pub fn expected_messages(&self) -> usize {
        self.config.expected_messages()
    }

    /// Run every worker to completion.
    pub async fn run(self, signed: SignedMessageStream) -> Result<Vec<WorkerReport>, RelayError> {
        let stream = Arc::new(Mutex::new(signed));
        let tracker = TaskTracker::new();

        let handles: Vec<_> = self
            .starting_nonces
            .iter()
            .enumerate()
            .map(|(worker, &nonce)| {
                tracker.spawn(run_worker(
                    worker,
                    nonce,
                    self.config.messages_per_worker,
                    stream.clone(),
                    self.cancel.clone(),
                ))
            })
            .collect();
        tracker.close();

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            reports.push(
                handle
                    .await
                    .map_err(|e| RelayError::TaskFailed(e.to_string()))?,
            );
        }
        tracker.wait().await;

        let delivered: usize = reports.iter().map(|r| r.deliveries.len()).sum();
        info!(
            workers = reports.len(),
            delivered,
            expected = self.expected_messages(),
            "[wr-02] Delivery sequence finished"
        );
        Ok(reports)
    }
}

async fn run_worker(
    worker: usize,
    starting_nonce: u64,
    quota: usize,
    stream: Arc<Mutex<SignedMessageStream>>,
    cancel: CancellationToken,
) -> WorkerReport {
    let mut deliveries = Vec::with_capacity(quota);
    let mut nonce = starting_nonce;

    while deliveries.len() < quota {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = async { stream.lock().await.recv().await } => next,
        };
        let Some(signed) = next else {
            break;
        };

        debug!(worker, nonce, message_id = %signed.message_id, "[wr-02] Signed message assigned");
        deliveries.push(OutboundDelivery {
            worker,
            nonce,
            message_id: signed.message_id,
            signature: signed.signature,
            signers: signed.signers,
        });
        nonce += 1;
    }

    WorkerReport { worker, deliveries }
}
