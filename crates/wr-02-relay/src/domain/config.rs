//! # Relay Configuration

use crate::domain::errors::RelayError;
use std::time::Duration;

/// Parameters of one aggregation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Distinct shares needed per message (absolute count).
    pub threshold: usize,
    /// Size of the validator set; indices `0..validator_count` are accepted.
    pub validator_count: usize,
    /// Completed messages after which the completion signal fires.
    pub expected_messages: usize,
}

impl AggregatorConfig {
    /// Reject thresholds that can never or trivially be met.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.threshold == 0 {
            return Err(RelayError::ZeroThreshold);
        }
        if self.threshold > self.validator_count {
            return Err(RelayError::ThresholdTooHigh {
                threshold: self.threshold,
                validators: self.validator_count,
            });
        }
        Ok(())
    }
}

/// Re-polling behaviour of a relay client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            max_attempts: 20,
        }
    }
}

/// Shape of the delivery side: `workers` each deliver `messages_per_worker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub workers: usize,
    pub messages_per_worker: usize,
}

impl DeliveryConfig {
    /// Total signed messages the delivery side will consume.
    pub fn expected_messages(&self) -> usize {
        self.workers * self.messages_per_worker
    }
}
