//! # Aggregation Arena
//!
//! Per-message state machine owned by the aggregator loop.
//!
//! ```text
//! (pending) --first share--> Collecting --threshold reached--> Complete
//!                                 |
//!                                 +--combine failed--> Failed
//! ```
//!
//! `Pending` is implicit: a message has no entry until its first accepted
//! share. Both terminal states swallow every later share.
//!
//! The arena is only ever mutated from one task, so it holds no locks.

use crate::domain::combine::combine_shares;
use crate::domain::config::AggregatorConfig;
use crate::domain::entities::{
    CollectingMessage, FailedMessage, SessionReport, ShareEvent, SignedMessage,
};
use crate::domain::errors::AggregationError;
use shared_types::{MessageId, SignatureShare, ValidatorIndex};
use std::collections::{BTreeMap, HashMap};

/// Aggregation state of one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageAggregation {
    /// Below threshold; at most one share per validator.
    Collecting(BTreeMap<ValidatorIndex, SignatureShare>),
    /// Aggregate emitted.
    Complete,
    /// Shares could not be combined.
    Failed(AggregationError),
}

impl MessageAggregation {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MessageAggregation::Collecting(_))
    }
}

/// What happened to a single share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Share stored; `count` distinct shares so far.
    Recorded { count: usize },
    /// This share completed the quorum.
    QuorumReached(SignedMessage),
    /// This share completed the quorum but combining failed.
    CombineFailed(AggregationError),
    /// The validator already contributed to this message.
    Duplicate,
    /// The validator index is outside the configured set.
    OutOfSet,
    /// The message is already complete or failed.
    Terminal,
}

/// All per-message aggregation state of a relay session.
pub struct AggregationArena {
    threshold: usize,
    validator_count: usize,
    messages: HashMap<MessageId, MessageAggregation>,
    completed: Vec<MessageId>,
}

impl AggregationArena {
    pub fn new(config: &AggregatorConfig) -> Self {
        Self {
            threshold: config.threshold,
            validator_count: config.validator_count,
            messages: HashMap::new(),
            completed: Vec::new(),
        }
    }

    /// Apply one share event.
    pub fn record(&mut self, event: ShareEvent) -> RecordOutcome {
        if event.validator.as_usize() >= self.validator_count {
            return RecordOutcome::OutOfSet;
        }

        let state = self
            .messages
            .entry(event.message_id)
            .or_insert_with(|| MessageAggregation::Collecting(BTreeMap::new()));

        let shares = match state {
            MessageAggregation::Collecting(shares) => shares,
            _ => return RecordOutcome::Terminal,
        };

        // First share per validator wins
        if shares.contains_key(&event.validator) {
            return RecordOutcome::Duplicate;
        }
        shares.insert(event.validator, event.share);

        let count = shares.len();
        if count < self.threshold {
            return RecordOutcome::Recorded { count };
        }

        match combine_shares(shares, self.validator_count) {
            Ok((signature, signers)) => {
                *state = MessageAggregation::Complete;
                self.completed.push(event.message_id);
                RecordOutcome::QuorumReached(SignedMessage {
                    message_id: event.message_id,
                    signature,
                    signers,
                })
            }
            Err(error) => {
                *state = MessageAggregation::Failed(error.clone());
                RecordOutcome::CombineFailed(error)
            }
        }
    }

    pub fn state(&self, id: &MessageId) -> Option<&MessageAggregation> {
        self.messages.get(id)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Snapshot of every message's final state.
    pub fn report(&self) -> SessionReport {
        let mut collecting = Vec::new();
        let mut failed = Vec::new();

        for (id, state) in &self.messages {
            match state {
                MessageAggregation::Collecting(shares) => collecting.push(CollectingMessage {
                    message_id: *id,
                    share_count: shares.len(),
                    validators: shares.keys().copied().collect(),
                }),
                MessageAggregation::Failed(reason) => failed.push(FailedMessage {
                    message_id: *id,
                    reason: reason.clone(),
                }),
                MessageAggregation::Complete => {}
            }
        }
        collecting.sort_by_key(|c| c.message_id);
        failed.sort_by_key(|f| f.message_id);

        SessionReport {
            completed: self.completed.clone(),
            collecting,
            failed,
        }
    }
}
