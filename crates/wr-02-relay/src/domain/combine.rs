//! # Share Combination
//!
//! Turns a quorum of raw shares into one aggregate signature plus the
//! signer bitmap a verifier needs to rebuild the aggregate public key.

use crate::domain::entities::{SignedMessage, SignerBitmap};
use crate::domain::errors::AggregationError;
use bitvec::prelude::*;
use shared_crypto::{BlsPublicKey, BlsSignature};
use shared_types::{AggregateSignature, SignatureShare, ValidatorIndex};
use std::collections::BTreeMap;

/// Combine `shares` (at most one per validator) into an aggregate.
///
/// Every share is parsed and subgroup-checked first; the first malformed
/// share fails the whole combination.
pub fn combine_shares(
    shares: &BTreeMap<ValidatorIndex, SignatureShare>,
    validator_count: usize,
) -> Result<(AggregateSignature, SignerBitmap), AggregationError> {
    if shares.is_empty() {
        return Err(AggregationError::NoShares);
    }

    let mut signers = bitvec![u8, Msb0; 0; validator_count];
    let mut signatures = Vec::with_capacity(shares.len());
    for (validator, share) in shares {
        let signature = BlsSignature::from_bytes(share.as_bytes()).map_err(|source| {
            AggregationError::MalformedShare {
                validator: *validator,
                source,
            }
        })?;
        signatures.push(signature);
        if let Some(mut bit) = signers.get_mut(validator.as_usize()) {
            *bit = true;
        }
    }

    let aggregate = BlsSignature::aggregate(&signatures).map_err(AggregationError::Combine)?;
    Ok((AggregateSignature::new(aggregate.to_bytes()), signers))
}

/// Verify an emitted aggregate against the message bytes and the validator
/// set's public keys, indexed by `ValidatorIndex`.
pub fn verify_signed_message(
    signed: &SignedMessage,
    message_bytes: &[u8],
    public_keys: &[BlsPublicKey],
) -> bool {
    let mut signers = Vec::with_capacity(signed.signer_count());
    for index in signed.signers.iter_ones() {
        match public_keys.get(index) {
            Some(key) => signers.push(key.clone()),
            None => return false,
        }
    }
    if signers.is_empty() {
        return false;
    }

    match BlsSignature::from_bytes(signed.signature.as_bytes()) {
        Ok(signature) => signature.verify_aggregate(message_bytes, &signers),
        Err(_) => false,
    }
}
