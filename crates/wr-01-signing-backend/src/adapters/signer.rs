//! # BLS Warp Signer
//!
//! Wraps the validator's BLS key. Signs only messages whose source chain is
//! the chain this validator runs.

use crate::ports::outbound::{SignerError, WarpSigner};
use shared_crypto::{BlsKeyPair, BlsPublicKey};
use shared_types::{ChainId, SignatureShare, UnsignedMessage};

/// `WarpSigner` backed by a local BLS key pair.
pub struct BlsWarpSigner {
    keypair: BlsKeyPair,
    chain_id: ChainId,
}

impl BlsWarpSigner {
    pub fn new(keypair: BlsKeyPair, chain_id: ChainId) -> Self {
        Self { keypair, chain_id }
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }
}

impl WarpSigner for BlsWarpSigner {
    fn sign(&self, message: &UnsignedMessage) -> Result<SignatureShare, SignerError> {
        if message.source_chain_id() != self.chain_id {
            return Err(SignerError::WrongSourceChain {
                expected: self.chain_id,
                actual: message.source_chain_id(),
            });
        }
        let signature = self.keypair.sign(message.bytes());
        Ok(SignatureShare::new(signature.to_bytes()))
    }

    fn public_key(&self) -> BlsPublicKey {
        self.keypair.public_key()
    }
}
