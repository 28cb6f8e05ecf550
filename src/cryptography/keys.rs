//! Address derivation and signature credentials.

use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ids::ShortId;

/// Address controlled by an ed25519 public key: the first 20 bytes of its
/// SHA-256.
pub fn derive_address_from_pk(public_key: &[u8]) -> ShortId {
    let mut hasher = Sha256::new();
    hasher.update(public_key);
    ShortId::from_digest(&hasher.finalize().into())
}

pub fn address_of(key: &SigningKey) -> ShortId {
    derive_address_from_pk(key.verifying_key().as_bytes())
}

/// One signer's contribution to a credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub public_key: [u8; 32],
    /// 64-byte ed25519 signature.
    pub signature: Vec<u8>,
}

/// Signatures authorizing one input or one subnet action, ordered to match
/// the signature indices of whatever they authorize.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub sigs: Vec<SignatureEntry>,
}

impl Credential {
    pub fn sign(message: &[u8], keys: &[&SigningKey]) -> Self {
        let sigs = keys
            .iter()
            .map(|key| SignatureEntry {
                public_key: key.verifying_key().to_bytes(),
                signature: key.sign(message).to_bytes().to_vec(),
            })
            .collect();
        Self { sigs }
    }
}
