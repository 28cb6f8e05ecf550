//! Feature extension for threshold-signature ownership.
//!
//! The staking verifiers never look at signatures directly. Spend
//! authorization (flow check) and subnet authorization both go through an
//! [`Fx`], which decides whether a credential satisfies an owner.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

use crate::cryptography::keys::{derive_address_from_pk, Credential};
use crate::ids::ShortId;
use crate::txs::{OutputOwners, SubnetAuth, TransferableInput, Tx, Utxo};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    #[error("owner is locked until {locktime}, current time {now}")]
    Locked { locktime: u64, now: u64 },
    #[error("input has more signers than expected")]
    TooManySigners,
    #[error("input has fewer signers than expected")]
    TooFewSigners,
    #[error("input and credential have different numbers of signers")]
    SignersMismatch,
    #[error("signature index {0} out of bounds")]
    IndexOutOfBounds(u32),
    #[error("signature from {actual} does not match owner address {expected}")]
    WrongSigner { expected: ShortId, actual: ShortId },
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("input amount {input} does not match utxo amount {utxo}")]
    AmountMismatch { input: u64, utxo: u64 },
}

pub trait Fx: Send + Sync {
    /// Checks that `cred` holds valid signatures over `message` from the
    /// owner addresses selected by `sig_indices`, and that those meet the
    /// owner's threshold.
    fn verify_credentials(
        &self,
        message: &[u8],
        sig_indices: &[u32],
        cred: &Credential,
        owners: &OutputOwners,
        now: u64,
    ) -> Result<(), FxError>;

    /// Checks that `cred` authorizes `tx` to act on behalf of `owner`.
    fn verify_permission(
        &self,
        tx: &Tx,
        auth: &SubnetAuth,
        cred: &Credential,
        owner: &OutputOwners,
        now: u64,
    ) -> Result<(), FxError> {
        self.verify_credentials(tx.id().as_bytes(), &auth.sig_indices, cred, owner, now)
    }

    /// Checks that `cred` authorizes `tx` to spend `utxo` through `input`.
    fn verify_transfer(
        &self,
        tx: &Tx,
        input: &TransferableInput,
        cred: &Credential,
        utxo: &Utxo,
        now: u64,
    ) -> Result<(), FxError> {
        if input.amount != utxo.amount {
            return Err(FxError::AmountMismatch {
                input: input.amount,
                utxo: utxo.amount,
            });
        }
        self.verify_credentials(tx.id().as_bytes(), &input.sig_indices, cred, &utxo.owners, now)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Fx;

impl Fx for Ed25519Fx {
    fn verify_credentials(
        &self,
        message: &[u8],
        sig_indices: &[u32],
        cred: &Credential,
        owners: &OutputOwners,
        now: u64,
    ) -> Result<(), FxError> {
        if owners.locktime > now {
            return Err(FxError::Locked {
                locktime: owners.locktime,
                now,
            });
        }

        let num_sigs = sig_indices.len();
        let threshold = owners.threshold as usize;
        if threshold < num_sigs {
            return Err(FxError::TooManySigners);
        }
        if threshold > num_sigs {
            return Err(FxError::TooFewSigners);
        }
        if num_sigs != cred.sigs.len() {
            return Err(FxError::SignersMismatch);
        }

        for (&index, entry) in sig_indices.iter().zip(&cred.sigs) {
            let expected = *owners
                .addrs
                .get(index as usize)
                .ok_or(FxError::IndexOutOfBounds(index))?;

            let actual = derive_address_from_pk(&entry.public_key);
            if actual != expected {
                return Err(FxError::WrongSigner { expected, actual });
            }

            let public_key =
                VerifyingKey::from_bytes(&entry.public_key).map_err(|_| FxError::InvalidPublicKey)?;
            let signature =
                Signature::from_slice(&entry.signature).map_err(|_| FxError::InvalidSignature)?;
            public_key
                .verify(message, &signature)
                .map_err(|_| FxError::InvalidSignature)?;
        }
        Ok(())
    }
}
