//! Signed staking transactions.
//!
//! A [`Tx`] pairs an [`UnsignedTx`] with the credentials that authorize it.
//! The transaction id is the SHA-256 of the bincode encoding of the unsigned
//! body, and every signature in the credentials is made over that id.

pub mod components;
pub mod staker_txs;
pub mod validator;

pub use components::{
    BaseTx, OutputOwners, SubnetAuth, TransferableInput, TransferableOutput, Utxo, UtxoId,
};
pub use staker_txs::{
    AddDelegatorTx, AddPermissionlessDelegatorTx, AddPermissionlessValidatorTx,
    AddSubnetValidatorTx, AddValidatorTx, RemoveSubnetValidatorTx, StakerTx,
    TransferSubnetOwnershipTx,
};
pub use validator::{SubnetValidator, Validator};

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Context;
use crate::cryptography::Credential;
use crate::ids::Id;

/// Structural problems detectable without chain state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntacticError {
    #[error("wrong network id: expected {expected}, got {actual}")]
    WrongNetworkId { expected: u32, actual: u32 },
    #[error("wrong chain id")]
    WrongChainId,
    #[error("memo of {0} bytes is too large")]
    MemoTooLarge(usize),
    #[error("inputs not sorted and unique")]
    InputsNotSortedUnique,
    #[error("outputs not sorted")]
    OutputsNotSorted,
    #[error("input has no value")]
    NoValueInput,
    #[error("output has no value")]
    NoValueOutput,
    #[error("output is unspendable")]
    OutputUnspendable,
    #[error("output owners with zero threshold must not list addresses")]
    OutputUnoptimized,
    #[error("addresses not sorted and unique")]
    AddrsNotSortedUnique,
    #[error("signature indices not sorted and unique")]
    SigIndicesNotSortedUnique,
    #[error("validator weight must be non-zero")]
    ZeroWeight,
    #[error("delegation shares {0} exceed 100%")]
    TooLargeDelegationShares(u32),
    #[error("no stake outputs")]
    NoStake,
    #[error("stake outputs overflow")]
    StakeOverflow,
    #[error("staked {staked} but validator weight is {weight}")]
    ValidatorWeightMismatch { staked: u64, weight: u64 },
    #[error("stake must be in the primary asset")]
    StakeMustBePrimaryAsset,
    #[error("stake outputs use multiple assets")]
    MultipleStakedAssets,
    #[error("operation does not apply to the primary network")]
    SubnetIsPrimaryNetwork,
    #[error("expected {expected} credentials, got {actual}")]
    WrongNumberOfCredentials { expected: usize, actual: usize },
}

/// Closed set of staking transaction kinds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsignedTx {
    AddValidator(AddValidatorTx),
    AddSubnetValidator(AddSubnetValidatorTx),
    RemoveSubnetValidator(RemoveSubnetValidatorTx),
    AddDelegator(AddDelegatorTx),
    AddPermissionlessValidator(AddPermissionlessValidatorTx),
    AddPermissionlessDelegator(AddPermissionlessDelegatorTx),
    TransferSubnetOwnership(TransferSubnetOwnershipTx),
}

impl UnsignedTx {
    pub fn base(&self) -> &BaseTx {
        match self {
            UnsignedTx::AddValidator(tx) => &tx.base,
            UnsignedTx::AddSubnetValidator(tx) => &tx.base,
            UnsignedTx::RemoveSubnetValidator(tx) => &tx.base,
            UnsignedTx::AddDelegator(tx) => &tx.base,
            UnsignedTx::AddPermissionlessValidator(tx) => &tx.base,
            UnsignedTx::AddPermissionlessDelegator(tx) => &tx.base,
            UnsignedTx::TransferSubnetOwnership(tx) => &tx.base,
        }
    }

    /// Whether the last credential authorizes a subnet action rather than a spend.
    pub fn has_subnet_auth(&self) -> bool {
        matches!(
            self,
            UnsignedTx::AddSubnetValidator(_)
                | UnsignedTx::RemoveSubnetValidator(_)
                | UnsignedTx::TransferSubnetOwnership(_)
        )
    }

    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        match self {
            UnsignedTx::AddValidator(tx) => tx.syntactic_verify(ctx),
            UnsignedTx::AddSubnetValidator(tx) => tx.syntactic_verify(ctx),
            UnsignedTx::RemoveSubnetValidator(tx) => tx.syntactic_verify(ctx),
            UnsignedTx::AddDelegator(tx) => tx.syntactic_verify(ctx),
            UnsignedTx::AddPermissionlessValidator(tx) => tx.syntactic_verify(ctx),
            UnsignedTx::AddPermissionlessDelegator(tx) => tx.syntactic_verify(ctx),
            UnsignedTx::TransferSubnetOwnership(tx) => tx.syntactic_verify(ctx),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    unsigned: UnsignedTx,
    creds: Vec<Credential>,
    id: Id,
}

impl Tx {
    pub fn new(unsigned: UnsignedTx) -> Result<Self, bincode::Error> {
        Self::with_credentials(unsigned, Vec::new())
    }

    pub fn with_credentials(unsigned: UnsignedTx, creds: Vec<Credential>) -> Result<Self, bincode::Error> {
        let bytes = bincode::serialize(&unsigned)?;
        Ok(Self {
            id: Id::digest(&bytes),
            unsigned,
            creds,
        })
    }

    /// Appends one credential per signer group, in order. The groups must
    /// line up with the inputs, followed by the subnet authorization if the
    /// kind carries one.
    pub fn sign(mut self, signers: &[Vec<&SigningKey>]) -> Self {
        for keys in signers {
            self.creds.push(Credential::sign(self.id.as_bytes(), keys));
        }
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn unsigned(&self) -> &UnsignedTx {
        &self.unsigned
    }

    pub fn creds(&self) -> &[Credential] {
        &self.creds
    }

    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        self.unsigned.syntactic_verify(ctx)?;

        let mut expected = self.unsigned.base().ins.len();
        if self.unsigned.has_subnet_auth() {
            expected += 1;
        }
        if self.creds.len() != expected {
            return Err(SyntacticError::WrongNumberOfCredentials {
                expected,
                actual: self.creds.len(),
            });
        }
        Ok(())
    }
}
