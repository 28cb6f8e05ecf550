//! Per-asset balance verification for transaction inputs and outputs.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::cryptography::{Credential, Fx, FxError};
use crate::ids::Id;
use crate::state::{Chain, StateError};
use crate::txs::{TransferableInput, TransferableOutput, Tx, UtxoId};
use crate::utils::math::{add64, MathError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("{inputs} inputs but {credentials} credentials")]
    WrongNumberOfCredentials { inputs: usize, credentials: usize },
    #[error("utxo {0} not found")]
    MissingUtxo(UtxoId),
    #[error("failed to read utxo: {0}")]
    State(StateError),
    #[error("utxo {utxo_id} holds asset {expected}, input claims {actual}")]
    AssetMismatch { utxo_id: UtxoId, expected: Id, actual: Id },
    #[error("failed to verify spend of {utxo_id}: {source}")]
    Credential { utxo_id: UtxoId, source: FxError },
    #[error("amount overflow: {0}")]
    Overflow(#[from] MathError),
    #[error("insufficient funds of asset {asset_id}: consumed {consumed}, produced {produced}")]
    InsufficientFunds { asset_id: Id, consumed: u64, produced: u64 },
}

/// Verifies that `ins` are spendable by `creds` and cover `outs` plus `fees`.
pub trait FlowChecker: Send + Sync {
    fn verify_spend(
        &self,
        tx: &Tx,
        state: &dyn Chain,
        ins: &[TransferableInput],
        outs: &[TransferableOutput],
        creds: &[Credential],
        fees: &BTreeMap<Id, u64>,
    ) -> Result<(), FlowError>;
}

/// Flow checker backed by the UTXO set in chain state.
#[derive(Clone)]
pub struct UtxoFlowChecker {
    fx: Arc<dyn Fx>,
}

impl UtxoFlowChecker {
    pub fn new(fx: Arc<dyn Fx>) -> Self {
        Self { fx }
    }
}

impl FlowChecker for UtxoFlowChecker {
    fn verify_spend(
        &self,
        tx: &Tx,
        state: &dyn Chain,
        ins: &[TransferableInput],
        outs: &[TransferableOutput],
        creds: &[Credential],
        fees: &BTreeMap<Id, u64>,
    ) -> Result<(), FlowError> {
        if ins.len() != creds.len() {
            return Err(FlowError::WrongNumberOfCredentials {
                inputs: ins.len(),
                credentials: creds.len(),
            });
        }

        let now = state.timestamp();
        let mut consumed: BTreeMap<Id, u64> = BTreeMap::new();
        for (input, cred) in ins.iter().zip(creds) {
            let utxo = state.get_utxo(&input.utxo_id).map_err(|err| match err {
                StateError::NotFound => FlowError::MissingUtxo(input.utxo_id),
                other => FlowError::State(other),
            })?;
            if utxo.asset_id != input.asset_id {
                return Err(FlowError::AssetMismatch {
                    utxo_id: input.utxo_id,
                    expected: utxo.asset_id,
                    actual: input.asset_id,
                });
            }
            self.fx
                .verify_transfer(tx, input, cred, &utxo, now)
                .map_err(|source| FlowError::Credential {
                    utxo_id: input.utxo_id,
                    source,
                })?;

            let total = consumed.entry(utxo.asset_id).or_insert(0);
            *total = add64(*total, utxo.amount)?;
        }

        let mut produced: BTreeMap<Id, u64> = BTreeMap::new();
        for out in outs {
            let total = produced.entry(out.asset_id).or_insert(0);
            *total = add64(*total, out.amount)?;
        }
        for (asset_id, fee) in fees {
            let total = produced.entry(*asset_id).or_insert(0);
            *total = add64(*total, *fee)?;
        }

        for (asset_id, produced) in produced {
            let consumed = consumed.get(&asset_id).copied().unwrap_or(0);
            if produced > consumed {
                return Err(FlowError::InsufficientFunds {
                    asset_id,
                    consumed,
                    produced,
                });
            }
        }
        Ok(())
    }
}
