//! Transfer components shared by every transaction kind.
//!
//! Inputs spend UTXOs, outputs create them, and `OutputOwners` describes the
//! threshold of addresses that may later spend (or, for subnets, administer)
//! what an output or record guards.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Context;
use crate::ids::{Id, ShortId};
use crate::txs::SyntacticError;

pub const MAX_MEMO_SIZE: usize = 256;

/// Position of an output in the transaction that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtxoId {
    pub tx_id: Id,
    pub output_index: u32,
}

impl fmt::Display for UtxoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.output_index)
    }
}

/// Threshold ownership over a sorted set of addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOwners {
    /// Unix time before which the owners may not sign.
    pub locktime: u64,
    pub threshold: u32,
    pub addrs: Vec<ShortId>,
}

impl OutputOwners {
    pub fn verify(&self) -> Result<(), SyntacticError> {
        if self.threshold as usize > self.addrs.len() {
            return Err(SyntacticError::OutputUnspendable);
        }
        if self.threshold == 0 && !self.addrs.is_empty() {
            return Err(SyntacticError::OutputUnoptimized);
        }
        if !is_sorted_and_unique(&self.addrs) {
            return Err(SyntacticError::AddrsNotSortedUnique);
        }
        Ok(())
    }
}

/// Indices into an owner's address list naming who signed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetAuth {
    pub sig_indices: Vec<u32>,
}

impl SubnetAuth {
    pub fn verify(&self) -> Result<(), SyntacticError> {
        if !is_sorted_and_unique(&self.sig_indices) {
            return Err(SyntacticError::SigIndicesNotSortedUnique);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableInput {
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub amount: u64,
    pub sig_indices: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferableOutput {
    pub asset_id: Id,
    pub amount: u64,
    pub owners: OutputOwners,
}

impl TransferableOutput {
    pub fn verify(&self) -> Result<(), SyntacticError> {
        if self.amount == 0 {
            return Err(SyntacticError::NoValueOutput);
        }
        self.owners.verify()
    }
}

/// An unspent output recorded in chain state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub amount: u64,
    pub owners: OutputOwners,
}

/// Funds movement carried by every transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outs: Vec<TransferableOutput>,
    pub ins: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

impl BaseTx {
    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        if self.network_id != ctx.network_id {
            return Err(SyntacticError::WrongNetworkId {
                expected: ctx.network_id,
                actual: self.network_id,
            });
        }
        if self.blockchain_id != ctx.chain_id {
            return Err(SyntacticError::WrongChainId);
        }
        if self.memo.len() > MAX_MEMO_SIZE {
            return Err(SyntacticError::MemoTooLarge(self.memo.len()));
        }
        for out in &self.outs {
            out.verify()?;
        }
        for input in &self.ins {
            if input.amount == 0 {
                return Err(SyntacticError::NoValueInput);
            }
            if !is_sorted_and_unique(&input.sig_indices) {
                return Err(SyntacticError::SigIndicesNotSortedUnique);
            }
        }
        let utxo_ids: Vec<UtxoId> = self.ins.iter().map(|input| input.utxo_id).collect();
        if !is_sorted_and_unique(&utxo_ids) {
            return Err(SyntacticError::InputsNotSortedUnique);
        }
        Ok(())
    }
}

pub(crate) fn is_sorted_and_unique<T: Ord>(items: &[T]) -> bool {
    items.windows(2).all(|pair| pair[0] < pair[1])
}
