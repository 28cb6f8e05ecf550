//! Chain state as seen by the staking verifiers.
//!
//! Verifiers only read through [`Chain`]. Accepted transactions are written
//! through [`ChainMut`], normally into a [`Diff`] layered over the last
//! accepted state so that each candidate gets its own isolated view.

pub mod diff;
pub mod memory;
pub mod staker;

pub use diff::{Changes, Diff};
pub use memory::MemoryState;
pub use staker::{Priority, Staker};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{Id, NodeId};
use crate::txs::{OutputOwners, Utxo, UtxoId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(String),
}

impl StateError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StateError::NotFound)
    }
}

/// Elastic staking parameters recorded when a subnet is transformed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetTransformation {
    pub subnet: Id,
    pub asset_id: Id,
    pub min_validator_stake: u64,
    pub max_validator_stake: u64,
    /// Seconds.
    pub min_stake_duration: u32,
    /// Seconds.
    pub max_stake_duration: u32,
    pub min_delegation_fee: u32,
    pub min_delegator_stake: u64,
    pub max_validator_weight_factor: u8,
}

/// Read-only view of chain state.
pub trait Chain {
    fn timestamp(&self) -> u64;

    fn get_current_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError>;
    fn get_pending_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError>;

    fn get_current_delegators(&self, subnet_id: Id, node_id: NodeId) -> Result<Vec<Staker>, StateError>;
    fn get_pending_delegators(&self, subnet_id: Id, node_id: NodeId) -> Result<Vec<Staker>, StateError>;

    fn get_subnet_transformation(&self, subnet_id: Id) -> Result<SubnetTransformation, StateError>;
    fn get_subnet_owner(&self, subnet_id: Id) -> Result<OutputOwners, StateError>;

    fn get_utxo(&self, utxo_id: &UtxoId) -> Result<Utxo, StateError>;
}

/// Writable chain state.
pub trait ChainMut: Chain {
    fn set_timestamp(&mut self, timestamp: u64);

    fn put_current_validator(&mut self, staker: Staker);
    fn delete_current_validator(&mut self, staker: &Staker);
    fn put_pending_validator(&mut self, staker: Staker);
    fn delete_pending_validator(&mut self, staker: &Staker);

    fn put_current_delegator(&mut self, staker: Staker);
    fn delete_current_delegator(&mut self, staker: &Staker);
    fn put_pending_delegator(&mut self, staker: Staker);
    fn delete_pending_delegator(&mut self, staker: &Staker);

    fn set_subnet_transformation(&mut self, transformation: SubnetTransformation);
    fn set_subnet_owner(&mut self, subnet_id: Id, owner: OutputOwners);

    fn add_utxo(&mut self, utxo: Utxo);
    fn delete_utxo(&mut self, utxo_id: &UtxoId);
}

/// Looks `node_id` up as a current validator of `subnet_id`, then as a
/// pending one. `NotFound` means it is neither.
pub fn get_validator(state: &dyn Chain, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError> {
    match state.get_current_validator(subnet_id, node_id) {
        Err(StateError::NotFound) => state.get_pending_validator(subnet_id, node_id),
        result => result,
    }
}
