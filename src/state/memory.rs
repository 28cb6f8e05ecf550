use std::collections::BTreeMap;

use crate::ids::{Id, NodeId};
use crate::state::{Chain, ChainMut, StateError, Staker, SubnetTransformation};
use crate::txs::{OutputOwners, Utxo, UtxoId};

type ValidatorKey = (Id, NodeId);

/// Base chain state held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryState {
    timestamp: u64,
    current_validators: BTreeMap<ValidatorKey, Staker>,
    pending_validators: BTreeMap<ValidatorKey, Staker>,
    current_delegators: BTreeMap<ValidatorKey, BTreeMap<Id, Staker>>,
    pending_delegators: BTreeMap<ValidatorKey, BTreeMap<Id, Staker>>,
    transformations: BTreeMap<Id, SubnetTransformation>,
    subnet_owners: BTreeMap<Id, OutputOwners>,
    utxos: BTreeMap<UtxoId, Utxo>,
}

impl MemoryState {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }
}

fn delegators(
    map: &BTreeMap<ValidatorKey, BTreeMap<Id, Staker>>,
    subnet_id: Id,
    node_id: NodeId,
) -> Vec<Staker> {
    map.get(&(subnet_id, node_id))
        .map(|stakers| stakers.values().cloned().collect())
        .unwrap_or_default()
}

fn remove_delegator(map: &mut BTreeMap<ValidatorKey, BTreeMap<Id, Staker>>, staker: &Staker) {
    let key = (staker.subnet_id, staker.node_id);
    if let Some(stakers) = map.get_mut(&key) {
        stakers.remove(&staker.tx_id);
        if stakers.is_empty() {
            map.remove(&key);
        }
    }
}

impl Chain for MemoryState {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn get_current_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError> {
        self.current_validators
            .get(&(subnet_id, node_id))
            .cloned()
            .ok_or(StateError::NotFound)
    }

    fn get_pending_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError> {
        self.pending_validators
            .get(&(subnet_id, node_id))
            .cloned()
            .ok_or(StateError::NotFound)
    }

    fn get_current_delegators(&self, subnet_id: Id, node_id: NodeId) -> Result<Vec<Staker>, StateError> {
        Ok(delegators(&self.current_delegators, subnet_id, node_id))
    }

    fn get_pending_delegators(&self, subnet_id: Id, node_id: NodeId) -> Result<Vec<Staker>, StateError> {
        Ok(delegators(&self.pending_delegators, subnet_id, node_id))
    }

    fn get_subnet_transformation(&self, subnet_id: Id) -> Result<SubnetTransformation, StateError> {
        self.transformations
            .get(&subnet_id)
            .cloned()
            .ok_or(StateError::NotFound)
    }

    fn get_subnet_owner(&self, subnet_id: Id) -> Result<OutputOwners, StateError> {
        self.subnet_owners
            .get(&subnet_id)
            .cloned()
            .ok_or(StateError::NotFound)
    }

    fn get_utxo(&self, utxo_id: &UtxoId) -> Result<Utxo, StateError> {
        self.utxos.get(utxo_id).cloned().ok_or(StateError::NotFound)
    }
}

impl ChainMut for MemoryState {
    fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    fn put_current_validator(&mut self, staker: Staker) {
        self.current_validators
            .insert((staker.subnet_id, staker.node_id), staker);
    }

    fn delete_current_validator(&mut self, staker: &Staker) {
        self.current_validators
            .remove(&(staker.subnet_id, staker.node_id));
    }

    fn put_pending_validator(&mut self, staker: Staker) {
        self.pending_validators
            .insert((staker.subnet_id, staker.node_id), staker);
    }

    fn delete_pending_validator(&mut self, staker: &Staker) {
        self.pending_validators
            .remove(&(staker.subnet_id, staker.node_id));
    }

    fn put_current_delegator(&mut self, staker: Staker) {
        self.current_delegators
            .entry((staker.subnet_id, staker.node_id))
            .or_default()
            .insert(staker.tx_id, staker);
    }

    fn delete_current_delegator(&mut self, staker: &Staker) {
        remove_delegator(&mut self.current_delegators, staker);
    }

    fn put_pending_delegator(&mut self, staker: Staker) {
        self.pending_delegators
            .entry((staker.subnet_id, staker.node_id))
            .or_default()
            .insert(staker.tx_id, staker);
    }

    fn delete_pending_delegator(&mut self, staker: &Staker) {
        remove_delegator(&mut self.pending_delegators, staker);
    }

    fn set_subnet_transformation(&mut self, transformation: SubnetTransformation) {
        self.transformations
            .insert(transformation.subnet, transformation);
    }

    fn set_subnet_owner(&mut self, subnet_id: Id, owner: OutputOwners) {
        self.subnet_owners.insert(subnet_id, owner);
    }

    fn add_utxo(&mut self, utxo: Utxo) {
        self.utxos.insert(utxo.utxo_id, utxo);
    }

    fn delete_utxo(&mut self, utxo_id: &UtxoId) {
        self.utxos.remove(utxo_id);
    }
}
