//! Copy-on-write overlay over a parent [`Chain`].
//!
//! Writes land in the overlay and shadow the parent on reads. The parent is
//! never touched until the overlay's [`Changes`] are explicitly committed,
//! so independent candidates can be verified and applied against separate
//! overlays of the same base.

use std::collections::BTreeMap;

use log::debug;

use crate::ids::{Id, NodeId};
use crate::state::{Chain, ChainMut, StateError, Staker, SubnetTransformation};
use crate::txs::{OutputOwners, Utxo, UtxoId};

type ValidatorKey = (Id, NodeId);

#[derive(Clone, Debug, PartialEq, Eq)]
enum Modified {
    Put(Staker),
    Deleted(Staker),
}

/// Everything written to a [`Diff`], detached from its parent.
#[derive(Clone, Debug, Default)]
pub struct Changes {
    timestamp: Option<u64>,
    current_validators: BTreeMap<ValidatorKey, Modified>,
    pending_validators: BTreeMap<ValidatorKey, Modified>,
    current_delegators: BTreeMap<ValidatorKey, BTreeMap<Id, Modified>>,
    pending_delegators: BTreeMap<ValidatorKey, BTreeMap<Id, Modified>>,
    transformations: BTreeMap<Id, SubnetTransformation>,
    subnet_owners: BTreeMap<Id, OutputOwners>,
    utxos: BTreeMap<UtxoId, Option<Utxo>>,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.timestamp.is_none()
            && self.current_validators.is_empty()
            && self.pending_validators.is_empty()
            && self.current_delegators.is_empty()
            && self.pending_delegators.is_empty()
            && self.transformations.is_empty()
            && self.subnet_owners.is_empty()
            && self.utxos.is_empty()
    }

    /// Writes every change onto `state`.
    pub fn apply_to(self, state: &mut dyn ChainMut) {
        if let Some(timestamp) = self.timestamp {
            state.set_timestamp(timestamp);
        }
        for modified in self.current_validators.into_values() {
            match modified {
                Modified::Put(staker) => state.put_current_validator(staker),
                Modified::Deleted(staker) => state.delete_current_validator(&staker),
            }
        }
        for modified in self.pending_validators.into_values() {
            match modified {
                Modified::Put(staker) => state.put_pending_validator(staker),
                Modified::Deleted(staker) => state.delete_pending_validator(&staker),
            }
        }
        for modified in self.current_delegators.into_values().flat_map(BTreeMap::into_values) {
            match modified {
                Modified::Put(staker) => state.put_current_delegator(staker),
                Modified::Deleted(staker) => state.delete_current_delegator(&staker),
            }
        }
        for modified in self.pending_delegators.into_values().flat_map(BTreeMap::into_values) {
            match modified {
                Modified::Put(staker) => state.put_pending_delegator(staker),
                Modified::Deleted(staker) => state.delete_pending_delegator(&staker),
            }
        }
        for transformation in self.transformations.into_values() {
            state.set_subnet_transformation(transformation);
        }
        for (subnet_id, owner) in self.subnet_owners {
            state.set_subnet_owner(subnet_id, owner);
        }
        for (utxo_id, utxo) in self.utxos {
            match utxo {
                Some(utxo) => state.add_utxo(utxo),
                None => state.delete_utxo(&utxo_id),
            }
        }
    }
}

pub struct Diff<'a> {
    parent: &'a dyn Chain,
    changes: Changes,
}

impl<'a> Diff<'a> {
    pub fn new(parent: &'a dyn Chain) -> Self {
        Self {
            parent,
            changes: Changes::default(),
        }
    }

    pub fn into_changes(self) -> Changes {
        debug!("detaching state diff (empty: {})", self.changes.is_empty());
        self.changes
    }
}

fn validator_lookup(
    modified: &BTreeMap<ValidatorKey, Modified>,
    key: &ValidatorKey,
    parent: impl FnOnce() -> Result<Staker, StateError>,
) -> Result<Staker, StateError> {
    match modified.get(key) {
        Some(Modified::Put(staker)) => Ok(staker.clone()),
        Some(Modified::Deleted(_)) => Err(StateError::NotFound),
        None => parent(),
    }
}

fn delegator_lookup(
    modified: &BTreeMap<ValidatorKey, BTreeMap<Id, Modified>>,
    key: &ValidatorKey,
    parent: Vec<Staker>,
) -> Vec<Staker> {
    let Some(changes) = modified.get(key) else {
        return parent;
    };
    let mut merged: BTreeMap<Id, Staker> = parent
        .into_iter()
        .map(|staker| (staker.tx_id, staker))
        .collect();
    for (tx_id, change) in changes {
        match change {
            Modified::Put(staker) => {
                merged.insert(*tx_id, staker.clone());
            }
            Modified::Deleted(_) => {
                merged.remove(tx_id);
            }
        }
    }
    merged.into_values().collect()
}

impl Chain for Diff<'_> {
    fn timestamp(&self) -> u64 {
        self.changes
            .timestamp
            .unwrap_or_else(|| self.parent.timestamp())
    }

    fn get_current_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError> {
        validator_lookup(&self.changes.current_validators, &(subnet_id, node_id), || {
            self.parent.get_current_validator(subnet_id, node_id)
        })
    }

    fn get_pending_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError> {
        validator_lookup(&self.changes.pending_validators, &(subnet_id, node_id), || {
            self.parent.get_pending_validator(subnet_id, node_id)
        })
    }

    fn get_current_delegators(&self, subnet_id: Id, node_id: NodeId) -> Result<Vec<Staker>, StateError> {
        let parent = self.parent.get_current_delegators(subnet_id, node_id)?;
        Ok(delegator_lookup(&self.changes.current_delegators, &(subnet_id, node_id), parent))
    }

    fn get_pending_delegators(&self, subnet_id: Id, node_id: NodeId) -> Result<Vec<Staker>, StateError> {
        let parent = self.parent.get_pending_delegators(subnet_id, node_id)?;
        Ok(delegator_lookup(&self.changes.pending_delegators, &(subnet_id, node_id), parent))
    }

    fn get_subnet_transformation(&self, subnet_id: Id) -> Result<SubnetTransformation, StateError> {
        match self.changes.transformations.get(&subnet_id) {
            Some(transformation) => Ok(transformation.clone()),
            None => self.parent.get_subnet_transformation(subnet_id),
        }
    }

    fn get_subnet_owner(&self, subnet_id: Id) -> Result<OutputOwners, StateError> {
        match self.changes.subnet_owners.get(&subnet_id) {
            Some(owner) => Ok(owner.clone()),
            None => self.parent.get_subnet_owner(subnet_id),
        }
    }

    fn get_utxo(&self, utxo_id: &UtxoId) -> Result<Utxo, StateError> {
        match self.changes.utxos.get(utxo_id) {
            Some(Some(utxo)) => Ok(utxo.clone()),
            Some(None) => Err(StateError::NotFound),
            None => self.parent.get_utxo(utxo_id),
        }
    }
}

impl ChainMut for Diff<'_> {
    fn set_timestamp(&mut self, timestamp: u64) {
        self.changes.timestamp = Some(timestamp);
    }

    fn put_current_validator(&mut self, staker: Staker) {
        self.changes
            .current_validators
            .insert((staker.subnet_id, staker.node_id), Modified::Put(staker));
    }

    fn delete_current_validator(&mut self, staker: &Staker) {
        self.changes.current_validators.insert(
            (staker.subnet_id, staker.node_id),
            Modified::Deleted(staker.clone()),
        );
    }

    fn put_pending_validator(&mut self, staker: Staker) {
        self.changes
            .pending_validators
            .insert((staker.subnet_id, staker.node_id), Modified::Put(staker));
    }

    fn delete_pending_validator(&mut self, staker: &Staker) {
        self.changes.pending_validators.insert(
            (staker.subnet_id, staker.node_id),
            Modified::Deleted(staker.clone()),
        );
    }

    fn put_current_delegator(&mut self, staker: Staker) {
        self.changes
            .current_delegators
            .entry((staker.subnet_id, staker.node_id))
            .or_default()
            .insert(staker.tx_id, Modified::Put(staker));
    }

    fn delete_current_delegator(&mut self, staker: &Staker) {
        self.changes
            .current_delegators
            .entry((staker.subnet_id, staker.node_id))
            .or_default()
            .insert(staker.tx_id, Modified::Deleted(staker.clone()));
    }

    fn put_pending_delegator(&mut self, staker: Staker) {
        self.changes
            .pending_delegators
            .entry((staker.subnet_id, staker.node_id))
            .or_default()
            .insert(staker.tx_id, Modified::Put(staker));
    }

    fn delete_pending_delegator(&mut self, staker: &Staker) {
        self.changes
            .pending_delegators
            .entry((staker.subnet_id, staker.node_id))
            .or_default()
            .insert(staker.tx_id, Modified::Deleted(staker.clone()));
    }

    fn set_subnet_transformation(&mut self, transformation: SubnetTransformation) {
        self.changes
            .transformations
            .insert(transformation.subnet, transformation);
    }

    fn set_subnet_owner(&mut self, subnet_id: Id, owner: OutputOwners) {
        self.changes.subnet_owners.insert(subnet_id, owner);
    }

    fn add_utxo(&mut self, utxo: Utxo) {
        self.changes.utxos.insert(utxo.utxo_id, Some(utxo));
    }

    fn delete_utxo(&mut self, utxo_id: &UtxoId) {
        self.changes.utxos.insert(*utxo_id, None);
    }
}
