use std::sync::Arc;
use std::time::Duration;

use ed25519_dalek::SigningKey;

use crate::config::{Config, Context, UpgradeConfig};
use crate::cryptography::{address_of, Ed25519Fx};
use crate::executor::Backend;
use crate::ids::{Id, NodeId, PRIMARY_NETWORK_ID};
use crate::state::{
    Chain, ChainMut, MemoryState, Priority, Staker, StateError, SubnetTransformation,
};
use crate::txs::{
    AddDelegatorTx, AddPermissionlessDelegatorTx, AddPermissionlessValidatorTx,
    AddSubnetValidatorTx, AddValidatorTx, BaseTx, OutputOwners, RemoveSubnetValidatorTx,
    SubnetAuth, SubnetValidator, TransferSubnetOwnershipTx, TransferableInput,
    TransferableOutput, Tx, UnsignedTx, Utxo, UtxoId, Validator,
};

pub const AVAX: Id = Id([0xaa; 32]);
pub const SUBNET_ASSET: Id = Id([0x5a; 32]);
pub const SUBNET: Id = Id([0x51; 32]);

pub const GENESIS_TIME: u64 = 1_700_000_000;
pub const DAY: u64 = 24 * 60 * 60;

pub const MIN_VALIDATOR_STAKE: u64 = 2_000;
pub const MAX_VALIDATOR_STAKE: u64 = 3_000_000;
pub const MIN_DELEGATOR_STAKE: u64 = 25;
pub const MIN_DELEGATION_FEE: u32 = 20_000;
pub const MIN_STAKE_DURATION: u64 = 14 * DAY;
pub const MAX_STAKE_DURATION: u64 = 365 * DAY;

pub const TX_FEE: u64 = 10;
pub const VALIDATOR_FEE: u64 = 100;
pub const DELEGATOR_FEE: u64 = 50;
pub const SUBNET_VALIDATOR_FEE: u64 = 20;
pub const SUBNET_DELEGATOR_FEE: u64 = 30;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn context() -> Context {
    Context {
        network_id: 1,
        chain_id: Id([0x0c; 32]),
        avax_asset_id: AVAX,
    }
}

/// Test config with either upgrade switched fully on or fully off.
pub fn config(apricot_phase3: bool, durango: bool) -> Config {
    let activation = |active: bool| if active { 0 } else { u64::MAX };
    Config {
        tx_fee: TX_FEE,
        add_primary_network_validator_fee: VALIDATOR_FEE,
        add_primary_network_delegator_fee: DELEGATOR_FEE,
        add_subnet_validator_fee: SUBNET_VALIDATOR_FEE,
        add_subnet_delegator_fee: SUBNET_DELEGATOR_FEE,
        min_validator_stake: MIN_VALIDATOR_STAKE,
        max_validator_stake: MAX_VALIDATOR_STAKE,
        min_delegator_stake: MIN_DELEGATOR_STAKE,
        min_delegation_fee: MIN_DELEGATION_FEE,
        min_stake_duration: Duration::from_secs(MIN_STAKE_DURATION),
        max_stake_duration: Duration::from_secs(MAX_STAKE_DURATION),
        upgrades: UpgradeConfig {
            apricot_phase3_time: activation(apricot_phase3),
            durango_time: activation(durango),
        },
    }
}

pub fn backend_with(config: Config, bootstrapped: bool) -> Backend {
    let backend = Backend::new(Arc::new(config), Arc::new(context()), Arc::new(Ed25519Fx));
    backend.set_bootstrapped(bootstrapped);
    backend
}

pub fn backend(bootstrapped: bool) -> Backend {
    backend_with(config(true, true), bootstrapped)
}

pub fn transformation(subnet: Id) -> SubnetTransformation {
    SubnetTransformation {
        subnet,
        asset_id: SUBNET_ASSET,
        min_validator_stake: 10,
        max_validator_stake: 1_000,
        min_stake_duration: 60,
        max_stake_duration: 10_000,
        min_delegation_fee: 0,
        min_delegator_stake: 1,
        max_validator_weight_factor: 3,
    }
}

pub fn owners_of(key: &SigningKey) -> OutputOwners {
    OutputOwners {
        locktime: 0,
        threshold: 1,
        addrs: vec![address_of(key)],
    }
}

pub fn random_node_id() -> NodeId {
    NodeId(rand::random())
}

pub fn staker(
    subnet_id: Id,
    node_id: NodeId,
    weight: u64,
    start_time: u64,
    end_time: u64,
    priority: Priority,
) -> Staker {
    Staker {
        tx_id: Id(rand::random()),
        node_id,
        subnet_id,
        weight,
        start_time,
        end_time,
        potential_reward: 0,
        priority,
    }
}

/// Lookups [`FaultyChain`] fails with a database error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    CurrentValidators,
    PendingValidators,
    Delegators,
    Transformations,
}

/// Reads through to `inner` except for the lookups named by `fault`.
pub struct FaultyChain<'a> {
    pub inner: &'a dyn Chain,
    pub fault: Fault,
}

impl<'a> FaultyChain<'a> {
    pub fn new(inner: &'a dyn Chain, fault: Fault) -> Self {
        Self { inner, fault }
    }

    fn check(&self, lookup: Fault) -> Result<(), StateError> {
        if self.fault == lookup {
            return Err(StateError::Database(format!("{:?} unavailable", lookup)));
        }
        Ok(())
    }
}

impl Chain for FaultyChain<'_> {
    fn timestamp(&self) -> u64 {
        self.inner.timestamp()
    }

    fn get_current_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError> {
        self.check(Fault::CurrentValidators)?;
        self.inner.get_current_validator(subnet_id, node_id)
    }

    fn get_pending_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Staker, StateError> {
        self.check(Fault::PendingValidators)?;
        self.inner.get_pending_validator(subnet_id, node_id)
    }

    fn get_current_delegators(&self, subnet_id: Id, node_id: NodeId) -> Result<Vec<Staker>, StateError> {
        self.check(Fault::Delegators)?;
        self.inner.get_current_delegators(subnet_id, node_id)
    }

    fn get_pending_delegators(&self, subnet_id: Id, node_id: NodeId) -> Result<Vec<Staker>, StateError> {
        self.check(Fault::Delegators)?;
        self.inner.get_pending_delegators(subnet_id, node_id)
    }

    fn get_subnet_transformation(&self, subnet_id: Id) -> Result<SubnetTransformation, StateError> {
        self.check(Fault::Transformations)?;
        self.inner.get_subnet_transformation(subnet_id)
    }

    fn get_subnet_owner(&self, subnet_id: Id) -> Result<OutputOwners, StateError> {
        self.inner.get_subnet_owner(subnet_id)
    }

    fn get_utxo(&self, utxo_id: &UtxoId) -> Result<Utxo, StateError> {
        self.inner.get_utxo(utxo_id)
    }
}

/// A bootstrapped backend over an in-memory chain at [`GENESIS_TIME`], with
/// a funded key and an untransformed [`SUBNET`] owned by `subnet_owner`.
pub struct TestEnv {
    pub backend: Backend,
    pub state: MemoryState,
    pub funder: SigningKey,
    pub subnet_owner: SigningKey,
    next_utxo: u32,
}

impl TestEnv {
    pub fn new(durango: bool) -> Self {
        Self::with_config(config(true, durango))
    }

    pub fn with_config(config: Config) -> Self {
        init_logger();
        let subnet_owner = SigningKey::from_bytes(&[0x0b; 32]);
        let mut state = MemoryState::new(GENESIS_TIME);
        state.set_subnet_owner(SUBNET, owners_of(&subnet_owner));
        Self {
            backend: backend_with(config, true),
            state,
            funder: SigningKey::from_bytes(&[0x0f; 32]),
            subnet_owner,
            next_utxo: 0,
        }
    }

    pub fn now(&self) -> u64 {
        self.state.timestamp()
    }

    pub fn owner(&self) -> OutputOwners {
        owners_of(&self.funder)
    }

    /// Adds a UTXO owned by the funder and returns an input spending it.
    pub fn fund(&mut self, asset_id: Id, amount: u64) -> TransferableInput {
        self.next_utxo += 1;
        let utxo_id = UtxoId {
            tx_id: Id::digest(&self.next_utxo.to_be_bytes()),
            output_index: 0,
        };
        self.state.add_utxo(Utxo {
            utxo_id,
            asset_id,
            amount,
            owners: self.owner(),
        });
        TransferableInput {
            utxo_id,
            asset_id,
            amount,
            sig_indices: vec![0],
        }
    }

    pub fn base_tx(&self, mut ins: Vec<TransferableInput>, outs: Vec<TransferableOutput>) -> BaseTx {
        ins.sort_by_key(|input| input.utxo_id);
        let ctx = context();
        BaseTx {
            network_id: ctx.network_id,
            blockchain_id: ctx.chain_id,
            outs,
            ins,
            memo: Vec::new(),
        }
    }

    pub fn output(&self, asset_id: Id, amount: u64) -> TransferableOutput {
        TransferableOutput {
            asset_id,
            amount,
            owners: self.owner(),
        }
    }

    /// Funds `stake` of `asset_id` plus `fee` of the primary asset.
    fn funded_base(&mut self, asset_id: Id, stake: u64, fee: u64) -> BaseTx {
        let ins = if asset_id == AVAX {
            vec![self.fund(AVAX, stake + fee)]
        } else {
            vec![self.fund(asset_id, stake), self.fund(AVAX, fee)]
        };
        self.base_tx(ins, Vec::new())
    }

    /// Signs every input with the funder and the subnet authorization, if
    /// any, with the subnet owner.
    pub fn sign(&self, unsigned: UnsignedTx) -> Tx {
        self.sign_with(unsigned, &self.subnet_owner)
    }

    pub fn sign_with(&self, unsigned: UnsignedTx, subnet_signer: &SigningKey) -> Tx {
        let mut signers: Vec<Vec<&SigningKey>> = vec![vec![&self.funder]; unsigned.base().ins.len()];
        if unsigned.has_subnet_auth() {
            signers.push(vec![subnet_signer]);
        }
        Tx::new(unsigned).unwrap().sign(&signers)
    }

    pub fn put_current_validator(
        &mut self,
        subnet_id: Id,
        node_id: NodeId,
        weight: u64,
        start_time: u64,
        end_time: u64,
        priority: Priority,
    ) -> Staker {
        let validator = staker(subnet_id, node_id, weight, start_time, end_time, priority);
        self.state.put_current_validator(validator.clone());
        validator
    }

    /// A primary network validator active from a day ago for the next 100 days.
    pub fn put_primary_validator(&mut self, node_id: NodeId, weight: u64) -> Staker {
        let now = self.now();
        self.put_current_validator(
            PRIMARY_NETWORK_ID,
            node_id,
            weight,
            now - DAY,
            now + 100 * DAY,
            Priority::PermissionlessValidator,
        )
    }

    pub fn add_validator_body(&mut self, node_id: NodeId, weight: u64, start: u64, end: u64) -> AddValidatorTx {
        AddValidatorTx {
            base: self.funded_base(AVAX, weight, VALIDATOR_FEE),
            validator: Validator { node_id, start, end, weight },
            stake_outs: vec![self.output(AVAX, weight)],
            rewards_owner: self.owner(),
            delegation_shares: MIN_DELEGATION_FEE,
        }
    }

    pub fn add_delegator_body(&mut self, node_id: NodeId, weight: u64, start: u64, end: u64) -> AddDelegatorTx {
        AddDelegatorTx {
            base: self.funded_base(AVAX, weight, DELEGATOR_FEE),
            validator: Validator { node_id, start, end, weight },
            stake_outs: vec![self.output(AVAX, weight)],
            delegation_rewards_owner: self.owner(),
        }
    }

    pub fn add_subnet_validator_body(
        &mut self,
        node_id: NodeId,
        weight: u64,
        start: u64,
        end: u64,
    ) -> AddSubnetValidatorTx {
        AddSubnetValidatorTx {
            base: self.funded_base(AVAX, 0, SUBNET_VALIDATOR_FEE),
            subnet_validator: SubnetValidator {
                validator: Validator { node_id, start, end, weight },
                subnet: SUBNET,
            },
            subnet_auth: SubnetAuth { sig_indices: vec![0] },
        }
    }

    pub fn remove_subnet_validator_body(&mut self, node_id: NodeId) -> RemoveSubnetValidatorTx {
        RemoveSubnetValidatorTx {
            base: self.funded_base(AVAX, 0, TX_FEE),
            node_id,
            subnet: SUBNET,
            subnet_auth: SubnetAuth { sig_indices: vec![0] },
        }
    }

    pub fn add_permissionless_validator_body(
        &mut self,
        subnet: Id,
        node_id: NodeId,
        asset_id: Id,
        weight: u64,
        start: u64,
        end: u64,
    ) -> AddPermissionlessValidatorTx {
        let fee = if subnet == PRIMARY_NETWORK_ID { VALIDATOR_FEE } else { SUBNET_VALIDATOR_FEE };
        AddPermissionlessValidatorTx {
            base: self.funded_base(asset_id, weight, fee),
            validator: Validator { node_id, start, end, weight },
            subnet,
            stake_outs: vec![self.output(asset_id, weight)],
            validator_rewards_owner: self.owner(),
            delegator_rewards_owner: self.owner(),
            delegation_shares: MIN_DELEGATION_FEE,
        }
    }

    pub fn add_permissionless_delegator_body(
        &mut self,
        subnet: Id,
        node_id: NodeId,
        asset_id: Id,
        weight: u64,
        start: u64,
        end: u64,
    ) -> AddPermissionlessDelegatorTx {
        let fee = if subnet == PRIMARY_NETWORK_ID { DELEGATOR_FEE } else { SUBNET_DELEGATOR_FEE };
        AddPermissionlessDelegatorTx {
            base: self.funded_base(asset_id, weight, fee),
            validator: Validator { node_id, start, end, weight },
            subnet,
            stake_outs: vec![self.output(asset_id, weight)],
            delegation_rewards_owner: self.owner(),
        }
    }

    pub fn transfer_subnet_ownership_body(&mut self, owner: OutputOwners) -> TransferSubnetOwnershipTx {
        TransferSubnetOwnershipTx {
            base: self.funded_base(AVAX, 0, TX_FEE),
            subnet: SUBNET,
            subnet_auth: SubnetAuth { sig_indices: vec![0] },
            owner,
        }
    }
}
