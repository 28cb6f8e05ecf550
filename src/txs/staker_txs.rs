//! Bodies of the staking transaction kinds.
//!
//! Each body carries a [`BaseTx`] for fees and change plus its kind-specific
//! fields, and knows how to check its own structure without chain state.

use serde::{Deserialize, Serialize};

use crate::config::{Context, PERCENT_DENOMINATOR};
use crate::ids::{Id, NodeId, PRIMARY_NETWORK_ID};
use crate::state::Priority;
use crate::txs::components::{BaseTx, OutputOwners, SubnetAuth, TransferableOutput};
use crate::txs::validator::{SubnetValidator, Validator};
use crate::txs::SyntacticError;

/// A transaction that, once accepted, becomes a [`crate::state::Staker`].
pub trait StakerTx {
    fn validator(&self) -> &Validator;
    fn subnet_id(&self) -> Id;
    fn priority(&self) -> Priority;

    fn node_id(&self) -> NodeId {
        self.validator().node_id
    }

    fn weight(&self) -> u64 {
        self.validator().weight
    }

    fn start_time(&self) -> u64 {
        self.validator().start
    }

    fn end_time(&self) -> u64 {
        self.validator().end
    }
}

/// Adds a primary network validator staking the primary asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake_outs: Vec<TransferableOutput>,
    pub rewards_owner: OutputOwners,
    /// Fee charged to delegators, in millionths.
    pub delegation_shares: u32,
}

/// Adds a validator to a permissioned (not transformed) subnet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSubnetValidatorTx {
    pub base: BaseTx,
    pub subnet_validator: SubnetValidator,
    pub subnet_auth: SubnetAuth,
}

/// Removes a permissioned validator from a subnet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveSubnetValidatorTx {
    pub base: BaseTx,
    pub node_id: NodeId,
    pub subnet: Id,
    pub subnet_auth: SubnetAuth,
}

/// Delegates primary asset stake to a primary network validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDelegatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub stake_outs: Vec<TransferableOutput>,
    pub delegation_rewards_owner: OutputOwners,
}

/// Adds a validator to the primary network or to a transformed subnet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPermissionlessValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub subnet: Id,
    pub stake_outs: Vec<TransferableOutput>,
    pub validator_rewards_owner: OutputOwners,
    pub delegator_rewards_owner: OutputOwners,
    pub delegation_shares: u32,
}

/// Delegates to a permissionless validator on the primary network or a
/// transformed subnet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPermissionlessDelegatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    pub subnet: Id,
    pub stake_outs: Vec<TransferableOutput>,
    pub delegation_rewards_owner: OutputOwners,
}

/// Replaces the owner allowed to administer a permissioned subnet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSubnetOwnershipTx {
    pub base: BaseTx,
    pub subnet: Id,
    pub subnet_auth: SubnetAuth,
    pub owner: OutputOwners,
}

impl AddValidatorTx {
    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        self.base.syntactic_verify(ctx)?;
        self.validator.verify()?;
        self.rewards_owner.verify()?;
        verify_delegation_shares(self.delegation_shares)?;
        verify_stake_outs(&self.stake_outs, self.validator.weight)?;
        verify_primary_asset_stake(&self.stake_outs, ctx)
    }
}

impl AddSubnetValidatorTx {
    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        self.base.syntactic_verify(ctx)?;
        if self.subnet_validator.subnet == PRIMARY_NETWORK_ID {
            return Err(SyntacticError::SubnetIsPrimaryNetwork);
        }
        self.subnet_validator.validator.verify()?;
        self.subnet_auth.verify()
    }
}

impl RemoveSubnetValidatorTx {
    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        self.base.syntactic_verify(ctx)?;
        if self.subnet == PRIMARY_NETWORK_ID {
            return Err(SyntacticError::SubnetIsPrimaryNetwork);
        }
        self.subnet_auth.verify()
    }
}

impl AddDelegatorTx {
    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        self.base.syntactic_verify(ctx)?;
        self.validator.verify()?;
        self.delegation_rewards_owner.verify()?;
        verify_stake_outs(&self.stake_outs, self.validator.weight)?;
        verify_primary_asset_stake(&self.stake_outs, ctx)
    }
}

impl AddPermissionlessValidatorTx {
    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        self.base.syntactic_verify(ctx)?;
        self.validator.verify()?;
        self.validator_rewards_owner.verify()?;
        self.delegator_rewards_owner.verify()?;
        verify_delegation_shares(self.delegation_shares)?;
        verify_stake_outs(&self.stake_outs, self.validator.weight)?;
        verify_single_staked_asset(&self.stake_outs)
    }

    /// Asset of the first stake output. Syntactic verification guarantees
    /// there is one and that all stake outputs share it.
    pub fn staked_asset_id(&self) -> Option<Id> {
        self.stake_outs.first().map(|out| out.asset_id)
    }
}

impl AddPermissionlessDelegatorTx {
    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        self.base.syntactic_verify(ctx)?;
        self.validator.verify()?;
        self.delegation_rewards_owner.verify()?;
        verify_stake_outs(&self.stake_outs, self.validator.weight)?;
        verify_single_staked_asset(&self.stake_outs)
    }

    pub fn staked_asset_id(&self) -> Option<Id> {
        self.stake_outs.first().map(|out| out.asset_id)
    }
}

impl TransferSubnetOwnershipTx {
    pub fn syntactic_verify(&self, ctx: &Context) -> Result<(), SyntacticError> {
        self.base.syntactic_verify(ctx)?;
        if self.subnet == PRIMARY_NETWORK_ID {
            return Err(SyntacticError::SubnetIsPrimaryNetwork);
        }
        self.subnet_auth.verify()?;
        self.owner.verify()
    }
}

impl StakerTx for AddValidatorTx {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn subnet_id(&self) -> Id {
        PRIMARY_NETWORK_ID
    }

    fn priority(&self) -> Priority {
        Priority::PermissionlessValidator
    }
}

impl StakerTx for AddSubnetValidatorTx {
    fn validator(&self) -> &Validator {
        &self.subnet_validator.validator
    }

    fn subnet_id(&self) -> Id {
        self.subnet_validator.subnet
    }

    fn priority(&self) -> Priority {
        Priority::PermissionedValidator
    }
}

impl StakerTx for AddDelegatorTx {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn subnet_id(&self) -> Id {
        PRIMARY_NETWORK_ID
    }

    fn priority(&self) -> Priority {
        Priority::PermissionlessDelegator
    }
}

impl StakerTx for AddPermissionlessValidatorTx {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn subnet_id(&self) -> Id {
        self.subnet
    }

    fn priority(&self) -> Priority {
        Priority::PermissionlessValidator
    }
}

impl StakerTx for AddPermissionlessDelegatorTx {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn subnet_id(&self) -> Id {
        self.subnet
    }

    fn priority(&self) -> Priority {
        Priority::PermissionlessDelegator
    }
}

fn verify_delegation_shares(shares: u32) -> Result<(), SyntacticError> {
    if shares > PERCENT_DENOMINATOR {
        return Err(SyntacticError::TooLargeDelegationShares(shares));
    }
    Ok(())
}

fn verify_stake_outs(stake_outs: &[TransferableOutput], weight: u64) -> Result<(), SyntacticError> {
    if stake_outs.is_empty() {
        return Err(SyntacticError::NoStake);
    }
    let mut total: u64 = 0;
    for out in stake_outs {
        out.verify()?;
        total = total
            .checked_add(out.amount)
            .ok_or(SyntacticError::StakeOverflow)?;
    }
    if !stake_outs.windows(2).all(|pair| pair[0].asset_id <= pair[1].asset_id) {
        return Err(SyntacticError::OutputsNotSorted);
    }
    if total != weight {
        return Err(SyntacticError::ValidatorWeightMismatch { staked: total, weight });
    }
    Ok(())
}

fn verify_primary_asset_stake(stake_outs: &[TransferableOutput], ctx: &Context) -> Result<(), SyntacticError> {
    if stake_outs.iter().any(|out| out.asset_id != ctx.avax_asset_id) {
        return Err(SyntacticError::StakeMustBePrimaryAsset);
    }
    Ok(())
}

fn verify_single_staked_asset(stake_outs: &[TransferableOutput]) -> Result<(), SyntacticError> {
    if let Some(first) = stake_outs.first() {
        if stake_outs.iter().any(|out| out.asset_id != first.asset_id) {
            return Err(SyntacticError::MultipleStakedAssets);
        }
    }
    Ok(())
}
