//! Staking bounds that apply to a given subnet.
//!
//! The primary network takes its bounds from [`crate::config::Config`]. A subnet only has
//! bounds once it has been transformed to elastic staking; until then it can
//! only be joined through the permissioned path.

use std::time::Duration;

use crate::config::MAX_VALIDATOR_WEIGHT_FACTOR;
use crate::executor::{Backend, VerifyError};
use crate::ids::{Id, PRIMARY_NETWORK_ID};
use crate::state::{Chain, StateError, SubnetTransformation};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorRules {
    pub asset_id: Id,
    pub min_validator_stake: u64,
    pub max_validator_stake: u64,
    pub min_stake_duration: Duration,
    pub max_stake_duration: Duration,
    pub min_delegation_fee: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegatorRules {
    pub asset_id: Id,
    pub min_delegator_stake: u64,
    pub max_validator_stake: u64,
    pub min_stake_duration: Duration,
    pub max_stake_duration: Duration,
    pub max_validator_weight_factor: u64,
}

pub fn get_validator_rules(
    backend: &Backend,
    state: &dyn Chain,
    subnet_id: Id,
) -> Result<ValidatorRules, VerifyError> {
    if subnet_id == PRIMARY_NETWORK_ID {
        let config = &backend.config;
        return Ok(ValidatorRules {
            asset_id: backend.ctx.avax_asset_id,
            min_validator_stake: config.min_validator_stake,
            max_validator_stake: config.max_validator_stake,
            min_stake_duration: config.min_stake_duration,
            max_stake_duration: config.max_stake_duration,
            min_delegation_fee: config.min_delegation_fee,
        });
    }

    let transformation = get_transformation(state, subnet_id)?;
    Ok(ValidatorRules {
        asset_id: transformation.asset_id,
        min_validator_stake: transformation.min_validator_stake,
        max_validator_stake: transformation.max_validator_stake,
        min_stake_duration: Duration::from_secs(transformation.min_stake_duration.into()),
        max_stake_duration: Duration::from_secs(transformation.max_stake_duration.into()),
        min_delegation_fee: transformation.min_delegation_fee,
    })
}

pub fn get_delegator_rules(
    backend: &Backend,
    state: &dyn Chain,
    subnet_id: Id,
) -> Result<DelegatorRules, VerifyError> {
    if subnet_id == PRIMARY_NETWORK_ID {
        let config = &backend.config;
        return Ok(DelegatorRules {
            asset_id: backend.ctx.avax_asset_id,
            min_delegator_stake: config.min_delegator_stake,
            max_validator_stake: config.max_validator_stake,
            min_stake_duration: config.min_stake_duration,
            max_stake_duration: config.max_stake_duration,
            max_validator_weight_factor: MAX_VALIDATOR_WEIGHT_FACTOR,
        });
    }

    let transformation = get_transformation(state, subnet_id)?;
    Ok(DelegatorRules {
        asset_id: transformation.asset_id,
        min_delegator_stake: transformation.min_delegator_stake,
        max_validator_stake: transformation.max_validator_stake,
        min_stake_duration: Duration::from_secs(transformation.min_stake_duration.into()),
        max_stake_duration: Duration::from_secs(transformation.max_stake_duration.into()),
        max_validator_weight_factor: transformation.max_validator_weight_factor.into(),
    })
}

fn get_transformation(state: &dyn Chain, subnet_id: Id) -> Result<SubnetTransformation, VerifyError> {
    match state.get_subnet_transformation(subnet_id) {
        Ok(transformation) => Ok(transformation),
        Err(StateError::NotFound) => Err(VerifyError::IsNotTransformSubnetTx(subnet_id)),
        Err(err) => Err(err.into()),
    }
}
