//! Semantic verification of the staking transaction kinds against a chain
//! state snapshot.
//!
//! Every verifier follows the same skeleton:
//! - syntactic verification of the signed transaction
//! - bound checks, in a fixed order where the first failing check wins
//! - early return when the node is still bootstrapping
//! - state-dependent checks (start time, duplicates, containment, delegation)
//! - authorization and flow check
//! - the future start time check, always last, so callers can tell a
//!   premature transaction apart from an invalid one

use std::collections::BTreeMap;
use std::time::Duration;

use log::debug;

use crate::config::{ProtocolRules, MAX_FUTURE_START_TIME, MAX_VALIDATOR_WEIGHT_FACTOR};
use crate::cryptography::Credential;
use crate::executor::rules::{get_delegator_rules, get_validator_rules};
use crate::executor::subnet_auth::{verify_poa_subnet_authorization, verify_subnet_authorization};
use crate::executor::{over_delegated, Backend, VerifyError};
use crate::ids::{Id, NodeId, PRIMARY_NETWORK_ID};
use crate::state::{get_validator, Chain, StateError, Staker};
use crate::txs::{
    AddDelegatorTx, AddPermissionlessDelegatorTx, AddPermissionlessValidatorTx,
    AddSubnetValidatorTx, AddValidatorTx, BaseTx, RemoveSubnetValidatorTx, StakerTx,
    SyntacticError, TransferSubnetOwnershipTx, TransferableOutput, Tx, Validator,
};
use crate::utils::bounded_by;
use crate::utils::math::{min, mul64};

/// Verifies an [`AddValidatorTx`] and returns the outputs that should be
/// handed back if the validator is never added to the staking set.
pub fn verify_add_validator_tx(
    backend: &Backend,
    state: &dyn Chain,
    tx: &Tx,
    body: &AddValidatorTx,
) -> Result<Vec<TransferableOutput>, VerifyError> {
    tx.syntactic_verify(&backend.ctx)?;

    let config = &backend.config;
    let chain_time = state.timestamp();
    let rules = config.rules_at(chain_time);
    let duration = staking_duration(rules, chain_time, &body.validator);

    if body.validator.weight < config.min_validator_stake {
        return Err(VerifyError::WeightTooSmall);
    }
    if body.validator.weight > config.max_validator_stake {
        return Err(VerifyError::WeightTooLarge);
    }
    if body.delegation_shares < config.min_delegation_fee {
        return Err(VerifyError::InsufficientDelegationFee);
    }
    verify_stake_duration(duration, config.min_stake_duration, config.max_stake_duration)?;

    let outs = outputs_with_stake(&body.base.outs, &body.stake_outs);

    if !backend.is_bootstrapped() {
        debug!("skipping state checks for {}: not bootstrapped", tx.id());
        return Ok(outs);
    }

    verify_staker_start_time(rules, chain_time, body.validator.start)?;

    let node_id = body.validator.node_id;
    match get_validator(state, PRIMARY_NETWORK_ID, node_id) {
        Ok(_) => return Err(VerifyError::AlreadyValidator(node_id)),
        Err(StateError::NotFound) => {}
        Err(err) => return Err(err.into()),
    }

    verify_flow(
        backend,
        state,
        tx,
        &body.base,
        &outs,
        tx.creds(),
        config.add_primary_network_validator_fee,
    )?;

    verify_staker_starts_soon(rules, chain_time, body.validator.start)?;
    Ok(outs)
}

/// Verifies an [`AddSubnetValidatorTx`], which adds a validator to a subnet
/// administered by its owner.
pub fn verify_add_subnet_validator_tx(
    backend: &Backend,
    state: &dyn Chain,
    tx: &Tx,
    body: &AddSubnetValidatorTx,
) -> Result<(), VerifyError> {
    tx.syntactic_verify(&backend.ctx)?;

    let config = &backend.config;
    let chain_time = state.timestamp();
    let rules = config.rules_at(chain_time);
    let validator = &body.subnet_validator.validator;
    let subnet_id = body.subnet_validator.subnet;
    let duration = staking_duration(rules, chain_time, validator);

    verify_stake_duration(duration, config.min_stake_duration, config.max_stake_duration)?;

    if !backend.is_bootstrapped() {
        debug!("skipping state checks for {}: not bootstrapped", tx.id());
        return Ok(());
    }

    verify_staker_start_time(rules, chain_time, validator.start)?;

    match get_validator(state, subnet_id, validator.node_id) {
        Ok(_) => {
            return Err(VerifyError::DuplicateValidator {
                node_id: validator.node_id,
                subnet_id,
            })
        }
        Err(StateError::NotFound) => {}
        Err(err) => return Err(err.into()),
    }

    verify_subnet_validator_primary_network_requirements(rules, state, validator)?;

    let base_creds =
        verify_poa_subnet_authorization(backend, state, tx, subnet_id, &body.subnet_auth)?;

    verify_flow(
        backend,
        state,
        tx,
        &body.base,
        &body.base.outs,
        base_creds,
        config.add_subnet_validator_fee,
    )?;

    verify_staker_starts_soon(rules, chain_time, validator.start)
}

/// Verifies a [`RemoveSubnetValidatorTx`]. Returns the staker being removed
/// and whether it is in the current (rather than pending) set.
pub fn verify_remove_subnet_validator_tx(
    backend: &Backend,
    state: &dyn Chain,
    tx: &Tx,
    body: &RemoveSubnetValidatorTx,
) -> Result<(Staker, bool), VerifyError> {
    tx.syntactic_verify(&backend.ctx)?;

    let not_validator = || VerifyError::NotValidator {
        node_id: body.node_id,
        subnet_id: body.subnet,
    };
    let (staker, is_current) = match state.get_current_validator(body.subnet, body.node_id) {
        Ok(staker) => (staker, true),
        Err(StateError::NotFound) => match state.get_pending_validator(body.subnet, body.node_id) {
            Ok(staker) => (staker, false),
            Err(StateError::NotFound) => return Err(not_validator()),
            Err(err) => return Err(err.into()),
        },
        Err(err) => return Err(err.into()),
    };

    if !staker.priority.is_permissioned_validator() {
        return Err(VerifyError::RemovePermissionlessValidator);
    }

    if !backend.is_bootstrapped() {
        debug!("skipping state checks for {}: not bootstrapped", tx.id());
        return Ok((staker, is_current));
    }

    let base_creds = verify_subnet_authorization(backend, state, tx, body.subnet, &body.subnet_auth)?;

    verify_flow(
        backend,
        state,
        tx,
        &body.base,
        &body.base.outs,
        base_creds,
        backend.config.tx_fee,
    )?;

    Ok((staker, is_current))
}

/// Verifies an [`AddDelegatorTx`]. Returns the delegator to add and the
/// outputs that should be handed back if it is never added to the staking
/// set.
pub fn verify_add_delegator_tx(
    backend: &Backend,
    state: &dyn Chain,
    tx: &Tx,
    body: &AddDelegatorTx,
) -> Result<(Staker, Vec<TransferableOutput>), VerifyError> {
    tx.syntactic_verify(&backend.ctx)?;

    let config = &backend.config;
    let chain_time = state.timestamp();
    let rules = config.rules_at(chain_time);
    let duration = staking_duration(rules, chain_time, &body.validator);

    verify_stake_duration(duration, config.min_stake_duration, config.max_stake_duration)?;
    if body.validator.weight < config.min_delegator_stake {
        return Err(VerifyError::WeightTooSmall);
    }

    let outs = outputs_with_stake(&body.base.outs, &body.stake_outs);
    let delegator = new_staker(tx.id(), body, rules, chain_time);

    if !backend.is_bootstrapped() {
        debug!("skipping state checks for {}: not bootstrapped", tx.id());
        return Ok((delegator, outs));
    }

    verify_staker_start_time(rules, chain_time, body.validator.start)?;

    let primary_validator = lookup_validator(state, PRIMARY_NETWORK_ID, body.validator.node_id)?;

    let mut maximum_weight = weight_ceiling(MAX_VALIDATOR_WEIGHT_FACTOR, primary_validator.weight);
    if rules.apricot_phase3 {
        maximum_weight = min(maximum_weight, config.max_validator_stake);
    }

    verify_delegation(state, &primary_validator, maximum_weight, &delegator)?;

    verify_flow(
        backend,
        state,
        tx,
        &body.base,
        &outs,
        tx.creds(),
        config.add_primary_network_delegator_fee,
    )?;

    verify_staker_starts_soon(rules, chain_time, body.validator.start)?;
    Ok((delegator, outs))
}

/// Verifies an [`AddPermissionlessValidatorTx`] against the rules of the
/// primary network or of the transformed subnet it targets.
pub fn verify_add_permissionless_validator_tx(
    backend: &Backend,
    state: &dyn Chain,
    tx: &Tx,
    body: &AddPermissionlessValidatorTx,
) -> Result<(), VerifyError> {
    tx.syntactic_verify(&backend.ctx)?;

    if !backend.is_bootstrapped() {
        debug!("skipping state checks for {}: not bootstrapped", tx.id());
        return Ok(());
    }

    let chain_time = state.timestamp();
    let rules = backend.config.rules_at(chain_time);
    let duration = staking_duration(rules, chain_time, &body.validator);

    verify_staker_start_time(rules, chain_time, body.validator.start)?;

    let validator_rules = get_validator_rules(backend, state, body.subnet)?;

    let staked_asset_id = body.staked_asset_id().ok_or(SyntacticError::NoStake)?;
    if body.validator.weight < validator_rules.min_validator_stake {
        return Err(VerifyError::WeightTooSmall);
    }
    if body.validator.weight > validator_rules.max_validator_stake {
        return Err(VerifyError::WeightTooLarge);
    }
    if body.delegation_shares < validator_rules.min_delegation_fee {
        return Err(VerifyError::InsufficientDelegationFee);
    }
    verify_stake_duration(
        duration,
        validator_rules.min_stake_duration,
        validator_rules.max_stake_duration,
    )?;
    if staked_asset_id != validator_rules.asset_id {
        return Err(VerifyError::WrongStakedAssetId {
            expected: validator_rules.asset_id,
            actual: staked_asset_id,
        });
    }

    match get_validator(state, body.subnet, body.validator.node_id) {
        Ok(_) => {
            return Err(VerifyError::DuplicateValidator {
                node_id: body.validator.node_id,
                subnet_id: body.subnet,
            })
        }
        Err(StateError::NotFound) => {}
        Err(err) => return Err(err.into()),
    }

    let fee = if body.subnet != PRIMARY_NETWORK_ID {
        verify_subnet_validator_primary_network_requirements(rules, state, &body.validator)?;
        backend.config.add_subnet_validator_fee
    } else {
        backend.config.add_primary_network_validator_fee
    };

    let outs = outputs_with_stake(&body.base.outs, &body.stake_outs);
    verify_flow(backend, state, tx, &body.base, &outs, tx.creds(), fee)?;

    verify_staker_starts_soon(rules, chain_time, body.validator.start)
}

/// Verifies an [`AddPermissionlessDelegatorTx`] against the rules of the
/// primary network or of the transformed subnet it targets, and returns the
/// delegator to add.
pub fn verify_add_permissionless_delegator_tx(
    backend: &Backend,
    state: &dyn Chain,
    tx: &Tx,
    body: &AddPermissionlessDelegatorTx,
) -> Result<Staker, VerifyError> {
    tx.syntactic_verify(&backend.ctx)?;

    let chain_time = state.timestamp();
    let rules = backend.config.rules_at(chain_time);
    let delegator = new_staker(tx.id(), body, rules, chain_time);

    if !backend.is_bootstrapped() {
        debug!("skipping state checks for {}: not bootstrapped", tx.id());
        return Ok(delegator);
    }

    let duration = staking_duration(rules, chain_time, &body.validator);

    verify_staker_start_time(rules, chain_time, body.validator.start)?;

    let delegator_rules = get_delegator_rules(backend, state, body.subnet)?;

    let staked_asset_id = body.staked_asset_id().ok_or(SyntacticError::NoStake)?;
    if body.validator.weight < delegator_rules.min_delegator_stake {
        return Err(VerifyError::WeightTooSmall);
    }
    verify_stake_duration(
        duration,
        delegator_rules.min_stake_duration,
        delegator_rules.max_stake_duration,
    )?;
    if staked_asset_id != delegator_rules.asset_id {
        return Err(VerifyError::WrongStakedAssetId {
            expected: delegator_rules.asset_id,
            actual: staked_asset_id,
        });
    }

    let validator = lookup_validator(state, body.subnet, body.validator.node_id)?;

    let maximum_weight = min(
        weight_ceiling(delegator_rules.max_validator_weight_factor, validator.weight),
        delegator_rules.max_validator_stake,
    );

    verify_delegation(state, &validator, maximum_weight, &delegator)?;

    let fee = if body.subnet != PRIMARY_NETWORK_ID {
        // Only permissionless validators accept delegations; the
        // permissioned validator kind carries no rewards owner.
        if validator.priority.is_permissioned_validator() {
            return Err(VerifyError::DelegateToPermissionedValidator);
        }
        backend.config.add_subnet_delegator_fee
    } else {
        backend.config.add_primary_network_delegator_fee
    };

    let outs = outputs_with_stake(&body.base.outs, &body.stake_outs);
    verify_flow(backend, state, tx, &body.base, &outs, tx.creds(), fee)?;

    verify_staker_starts_soon(rules, chain_time, body.validator.start)?;
    Ok(delegator)
}

/// Verifies a [`TransferSubnetOwnershipTx`]. Only available once Durango is
/// active.
pub fn verify_transfer_subnet_ownership_tx(
    backend: &Backend,
    state: &dyn Chain,
    tx: &Tx,
    body: &TransferSubnetOwnershipTx,
) -> Result<(), VerifyError> {
    if !backend.config.rules_at(state.timestamp()).durango {
        return Err(VerifyError::UpgradeNotActive);
    }

    tx.syntactic_verify(&backend.ctx)?;

    if !backend.is_bootstrapped() {
        debug!("skipping state checks for {}: not bootstrapped", tx.id());
        return Ok(());
    }

    let base_creds = verify_subnet_authorization(backend, state, tx, body.subnet, &body.subnet_auth)?;

    verify_flow(
        backend,
        state,
        tx,
        &body.base,
        &body.base.outs,
        base_creds,
        backend.config.tx_fee,
    )
}

/// Builds the staker an accepted transaction adds. Once Durango is active
/// stakers start immediately at chain time; before that they wait in the
/// pending set for their declared start.
pub fn new_staker<T: StakerTx + ?Sized>(
    tx_id: Id,
    body: &T,
    rules: ProtocolRules,
    chain_time: u64,
) -> Staker {
    if rules.durango {
        // Rewards are computed when the staker leaves the set.
        Staker::new_current(tx_id, body, chain_time, 0)
    } else {
        Staker::new_pending(tx_id, body)
    }
}

/// The base outputs followed by the stake outputs.
pub fn outputs_with_stake(
    outs: &[TransferableOutput],
    stake_outs: &[TransferableOutput],
) -> Vec<TransferableOutput> {
    let mut all = Vec::with_capacity(outs.len() + stake_outs.len());
    all.extend_from_slice(outs);
    all.extend_from_slice(stake_outs);
    all
}

/// Time from the staker's effective start to its end. `None` when the end
/// is not after the start.
fn staking_duration(rules: ProtocolRules, chain_time: u64, validator: &Validator) -> Option<Duration> {
    let start = if rules.durango { chain_time } else { validator.start };
    match validator.end.checked_sub(start) {
        Some(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}

fn verify_stake_duration(
    duration: Option<Duration>,
    min_duration: Duration,
    max_duration: Duration,
) -> Result<(), VerifyError> {
    match duration {
        None => Err(VerifyError::StakeTooShort),
        Some(duration) if duration < min_duration => Err(VerifyError::StakeTooShort),
        Some(duration) if duration > max_duration => Err(VerifyError::StakeTooLong),
        Some(_) => Ok(()),
    }
}

fn verify_staker_start_time(rules: ProtocolRules, chain_time: u64, start: u64) -> Result<(), VerifyError> {
    if !rules.durango && chain_time >= start {
        return Err(VerifyError::TimestampNotBeforeStartTime {
            chain_time,
            start_time: start,
        });
    }
    Ok(())
}

fn verify_staker_starts_soon(rules: ProtocolRules, chain_time: u64, start: u64) -> Result<(), VerifyError> {
    if !rules.durango {
        let max_start_time = chain_time.saturating_add(MAX_FUTURE_START_TIME.as_secs());
        if start > max_start_time {
            return Err(VerifyError::FutureStakeTime);
        }
    }
    Ok(())
}

/// A subnet validator must validate the primary network for the whole
/// period it validates the subnet.
fn verify_subnet_validator_primary_network_requirements(
    rules: ProtocolRules,
    state: &dyn Chain,
    validator: &Validator,
) -> Result<(), VerifyError> {
    let primary_validator = lookup_validator(state, PRIMARY_NETWORK_ID, validator.node_id)?;

    let chain_time = state.timestamp();
    let start = if rules.durango { chain_time } else { validator.start };
    if !bounded_by(
        start,
        validator.end,
        primary_validator.start_time,
        primary_validator.end_time,
    ) {
        return Err(VerifyError::PeriodMismatch);
    }
    Ok(())
}

fn lookup_validator(state: &dyn Chain, subnet_id: Id, node_id: NodeId) -> Result<Staker, VerifyError> {
    get_validator(state, subnet_id, node_id).map_err(|err| match err {
        StateError::NotFound => VerifyError::NotValidator { node_id, subnet_id },
        other => other.into(),
    })
}

/// `factor * validator_weight`, saturating at `u64::MAX`.
fn weight_ceiling(factor: u64, validator_weight: u64) -> u64 {
    mul64(factor, validator_weight).unwrap_or(u64::MAX)
}

/// The delegation must sit inside the validator's period and keep the
/// validator under `maximum_weight` throughout.
fn verify_delegation(
    state: &dyn Chain,
    validator: &Staker,
    maximum_weight: u64,
    delegator: &Staker,
) -> Result<(), VerifyError> {
    if !bounded_by(
        delegator.start_time,
        delegator.end_time,
        validator.start_time,
        validator.end_time,
    ) {
        return Err(VerifyError::PeriodMismatch);
    }
    if over_delegated(state, validator, maximum_weight, delegator)? {
        return Err(VerifyError::OverDelegated);
    }
    Ok(())
}

fn verify_flow(
    backend: &Backend,
    state: &dyn Chain,
    tx: &Tx,
    base: &BaseTx,
    outs: &[TransferableOutput],
    creds: &[Credential],
    fee: u64,
) -> Result<(), VerifyError> {
    let fees = BTreeMap::from([(backend.ctx.avax_asset_id, fee)]);
    backend
        .flow_checker
        .verify_spend(tx, state, &base.ins, outs, creds, &fees)
        .map_err(VerifyError::FlowCheckFailed)
}
