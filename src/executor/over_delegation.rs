//! Peak delegated weight on a validator over a time window.
//!
//! The weight on a validator only changes when a delegator starts or stops,
//! so the peak over a window is found by walking those change points in time
//! order rather than sampling every instant.

use log::trace;

use crate::executor::VerifyError;
use crate::state::{Chain, Staker};
use crate::utils::math::{add64, max, sub64};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Change {
    // Declared first so that at equal times additions are applied before
    // removals.
    Added,
    Removed,
}

/// Maximum total weight (validator plus delegators) staked on `validator`
/// at any point within `[start, end]`.
pub fn get_max_weight(
    state: &dyn Chain,
    validator: &Staker,
    start: u64,
    end: u64,
) -> Result<u64, VerifyError> {
    let current = state.get_current_delegators(validator.subnet_id, validator.node_id)?;
    let pending = state.get_pending_delegators(validator.subnet_id, validator.node_id)?;

    let mut current_weight = validator.weight;
    for delegator in &current {
        current_weight = add64(current_weight, delegator.weight).map_err(|_| VerifyError::StakeOverflow)?;
    }

    let mut changes: Vec<(u64, Change, u64)> = Vec::with_capacity(current.len() + 2 * pending.len());
    changes.extend(current.iter().map(|d| (d.end_time, Change::Removed, d.weight)));
    for delegator in &pending {
        changes.push((delegator.start_time, Change::Added, delegator.weight));
        changes.push((delegator.end_time, Change::Removed, delegator.weight));
    }
    changes.sort_unstable();

    let mut current_max = 0;
    for (time, change, weight) in changes {
        if time > end {
            break;
        }
        if time >= start {
            current_max = max(current_max, current_weight);
        }
        current_weight = match change {
            Change::Added => add64(current_weight, weight),
            Change::Removed => sub64(current_weight, weight),
        }
        .map_err(|_| VerifyError::StakeOverflow)?;
        trace!(
            "delegation change on {} at {}: {:?} {}, weight now {}",
            validator.node_id,
            time,
            change,
            weight,
            current_weight
        );
    }

    Ok(max(current_max, current_weight))
}

/// Whether adding `delegator` would push the weight on `validator` above
/// `weight_limit` at any point during the delegation.
pub fn over_delegated(
    state: &dyn Chain,
    validator: &Staker,
    weight_limit: u64,
    delegator: &Staker,
) -> Result<bool, VerifyError> {
    let max_weight = get_max_weight(state, validator, delegator.start_time, delegator.end_time)?;
    let new_max_weight = add64(max_weight, delegator.weight).map_err(|_| VerifyError::StakeOverflow)?;
    Ok(new_max_weight > weight_limit)
}
