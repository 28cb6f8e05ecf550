//! Staking transaction execution.
//!
//! This module contains:
//! - the [`Backend`] shared by every verification call
//! - the seven staking verifiers and the [`verify_tx`] dispatch point
//! - the rule resolver, subnet authorization and over-delegation checks
//! - [`apply_verified`], which commits an accepted transaction to a state

pub mod apply;
pub mod error;
pub mod flow_check;
pub mod over_delegation;
pub mod rules;
pub mod staker_tx_verification;
pub mod subnet_auth;

#[cfg(test)]
mod tests;

pub use apply::apply_verified;
pub use error::VerifyError;
pub use flow_check::{FlowChecker, FlowError, UtxoFlowChecker};
pub use over_delegation::{get_max_weight, over_delegated};
pub use rules::{get_delegator_rules, get_validator_rules, DelegatorRules, ValidatorRules};
pub use staker_tx_verification::{
    verify_add_delegator_tx, verify_add_permissionless_delegator_tx,
    verify_add_permissionless_validator_tx, verify_add_subnet_validator_tx,
    verify_add_validator_tx, verify_remove_subnet_validator_tx,
    verify_transfer_subnet_ownership_tx,
};
pub use subnet_auth::{verify_poa_subnet_authorization, verify_subnet_authorization};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::config::{Config, Context};
use crate::cryptography::Fx;
use crate::ids::Id;
use crate::state::{Chain, Staker};
use crate::txs::{OutputOwners, TransferableOutput, Tx, UnsignedTx};
use staker_tx_verification::{new_staker, outputs_with_stake};

/// Read-only context shared by verification calls.
///
/// Cloning is cheap. The bootstrapped flag is the only piece that changes
/// over a node's lifetime, and verifiers only read it.
#[derive(Clone)]
pub struct Backend {
    pub config: Arc<Config>,
    pub ctx: Arc<Context>,
    pub fx: Arc<dyn Fx>,
    pub flow_checker: Arc<dyn FlowChecker>,
    bootstrapped: Arc<AtomicBool>,
}

impl Backend {
    /// Creates a backend whose flow checker spends UTXOs from chain state
    /// through `fx`. Starts out not bootstrapped.
    pub fn new(config: Arc<Config>, ctx: Arc<Context>, fx: Arc<dyn Fx>) -> Self {
        let flow_checker = Arc::new(UtxoFlowChecker::new(fx.clone()));
        Self {
            config,
            ctx,
            fx,
            flow_checker,
            bootstrapped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_flow_checker(mut self, flow_checker: Arc<dyn FlowChecker>) -> Self {
        self.flow_checker = flow_checker;
        self
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::Acquire)
    }

    pub fn set_bootstrapped(&self, bootstrapped: bool) {
        self.bootstrapped.store(bootstrapped, Ordering::Release);
    }
}

/// What an accepted transaction does to chain state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verified {
    AddStaker {
        staker: Staker,
        /// Whether the staker goes straight into the current set.
        is_current: bool,
        /// Outputs to hand back if the staker is never added.
        return_outputs: Vec<TransferableOutput>,
    },
    RemoveSubnetValidator {
        staker: Staker,
        is_current: bool,
    },
    TransferSubnetOwnership {
        subnet_id: Id,
        owner: OutputOwners,
    },
}

/// Verifies `tx` against `state` with the verifier for its kind.
pub fn verify_tx(backend: &Backend, state: &dyn Chain, tx: &Tx) -> Result<Verified, VerifyError> {
    let chain_time = state.timestamp();
    let rules = backend.config.rules_at(chain_time);
    let tx_id = tx.id();

    let result = match tx.unsigned() {
        UnsignedTx::AddValidator(body) => {
            verify_add_validator_tx(backend, state, tx, body).map(|return_outputs| {
                Verified::AddStaker {
                    staker: new_staker(tx_id, body, rules, chain_time),
                    is_current: rules.durango,
                    return_outputs,
                }
            })
        }
        UnsignedTx::AddSubnetValidator(body) => {
            verify_add_subnet_validator_tx(backend, state, tx, body).map(|()| Verified::AddStaker {
                staker: new_staker(tx_id, body, rules, chain_time),
                is_current: rules.durango,
                return_outputs: body.base.outs.clone(),
            })
        }
        UnsignedTx::RemoveSubnetValidator(body) => {
            verify_remove_subnet_validator_tx(backend, state, tx, body)
                .map(|(staker, is_current)| Verified::RemoveSubnetValidator { staker, is_current })
        }
        UnsignedTx::AddDelegator(body) => {
            verify_add_delegator_tx(backend, state, tx, body).map(|(staker, return_outputs)| {
                Verified::AddStaker {
                    staker,
                    is_current: rules.durango,
                    return_outputs,
                }
            })
        }
        UnsignedTx::AddPermissionlessValidator(body) => {
            verify_add_permissionless_validator_tx(backend, state, tx, body).map(|()| {
                Verified::AddStaker {
                    staker: new_staker(tx_id, body, rules, chain_time),
                    is_current: rules.durango,
                    return_outputs: outputs_with_stake(&body.base.outs, &body.stake_outs),
                }
            })
        }
        UnsignedTx::AddPermissionlessDelegator(body) => {
            verify_add_permissionless_delegator_tx(backend, state, tx, body).map(|staker| {
                Verified::AddStaker {
                    staker,
                    is_current: rules.durango,
                    return_outputs: outputs_with_stake(&body.base.outs, &body.stake_outs),
                }
            })
        }
        UnsignedTx::TransferSubnetOwnership(body) => {
            verify_transfer_subnet_ownership_tx(backend, state, tx, body).map(|()| {
                Verified::TransferSubnetOwnership {
                    subnet_id: body.subnet,
                    owner: body.owner.clone(),
                }
            })
        }
    };

    if let Err(err) = &result {
        debug!("rejected tx {}: {}", tx_id, err);
    }
    result
}
