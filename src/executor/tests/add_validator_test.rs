use std::time::Duration;

use pretty_assertions::assert_eq;

use crate::config::MAX_FUTURE_START_TIME;
use crate::executor::tests::helpers::*;
use crate::executor::{verify_add_validator_tx, verify_tx, FlowError, Verified, VerifyError};
use crate::ids::PRIMARY_NETWORK_ID;
use crate::state::{ChainMut, Priority};
use crate::txs::{AddValidatorTx, TransferableOutput, UnsignedTx};

fn verify(env: &TestEnv, body: &AddValidatorTx) -> Result<Vec<TransferableOutput>, VerifyError> {
    let tx = env.sign(UnsignedTx::AddValidator(body.clone()));
    verify_add_validator_tx(&env.backend, &env.state, &tx, body)
}

#[test]
fn test_accepts_durations_within_bounds() {
    let mut env = TestEnv::new(false);
    let start = env.now() + DAY;
    for duration in [
        MIN_STAKE_DURATION,
        (MIN_STAKE_DURATION + MAX_STAKE_DURATION) / 2,
        MAX_STAKE_DURATION,
    ] {
        let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, start + duration);
        assert!(verify(&env, &body).is_ok(), "duration {} rejected", duration);
    }
}

#[test]
fn test_minimum_validator_consumes_all_inputs() {
    let mut env = TestEnv::new(false);
    let node_id = random_node_id();
    let start = env.now() + 1;
    let body = env.add_validator_body(node_id, MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    assert!(body.base.outs.is_empty());

    let outs = verify(&env, &body).unwrap();
    assert_eq!(outs, body.stake_outs);

    let tx = env.sign(UnsignedTx::AddValidator(body));
    match verify_tx(&env.backend, &env.state, &tx).unwrap() {
        Verified::AddStaker { staker, is_current, return_outputs } => {
            assert!(!is_current);
            assert_eq!(return_outputs, outs);
            assert_eq!(staker.tx_id, tx.id());
            assert_eq!(staker.node_id, node_id);
            assert_eq!(staker.subnet_id, PRIMARY_NETWORK_ID);
            assert_eq!(staker.weight, MIN_VALIDATOR_STAKE);
            assert_eq!(staker.start_time, start);
            assert_eq!(staker.priority, Priority::PermissionlessValidator);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_bound_checks_in_order() {
    let mut env = TestEnv::new(false);
    let start = env.now() + DAY;
    let short = start + MIN_STAKE_DURATION - 1;
    let long = start + MAX_STAKE_DURATION + 1;
    let ok = start + MIN_STAKE_DURATION;

    // Under-weight and too short: weight is checked first.
    let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE - 1, start, short);
    assert_eq!(verify(&env, &body), Err(VerifyError::WeightTooSmall));

    let body = env.add_validator_body(random_node_id(), MAX_VALIDATOR_STAKE + 1, start, long);
    assert_eq!(verify(&env, &body), Err(VerifyError::WeightTooLarge));

    let mut body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, short);
    body.delegation_shares = MIN_DELEGATION_FEE - 1;
    assert_eq!(verify(&env, &body), Err(VerifyError::InsufficientDelegationFee));

    let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, short);
    assert_eq!(verify(&env, &body), Err(VerifyError::StakeTooShort));

    let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, long);
    assert_eq!(verify(&env, &body), Err(VerifyError::StakeTooLong));

    let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, ok);
    assert!(verify(&env, &body).is_ok());
}

#[test]
fn test_rejection_is_idempotent() {
    let mut env = TestEnv::new(false);
    let node_id = random_node_id();
    env.put_primary_validator(node_id, MIN_VALIDATOR_STAKE);
    let start = env.now() + DAY;

    let short = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, start + 1);
    let duplicate = env.add_validator_body(node_id, MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    for body in [short, duplicate] {
        let first = verify(&env, &body).unwrap_err();
        let second = verify(&env, &body).unwrap_err();
        assert_eq!(first, second);
    }
}

#[test]
fn test_already_validator() {
    let mut env = TestEnv::new(false);
    let start = env.now() + DAY;

    let current = random_node_id();
    env.put_primary_validator(current, MIN_VALIDATOR_STAKE);
    let body = env.add_validator_body(current, MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    assert_eq!(verify(&env, &body), Err(VerifyError::AlreadyValidator(current)));

    let pending = random_node_id();
    env.state.put_pending_validator(staker(
        PRIMARY_NETWORK_ID,
        pending,
        MIN_VALIDATOR_STAKE,
        start,
        start + MIN_STAKE_DURATION,
        Priority::PermissionlessValidator,
    ));
    let body = env.add_validator_body(pending, MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    assert_eq!(verify(&env, &body), Err(VerifyError::AlreadyValidator(pending)));
}

#[test]
fn test_past_start_time_before_and_after_durango() {
    for durango in [false, true] {
        let mut env = TestEnv::new(durango);
        let now = env.now();
        let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, now - 100, now + MIN_STAKE_DURATION);

        if durango {
            assert!(verify(&env, &body).is_ok());
            let tx = env.sign(UnsignedTx::AddValidator(body));
            match verify_tx(&env.backend, &env.state, &tx).unwrap() {
                Verified::AddStaker { staker, is_current, .. } => {
                    assert!(is_current);
                    assert_eq!(staker.start_time, now);
                }
                other => panic!("unexpected result {:?}", other),
            }
        } else {
            assert_eq!(
                verify(&env, &body),
                Err(VerifyError::TimestampNotBeforeStartTime {
                    chain_time: now,
                    start_time: now - 100,
                })
            );
        }
    }
}

#[test]
fn test_duration_counts_from_chain_time_after_durango() {
    let mut env = TestEnv::new(true);
    let now = env.now();
    // Declared period is long enough but the remaining period is not.
    let body = env.add_validator_body(
        random_node_id(),
        MIN_VALIDATOR_STAKE,
        now - DAY,
        now + MIN_STAKE_DURATION - 1,
    );
    assert_eq!(verify(&env, &body), Err(VerifyError::StakeTooShort));
}

#[test]
fn test_future_stake_time_checked_last() {
    let mut env = TestEnv::new(false);
    let start = env.now() + MAX_FUTURE_START_TIME.as_secs() + 1;

    let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    let err = verify(&env, &body).unwrap_err();
    assert_eq!(err, VerifyError::FutureStakeTime);
    assert!(err.is_retryable());

    // Any other failure takes precedence.
    let mut body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    let input = env.fund(AVAX, MIN_VALIDATOR_STAKE + VALIDATOR_FEE - 1);
    body.base = env.base_tx(vec![input], Vec::new());
    let err = verify(&env, &body).unwrap_err();
    assert!(matches!(err, VerifyError::FlowCheckFailed(_)));
    assert!(!err.is_retryable());

    // Start time is advisory once Durango is active.
    let mut env = TestEnv::new(true);
    let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    assert!(verify(&env, &body).is_ok());
}

#[test]
fn test_insufficient_funds() {
    let mut env = TestEnv::new(false);
    let start = env.now() + DAY;
    let mut body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    let input = env.fund(AVAX, MIN_VALIDATOR_STAKE + VALIDATOR_FEE - 1);
    body.base = env.base_tx(vec![input], Vec::new());

    assert_eq!(
        verify(&env, &body),
        Err(VerifyError::FlowCheckFailed(FlowError::InsufficientFunds {
            asset_id: AVAX,
            consumed: MIN_VALIDATOR_STAKE + VALIDATOR_FEE - 1,
            produced: MIN_VALIDATOR_STAKE + VALIDATOR_FEE,
        }))
    );
}

#[test]
fn test_not_bootstrapped_skips_state_checks() {
    let mut env = TestEnv::new(false);
    let node_id = random_node_id();
    env.put_primary_validator(node_id, MIN_VALIDATOR_STAKE);
    let start = env.now() + DAY;
    let mut body = env.add_validator_body(node_id, MIN_VALIDATOR_STAKE, start, start + MIN_STAKE_DURATION);
    let input = env.fund(AVAX, 1);
    body.base = env.base_tx(vec![input], Vec::new());

    env.backend.set_bootstrapped(false);
    assert_eq!(verify(&env, &body), Ok(body.stake_outs.clone()));

    // Bounds are still enforced.
    let body = env.add_validator_body(node_id, MIN_VALIDATOR_STAKE - 1, start, start + MIN_STAKE_DURATION);
    assert_eq!(verify(&env, &body), Err(VerifyError::WeightTooSmall));
}

#[test]
fn test_inverted_period_rejected_without_minimum_duration() {
    for durango in [false, true] {
        let mut config = config(true, durango);
        config.min_stake_duration = Duration::ZERO;
        let mut env = TestEnv::with_config(config);
        let now = env.now();

        // Before Durango the declared end precedes the declared start. After
        // it the end precedes chain time, which is the effective start.
        let (start, end, empty_end) = if durango {
            (now - DAY, now - 10, now)
        } else {
            (now + DAY, now + DAY - 10, now + DAY)
        };

        let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, end);
        assert_eq!(verify(&env, &body), Err(VerifyError::StakeTooShort));
        let tx = env.sign(UnsignedTx::AddValidator(body));
        assert_eq!(verify_tx(&env.backend, &env.state, &tx), Err(VerifyError::StakeTooShort));

        let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, empty_end);
        assert_eq!(verify(&env, &body), Err(VerifyError::StakeTooShort));

        let body = env.add_validator_body(random_node_id(), MIN_VALIDATOR_STAKE, start, empty_end + 1);
        assert!(verify(&env, &body).is_ok(), "one second rejected, durango {}", durango);
    }
}
