use thiserror::Error;

use crate::cryptography::FxError;
use crate::executor::flow_check::FlowError;
use crate::ids::{Id, NodeId};
use crate::state::StateError;
use crate::txs::SyntacticError;

/// Why a staking transaction was rejected.
///
/// Every variant is terminal for the transaction under evaluation. Only
/// [`VerifyError::FutureStakeTime`] may become valid later on its own, as
/// chain time advances.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("weight of this validator is too low")]
    WeightTooSmall,
    #[error("weight of this validator is too large")]
    WeightTooLarge,
    #[error("staker charges an insufficient delegation fee")]
    InsufficientDelegationFee,
    #[error("staking period is too short")]
    StakeTooShort,
    #[error("staking period is too long")]
    StakeTooLong,
    #[error("flow check failed: {0}")]
    FlowCheckFailed(#[source] FlowError),
    #[error("staker is attempting to start staking too far ahead of the current chain time")]
    FutureStakeTime,
    #[error("{node_id} isn't a current or pending validator of {subnet_id}")]
    NotValidator { node_id: NodeId, subnet_id: Id },
    #[error("attempting to remove permissionless validator")]
    RemovePermissionlessValidator,
    #[error("validator stake exceeds limit")]
    StakeOverflow,
    #[error("proposed staking period is not inside dependant staking period")]
    PeriodMismatch,
    #[error("validator would be over delegated")]
    OverDelegated,
    #[error("subnet {0} is not transformed")]
    IsNotTransformSubnetTx(Id),
    #[error("chain timestamp {chain_time} not before start time {start_time}")]
    TimestampNotBeforeStartTime { chain_time: u64, start_time: u64 },
    #[error("{0} is already a validator of the primary network")]
    AlreadyValidator(NodeId),
    #[error("duplicate validator {node_id} on subnet {subnet_id}")]
    DuplicateValidator { node_id: NodeId, subnet_id: Id },
    #[error("delegation to permissioned validator")]
    DelegateToPermissionedValidator,
    #[error("incorrect staked asset: expected {expected}, got {actual}")]
    WrongStakedAssetId { expected: Id, actual: Id },
    #[error("attempting to use a Durango feature prior to activation")]
    UpgradeNotActive,
    #[error("subnet {0} is immutable")]
    IsImmutable(Id),
    #[error("unauthorized subnet modification: {0}")]
    UnauthorizedSubnetModification(#[source] FxError),
    #[error("wrong number of credentials")]
    WrongNumberOfCredentials,
    #[error("malformed transaction: {0}")]
    Syntactic(#[from] SyntacticError),
    #[error("state error: {0}")]
    State(#[from] StateError),
}

impl VerifyError {
    /// True if the same transaction may pass once chain time advances.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VerifyError::FutureStakeTime)
    }
}
