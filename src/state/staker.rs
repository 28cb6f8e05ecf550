use serde::{Deserialize, Serialize};

use crate::ids::{Id, NodeId};
use crate::txs::StakerTx;

/// The kind of bond a staker represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    /// A subnet validator admitted by the subnet's owner.
    PermissionedValidator,
    PermissionedDelegator,
    /// A primary network validator, or a validator of a transformed subnet.
    PermissionlessValidator,
    PermissionlessDelegator,
}

impl Priority {
    pub fn is_permissioned_validator(&self) -> bool {
        matches!(self, Priority::PermissionedValidator)
    }

    pub fn is_validator(&self) -> bool {
        matches!(
            self,
            Priority::PermissionedValidator | Priority::PermissionlessValidator
        )
    }

    pub fn is_delegator(&self) -> bool {
        !self.is_validator()
    }
}

/// A bonded validator or delegator as recorded in chain state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staker {
    pub tx_id: Id,
    pub node_id: NodeId,
    pub subnet_id: Id,
    pub weight: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub potential_reward: u64,
    pub priority: Priority,
}

impl Staker {
    /// A staker that is active from `start_time` on.
    pub fn new_current<T: StakerTx + ?Sized>(
        tx_id: Id,
        tx: &T,
        start_time: u64,
        potential_reward: u64,
    ) -> Self {
        Self {
            tx_id,
            node_id: tx.node_id(),
            subnet_id: tx.subnet_id(),
            weight: tx.weight(),
            start_time,
            end_time: tx.end_time(),
            potential_reward,
            priority: tx.priority(),
        }
    }

    /// A staker waiting for its declared start time.
    pub fn new_pending<T: StakerTx + ?Sized>(tx_id: Id, tx: &T) -> Self {
        Self {
            tx_id,
            node_id: tx.node_id(),
            subnet_id: tx.subnet_id(),
            weight: tx.weight(),
            start_time: tx.start_time(),
            end_time: tx.end_time(),
            potential_reward: 0,
            priority: tx.priority(),
        }
    }
}
