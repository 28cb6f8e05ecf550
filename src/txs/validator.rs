use serde::{Deserialize, Serialize};

use crate::ids::{Id, NodeId};
use crate::txs::SyntacticError;
use crate::utils::bounded_by;

/// The node, weight and declared staking interval of a staker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub node_id: NodeId,
    /// Unix time the staker declares it starts. Advisory once Durango is active.
    pub start: u64,
    pub end: u64,
    pub weight: u64,
}

impl Validator {
    pub fn start_time(&self) -> u64 {
        self.start
    }

    pub fn end_time(&self) -> u64 {
        self.end
    }

    /// Returns true if this staking period lies within `[lower, upper]`.
    pub fn bounded_by(&self, lower: u64, upper: u64) -> bool {
        bounded_by(self.start, self.end, lower, upper)
    }

    pub fn verify(&self) -> Result<(), SyntacticError> {
        if self.weight == 0 {
            return Err(SyntacticError::ZeroWeight);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetValidator {
    pub validator: Validator,
    pub subnet: Id,
}
