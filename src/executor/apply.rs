use log::info;

use crate::executor::Verified;
use crate::state::{ChainMut, Staker};
use crate::txs::{Tx, Utxo, UtxoId};

/// Commits the effects of an accepted `tx` onto `state`.
///
/// Inputs are consumed and the base outputs become new UTXOs indexed by
/// their position. Stake outputs stay locked with the staker and are not
/// spendable until it leaves the set.
pub fn apply_verified(state: &mut dyn ChainMut, tx: &Tx, verified: &Verified) {
    let tx_id = tx.id();
    let base = tx.unsigned().base();

    for input in &base.ins {
        state.delete_utxo(&input.utxo_id);
    }
    for (index, out) in base.outs.iter().enumerate() {
        state.add_utxo(Utxo {
            utxo_id: UtxoId {
                tx_id,
                output_index: index as u32,
            },
            asset_id: out.asset_id,
            amount: out.amount,
            owners: out.owners.clone(),
        });
    }

    match verified {
        Verified::AddStaker { staker, is_current, .. } => {
            put_staker(state, staker.clone(), *is_current);
            info!(
                "added {:?} {} on {} (current: {})",
                staker.priority, staker.node_id, staker.subnet_id, is_current
            );
        }
        Verified::RemoveSubnetValidator { staker, is_current } => {
            if *is_current {
                state.delete_current_validator(staker);
            } else {
                state.delete_pending_validator(staker);
            }
            info!("removed validator {} from {}", staker.node_id, staker.subnet_id);
        }
        Verified::TransferSubnetOwnership { subnet_id, owner } => {
            state.set_subnet_owner(*subnet_id, owner.clone());
            info!("transferred ownership of subnet {}", subnet_id);
        }
    }
}

fn put_staker(state: &mut dyn ChainMut, staker: Staker, is_current: bool) {
    match (staker.priority.is_validator(), is_current) {
        (true, true) => state.put_current_validator(staker),
        (true, false) => state.put_pending_validator(staker),
        (false, true) => state.put_current_delegator(staker),
        (false, false) => state.put_pending_delegator(staker),
    }
}
