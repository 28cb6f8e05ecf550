/*!
Stakegate - staking transaction verification for a proof-of-stake platform chain

This crate decides whether a staking transaction may be accepted against a
snapshot of chain state, and what accepting it does to that state. Verifiers
are pure functions of their inputs, so independent candidates can be checked
concurrently against separate state overlays.

# Main Components

- `config`: staking bounds, fees and the network upgrade schedule
- `txs`: the signed staking transaction kinds and their structural checks
- `cryptography`: address derivation, credentials and threshold signature verification
- `state`: stakers, the chain state traits, an in-memory store and a copy-on-write overlay
- `executor`: the seven verifiers, their shared backend, and applying accepted transactions

# Example Usage

```rust,no_run
use std::sync::Arc;
use stakegate::{verify_tx, apply_verified, Backend, Config, Context, Diff, Ed25519Fx, MemoryState, Tx};

fn accept(base: &mut MemoryState, ctx: Context, tx: &Tx) -> Result<(), stakegate::VerifyError> {
    let backend = Backend::new(Arc::new(Config::default()), Arc::new(ctx), Arc::new(Ed25519Fx));
    backend.set_bootstrapped(true);

    let mut diff = Diff::new(&*base);
    let verified = verify_tx(&backend, &diff, tx)?;
    apply_verified(&mut diff, tx, &verified);
    let changes = diff.into_changes();
    changes.apply_to(base);
    Ok(())
}
```
*/

/// Staking configuration and the network upgrade schedule.
pub mod config;

/// Signature verification and address derivation.
pub mod cryptography;

/// Transaction verification and execution.
pub mod executor;

/// 32-byte and 20-byte identifiers.
pub mod ids;

/// Stakers and chain state.
pub mod state;

/// Staking transaction kinds.
pub mod txs;

/// Checked arithmetic and interval helpers.
pub mod utils;

// Re-export commonly used types
pub use config::{Config, Context, ProtocolRules, UpgradeConfig};
pub use cryptography::{Credential, Ed25519Fx, Fx};
pub use executor::{apply_verified, verify_tx, Backend, Verified, VerifyError};
pub use ids::{Id, NodeId, ShortId, PRIMARY_NETWORK_ID};
pub use state::{Chain, ChainMut, Diff, MemoryState, Priority, Staker};
pub use txs::{Tx, UnsignedTx};
