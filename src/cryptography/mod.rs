pub mod fx;
pub mod keys;

pub use fx::{Ed25519Fx, Fx, FxError};
pub use keys::{address_of, derive_address_from_pk, Credential, SignatureEntry};
