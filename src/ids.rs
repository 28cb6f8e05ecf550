//! Fixed-length identifiers used throughout the staking engine.
//!
//! Identifiers are opaque: they are compared, ordered and hashed, and printed
//! as hex for logs and error messages. Nothing else about them matters here.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of an [`Id`] in bytes.
pub const ID_LEN: usize = 32;

/// Length of a [`NodeId`] or [`ShortId`] in bytes.
pub const SHORT_ID_LEN: usize = 20;

/// The primary network is addressed by the all-zero subnet id.
pub const PRIMARY_NETWORK_ID: Id = Id::EMPTY;

/// 32-byte identifier for transactions, subnets, chains and assets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Id(pub [u8; ID_LEN]);

impl Id {
    pub const EMPTY: Id = Id([0; ID_LEN]);

    /// SHA-256 of `bytes`.
    pub fn digest(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Identifier of a node participating in validation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub [u8; SHORT_ID_LEN]);

/// 20-byte identifier used for addresses in output owners.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ShortId(pub [u8; SHORT_ID_LEN]);

impl ShortId {
    /// Takes the first 20 bytes of `digest`.
    pub fn from_digest(digest: &[u8; ID_LEN]) -> Self {
        let mut out = [0u8; SHORT_ID_LEN];
        out.copy_from_slice(&digest[..SHORT_ID_LEN]);
        Self(out)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeID-{}", hex::encode(self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortId({})", self)
    }
}
