//! Global staking configuration and network upgrade schedule.
//!
//! `Config` holds the numeric bounds and fees that apply to the primary
//! network, plus the activation times of the upgrades that reshape
//! validation. Verifiers never compare timestamps against the schedule
//! directly; they resolve a [`ProtocolRules`] once per call instead.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::ids::Id;

/// How far ahead of the chain time a staker may schedule its start.
pub const MAX_FUTURE_START_TIME: Duration = Duration::from_secs(24 * 7 * 2 * 60 * 60);

/// Total delegated weight on a validator may not exceed this multiple of
/// the validator's own weight.
pub const MAX_VALIDATOR_WEIGHT_FACTOR: u64 = 5;

/// Delegation shares are expressed in millionths.
pub const PERCENT_DENOMINATOR: u32 = 1_000_000;

/// One unit of the primary asset, in its smallest denomination.
pub const UNITS: u64 = 1_000_000_000;

/// Activation times (unix seconds) of upgrades that change staking rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeConfig {
    pub apricot_phase3_time: u64,
    pub durango_time: u64,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            apricot_phase3_time: 1_629_813_600, // 2021-08-24 14:00 UTC
            durango_time: 1_709_740_800,        // 2024-03-06 16:00 UTC
        }
    }
}

impl UpgradeConfig {
    pub fn is_apricot_phase3_activated(&self, timestamp: u64) -> bool {
        timestamp >= self.apricot_phase3_time
    }

    pub fn is_durango_activated(&self, timestamp: u64) -> bool {
        timestamp >= self.durango_time
    }
}

/// The set of upgrades active at a given chain time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolRules {
    /// Caps delegator ceilings at the maximum validator stake.
    pub apricot_phase3: bool,
    /// Makes declared start times advisory and enables ownership transfers.
    pub durango: bool,
}

impl ProtocolRules {
    pub fn at(upgrades: &UpgradeConfig, timestamp: u64) -> Self {
        Self {
            apricot_phase3: upgrades.is_apricot_phase3_activated(timestamp),
            durango: upgrades.is_durango_activated(timestamp),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Fee for transactions that don't have a dedicated fee.
    pub tx_fee: u64,
    pub add_primary_network_validator_fee: u64,
    pub add_primary_network_delegator_fee: u64,
    pub add_subnet_validator_fee: u64,
    pub add_subnet_delegator_fee: u64,

    pub min_validator_stake: u64,
    pub max_validator_stake: u64,
    pub min_delegator_stake: u64,
    /// Minimum delegation shares, in millionths.
    pub min_delegation_fee: u32,

    #[serde(with = "duration_secs")]
    pub min_stake_duration: Duration,
    #[serde(with = "duration_secs")]
    pub max_stake_duration: Duration,

    #[serde(default)]
    pub upgrades: UpgradeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tx_fee: UNITS / 1000,
            add_primary_network_validator_fee: 0,
            add_primary_network_delegator_fee: 0,
            add_subnet_validator_fee: UNITS / 1000,
            add_subnet_delegator_fee: UNITS / 1000,
            min_validator_stake: 2_000 * UNITS,
            max_validator_stake: 3_000_000 * UNITS,
            min_delegator_stake: 25 * UNITS,
            min_delegation_fee: 20_000, // 2%
            min_stake_duration: Duration::from_secs(2 * 7 * 24 * 60 * 60),
            max_stake_duration: Duration::from_secs(365 * 24 * 60 * 60),
            upgrades: UpgradeConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse staking config")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read staking config {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn rules_at(&self, timestamp: u64) -> ProtocolRules {
        ProtocolRules::at(&self.upgrades, timestamp)
    }
}

/// Chain identity and the primary asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub network_id: u32,
    pub chain_id: Id,
    pub avax_asset_id: Id,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
