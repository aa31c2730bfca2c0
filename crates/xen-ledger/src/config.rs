//! Engine configuration.
//!
//! Provides [`EngineConfig`] with defaults for the treasury account, the
//! rank snapshot convention and the protocol reserve. Fixed at genesis and
//! carried in every state snapshot.

use serde::{Deserialize, Serialize};

use xen_core::constants::PROTOCOL_RESERVE_PCT;
use xen_core::error::XenError;
use xen_core::types::{AccountId, TokenInfo};

/// Which value of the global rank counter a new claim records.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default,
    bincode::Encode, bincode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum RankSnapshot {
    /// The counter before this claim's increment. The first claim at
    /// genesis records rank 0.
    #[default]
    PreIncrement,
    /// The counter after this claim's increment. The first claim records 1.
    PostIncrement,
}

/// Configuration for an engine instance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
#[serde(default)]
pub struct EngineConfig {
    /// Receives the protocol reserve minted alongside every settlement.
    pub treasury: AccountId,
    pub rank_snapshot: RankSnapshot,
    /// Reserve as a percentage of each net mint reward.
    pub reserve_pct: u8,
    /// Registered with the token ledger at genesis.
    pub token: TokenInfo,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            treasury: AccountId::ZERO,
            rank_snapshot: RankSnapshot::default(),
            reserve_pct: PROTOCOL_RESERVE_PCT,
            token: TokenInfo::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), XenError> {
        if self.reserve_pct > 100 {
            return Err(XenError::Config(format!(
                "reserve_pct {} exceeds 100",
                self.reserve_pct
            )));
        }
        if self.token.symbol.is_empty() {
            return Err(XenError::Config("token symbol is empty".to_string()));
        }
        Ok(())
    }

    /// Reserve owed to the treasury on a settlement paying `reward`.
    pub fn reserve_for(&self, reward: u128) -> u128 {
        reward * self.reserve_pct as u128 / 100
    }
}
