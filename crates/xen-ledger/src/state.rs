//! Engine state snapshots.
//!
//! An [`EngineState`] holds everything the engine owns: config, dashboard
//! and the per-account records. Token balances live in the host ledger and
//! are not part of it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use xen_core::error::XenError;
use xen_core::types::{MintClaim, StakeClaim};

use crate::config::EngineConfig;
use crate::dashboard::Dashboard;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct EngineState {
    pub config: EngineConfig,
    pub dashboard: Dashboard,
    /// Latest claim record per account, in account order.
    pub mints: Vec<MintClaim>,
    /// Stake position per account, in account order.
    pub stakes: Vec<StakeClaim>,
}

impl EngineState {
    /// Canonical bincode encoding (standard config).
    pub fn encode(&self) -> Result<Vec<u8>, XenError> {
        bincode::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| XenError::Encoding(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, XenError> {
        let (state, read): (Self, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| XenError::Encoding(e.to_string()))?;
        if read != bytes.len() {
            return Err(XenError::Encoding(format!(
                "{} trailing bytes after state",
                bytes.len() - read
            )));
        }
        Ok(state)
    }

    /// BLAKE3 hash of the canonical encoding.
    pub fn digest(&self) -> Result<[u8; 32], XenError> {
        Ok(blake3::hash(&self.encode()?).into())
    }

    /// Check that every account owns at most one claim and one position,
    /// and that the dashboard counters agree with the records.
    pub fn check_consistency(&self) -> Result<(), XenError> {
        let mut owners = HashSet::with_capacity(self.mints.len());
        if let Some(dup) = self.mints.iter().find(|c| !owners.insert(c.owner)) {
            return Err(XenError::Encoding(format!(
                "duplicate mint claim for {}",
                dup.owner
            )));
        }
        let mut owners = HashSet::with_capacity(self.stakes.len());
        if let Some(dup) = self.stakes.iter().find(|s| !owners.insert(s.owner)) {
            return Err(XenError::Encoding(format!(
                "duplicate stake position for {}",
                dup.owner
            )));
        }

        let open_mints = self.mints.iter().filter(|c| c.is_open()).count() as u64;
        if open_mints != self.dashboard.active_minters() {
            return Err(XenError::Encoding(format!(
                "active_minters {} but {open_mints} open claims",
                self.dashboard.active_minters()
            )));
        }
        let open_stakes = self.stakes.iter().filter(|s| s.is_open()).count() as u64;
        if open_stakes != self.dashboard.active_stakes() {
            return Err(XenError::Encoding(format!(
                "active_stakes {} but {open_stakes} open positions",
                self.dashboard.active_stakes()
            )));
        }
        let locked = self
            .stakes
            .iter()
            .try_fold(0u128, |acc, s| acc.checked_add(s.amount))
            .ok_or_else(|| XenError::Encoding("staked amounts overflow".to_string()))?;
        if locked != self.dashboard.total_xen_staked() {
            return Err(XenError::Encoding(format!(
                "total_xen_staked {} but positions hold {locked}",
                self.dashboard.total_xen_staked()
            )));
        }
        Ok(())
    }
}
