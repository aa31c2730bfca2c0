//! Global economic counters.
//!
//! The [`Dashboard`] is created once at genesis and mutated only by the
//! mint, stake and burn paths. Counter underflow means a lifecycle bug, so
//! it aborts instead of returning an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::error;

use xen_core::constants::GENESIS_RANK;
use xen_core::types::AccountId;

use crate::config::RankSnapshot;

/// Abort on a broken counter invariant.
#[track_caller]
fn invariant_violation(what: &str) -> ! {
    error!(what, "dashboard: invariant violation");
    panic!("invariant violation: {what}");
}

/// Engine-wide counters.
///
/// # Invariants
///
/// * `global_rank` never decreases and grows by exactly one per claim
/// * `total_xen_staked` equals the sum of all open stake amounts
/// * `user_burns` entries only grow
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, bincode::Encode, bincode::Decode)]
pub struct Dashboard {
    genesis_ts: u64,
    global_rank: u64,
    active_minters: u64,
    active_stakes: u64,
    total_xen_staked: u128,
    total_supply: u128,
    user_burns: BTreeMap<AccountId, u128>,
}

impl Dashboard {
    /// Fresh counters with `genesis_ts` as time zero.
    pub fn new(genesis_ts: u64) -> Self {
        Self {
            genesis_ts,
            global_rank: GENESIS_RANK,
            active_minters: 0,
            active_stakes: 0,
            total_xen_staked: 0,
            total_supply: 0,
            user_burns: BTreeMap::new(),
        }
    }

    pub fn genesis_ts(&self) -> u64 {
        self.genesis_ts
    }

    pub fn global_rank(&self) -> u64 {
        self.global_rank
    }

    pub fn active_minters(&self) -> u64 {
        self.active_minters
    }

    pub fn active_stakes(&self) -> u64 {
        self.active_stakes
    }

    pub fn total_xen_staked(&self) -> u128 {
        self.total_xen_staked
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Cumulative burns recorded for `account`; zero if it never burned.
    pub fn user_burns(&self, account: &AccountId) -> u128 {
        self.user_burns.get(account).copied().unwrap_or(0)
    }

    /// Seconds since genesis at `now`. Zero if `now` precedes genesis.
    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.genesis_ts)
    }

    /// Count a new minter and advance the global rank.
    ///
    /// Returns the rank the new claim records, per `snapshot`.
    pub fn open_minter(&mut self, snapshot: RankSnapshot) -> u64 {
        let before = self.global_rank;
        self.active_minters += 1;
        self.global_rank += 1;
        match snapshot {
            RankSnapshot::PreIncrement => before,
            RankSnapshot::PostIncrement => self.global_rank,
        }
    }

    pub fn close_minter(&mut self) {
        self.active_minters = match self.active_minters.checked_sub(1) {
            Some(n) => n,
            None => invariant_violation("active_minters underflow"),
        };
    }

    pub fn open_stake(&mut self, amount: u128) {
        self.active_stakes += 1;
        self.total_xen_staked = self.total_xen_staked.saturating_add(amount);
    }

    pub fn close_stake(&mut self, amount: u128) {
        self.active_stakes = match self.active_stakes.checked_sub(1) {
            Some(n) => n,
            None => invariant_violation("active_stakes underflow"),
        };
        self.total_xen_staked = match self.total_xen_staked.checked_sub(amount) {
            Some(n) => n,
            None => invariant_violation("total_xen_staked underflow"),
        };
    }

    pub fn record_supply(&mut self, delta: u128) {
        self.total_supply = self.total_supply.saturating_add(delta);
    }

    /// Remove `amount` from the emitted supply, stopping at zero.
    ///
    /// Staking burns tokens that may have been pre-minted outside the
    /// engine, so the engine's own counter can be smaller than the burn.
    pub fn reduce_supply(&mut self, amount: u128) {
        self.total_supply = self.total_supply.saturating_sub(amount);
    }

    /// Add `amount` to the account's cumulative burns and return the new total.
    pub fn record_burn(&mut self, account: &AccountId, amount: u128) -> u128 {
        let entry = self.user_burns.entry(*account).or_insert(0);
        *entry = entry.saturating_add(amount);
        *entry
    }

    /// Number of accounts that have burned at least once.
    pub fn burner_count(&self) -> usize {
        self.user_burns.len()
    }
}
