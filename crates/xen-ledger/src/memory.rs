//! In-memory token ledger and manual clock.
//!
//! Stores balances in `HashMap`s with no persistence. Suitable for tests,
//! simulations and the CLI; a production host supplies its own
//! [`TokenLedger`] and [`Clock`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use xen_core::authority::{BurnCapability, MintCapability};
use xen_core::constants::SECONDS_IN_DAY;
use xen_core::error::LedgerError;
use xen_core::traits::{Clock, TokenLedger};
use xen_core::types::{AccountId, TokenInfo};

/// HashMap-backed [`TokenLedger`].
///
/// Minting to an unregistered account fails, like a real host ledger, so
/// the engine's auto-registration path is exercised.
#[derive(Debug, Default)]
pub struct MemoryTokenLedger {
    token: Option<TokenInfo>,
    balances: HashMap<AccountId, u128>,
    registered: HashSet<AccountId>,
    supply: u128,
}

impl MemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token metadata, once initialized.
    pub fn token_info(&self) -> Option<&TokenInfo> {
        self.token.as_ref()
    }

    /// Credit tokens minted outside the engine (genesis allocations, bridges).
    ///
    /// Counts toward the ledger's supply but not the engine's emitted supply.
    pub fn premint(&mut self, account: &AccountId, amount: u128) {
        self.registered.insert(*account);
        *self.balances.entry(*account).or_insert(0) += amount;
        self.supply = self.supply.saturating_add(amount);
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.registered.len()
    }

    fn require_initialized(&self) -> Result<(), LedgerError> {
        if self.token.is_none() {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn initialize(&mut self, info: &TokenInfo) -> Result<(), LedgerError> {
        if self.token.is_some() {
            return Err(LedgerError::AlreadyInitialized);
        }
        debug!(symbol = %info.symbol, decimals = info.decimals, "memory_ledger: token initialized");
        self.token = Some(info.clone());
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> Result<u128, LedgerError> {
        Ok(self.balances.get(account).copied().unwrap_or(0))
    }

    fn mint(
        &mut self,
        _cap: &MintCapability,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.require_initialized()?;
        if !self.registered.contains(account) {
            return Err(LedgerError::NotRegistered(account.to_string()));
        }
        let supply = self
            .supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        *self.balances.entry(*account).or_insert(0) += amount;
        self.supply = supply;
        Ok(())
    }

    fn burn_from(
        &mut self,
        _cap: &BurnCapability,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.require_initialized()?;
        let have = self.balance_of(account)?;
        let remaining = have
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance { have, need: amount })?;
        self.balances.insert(*account, remaining);
        self.supply = self.supply.saturating_sub(amount);
        Ok(())
    }

    fn register(&mut self, account: &AccountId) -> Result<(), LedgerError> {
        self.registered.insert(*account);
        Ok(())
    }

    fn is_registered(&self, account: &AccountId) -> bool {
        self.registered.contains(account)
    }

    fn total_minted_supply(&self) -> Option<u128> {
        self.token.as_ref().map(|_| self.supply)
    }
}

/// A settable [`Clock`]. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    /// Jump to `now`. Callers are responsible for keeping time monotonic.
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward `secs`, stopping at `u64::MAX`.
    pub fn advance(&self, secs: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(secs))
            });
    }

    pub fn advance_days(&self, days: u64) {
        self.advance(days.saturating_mul(SECONDS_IN_DAY));
    }

    /// Move forward `secs` and return the new time, or leave the clock
    /// untouched and return `None` if it would pass `u64::MAX`.
    pub fn try_advance(&self, secs: u64) -> Option<u64> {
        self.now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| now.checked_add(secs))
            .ok()
            .map(|prev| prev + secs)
    }
}

impl Clock for ManualClock {
    fn now_seconds(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
