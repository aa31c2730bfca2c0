//! Trait interfaces for the XEN emission engine.
//!
//! These traits define the seams between the engine and everything it
//! does not own:
//! - [`TokenLedger`] — balances, mint/burn, account registration (host implements)
//! - [`Clock`] — the host's notion of "now"
//! - [`RewardCalculator`] — reward, penalty and decay math (xen-reward implements)

use crate::authority::{BurnCapability, MintCapability};
use crate::error::{LedgerError, RewardError};
use crate::types::{AccountId, TokenInfo};

/// The fungible token ledger the engine mints into and burns from.
///
/// Mutating supply requires a capability obtained once through
/// [`TokenAuthority::acquire`](crate::authority::TokenAuthority::acquire).
pub trait TokenLedger: Send {
    /// Register the token type. Must fail with
    /// [`LedgerError::AlreadyInitialized`] on every call after the first.
    fn initialize(&mut self, info: &TokenInfo) -> Result<(), LedgerError>;

    /// Spendable balance of `account`. Unregistered accounts hold zero.
    fn balance_of(&self, account: &AccountId) -> Result<u128, LedgerError>;

    /// Credit `amount` new tokens to a registered `account`.
    fn mint(
        &mut self,
        cap: &MintCapability,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Destroy `amount` tokens held by `account`.
    fn burn_from(
        &mut self,
        cap: &BurnCapability,
        account: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Onboard an account. Idempotent.
    fn register(&mut self, account: &AccountId) -> Result<(), LedgerError>;

    fn is_registered(&self, account: &AccountId) -> bool;

    /// Circulating supply as tracked by the ledger, if it tracks one.
    fn total_minted_supply(&self) -> Option<u128>;

    /// Register `account` unless it already is.
    ///
    /// Default implementation: [`is_registered`](Self::is_registered) then
    /// [`register`](Self::register).
    fn ensure_registered(&mut self, account: &AccountId) -> Result<(), LedgerError> {
        if !self.is_registered(account) {
            self.register(account)?;
        }
        Ok(())
    }
}

/// Source of the current time in Unix seconds.
///
/// The engine never reads the wall clock itself. Implementations must be
/// monotonic.
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> u64;
}

/// Pure reward, penalty and decay math.
///
/// All methods are deterministic and integer-only; identical inputs always
/// produce identical outputs. Division truncates. Implemented by the reward
/// engine (xen-reward).
pub trait RewardCalculator: Send + Sync {
    /// Reward amplifier for a claim opened `elapsed_secs` after genesis with
    /// `current_supply` already minted. Minimum of the time-based and
    /// supply-based decays, never below `AMPLIFIER_END`.
    fn reward_amplifier(&self, elapsed_secs: u64, current_supply: u128) -> u64;

    /// Early adopter amplifier in per-mille for the given global rank.
    fn eaa_rate(&self, global_rank: u64) -> u64;

    /// APY (hundredths of a percent) offered to a stake opened at `now_ts`.
    fn apy(&self, now_ts: u64, genesis_ts: u64) -> u64;

    /// Maximum mint term in seconds at the given global rank.
    fn max_term(&self, global_rank: u64) -> u64;

    /// Late-settlement penalty percentage in `[0, MAX_PENALTY_PCT]`.
    fn withdrawal_penalty(&self, seconds_late: u64) -> u64;

    /// `log2_floor(rank_delta) * amplifier * term * eaa`, with `eaa` the
    /// full per-mille multiplier (`EAA_PRECISION + eaa_rate`).
    fn gross_mint_reward(
        &self,
        rank_delta: u64,
        amplifier: u64,
        term: u64,
        eaa: u64,
    ) -> Result<u128, RewardError>;

    /// Token-unit reward for settling a claim at `now_ts`.
    #[allow(clippy::too_many_arguments)]
    fn net_mint_reward(
        &self,
        global_rank: u64,
        claim_rank: u64,
        term: u64,
        now_ts: u64,
        maturity_ts: u64,
        amplifier: u64,
        eaa_rate: u64,
    ) -> Result<u128, RewardError>;

    /// Principal plus yield at or after maturity; bare principal before it.
    fn stake_reward(
        &self,
        amount: u128,
        term_days: u64,
        now_ts: u64,
        maturity_ts: u64,
        apy: u64,
    ) -> Result<u128, RewardError>;
}
