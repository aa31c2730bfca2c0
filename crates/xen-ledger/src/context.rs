//! Per-operation context.

use xen_core::authority::TokenAuthority;
use xen_core::error::LedgerError;
use xen_core::traits::{RewardCalculator, TokenLedger};
use xen_core::types::AccountId;

use crate::config::EngineConfig;
use crate::dashboard::Dashboard;

/// Everything an entry operation may read or mutate besides the
/// per-account ledger it runs on.
///
/// Built fresh for every call with `now` read once from the clock, so an
/// operation sees a single consistent time.
pub struct Context<'a, T: TokenLedger + ?Sized, R: RewardCalculator + ?Sized> {
    pub dashboard: &'a mut Dashboard,
    pub token: &'a mut T,
    pub authority: &'a TokenAuthority,
    pub rewards: &'a R,
    pub config: &'a EngineConfig,
    pub now: u64,
}

impl<T: TokenLedger + ?Sized, R: RewardCalculator + ?Sized> Context<'_, T, R> {
    /// Mint `amount` to `account`, registering it first if needed.
    /// Zero amounts are skipped.
    pub fn mint_to(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        self.token.ensure_registered(account)?;
        self.token.mint(self.authority.mint_cap(), account, amount)
    }

    /// Register every recipient of a nonzero payout. Run before any engine
    /// state changes so a registry failure leaves the operation retryable.
    pub fn ensure_recipients(&mut self, payouts: &[(AccountId, u128)]) -> Result<(), LedgerError> {
        for (account, amount) in payouts {
            if *amount > 0 {
                self.token.ensure_registered(account)?;
            }
        }
        Ok(())
    }

    pub fn burn_from(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError> {
        self.token.burn_from(self.authority.burn_cap(), account, amount)
    }

    /// Supply reported by the token ledger; absent counts as zero.
    pub fn ledger_supply(&self) -> u128 {
        self.token.total_minted_supply().unwrap_or(0)
    }
}


#[cfg(test)]
mod tests {
    use super::fixture::Fixture;
    use super::*;

    #[test]
    fn mint_to_registers_recipient() {
        let mut fx = Fixture::new();
        let a = AccountId::from_label("a");
        fx.ctx(0).mint_to(&a, 25).unwrap();
        assert!(fx.token.is_registered(&a));
        assert_eq!(fx.token.balance_of(&a).unwrap(), 25);
    }

    #[test]
    fn mint_to_skips_zero() {
        let mut fx = Fixture::new();
        let a = AccountId::from_label("a");
        fx.ctx(0).mint_to(&a, 0).unwrap();
        assert!(!fx.token.is_registered(&a));
    }

    #[test]
    fn ensure_recipients_registers_only_paid_accounts() {
        let mut fx = Fixture::new();
        let a = AccountId::from_label("a");
        let b = AccountId::from_label("b");
        fx.ctx(0).ensure_recipients(&[(a, 10), (b, 0)]).unwrap();
        assert!(fx.token.is_registered(&a));
        assert!(!fx.token.is_registered(&b));
        assert_eq!(fx.token.balance_of(&a).unwrap(), 0);
    }

    #[test]
    fn burn_from_propagates_ledger_error() {
        let mut fx = Fixture::new();
        let a = AccountId::from_label("a");
        fx.fund(&a, 5);
        assert_eq!(
            fx.ctx(0).burn_from(&a, 6),
            Err(LedgerError::InsufficientBalance { have: 5, need: 6 })
        );
        assert_eq!(fx.ctx(0).ledger_supply(), 5);
    }
}
