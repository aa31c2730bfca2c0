//! Staking positions.
//!
//! One position per account: `Empty -> Open -> Empty`. Opening burns the
//! principal from the account; withdrawing mints principal plus any earned
//! yield back. A withdrawn position stays behind with `amount == 0` and may
//! be reopened.

use std::collections::BTreeMap;

use tracing::{debug, info};

use xen_core::constants::{MAX_TERM_END, MIN_TERM, SECONDS_IN_DAY, XEN_MIN_STAKE};
use xen_core::error::{StakeError, XenError};
use xen_core::traits::{RewardCalculator, TokenLedger};
use xen_core::types::{AccountId, StakeClaim, StakeOpened, StakeWithdrawal};

use crate::context::Context;

/// Check a stake term and return it in seconds.
///
/// Bounds are the same as a mint term except the upper bound is fixed at
/// `MAX_TERM_END` instead of growing with rank.
pub fn validate_term(term_days: u64) -> Result<u64, StakeError> {
    let Some(term_secs) = term_days.checked_mul(SECONDS_IN_DAY) else {
        return Err(StakeError::TermTooLong {
            term_secs: u64::MAX,
            max_secs: MAX_TERM_END,
        });
    };
    if term_secs <= MIN_TERM {
        return Err(StakeError::TermTooShort {
            term_secs,
            min_secs: MIN_TERM,
        });
    }
    if term_secs > MAX_TERM_END {
        return Err(StakeError::TermTooLong {
            term_secs,
            max_secs: MAX_TERM_END,
        });
    }
    Ok(term_secs)
}

/// Per-account staking positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakeLedger {
    stakes: BTreeMap<AccountId, StakeClaim>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored positions. Owners are expected to be unique; see
    /// [`EngineState::check_consistency`](crate::state::EngineState::check_consistency).
    pub fn from_positions(positions: impl IntoIterator<Item = StakeClaim>) -> Self {
        Self {
            stakes: positions.into_iter().map(|s| (s.owner, s)).collect(),
        }
    }

    /// The account's position record, open or withdrawn.
    pub fn get(&self, account: &AccountId) -> Option<&StakeClaim> {
        self.stakes.get(account)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StakeClaim> {
        self.stakes.values()
    }

    /// Sum of all open principals. Matches `Dashboard::total_xen_staked`.
    pub fn total_locked(&self) -> u128 {
        self.stakes.values().map(|s| s.amount).sum()
    }

    /// Fail if `account` already has an open position.
    pub fn ensure_can_open(&self, account: &AccountId) -> Result<(), StakeError> {
        match self.stakes.get(account) {
            Some(pos) if pos.is_open() => Err(StakeError::PositionAlreadyOpen(account.to_string())),
            _ => Ok(()),
        }
    }

    /// Burn `amount` from `account` and lock it for `term_days`.
    pub fn stake<T, R>(
        &mut self,
        ctx: &mut Context<'_, T, R>,
        account: &AccountId,
        amount: u128,
        term_days: u64,
    ) -> Result<StakeOpened, XenError>
    where
        T: TokenLedger + ?Sized,
        R: RewardCalculator + ?Sized,
    {
        if amount <= XEN_MIN_STAKE {
            return Err(StakeError::AmountTooSmall {
                amount,
                min: XEN_MIN_STAKE,
            }
            .into());
        }
        let term_secs = validate_term(term_days)?;
        self.ensure_can_open(account)?;
        let have = ctx.token.balance_of(account)?;
        if have < amount {
            return Err(StakeError::InsufficientBalance { have, need: amount }.into());
        }

        ctx.burn_from(account, amount)?;
        ctx.dashboard.reduce_supply(amount);
        Ok(self.open_position(ctx, account, amount, term_days, term_secs))
    }

    /// Record a new open position. Callers have already validated the term,
    /// checked for conflicts and taken the principal out of circulation.
    pub(crate) fn open_position<T, R>(
        &mut self,
        ctx: &mut Context<'_, T, R>,
        account: &AccountId,
        amount: u128,
        term_days: u64,
        term_secs: u64,
    ) -> StakeOpened
    where
        T: TokenLedger + ?Sized,
        R: RewardCalculator + ?Sized,
    {
        let apy = ctx.rewards.apy(ctx.now, ctx.dashboard.genesis_ts());
        let maturity_ts = ctx.now.saturating_add(term_secs);
        self.stakes.insert(
            *account,
            StakeClaim {
                owner: *account,
                term: term_days,
                maturity_ts,
                amount,
                apy,
            },
        );
        ctx.dashboard.open_stake(amount);
        info!(%account, amount, term = term_days, apy, maturity_ts, "stake: position opened");

        StakeOpened {
            account: *account,
            amount,
            term: term_days,
            maturity_ts,
            apy,
        }
    }

    /// Close the account's position and mint the payout.
    ///
    /// Before maturity the payout is the bare principal.
    pub fn withdraw<T, R>(
        &mut self,
        ctx: &mut Context<'_, T, R>,
        account: &AccountId,
    ) -> Result<StakeWithdrawal, XenError>
    where
        T: TokenLedger + ?Sized,
        R: RewardCalculator + ?Sized,
    {
        let Some(pos) = self.stakes.get_mut(account) else {
            return Err(StakeError::NoStakePosition(account.to_string()).into());
        };
        if !pos.is_open() {
            return Err(StakeError::PositionAlreadyEmpty(account.to_string()).into());
        }

        let principal = pos.amount;
        let matured = pos.is_matured(ctx.now);
        let payout = ctx
            .rewards
            .stake_reward(principal, pos.term, ctx.now, pos.maturity_ts, pos.apy)?;
        let yield_amount = payout.saturating_sub(principal);
        debug!(%account, principal, yield_amount, matured, "stake: payout computed");
        ctx.ensure_recipients(&[(*account, payout)])?;

        pos.amount = 0;
        ctx.dashboard.close_stake(principal);
        ctx.dashboard.record_supply(payout);
        ctx.mint_to(account, payout)?;
        info!(%account, principal, payout, "stake: position withdrawn");

        Ok(StakeWithdrawal {
            account: *account,
            principal,
            yield_amount,
            payout,
            matured,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::fixture::Fixture;
    use proptest::prelude::*;
    use xen_core::constants::{APY_START, COIN};
    use xen_core::error::{ErrorKind, RewardError};
    use xen_reward::RewardEngine;

    const DAY: u64 = SECONDS_IN_DAY;

    fn bob() -> AccountId {
        AccountId::from_label("bob")
    }

    #[test]
    fn term_bounds() {
        assert!(matches!(validate_term(0), Err(StakeError::TermTooShort { .. })));
        assert_eq!(validate_term(1), Ok(DAY));
        assert_eq!(validate_term(1_000), Ok(MAX_TERM_END));
        assert!(matches!(validate_term(1_001), Err(StakeError::TermTooLong { .. })));
        assert!(matches!(validate_term(u64::MAX), Err(StakeError::TermTooLong { .. })));
    }

    #[test]
    fn stake_then_immediate_withdraw_returns_principal() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        fx.fund(&bob(), 100);

        let opened = ledger.stake(&mut fx.ctx(0), &bob(), 100, 10).unwrap();
        assert_eq!(opened.apy, APY_START);
        assert_eq!(opened.maturity_ts, 10 * DAY);
        assert_eq!(fx.token.balance_of(&bob()).unwrap(), 0);
        assert_eq!(fx.dashboard.total_xen_staked(), 100);

        let out = ledger.withdraw(&mut fx.ctx(0), &bob()).unwrap();
        assert_eq!(out.payout, 100);
        assert_eq!(out.yield_amount, 0);
        assert!(!out.matured);
        assert_eq!(fx.token.balance_of(&bob()).unwrap(), 100);
        assert_eq!(fx.dashboard.total_xen_staked(), 0);
        assert_eq!(fx.dashboard.active_stakes(), 0);
    }

    #[test]
    fn withdraw_at_maturity_pays_yield() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        let amount = 1_000 * COIN;
        fx.fund(&bob(), amount);

        ledger.stake(&mut fx.ctx(0), &bob(), amount, 10).unwrap();
        let out = ledger.withdraw(&mut fx.ctx(10 * DAY), &bob()).unwrap();
        // 1000 COIN * 2000 * 10 / (10_000 * 365)
        assert_eq!(out.yield_amount, 547_945_205);
        assert!(out.matured);
        assert_eq!(fx.token.balance_of(&bob()).unwrap(), amount + 547_945_205);
        assert_eq!(fx.dashboard.total_supply(), amount + 547_945_205);
    }

    #[test]
    fn stake_reduces_emitted_supply_without_underflow() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        fx.dashboard.record_supply(40);
        fx.fund(&bob(), 100);
        ledger.stake(&mut fx.ctx(0), &bob(), 100, 1).unwrap();
        assert_eq!(fx.dashboard.total_supply(), 0);
    }

    #[test]
    fn second_open_position_rejected() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        fx.fund(&bob(), 200);
        ledger.stake(&mut fx.ctx(0), &bob(), 100, 5).unwrap();
        let err = ledger.stake(&mut fx.ctx(0), &bob(), 100, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StakeConflict);
        assert_eq!(fx.token.balance_of(&bob()).unwrap(), 100);
    }

    #[test]
    fn reopen_after_withdraw() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        fx.fund(&bob(), 100);
        ledger.stake(&mut fx.ctx(0), &bob(), 100, 5).unwrap();
        ledger.withdraw(&mut fx.ctx(DAY), &bob()).unwrap();
        ledger.stake(&mut fx.ctx(DAY), &bob(), 60, 5).unwrap();
        assert_eq!(ledger.get(&bob()).unwrap().amount, 60);
        assert_eq!(fx.dashboard.active_stakes(), 1);
    }

    #[test]
    fn withdraw_errors() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        assert!(matches!(
            ledger.withdraw(&mut fx.ctx(0), &bob()),
            Err(XenError::Stake(StakeError::NoStakePosition(_)))
        ));

        fx.fund(&bob(), 10);
        ledger.stake(&mut fx.ctx(0), &bob(), 10, 1).unwrap();
        ledger.withdraw(&mut fx.ctx(0), &bob()).unwrap();
        assert!(matches!(
            ledger.withdraw(&mut fx.ctx(0), &bob()),
            Err(XenError::Stake(StakeError::PositionAlreadyEmpty(_)))
        ));
    }

    /// Pays back half the principal on withdrawal.
    struct Haircut;

    impl RewardCalculator for Haircut {
        fn reward_amplifier(&self, elapsed_secs: u64, current_supply: u128) -> u64 {
            RewardEngine.reward_amplifier(elapsed_secs, current_supply)
        }
        fn eaa_rate(&self, global_rank: u64) -> u64 {
            RewardEngine.eaa_rate(global_rank)
        }
        fn apy(&self, now_ts: u64, genesis_ts: u64) -> u64 {
            RewardEngine.apy(now_ts, genesis_ts)
        }
        fn max_term(&self, global_rank: u64) -> u64 {
            RewardEngine.max_term(global_rank)
        }
        fn withdrawal_penalty(&self, seconds_late: u64) -> u64 {
            RewardEngine.withdrawal_penalty(seconds_late)
        }
        fn gross_mint_reward(
            &self,
            rank_delta: u64,
            amplifier: u64,
            term: u64,
            eaa: u64,
        ) -> Result<u128, RewardError> {
            RewardEngine.gross_mint_reward(rank_delta, amplifier, term, eaa)
        }
        fn net_mint_reward(
            &self,
            global_rank: u64,
            claim_rank: u64,
            term: u64,
            now_ts: u64,
            maturity_ts: u64,
            amplifier: u64,
            eaa_rate: u64,
        ) -> Result<u128, RewardError> {
            RewardEngine.net_mint_reward(
                global_rank,
                claim_rank,
                term,
                now_ts,
                maturity_ts,
                amplifier,
                eaa_rate,
            )
        }
        fn stake_reward(
            &self,
            amount: u128,
            _term_days: u64,
            _now_ts: u64,
            _maturity_ts: u64,
            _apy: u64,
        ) -> Result<u128, RewardError> {
            Ok(amount / 2)
        }
    }

    #[test]
    fn payout_below_principal_reports_zero_yield() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        fx.fund(&bob(), 100);
        ledger.stake(&mut fx.ctx(0), &bob(), 100, 1).unwrap();

        let mut ctx = Context {
            dashboard: &mut fx.dashboard,
            token: &mut fx.token,
            authority: &fx.authority,
            rewards: &Haircut,
            config: &fx.config,
            now: DAY,
        };
        let out = ledger.withdraw(&mut ctx, &bob()).unwrap();
        assert_eq!(out.principal, 100);
        assert_eq!(out.payout, 50);
        assert_eq!(out.yield_amount, 0);
        assert_eq!(fx.token.balance_of(&bob()).unwrap(), 50);
        assert_eq!(fx.dashboard.total_xen_staked(), 0);
    }

    #[test]
    fn zero_amount_rejected() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        let err = ledger.stake(&mut fx.ctx(0), &bob(), 0, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    }

    #[test]
    fn insufficient_balance_leaves_state_untouched() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        fx.fund(&bob(), 99);
        let err = ledger.stake(&mut fx.ctx(0), &bob(), 100, 5).unwrap_err();
        assert!(matches!(
            err,
            XenError::Stake(StakeError::InsufficientBalance { have: 99, need: 100 })
        ));
        assert!(ledger.get(&bob()).is_none());
        assert_eq!(fx.dashboard.active_stakes(), 0);
        assert_eq!(fx.token.balance_of(&bob()).unwrap(), 99);
    }

    #[test]
    fn invalid_term_checked_before_balance() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        let err = ledger.stake(&mut fx.ctx(0), &bob(), 100, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTerm);
    }

    #[test]
    fn apy_snapshot_survives_decay() {
        let mut fx = Fixture::new();
        let mut ledger = StakeLedger::new();
        fx.fund(&bob(), 100);
        let opened = ledger.stake(&mut fx.ctx(200 * DAY), &bob(), 100, 5).unwrap();
        assert_eq!(opened.apy, APY_START - 2 * 100);
        assert_eq!(ledger.get(&bob()).unwrap().apy, opened.apy);
    }

    proptest! {
        #[test]
        fn counters_track_open_positions(
            amounts in proptest::collection::vec(1u128..1_000_000, 1..20),
            withdraw_mask in proptest::collection::vec(any::<bool>(), 20),
        ) {
            let mut fx = Fixture::new();
            let mut ledger = StakeLedger::new();
            let accounts: Vec<AccountId> =
                (0..amounts.len()).map(|i| AccountId::from_label(&format!("s{i}"))).collect();
            for (acct, &amt) in accounts.iter().zip(&amounts) {
                fx.fund(acct, amt);
                ledger.stake(&mut fx.ctx(0), acct, amt, 30).unwrap();
            }
            for (acct, &w) in accounts.iter().zip(&withdraw_mask) {
                if w {
                    let before = fx.dashboard.total_xen_staked();
                    let stakes_before = fx.dashboard.active_stakes();
                    let out = ledger.withdraw(&mut fx.ctx(DAY), acct).unwrap();
                    prop_assert_eq!(fx.dashboard.total_xen_staked(), before - out.principal);
                    prop_assert_eq!(fx.dashboard.active_stakes(), stakes_before - 1);
                }
            }
            prop_assert_eq!(ledger.total_locked(), fx.dashboard.total_xen_staked());
        }
    }
}
