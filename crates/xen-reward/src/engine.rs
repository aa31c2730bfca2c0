//! Reward engine implementing the [`RewardCalculator`] trait.
//!
//! Combines the decay schedules, the penalty curve and the logarithmic
//! rank delta into mint and stake payouts. All arithmetic is integer-only
//! with u128 intermediates; every product that could exceed u128 for
//! adversarial inputs is checked.

use xen_core::constants::{
    APY_DENOM, COIN, DAYS_IN_YEAR, EAA_PRECISION, MAX_PENALTY_PCT, MAX_REWARD_CLAIM,
};
use xen_core::error::RewardError;
use xen_core::traits::RewardCalculator;

use crate::log2::log2_floor;
use crate::penalty::withdrawal_penalty;
use crate::schedule;

/// The production reward calculator.
///
/// Stateless; a single instance can be shared by every ledger.
#[derive(Debug, Clone, Default)]
pub struct RewardEngine;

impl RewardEngine {
    /// Create a new RewardEngine.
    pub fn new() -> Self {
        Self
    }
}

impl RewardCalculator for RewardEngine {
    fn reward_amplifier(&self, elapsed_secs: u64, current_supply: u128) -> u64 {
        schedule::reward_amplifier(elapsed_secs, current_supply)
    }

    fn eaa_rate(&self, global_rank: u64) -> u64 {
        schedule::eaa_rate(global_rank)
    }

    fn apy(&self, now_ts: u64, genesis_ts: u64) -> u64 {
        schedule::apy(now_ts, genesis_ts)
    }

    fn max_term(&self, global_rank: u64) -> u64 {
        schedule::max_term(global_rank)
    }

    fn withdrawal_penalty(&self, seconds_late: u64) -> u64 {
        withdrawal_penalty(seconds_late)
    }

    fn gross_mint_reward(
        &self,
        rank_delta: u64,
        amplifier: u64,
        term: u64,
        eaa: u64,
    ) -> Result<u128, RewardError> {
        let log = log2_floor(rank_delta.max(2) as u128) as u128;
        log.checked_mul(amplifier as u128)
            .and_then(|v| v.checked_mul(term as u128))
            .and_then(|v| v.checked_mul(eaa as u128))
            .ok_or(RewardError::ArithmeticOverflow)
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
        let penalty = withdrawal_penalty(now_ts.saturating_sub(maturity_ts));
        let rank_delta = global_rank.saturating_sub(claim_rank).max(2);
        let eaa = EAA_PRECISION
            .checked_add(eaa_rate)
            .ok_or(RewardError::ArithmeticOverflow)?;

        let gross = self.gross_mint_reward(rank_delta, amplifier, term, eaa)?;
        let capped = gross.min(MAX_REWARD_CLAIM);

        // Order matters: haircut first, then per-mille scaling into base units.
        // capped <= MAX_REWARD_CLAIM, so neither product can overflow.
        let after_penalty = capped * (100 - penalty.min(MAX_PENALTY_PCT)) as u128 / 100;
        Ok(after_penalty * COIN / EAA_PRECISION as u128)
    }

    fn stake_reward(
        &self,
        amount: u128,
        term_days: u64,
        now_ts: u64,
        maturity_ts: u64,
        apy: u64,
    ) -> Result<u128, RewardError> {
        if now_ts < maturity_ts {
            // Early exit forfeits yield, never principal.
            return Ok(amount);
        }
        let accrued = amount
            .checked_mul(apy as u128)
            .and_then(|v| v.checked_mul(term_days as u128))
            .ok_or(RewardError::ArithmeticOverflow)?
            / (APY_DENOM as u128 * DAYS_IN_YEAR as u128);
        amount
            .checked_add(accrued)
            .ok_or(RewardError::ArithmeticOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use xen_core::constants::{AMPLIFIER_START, EAA_START, MAX_TERM_END, SECONDS_IN_DAY};

    const DAY: u64 = SECONDS_IN_DAY;

    fn engine() -> RewardEngine {
        RewardEngine::new()
    }

    // --- gross_mint_reward ---

    #[test]
    fn gross_reward_formula() {
        // log2_floor(8) = 3
        assert_eq!(engine().gross_mint_reward(8, 3_000, 10, 1_100).unwrap(), 3 * 3_000 * 10 * 1_100);
    }

    #[test]
    fn gross_reward_floors_rank_delta() {
        let e = engine();
        let at_two = e.gross_mint_reward(2, 100, 1, 1_000).unwrap();
        assert_eq!(e.gross_mint_reward(0, 100, 1, 1_000).unwrap(), at_two);
        assert_eq!(e.gross_mint_reward(1, 100, 1, 1_000).unwrap(), at_two);
        assert_eq!(at_two, 100_000);
    }

    #[test]
    fn gross_reward_max_inputs_fit() {
        // 63 * u64::MAX^3 overflows u128.
        assert_eq!(
            engine().gross_mint_reward(u64::MAX, u64::MAX, u64::MAX, u64::MAX),
            Err(RewardError::ArithmeticOverflow)
        );
    }

    // --- net_mint_reward ---

    #[test]
    fn net_reward_documented_example() {
        // rank_delta = 10_000 → log2_floor = 13
        // gross = 13 * 2000 * 1 * 1000 = 26_000_000
        // net = 26_000_000 * 100 / 100 * COIN / 1000 = 26_000 XEN
        let reward = engine()
            .net_mint_reward(10_001, 1, 1, DAY, DAY, 2_000, 0)
            .unwrap();
        assert_eq!(reward, 2_600_000_000_000);
        assert_eq!(reward, 26_000 * COIN);
    }

    #[test]
    fn net_reward_applies_eaa() {
        let base = engine().net_mint_reward(10_001, 1, 1, 0, 0, 2_000, 0).unwrap();
        let boosted = engine().net_mint_reward(10_001, 1, 1, 0, 0, 2_000, EAA_START).unwrap();
        assert_eq!(boosted, base * 1_100 / 1_000);
    }

    #[test]
    fn net_reward_penalised_when_late() {
        let e = engine();
        let on_time = e.net_mint_reward(10_001, 1, 1, 100, 100, 2_000, 0).unwrap();
        // 3 days late → 8% penalty
        let late = e.net_mint_reward(10_001, 1, 1, 100 + 3 * DAY, 100, 2_000, 0).unwrap();
        assert_eq!(late, 26_000_000u128 * 92 / 100 * COIN / 1_000);
        assert!(late < on_time);
    }

    #[test]
    fn net_reward_very_late_keeps_one_percent() {
        let reward = engine()
            .net_mint_reward(10_001, 1, 1, 30 * DAY, 0, 2_000, 0)
            .unwrap();
        assert_eq!(reward, 26_000_000u128 / 100 * COIN / 1_000);
    }

    #[test]
    fn net_reward_rank_delta_minimum() {
        let e = engine();
        // Claim rank ahead of global rank (impossible in practice) still floors to delta 2.
        let r = e.net_mint_reward(5, 10, 1, 0, 0, 1_000, 0).unwrap();
        assert_eq!(r, 1_000_000u128 * COIN / 1_000);
    }

    #[test]
    fn net_reward_capped() {
        let e = engine();
        let r = e
            .net_mint_reward(u64::MAX, 0, 1_000, 0, 0, AMPLIFIER_START, EAA_START)
            .unwrap();
        // 63 * 3000 * 1000 * 1100 = 2.079e11, under the cap.
        assert_eq!(r, 63u128 * 3_000 * 1_000 * 1_100 * COIN / 1_000);
        let capped = e
            .net_mint_reward(u64::MAX, 0, 10_000, 0, 0, AMPLIFIER_START, EAA_START)
            .unwrap();
        assert_eq!(capped, MAX_REWARD_CLAIM * COIN / 1_000);
    }

    #[test]
    fn net_reward_eaa_overflow_reported() {
        assert_eq!(
            engine().net_mint_reward(10, 0, 1, 0, 0, 1, u64::MAX),
            Err(RewardError::ArithmeticOverflow)
        );
    }

    // --- stake_reward ---

    #[test]
    fn stake_early_withdrawal_returns_principal() {
        let e = engine();
        assert_eq!(e.stake_reward(100, 10, 0, 10 * DAY, 1_010).unwrap(), 100);
        assert_eq!(e.stake_reward(100, 10, 10 * DAY - 1, 10 * DAY, 2_000).unwrap(), 100);
    }

    #[test]
    fn stake_small_amount_truncates_yield() {
        // 100 + (1010 * 100 * 10) / (10_000 * 365) = 100 + 0
        let e = engine();
        assert_eq!(e.stake_reward(100, 10, 10 * DAY, 10 * DAY, 1_010).unwrap(), 100 + (1_010 * 100 * 10) / (10_000 * 365));
        assert_eq!(e.stake_reward(100, 10, 10 * DAY, 10 * DAY, 1_010).unwrap(), 100);
    }

    #[test]
    fn stake_yield_at_maturity() {
        let e = engine();
        let amount = 1_000 * COIN;
        // 1000e8 * 1010 * 10 / 3_650_000 = 276_712_328 (truncated)
        assert_eq!(
            e.stake_reward(amount, 10, 10 * DAY, 10 * DAY, 1_010).unwrap(),
            amount + 276_712_328
        );
    }

    #[test]
    fn stake_yield_full_year_at_start_apy() {
        let e = engine();
        let amount = 1_000 * COIN;
        // 20% for 365 days
        assert_eq!(
            e.stake_reward(amount, 365, 365 * DAY, 365 * DAY, 2_000).unwrap(),
            amount + 200 * COIN
        );
    }

    #[test]
    fn stake_yield_does_not_grow_after_maturity() {
        let e = engine();
        let at = e.stake_reward(1_000 * COIN, 10, 10 * DAY, 10 * DAY, 2_000).unwrap();
        let later = e.stake_reward(1_000 * COIN, 10, 400 * DAY, 10 * DAY, 2_000).unwrap();
        assert_eq!(at, later);
    }

    // --- dyn compatibility ---

    #[test]
    fn engine_is_object_safe() {
        let e = engine();
        let dyn_e: &dyn RewardCalculator = &e;
        assert_eq!(dyn_e.withdrawal_penalty(0), 0);
        assert_eq!(dyn_e.eaa_rate(0), EAA_START);
    }

    proptest! {
        #[test]
        fn stake_never_loses_principal(
            amount in 0u128..=u64::MAX as u128,
            term in 1u64..=(MAX_TERM_END / DAY),
            now in any::<u32>(),
            maturity in any::<u32>(),
            apy in 0u64..=2_000,
        ) {
            let payout = engine().stake_reward(amount, term, now as u64, maturity as u64, apy).unwrap();
            prop_assert!(payout >= amount);
        }

        #[test]
        fn net_reward_non_increasing_with_lateness(
            late_a in 0u64..(30 * DAY),
            late_b in 0u64..(30 * DAY),
            amplifier in 1u64..=AMPLIFIER_START,
            eaa in 0u64..=EAA_START,
            term in 1u64..=1_000,
        ) {
            let (lo, hi) = if late_a <= late_b { (late_a, late_b) } else { (late_b, late_a) };
            let e = engine();
            let r_lo = e.net_mint_reward(100_000, 1, term, lo, 0, amplifier, eaa).unwrap();
            let r_hi = e.net_mint_reward(100_000, 1, term, hi, 0, amplifier, eaa).unwrap();
            prop_assert!(r_lo >= r_hi);
        }

        #[test]
        fn net_reward_deterministic(
            global in 0u64..10_000_000,
            claim in 0u64..10_000_000,
            term in 1u64..=1_000,
            late in 0u64..(10 * DAY),
        ) {
            let e = engine();
            let a = e.net_mint_reward(global, claim, term, late, 0, 2_500, 50).unwrap();
            let b = e.net_mint_reward(global, claim, term, late, 0, 2_500, 50).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
