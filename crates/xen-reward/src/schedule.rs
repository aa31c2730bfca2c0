//! Decay schedules snapshotted into claims and stakes at open time.
//!
//! Each function is a clamped linear curve over one driver: elapsed days,
//! emitted supply, global rank, or `log2(global_rank)`.

use xen_core::constants::{
    AMPLIFIER_END, AMPLIFIER_START, APY_DAYS_STEP, APY_END, APY_START, APY_STEP, EAA_RANK_STEP,
    EAA_START, MAX_TERM_END, MAX_TERM_START, SECONDS_IN_DAY, SUPPLY_UNIT, TERM_AMPLIFIER,
    TERM_AMPLIFIER_THRESHOLD,
};

use crate::log2::log2_floor;

/// Amplifier after `elapsed_secs` of wall time: one point per whole day.
pub fn time_amplifier(elapsed_secs: u64) -> u64 {
    let decrease = elapsed_secs / SECONDS_IN_DAY;
    AMPLIFIER_START.saturating_sub(decrease).max(AMPLIFIER_END)
}

/// Amplifier after `supply` units have been emitted: one point per
/// [`SUPPLY_UNIT`].
pub fn supply_amplifier(supply: u128) -> u64 {
    let decrease = supply / SUPPLY_UNIT;
    if decrease >= AMPLIFIER_START as u128 {
        return AMPLIFIER_END;
    }
    (AMPLIFIER_START - decrease as u64).max(AMPLIFIER_END)
}

/// Whichever of the time and supply decays has progressed further.
pub fn reward_amplifier(elapsed_secs: u64, current_supply: u128) -> u64 {
    time_amplifier(elapsed_secs).min(supply_amplifier(current_supply))
}

/// EAA bonus in per-mille: `EAA_START - global_rank / EAA_RANK_STEP`, floored at 0.
pub fn eaa_rate(global_rank: u64) -> u64 {
    EAA_START.saturating_sub(global_rank / EAA_RANK_STEP)
}

/// APY offered at `now_ts`, stepping down by [`APY_STEP`] every
/// [`APY_DAYS_STEP`] days and never below [`APY_END`].
///
/// A `now_ts` before genesis is treated as genesis.
pub fn apy(now_ts: u64, genesis_ts: u64) -> u64 {
    let steps = now_ts.saturating_sub(genesis_ts) / (APY_DAYS_STEP * SECONDS_IN_DAY);
    APY_START
        .saturating_sub(steps.saturating_mul(APY_STEP))
        .max(APY_END)
}

/// Maximum mint term in seconds.
///
/// Flat at [`MAX_TERM_START`] up to [`TERM_AMPLIFIER_THRESHOLD`]; past it,
/// extended by `log2(global_rank) * TERM_AMPLIFIER` days, up to [`MAX_TERM_END`].
pub fn max_term(global_rank: u64) -> u64 {
    if global_rank <= TERM_AMPLIFIER_THRESHOLD {
        return MAX_TERM_START;
    }
    let delta_days = log2_floor(global_rank as u128).saturating_mul(TERM_AMPLIFIER);
    MAX_TERM_START
        .saturating_add(delta_days.saturating_mul(SECONDS_IN_DAY))
        .min(MAX_TERM_END)
}
