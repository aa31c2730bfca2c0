//! Protocol constants. All token amounts are in base units (1 XEN = 10^8 units).
//!
//! Durations are in seconds unless the name says days. Every scaled quantity
//! names its precision next to it so the reward math can be read without
//! guessing at implicit denominators.

/// Base units per whole token.
pub const COIN: u128 = 100_000_000;

/// Decimal places registered with the token ledger.
pub const TOKEN_DECIMALS: u8 = 8;

pub const SECONDS_IN_DAY: u64 = 86_400;
pub const DAYS_IN_YEAR: u64 = 365;

/// Value of the global rank counter at genesis.
pub const GENESIS_RANK: u64 = 0;

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// Term lengths in seconds must be strictly greater than this (i.e. >= 1 day).
pub const MIN_TERM: u64 = SECONDS_IN_DAY - 1;

/// Maximum mint term before the rank-based extension kicks in.
pub const MAX_TERM_START: u64 = 100 * SECONDS_IN_DAY;

/// Hard ceiling on any term. Stakes are bounded by this directly.
pub const MAX_TERM_END: u64 = 1_000 * SECONDS_IN_DAY;

/// Days added to the maximum mint term per `log2(global_rank)`.
pub const TERM_AMPLIFIER: u64 = 15;

/// Global rank above which the maximum mint term starts to grow.
pub const TERM_AMPLIFIER_THRESHOLD: u64 = 5_000;

// ---------------------------------------------------------------------------
// Reward amplifier
// ---------------------------------------------------------------------------

pub const AMPLIFIER_START: u64 = 3_000;
pub const AMPLIFIER_END: u64 = 1;

/// Minted supply that lowers the supply-based amplifier by one.
pub const SUPPLY_UNIT: u128 = 10_000_000 * COIN;

// ---------------------------------------------------------------------------
// Early adopter amplifier (per-mille)
// ---------------------------------------------------------------------------

/// Initial EAA bonus in per-mille (100 = 10%).
pub const EAA_START: u64 = 100;

/// Ranks per one per-mille of EAA decay.
pub const EAA_RANK_STEP: u64 = 100_000;

/// Denominator of the `EAA_PRECISION + eaa_rate` multiplier.
pub const EAA_PRECISION: u64 = 1_000;

// ---------------------------------------------------------------------------
// Staking yield (hundredths of a percent)
// ---------------------------------------------------------------------------

/// Starting APY: 20.00%.
pub const APY_START: u64 = 2_000;

/// Floor APY: 2.00%.
pub const APY_END: u64 = 200;

/// APY reduction per decay step: 1.00%.
pub const APY_STEP: u64 = 100;

/// Days per APY decay step.
pub const APY_DAYS_STEP: u64 = 90;

/// `apy / APY_DENOM` is the yearly yield fraction.
pub const APY_DENOM: u64 = 10_000;

// ---------------------------------------------------------------------------
// Late settlement
// ---------------------------------------------------------------------------

pub const WITHDRAWAL_WINDOW_DAYS: u64 = 7;
pub const MAX_PENALTY_PCT: u64 = 99;

// ---------------------------------------------------------------------------
// Supply limits
// ---------------------------------------------------------------------------

/// Ceiling on the gross (pre-scaling) mint reward of a single claim.
pub const MAX_REWARD_CLAIM: u128 = 1_000_000_000_000;

/// `claim_rank` is refused once the engine has emitted this much.
pub const MAX_MINT_SUPPLY: u128 = 100_000_000_000 * COIN;

/// Stakes must be strictly larger than this.
pub const XEN_MIN_STAKE: u128 = 0;

/// Burns must be strictly larger than this.
pub const XEN_MIN_BURN: u128 = 0;

/// Percentage of every settled mint reward additionally minted to the treasury.
pub const PROTOCOL_RESERVE_PCT: u8 = 1;

pub const TOKEN_NAME: &str = "XEN Crypto";
pub const TOKEN_SYMBOL: &str = "XEN";
