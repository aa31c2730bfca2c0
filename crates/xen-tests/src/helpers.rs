//! Shared test helpers for E2E and adversarial tests.

use xen_core::constants::SECONDS_IN_DAY;
use xen_core::traits::TokenLedger;
use xen_core::types::AccountId;
use xen_ledger::{EngineConfig, ManualClock, MemoryTokenLedger, XenEngine};

/// Engine over the in-memory ledger with the default reward engine.
pub type TestEngine = XenEngine<MemoryTokenLedger, ManualClock>;

/// Genesis timestamp used by every helper-built engine.
pub const GENESIS_TS: u64 = 1_700_000_000;

pub const DAY: u64 = SECONDS_IN_DAY;

/// Deterministic account from a short label.
pub fn account(label: &str) -> AccountId {
    AccountId::from_label(label)
}

/// The treasury every helper-built engine pays its reserve to.
pub fn treasury() -> AccountId {
    account("treasury")
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        treasury: treasury(),
        ..EngineConfig::default()
    }
}

/// Fresh engine at [`GENESIS_TS`], plus a handle on its clock.
pub fn new_engine() -> (TestEngine, ManualClock) {
    engine_with_config(test_config())
}

/// Fresh engine at genesis time zero, matching the documented scenarios.
pub fn engine_at_zero() -> (TestEngine, ManualClock) {
    let clock = ManualClock::new(0);
    let engine = XenEngine::genesis(test_config(), MemoryTokenLedger::new(), clock.clone())
        .expect("genesis on a fresh ledger");
    (engine, clock)
}

pub fn engine_with_config(config: EngineConfig) -> (TestEngine, ManualClock) {
    let clock = ManualClock::new(GENESIS_TS);
    let engine = XenEngine::genesis(config, MemoryTokenLedger::new(), clock.clone())
        .expect("genesis on a fresh ledger");
    (engine, clock)
}

/// Credit `amount` to `who` outside the engine.
pub fn fund(engine: &mut TestEngine, who: &AccountId, amount: u128) {
    engine.token_mut().premint(who, amount);
}

pub fn balance(engine: &TestEngine, who: &AccountId) -> u128 {
    engine
        .token()
        .balance_of(who)
        .expect("memory ledger balance never fails")
}

/// Claim rank and settle exactly at maturity. Returns the net reward.
pub fn mint_cycle(engine: &mut TestEngine, clock: &ManualClock, who: &AccountId, term_days: u64) -> u128 {
    engine.claim_rank(who, term_days).expect("claim_rank");
    clock.advance_days(term_days);
    engine.claim_mint_reward(who).expect("claim_mint_reward").reward
}
