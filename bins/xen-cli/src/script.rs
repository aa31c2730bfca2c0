//! Scripted simulations over the in-memory ledger.
//!
//! A script is a JSON document listing timed operations. Accounts are
//! named by label and mapped to identities with `AccountId::from_label`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use xen_core::constants::SECONDS_IN_DAY;
use xen_core::error::{RewardError, XenError};
use xen_core::traits::TokenLedger;
use xen_core::types::{
    AccountId, BurnReceipt, MintSettlement, RankClaim, StakeOpened, StakeWithdrawal,
};
use xen_ledger::{Dashboard, EngineConfig, ManualClock, MemoryTokenLedger, XenEngine};

type SimEngine = XenEngine<MemoryTokenLedger, ManualClock>;

#[derive(Deserialize, Debug)]
pub struct Script {
    /// Unix time of genesis.
    #[serde(default)]
    pub genesis_ts: u64,
    /// Base-unit balances credited before the first step.
    #[serde(default)]
    pub balances: BTreeMap<String, u128>,
    pub steps: Vec<Step>,
}

/// One scripted operation. Amounts are u64 base units: serde cannot buffer
/// u128 fields of internally tagged enums.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Advance {
        #[serde(default)]
        days: u64,
        #[serde(default)]
        secs: u64,
    },
    Fund { account: String, amount: u64 },
    ClaimRank { account: String, term: u64 },
    ClaimMintReward { account: String },
    ClaimMintRewardStake { account: String, pct: u8, term: u64 },
    Stake { account: String, amount: u64, term: u64 },
    Withdraw { account: String },
    Burn { account: String, amount: u64 },
}

impl Step {
    fn account(&self) -> Option<&str> {
        match self {
            Step::Advance { .. } => None,
            Step::Fund { account, .. }
            | Step::ClaimRank { account, .. }
            | Step::ClaimMintReward { account }
            | Step::ClaimMintRewardStake { account, .. }
            | Step::Stake { account, .. }
            | Step::Withdraw { account }
            | Step::Burn { account, .. } => Some(account.as_str()),
        }
    }
}

/// Outcome of one step.
#[derive(Serialize, Debug)]
pub struct StepResult {
    pub index: usize,
    pub now: u64,
    pub step: Step,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Receipt {
    Rank(RankClaim),
    Mint(MintSettlement),
    StakeOpened(StakeOpened),
    Withdrawal(StakeWithdrawal),
    Burn(BurnReceipt),
}

#[derive(Serialize, Debug)]
pub struct Report {
    pub results: Vec<StepResult>,
    pub dashboard: Dashboard,
    /// Final ledger balances by label.
    pub balances: BTreeMap<String, u128>,
    /// Hex BLAKE3 digest of the final engine state.
    pub state_digest: String,
}

impl Report {
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }
}

pub fn load_script(path: &Path) -> Result<Script> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing script {}", path.display()))
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

/// Run every step in order. Failed steps are recorded and skipped.
///
/// Returns the report and the final engine, so callers can snapshot it.
pub fn run(script: &Script, config: EngineConfig) -> Result<(Report, SimEngine)> {
    let clock = ManualClock::new(script.genesis_ts);
    let mut engine = XenEngine::genesis(config, MemoryTokenLedger::new(), clock.clone())
        .context("engine genesis")?;

    let mut labels: BTreeMap<String, AccountId> = BTreeMap::new();
    for (label, amount) in &script.balances {
        let id = AccountId::from_label(label);
        labels.insert(label.clone(), id);
        engine.token_mut().premint(&id, *amount);
    }

    let mut results = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        if let Some(label) = step.account() {
            labels
                .entry(label.to_string())
                .or_insert_with(|| AccountId::from_label(label));
        }
        let outcome = apply(&mut engine, &clock, step);
        let now = engine.now();
        let result = match outcome {
            Ok(receipt) => {
                debug!(index, now, "simulate: step applied");
                StepResult {
                    index,
                    now,
                    step: step.clone(),
                    receipt,
                    error: None,
                }
            }
            Err(e) => {
                warn!(index, now, error = %e, kind = ?e.kind(), "simulate: step failed");
                StepResult {
                    index,
                    now,
                    step: step.clone(),
                    receipt: None,
                    error: Some(e.to_string()),
                }
            }
        };
        results.push(result);
    }

    let mut balances = BTreeMap::new();
    for (label, id) in &labels {
        balances.insert(label.clone(), engine.token().balance_of(id)?);
    }
    let digest = engine.snapshot().digest()?;

    let report = Report {
        results,
        dashboard: engine.dashboard().clone(),
        balances,
        state_digest: hex::encode(digest),
    };
    Ok((report, engine))
}

fn apply(engine: &mut SimEngine, clock: &ManualClock, step: &Step) -> Result<Option<Receipt>, XenError> {
    let id = |label: &str| AccountId::from_label(label);
    let receipt = match step {
        Step::Advance { days, secs } => {
            days.checked_mul(SECONDS_IN_DAY)
                .and_then(|d| d.checked_add(*secs))
                .and_then(|delta| clock.try_advance(delta))
                .ok_or(RewardError::ArithmeticOverflow)?;
            return Ok(None);
        }
        Step::Fund { account, amount } => {
            engine.token_mut().premint(&id(account), u128::from(*amount));
            return Ok(None);
        }
        Step::ClaimRank { account, term } => Receipt::Rank(engine.claim_rank(&id(account), *term)?),
        Step::ClaimMintReward { account } => Receipt::Mint(engine.claim_mint_reward(&id(account))?),
        Step::ClaimMintRewardStake { account, pct, term } => {
            Receipt::Mint(engine.claim_mint_reward_stake(&id(account), *pct, *term)?)
        }
        Step::Stake {
            account,
            amount,
            term,
        } => Receipt::StakeOpened(engine.stake(&id(account), u128::from(*amount), *term)?),
        Step::Withdraw { account } => Receipt::Withdrawal(engine.withdraw(&id(account))?),
        Step::Burn { account, amount } => {
            Receipt::Burn(engine.burn(&id(account), u128::from(*amount))?)
        }
    };
    Ok(Some(receipt))
}
