//! Error types for the XEN emission engine.
//!
//! Counter underflow is deliberately absent: it can only happen through a
//! lifecycle bug and aborts the operation instead of being returned.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    #[error("term too short: {term_secs}s <= {min_secs}s")] TermTooShort { term_secs: u64, min_secs: u64 },
    #[error("term too long: {term_secs}s > {max_secs}s")] TermTooLong { term_secs: u64, max_secs: u64 },
    #[error("mint supply exhausted: {supply} >= {max}")] SupplyExhausted { supply: u128, max: u128 },
    #[error("mint claim already open for {0}")] ClaimAlreadyOpen(String),
    #[error("no open mint claim for {0}")] NoOpenClaim(String),
    #[error("mint claim not matured: now {now} < maturity {maturity_ts}")] NotMatured { now: u64, maturity_ts: u64 },
    #[error("percent out of range: {0} > 100")] PercentOutOfRange(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakeError {
    #[error("term too short: {term_secs}s <= {min_secs}s")] TermTooShort { term_secs: u64, min_secs: u64 },
    #[error("term too long: {term_secs}s > {max_secs}s")] TermTooLong { term_secs: u64, max_secs: u64 },
    #[error("stake amount {amount} not above minimum {min}")] AmountTooSmall { amount: u128, min: u128 },
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u128, need: u128 },
    #[error("stake position already open for {0}")] PositionAlreadyOpen(String),
    #[error("no stake position for {0}")] NoStakePosition(String),
    #[error("stake position already withdrawn for {0}")] PositionAlreadyEmpty(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BurnError {
    #[error("burn amount {amount} not above minimum {min}")] AmountTooSmall { amount: u128, min: u128 },
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u128, need: u128 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("token already initialized")] AlreadyInitialized,
    #[error("token not initialized")] NotInitialized,
    #[error("account not registered: {0}")] NotRegistered(String),
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u128, need: u128 },
    #[error("supply overflow")] SupplyOverflow,
    #[error("ledger backend: {0}")] Backend(String),
}

/// Kind of failure, independent of which operation produced it.
///
/// Callers that only care whether to fix their input, wait, or give up
/// can branch on this instead of on the concrete variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidTerm,
    InvalidAmount,
    ClaimConflict,
    StakeConflict,
    MaturityNotReached,
    PercentOutOfRange,
    InsufficientBalance,
    SupplyExhausted,
    Arithmetic,
    Ledger,
    Encoding,
    Config,
}

#[derive(Error, Debug)]
pub enum XenError {
    #[error(transparent)] Reward(#[from] RewardError),
    #[error(transparent)] Mint(#[from] MintError),
    #[error(transparent)] Stake(#[from] StakeError),
    #[error(transparent)] Burn(#[from] BurnError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error("state encoding: {0}")] Encoding(String),
    #[error("invalid config: {0}")] Config(String),
}

impl XenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Reward(RewardError::ArithmeticOverflow) => ErrorKind::Arithmetic,
            Self::Mint(e) => match e {
                MintError::TermTooShort { .. } | MintError::TermTooLong { .. } => ErrorKind::InvalidTerm,
                MintError::SupplyExhausted { .. } => ErrorKind::SupplyExhausted,
                MintError::ClaimAlreadyOpen(_) | MintError::NoOpenClaim(_) => ErrorKind::ClaimConflict,
                MintError::NotMatured { .. } => ErrorKind::MaturityNotReached,
                MintError::PercentOutOfRange(_) => ErrorKind::PercentOutOfRange,
            },
            Self::Stake(e) => match e {
                StakeError::TermTooShort { .. } | StakeError::TermTooLong { .. } => ErrorKind::InvalidTerm,
                StakeError::AmountTooSmall { .. } => ErrorKind::InvalidAmount,
                StakeError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
                StakeError::PositionAlreadyOpen(_)
                | StakeError::NoStakePosition(_)
                | StakeError::PositionAlreadyEmpty(_) => ErrorKind::StakeConflict,
            },
            Self::Burn(e) => match e {
                BurnError::AmountTooSmall { .. } => ErrorKind::InvalidAmount,
                BurnError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            },
            Self::Ledger(LedgerError::InsufficientBalance { .. }) => ErrorKind::InsufficientBalance,
            Self::Ledger(_) => ErrorKind::Ledger,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}
