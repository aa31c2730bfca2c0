//! # xen-ledger — Per-account state machines and global counters.
//!
//! - [`Dashboard`]: global rank, supply, and position counters.
//! - [`MintClaimLedger`]: one rank claim per account, opened then settled.
//! - [`StakeLedger`]: one staking position per account, opened then withdrawn.
//! - [`XenEngine`]: the entry-point facade threading an explicit
//!   [`Context`] through every operation.
//!
//! Every entry operation checks all of its preconditions before mutating
//! anything. The host is expected to run each call atomically.

pub mod burn;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod engine;
pub mod memory;
pub mod mint;
pub mod stake;
pub mod state;

pub use config::{EngineConfig, RankSnapshot};
pub use context::Context;
pub use dashboard::Dashboard;
pub use engine::XenEngine;
pub use memory::{ManualClock, MemoryTokenLedger};
pub use mint::MintClaimLedger;
pub use stake::StakeLedger;
pub use state::EngineState;
