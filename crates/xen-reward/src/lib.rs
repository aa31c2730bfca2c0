//! # xen-reward — Reward, penalty and decay math.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Logarithmic rank delta**: rewards grow with `log2` of how many ranks
//!   were claimed after yours, floored at 1 so the term never collapses.
//! - **Decay schedules**: the reward amplifier decays with both elapsed days
//!   and emitted supply, the EAA with global rank, the staking APY in 90-day
//!   steps; the maximum mint term grows with `log2(global_rank)`.
//! - **Late penalty**: settling past maturity costs an exponentially growing
//!   share of the reward, reaching 99% after the withdrawal window.
//! - **Stake yield**: simple interest on principal for matured positions.

pub mod engine;
pub mod log2;
pub mod penalty;
pub mod schedule;

pub use engine::RewardEngine;
pub use log2::log2_floor;
pub use penalty::withdrawal_penalty;
