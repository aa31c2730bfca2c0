//! Integration test suite for the XEN emission engine.
//!
//! Drives the full engine over the in-memory ledger and a manual clock:
//! end-to-end lifecycles in `tests/e2e.rs`, attempts to break accounting
//! invariants in `tests/adversarial.rs`.

pub mod helpers;
