//! # xen-core
//! Foundation types and traits for the XEN emission engine.
//!
//! Everything that more than one crate needs lives here: the economic
//! constants, the error taxonomy, per-account record types, the traits the
//! engine uses to talk to its collaborators (token ledger, clock, reward
//! math), and the mint/burn capability objects.

pub mod authority;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
