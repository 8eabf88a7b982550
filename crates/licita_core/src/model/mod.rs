//! Domain model mirrored from the ledger.
//!
//! # Responsibility
//! - Define tender, proposal, address and activity records used by core.
//! - Decode ledger payloads into typed records.
//!
//! # Invariants
//! - Records have no local lifecycle; the ledger creates and destroys them.
//! - Addresses compare case-insensitively everywhere.

pub mod activity;
pub mod address;
pub mod amount;
pub mod proposal;
pub mod tender;
pub(crate) mod wire;
