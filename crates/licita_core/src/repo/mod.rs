//! Ledger-backed repositories.
//!
//! # Responsibility
//! - Read tenders, proposals and admins through the injected gateway.
//! - Run guard checks before any write reaches the ledger.
//!
//! # Invariants
//! - Caches are read-through views rebuilt by each sync call.
//! - Writes never update caches; callers re-fetch after confirmation.

pub mod admin_registry;
pub mod proposal_repo;
pub mod tender_repo;
