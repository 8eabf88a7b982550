//! Pure derivation and authorization policies.
//!
//! Nothing in this module performs I/O; callers pass in ledger records and
//! wall-clock time explicitly.

pub mod guard;
pub mod status;
