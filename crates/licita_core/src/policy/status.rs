//! Lifecycle status derivation.
//!
//! # Responsibility
//! - Map raw ledger fields plus wall-clock time to presentation status.
//!
//! # Invariants
//! - Both functions are total: every input maps to exactly one status.
//! - An expired deadline overrides the raw tender status.
//! - The winner branch of proposal status ignores the deadline.

use crate::model::address::Address;
use crate::model::proposal::Proposal;
use crate::model::tender::{Tender, TenderRawStatus};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// User-facing tender status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderStatus {
    Open,
    Closed,
    InEvaluation,
    Awarded,
    Cancelled,
}

/// User-facing status of a proposal from the viewer's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Winning,
    NotSelected,
    TenderClosed,
    UnderEvaluation,
}

pub fn compute_tender_status(tender: &Tender, now: u64) -> TenderStatus {
    if now >= tender.deadline {
        return TenderStatus::Closed;
    }
    match tender.raw_status {
        TenderRawStatus::Created | TenderRawStatus::Open => TenderStatus::Open,
        TenderRawStatus::InEvaluation => TenderStatus::InEvaluation,
        TenderRawStatus::Awarded => TenderStatus::Awarded,
        TenderRawStatus::Cancelled => TenderStatus::Cancelled,
    }
}

/// Derives proposal status for `viewer`.
///
/// Check order matters: the actual winner sees `Winning` even after the
/// deadline, and a zero viewer never matches an unset winner. Only `tender`
/// decides the result; a proposal filed under another id is not checked.
pub fn compute_proposal_status(
    _proposal: &Proposal,
    tender: &Tender,
    viewer: &Address,
    now: u64,
) -> ProposalStatus {
    if tender.has_winner() && tender.winner == *viewer {
        return ProposalStatus::Winning;
    }
    if tender.has_winner() {
        return ProposalStatus::NotSelected;
    }
    if now >= tender.deadline {
        return ProposalStatus::TenderClosed;
    }
    ProposalStatus::UnderEvaluation
}

/// Current wall-clock time in unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
