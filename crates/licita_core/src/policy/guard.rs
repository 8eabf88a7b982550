//! Client-side mirror of the ledger's access-control rules.
//!
//! # Responsibility
//! - Short-circuit writes the ledger would reject, before any submission.
//!
//! # Invariants
//! - Predicates are pure and stateless.
//! - Address identity is always compared lower-cased.
//! - Passing every check is advisory: the ledger remains the final arbiter.

use crate::error::{CoreError, CoreResult};
use crate::model::address::Address;
use crate::model::proposal::Proposal;
use crate::model::tender::Tender;

pub fn can_delete_tender(tender: &Tender, account: &Address, is_admin: bool) -> bool {
    is_admin || tender.creator == *account
}

pub fn can_delete_proposal(proposal: &Proposal, account: &Address, is_admin: bool) -> bool {
    is_admin || proposal.proponent == *account
}

/// Self-removal is always rejected locally.
pub fn can_remove_admin(target: &Address, account: &Address) -> bool {
    target != account
}

pub fn can_add_admin(already_admin: bool) -> bool {
    !already_admin
}

/// Equal to the budget is allowed; anything above is not.
pub fn can_submit_proposal(proposed_amount: u128, tender: &Tender) -> bool {
    proposed_amount <= tender.budget
}

pub fn ensure_can_delete_tender(
    tender: &Tender,
    account: &Address,
    is_admin: bool,
) -> CoreResult<()> {
    if can_delete_tender(tender, account, is_admin) {
        return Ok(());
    }
    Err(CoreError::PermissionDenied {
        action: "delete this tender",
    })
}

pub fn ensure_can_delete_proposal(
    proposal: &Proposal,
    account: &Address,
    is_admin: bool,
) -> CoreResult<()> {
    if can_delete_proposal(proposal, account, is_admin) {
        return Ok(());
    }
    Err(CoreError::PermissionDenied {
        action: "delete this proposal",
    })
}

pub fn ensure_can_remove_admin(target: &Address, account: &Address) -> CoreResult<()> {
    if can_remove_admin(target, account) {
        return Ok(());
    }
    Err(CoreError::SelfRemovalRejected)
}

pub fn ensure_can_add_admin(target: &Address, already_admin: bool) -> CoreResult<()> {
    if can_add_admin(already_admin) {
        return Ok(());
    }
    Err(CoreError::AlreadyAdmin(target.clone()))
}

pub fn ensure_can_submit_proposal(proposed_amount: u128, tender: &Tender) -> CoreResult<()> {
    if can_submit_proposal(proposed_amount, tender) {
        return Ok(());
    }
    Err(CoreError::BudgetExceeded {
        proposed: proposed_amount,
        budget: tender.budget,
    })
}
