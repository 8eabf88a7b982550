//! Proposal repository.
//!
//! # Responsibility
//! - Read the ledger-native proposal list of one tender.
//! - Aggregate one account's proposals across every scanned tender.
//! - Guard proposal submission and deletion before submitting them.
//!
//! # Invariants
//! - Proponent filtering compares addresses lower-cased.
//! - In `for_account`, one failed per-tender read is logged and contributes
//!   nothing; every other failure propagates.
//! - Cached lists are replaced per tender on each read, never patched.

use crate::error::{CoreError, CoreResult};
use crate::gateway::{amount_arg, methods, Receipt};
use crate::model::address::Address;
use crate::model::proposal::{decode_proposals, Proposal, ProposalDraft, ProposalId};
use crate::model::tender::{Tender, TenderId};
use crate::policy::guard;
use crate::repo::admin_registry::read_admin_flag;
use crate::repo::tender_repo::TenderRepository;
use crate::session::context::LedgerContext;
use log::{info, warn};
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// One of the account's proposals together with its tender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProposal {
    pub proposal: Proposal,
    pub tender: Tender,
}

/// Ledger-backed proposal repository.
pub struct ProposalRepository {
    ctx: LedgerContext,
    tenders: Arc<TenderRepository>,
    cache: RwLock<HashMap<TenderId, Vec<Proposal>>>,
}

impl ProposalRepository {
    pub fn new(ctx: LedgerContext, tenders: Arc<TenderRepository>) -> Self {
        Self {
            ctx,
            tenders,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Single ledger read of the full proposal list for `tender_id`.
    pub async fn for_tender(&self, tender_id: TenderId) -> CoreResult<Vec<Proposal>> {
        let gateway = self.ctx.gateway()?;
        let value = gateway
            .call(methods::PROPOSALS, &[json!(tender_id)])
            .await?;
        let proposals = decode_proposals(value)?;
        self.cache.write().insert(tender_id, proposals.clone());
        Ok(proposals)
    }

    /// Scans every tender and keeps proposals made by `account`.
    ///
    /// Costs one read per tender; bounded by the tender scan bound.
    pub async fn for_account(&self, account: &Address) -> CoreResult<Vec<AccountProposal>> {
        self.ctx.gateway()?;
        let scan = self.tenders.scan_all().await?;

        let mut owned = Vec::new();
        let mut skipped = 0usize;
        for tender in scan.tenders {
            let proposals = match self.for_tender(tender.id).await {
                Ok(proposals) => proposals,
                Err(err) => {
                    skipped += 1;
                    warn!(
                        "event=account_proposals_partial module=proposal_repo status=skipped session={} tender_id={} code={}",
                        self.ctx.session_id(),
                        tender.id,
                        err.code()
                    );
                    continue;
                }
            };
            owned.extend(
                proposals
                    .into_iter()
                    .filter(|proposal| proposal.proponent == *account)
                    .map(|proposal| AccountProposal {
                        proposal,
                        tender: tender.clone(),
                    }),
            );
        }

        info!(
            "event=account_proposals_loaded module=proposal_repo status=ok session={} proposals={} skipped_tenders={}",
            self.ctx.session_id(),
            owned.len(),
            skipped
        );
        Ok(owned)
    }

    /// Checks the draft against the tender budget, then submits it.
    pub async fn submit(
        &self,
        tender_id: TenderId,
        draft: &ProposalDraft,
        sender: &Address,
    ) -> CoreResult<Receipt> {
        let gateway = self.ctx.gateway()?;
        draft.validate()?;
        let tender = self.tenders.get(tender_id).await?;
        guard::ensure_can_submit_proposal(draft.proposed_amount, &tender)?;

        let receipt = gateway
            .submit(
                methods::SUBMIT_PROPOSAL,
                &[
                    json!(tender_id),
                    json!(draft.description),
                    amount_arg(draft.proposed_amount),
                ],
                sender,
            )
            .await?;
        info!(
            "event=proposal_submitted module=proposal_repo status=ok session={} tender_id={} block={}",
            self.ctx.session_id(),
            tender_id,
            receipt.block_number
        );
        Ok(receipt)
    }

    /// Deletes a proposal when `sender` is its proponent or an admin.
    pub async fn remove(
        &self,
        tender_id: TenderId,
        proposal_id: ProposalId,
        sender: &Address,
    ) -> CoreResult<Receipt> {
        let gateway = self.ctx.gateway()?;
        self.tenders.get(tender_id).await?;
        let proposal = self.find(tender_id, proposal_id).await?;
        let is_admin = read_admin_flag(gateway.as_ref(), sender).await?;
        guard::ensure_can_delete_proposal(&proposal, sender, is_admin)?;

        let receipt = gateway
            .submit(
                methods::DELETE_PROPOSAL,
                &[json!(tender_id), json!(proposal_id)],
                sender,
            )
            .await?;
        info!(
            "event=proposal_removed module=proposal_repo status=ok session={} tender_id={} proposal_id={} block={}",
            self.ctx.session_id(),
            tender_id,
            proposal_id,
            receipt.block_number
        );
        Ok(receipt)
    }

    /// Locates one proposal of a tender by a fresh list read.
    pub async fn find(&self, tender_id: TenderId, proposal_id: ProposalId) -> CoreResult<Proposal> {
        self.for_tender(tender_id)
            .await?
            .into_iter()
            .find(|proposal| proposal.id == proposal_id)
            .ok_or_else(|| CoreError::not_found("proposal", format!("{tender_id}/{proposal_id}")))
    }

    /// Last list read for `tender_id`, if any.
    pub fn cached(&self, tender_id: TenderId) -> Option<Vec<Proposal>> {
        self.cache.read().get(&tender_id).cloned()
    }

    pub fn invalidate(&self) {
        self.cache.write().clear();
    }
}
