//! Tender evaluation use-case service.
//!
//! # Responsibility
//! - Build the evaluation queue: unawarded tenders with their proposals.
//! - Guard and submit winner selection.
//!
//! # Invariants
//! - Only admins may select a winner.
//! - A tender with a winner never re-enters the queue.
//! - A failed proposal read for one queued tender yields an empty list for it.

use crate::error::{CoreError, CoreResult};
use crate::gateway::{methods, Receipt};
use crate::model::address::Address;
use crate::model::proposal::{Proposal, ProposalId};
use crate::model::tender::{Tender, TenderId};
use crate::repo::admin_registry::AdminRegistry;
use crate::repo::proposal_repo::ProposalRepository;
use crate::repo::tender_repo::TenderRepository;
use crate::session::context::LedgerContext;
use log::{info, warn};
use serde_json::json;
use std::sync::Arc;

/// One unawarded tender and its proposals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTender {
    pub tender: Tender,
    pub proposals: Vec<Proposal>,
}

/// Evaluation use-cases over the tender and proposal repositories.
pub struct EvaluationService {
    ctx: LedgerContext,
    tenders: Arc<TenderRepository>,
    proposals: Arc<ProposalRepository>,
    admins: Arc<AdminRegistry>,
}

impl EvaluationService {
    pub fn new(
        ctx: LedgerContext,
        tenders: Arc<TenderRepository>,
        proposals: Arc<ProposalRepository>,
        admins: Arc<AdminRegistry>,
    ) -> Self {
        Self {
            ctx,
            tenders,
            proposals,
            admins,
        }
    }

    /// Tenders without a winner, each paired with its proposals.
    pub async fn pending(&self) -> CoreResult<Vec<PendingTender>> {
        let scan = self.tenders.scan_all().await?;

        let mut queue = Vec::new();
        for tender in scan.tenders.into_iter().filter(|tender| !tender.has_winner()) {
            let proposals = match self.proposals.for_tender(tender.id).await {
                Ok(proposals) => proposals,
                Err(err) => {
                    warn!(
                        "event=evaluation_proposals_failed module=evaluation status=skipped session={} tender_id={} code={}",
                        self.ctx.session_id(),
                        tender.id,
                        err.code()
                    );
                    Vec::new()
                }
            };
            queue.push(PendingTender { tender, proposals });
        }
        Ok(queue)
    }

    /// Awards `tender_id` to `proposal_id`.
    pub async fn select_winner(
        &self,
        tender_id: TenderId,
        proposal_id: ProposalId,
        sender: &Address,
    ) -> CoreResult<Receipt> {
        let gateway = self.ctx.gateway()?;
        if !self.admins.is_admin(sender).await? {
            return Err(CoreError::PermissionDenied {
                action: "select a winner",
            });
        }

        let tender = self.tenders.get(tender_id).await?;
        if tender.has_winner() {
            return Err(CoreError::InvalidInput(format!(
                "tender {tender_id} already has a winner"
            )));
        }
        self.proposals.find(tender_id, proposal_id).await?;

        let receipt = gateway
            .submit(
                methods::SELECT_WINNER,
                &[json!(tender_id), json!(proposal_id)],
                sender,
            )
            .await?;
        info!(
            "event=winner_selected module=evaluation status=ok session={} tender_id={} proposal_id={} block={}",
            self.ctx.session_id(),
            tender_id,
            proposal_id,
            receipt.block_number
        );
        Ok(receipt)
    }
}
