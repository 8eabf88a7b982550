//! Tender repository over the ledger's index-only tender store.
//!
//! # Responsibility
//! - Enumerate tenders by bounded linear probing (the ledger has no count).
//! - Guard tender creation and deletion before submitting them.
//!
//! # Invariants
//! - Ids are probed in ascending order starting at 1.
//! - A revert or out-of-range read marks the end of the id space.
//! - Placeholder slots (`creator == ZERO`) are never returned.
//! - The cache is replaced wholesale by each scan, never patched.

use crate::error::{CoreError, CoreResult};
use crate::gateway::{methods, LedgerError, LedgerGateway, Receipt};
use crate::model::address::Address;
use crate::model::tender::{Tender, TenderDraft, TenderId};
use crate::policy::guard;
use crate::policy::status::unix_now;
use crate::repo::admin_registry::read_admin_flag;
use crate::session::context::LedgerContext;
use log::{debug, info};
use parking_lot::RwLock;
use serde_json::json;

/// Result of one full tender enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenderScan {
    /// Real tenders in ascending id order.
    pub tenders: Vec<Tender>,
    /// The probe hit `scan_bound` without finding the end of the id space.
    pub possibly_truncated: bool,
}

impl TenderScan {
    pub fn find(&self, id: TenderId) -> Option<&Tender> {
        self.tenders.iter().find(|tender| tender.id == id)
    }
}

enum Probe {
    Record(Tender),
    Hole,
    End,
}

/// Ledger-backed tender repository with a read-through cache of `scan_all()`.
pub struct TenderRepository {
    ctx: LedgerContext,
    cache: RwLock<Option<TenderScan>>,
}

impl TenderRepository {
    pub fn new(ctx: LedgerContext) -> Self {
        Self {
            ctx,
            cache: RwLock::new(None),
        }
    }

    /// Probes ids `1..scan_bound` until the ledger reports the end.
    ///
    /// Out-of-range, reverted and empty slots end the scan; unavailable and
    /// transport failures propagate unchanged.
    pub async fn scan_all(&self) -> CoreResult<TenderScan> {
        let gateway = self.ctx.gateway()?;
        let bound = self.ctx.config().scan_bound;

        let mut tenders = Vec::new();
        let mut holes = 0usize;
        let mut reached_end = false;
        for id in 1..bound {
            match probe(gateway.as_ref(), id).await? {
                Probe::Record(tender) => tenders.push(tender),
                Probe::Hole => holes += 1,
                Probe::End => {
                    reached_end = true;
                    break;
                }
            }
        }

        let scan = TenderScan {
            tenders,
            possibly_truncated: !reached_end,
        };
        info!(
            "event=tenders_scanned module=tender_repo status=ok session={} tenders={} holes={} truncated={}",
            self.ctx.session_id(),
            scan.tenders.len(),
            holes,
            scan.possibly_truncated
        );
        *self.cache.write() = Some(scan.clone());
        Ok(scan)
    }

    /// Direct single-slot read; placeholder or missing slots are `NotFound`.
    pub async fn get(&self, id: TenderId) -> CoreResult<Tender> {
        let gateway = self.ctx.gateway()?;
        match probe(gateway.as_ref(), id).await? {
            Probe::Record(tender) => Ok(tender),
            Probe::Hole | Probe::End => Err(CoreError::not_found("tender", id)),
        }
    }

    /// Validates the draft, then submits the creation and waits for it.
    ///
    /// The cache is not touched; callers re-scan to observe the new tender.
    pub async fn create(&self, draft: &TenderDraft, sender: &Address) -> CoreResult<Receipt> {
        let gateway = self.ctx.gateway()?;
        draft.validate(unix_now())?;

        let receipt = gateway
            .submit(methods::CREATE_TENDER, &draft.to_args(), sender)
            .await?;
        info!(
            "event=tender_created module=tender_repo status=ok session={} block={}",
            self.ctx.session_id(),
            receipt.block_number
        );
        Ok(receipt)
    }

    /// Deletes a tender when `sender` is its creator or an admin.
    pub async fn remove(&self, id: TenderId, sender: &Address) -> CoreResult<Receipt> {
        let gateway = self.ctx.gateway()?;
        let tender = self.get(id).await?;
        let is_admin = read_admin_flag(gateway.as_ref(), sender).await?;
        guard::ensure_can_delete_tender(&tender, sender, is_admin)?;

        let receipt = gateway
            .submit(methods::DELETE_TENDER, &[json!(id)], sender)
            .await?;
        info!(
            "event=tender_removed module=tender_repo status=ok session={} tender_id={} block={}",
            self.ctx.session_id(),
            id,
            receipt.block_number
        );
        Ok(receipt)
    }

    /// Last full `scan_all()` result, if any.
    pub fn cached(&self) -> Option<TenderScan> {
        self.cache.read().clone()
    }

    pub fn invalidate(&self) {
        *self.cache.write() = None;
    }
}

async fn probe(gateway: &dyn LedgerGateway, id: TenderId) -> CoreResult<Probe> {
    let value = match gateway.call(methods::TENDERS, &[json!(id)]).await {
        Ok(value) => value,
        Err(LedgerError::OutOfRange(_)) => {
            debug!("event=tender_probe_end module=tender_repo status=ok id={id} reason=out_of_range");
            return Ok(Probe::End);
        }
        // Reading past the last slot reverts on most deployments.
        Err(LedgerError::Rejected(_)) => {
            debug!("event=tender_probe_end module=tender_repo status=ok id={id} reason=reverted");
            return Ok(Probe::End);
        }
        Err(err) => return Err(err.into()),
    };

    match Tender::from_ledger(id, value)? {
        None => Ok(Probe::End),
        Some(tender) if tender.is_placeholder() => Ok(Probe::Hole),
        Some(tender) => Ok(Probe::Record(tender)),
    }
}
