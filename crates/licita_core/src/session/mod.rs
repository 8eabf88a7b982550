//! Session wiring: one explicit context injected into every repository.
//!
//! # Responsibility
//! - Construct repositories, the activity log and services from one
//!   `LedgerContext`.
//! - Run the bootstrap sync and react to account/network changes.
//!
//! # Invariants
//! - A context change discards every cache before the resync starts.
//! - The activity feed runs once per bootstrap, independent of the sync;
//!   its failure never fails the sync snapshot.

pub mod context;
pub mod watcher;

use crate::activity::{ActivityFeed, ActivityLog};
use crate::config::ActivityPolicy;
use crate::error::CoreResult;
use crate::model::address::Address;
use crate::repo::admin_registry::{AdminRegistry, AdminSet};
use crate::repo::proposal_repo::ProposalRepository;
use crate::repo::tender_repo::{TenderRepository, TenderScan};
use crate::service::evaluation_service::EvaluationService;
use context::LedgerContext;
use log::{error, info};
use parking_lot::RwLock;
use std::sync::Arc;
use watcher::{ContextChange, ContextSubscription};

/// Fully rebuilt view after one sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSnapshot {
    pub tenders: TenderScan,
    pub admins: AdminSet,
    pub account: Option<Address>,
    pub account_is_admin: bool,
}

/// Outcome of session bootstrap.
#[derive(Debug)]
pub struct BootstrapReport {
    pub snapshot: SyncSnapshot,
    pub activity: CoreResult<ActivityFeed>,
}

/// One connected session with its repositories.
pub struct Session {
    ctx: LedgerContext,
    tenders: Arc<TenderRepository>,
    proposals: Arc<ProposalRepository>,
    admins: Arc<AdminRegistry>,
    activity: ActivityLog,
    evaluation: EvaluationService,
    account: RwLock<Option<Address>>,
}

impl Session {
    pub fn new(ctx: LedgerContext, account: Option<Address>) -> Self {
        let tenders = Arc::new(TenderRepository::new(ctx.clone()));
        let proposals = Arc::new(ProposalRepository::new(ctx.clone(), Arc::clone(&tenders)));
        let admins = Arc::new(AdminRegistry::new(ctx.clone()));
        let activity = ActivityLog::new(ctx.clone());
        let evaluation = EvaluationService::new(
            ctx.clone(),
            Arc::clone(&tenders),
            Arc::clone(&proposals),
            Arc::clone(&admins),
        );

        Self {
            ctx,
            tenders,
            proposals,
            admins,
            activity,
            evaluation,
            account: RwLock::new(account),
        }
    }

    pub fn context(&self) -> &LedgerContext {
        &self.ctx
    }

    pub fn tenders(&self) -> &TenderRepository {
        &self.tenders
    }

    pub fn proposals(&self) -> &ProposalRepository {
        &self.proposals
    }

    pub fn admins(&self) -> &AdminRegistry {
        &self.admins
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn evaluation(&self) -> &EvaluationService {
        &self.evaluation
    }

    /// Currently connected account, if any.
    pub fn account(&self) -> Option<Address> {
        self.account.read().clone()
    }

    /// Initial sync plus the one-off activity feed load.
    pub async fn bootstrap(&self) -> CoreResult<BootstrapReport> {
        let (snapshot, activity) = futures::join!(self.resync(), self.load_activity());
        let snapshot = snapshot?;
        if let Err(err) = &activity {
            error!(
                "event=bootstrap_activity module=session status=error session={} code={}",
                self.ctx.session_id(),
                err.code()
            );
        }
        Ok(BootstrapReport { snapshot, activity })
    }

    /// Rebuilds tenders, admins and the account's admin flag from the ledger.
    pub async fn resync(&self) -> CoreResult<SyncSnapshot> {
        let account = self.account();
        let (tenders, admins) =
            futures::try_join!(self.tenders.scan_all(), self.admins.list())?;
        let account_is_admin = match &account {
            Some(address) => self.admins.is_admin(address).await?,
            None => false,
        };

        info!(
            "event=session_synced module=session status=ok session={} tenders={} admins={} connected_account={} account_is_admin={}",
            self.ctx.session_id(),
            tenders.tenders.len(),
            admins.len(),
            account.is_some(),
            account_is_admin
        );
        Ok(SyncSnapshot {
            tenders,
            admins,
            account,
            account_is_admin,
        })
    }

    /// Drops every cached view.
    pub fn invalidate(&self) {
        self.tenders.invalidate();
        self.proposals.invalidate();
        self.admins.invalidate();
    }

    /// Applies one context change: discard caches, then resync fully.
    pub async fn apply(&self, change: ContextChange) -> CoreResult<SyncSnapshot> {
        match change {
            ContextChange::AccountChanged(account) => {
                info!(
                    "event=account_changed module=session status=ok session={} connected_account={}",
                    self.ctx.session_id(),
                    account.is_some()
                );
                *self.account.write() = account;
            }
            ContextChange::NetworkChanged { chain_id } => {
                info!(
                    "event=network_changed module=session status=ok session={} chain_id={}",
                    self.ctx.session_id(),
                    chain_id
                );
            }
        }
        self.invalidate();
        self.resync().await
    }

    /// Applies changes until the subscription ends; stops at the first failure.
    ///
    /// Returns how many changes were applied.
    pub async fn follow(&self, subscription: &mut ContextSubscription) -> CoreResult<usize> {
        let mut applied = 0usize;
        while let Some(change) = subscription.next().await {
            self.apply(change).await?;
            applied += 1;
        }
        Ok(applied)
    }

    async fn load_activity(&self) -> CoreResult<ActivityFeed> {
        let config = self.ctx.config();
        match config.activity_policy {
            ActivityPolicy::AllOrNothing => {
                let events = self.activity.recent(config.activity_limit).await?;
                Ok(ActivityFeed {
                    events,
                    failed_streams: Vec::new(),
                })
            }
            ActivityPolicy::Partial => self.activity.recent_degraded(config.activity_limit).await,
        }
    }
}
