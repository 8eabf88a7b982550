//! Ledger synchronization core for Licita tender procurement.
//! Every tender, proposal and admin fact is read from the ledger; this crate
//! only mirrors, guards and orders it.

pub mod activity;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;
pub mod session;

pub use activity::{ActivityFeed, ActivityLog};
pub use config::{ActivityPolicy, SyncConfig};
pub use error::{CoreError, CoreResult};
pub use gateway::{
    BlockRef, BlockTag, LedgerError, LedgerGateway, LedgerResult, RawEvent, Receipt,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::activity::{ActivityEvent, ActivityKind};
pub use model::address::Address;
pub use model::proposal::{Proposal, ProposalDraft, ProposalId};
pub use model::tender::{Tender, TenderDraft, TenderId};
pub use policy::status::{
    compute_proposal_status, compute_tender_status, ProposalStatus, TenderStatus,
};
pub use repo::admin_registry::{AdminRegistry, AdminSet};
pub use repo::proposal_repo::{AccountProposal, ProposalRepository};
pub use repo::tender_repo::{TenderRepository, TenderScan};
pub use service::evaluation_service::{EvaluationService, PendingTender};
pub use session::context::LedgerContext;
pub use session::watcher::{ContextChange, ContextFeed, ContextSubscription};
pub use session::{BootstrapReport, Session, SyncSnapshot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
