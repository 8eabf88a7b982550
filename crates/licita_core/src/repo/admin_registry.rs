//! Admin capability registry backed by the ledger.
//!
//! # Responsibility
//! - Resolve the current admin set from the enumeration list plus the
//!   authoritative per-address flag.
//! - Guard admin additions/removals before submitting them.
//!
//! # Invariants
//! - `list()` returns only addresses whose flag is currently true.
//! - `is_admin()` is never cached; authorization needs fresh data.
//! - The acting account can never remove itself.

use crate::error::{CoreError, CoreResult};
use crate::gateway::{methods, LedgerGateway, Receipt};
use crate::model::address::Address;
use crate::policy::guard;
use crate::session::context::LedgerContext;
use log::info;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Unique, unordered set of admin addresses (kept in first-seen order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSet {
    members: Vec<Address>,
}

impl AdminSet {
    fn from_verified(candidates: Vec<Address>) -> Self {
        let mut seen = HashSet::new();
        let members = candidates
            .into_iter()
            .filter(|address| seen.insert(address.clone()))
            .collect();
        Self { members }
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.members.iter().any(|member| member == address)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}

/// Reads the authoritative admin flag of one address.
pub(crate) async fn read_admin_flag(
    gateway: &dyn LedgerGateway,
    address: &Address,
) -> CoreResult<bool> {
    let value = gateway
        .call(methods::ADMIN_FLAG, &[json!(address.as_str())])
        .await?;
    match value {
        Value::Bool(flag) => Ok(flag),
        Value::Null => Ok(false),
        other => Err(CoreError::InvalidData(format!(
            "admin flag must be a boolean, got `{other}`"
        ))),
    }
}

/// Ledger-backed admin registry with a read-through cache of `list()`.
pub struct AdminRegistry {
    ctx: LedgerContext,
    cache: RwLock<Option<AdminSet>>,
}

impl AdminRegistry {
    pub fn new(ctx: LedgerContext) -> Self {
        Self {
            ctx,
            cache: RwLock::new(None),
        }
    }

    /// Enumerates candidates, then re-verifies each against its flag.
    pub async fn list(&self) -> CoreResult<AdminSet> {
        let gateway = self.ctx.gateway()?;
        let value = gateway.call(methods::ADMIN_LIST, &[]).await?;
        let candidates = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(text) => Ok(Address::from_ledger(text)),
                    other => Err(CoreError::InvalidData(format!(
                        "admin list entry must be an address, got `{other}`"
                    ))),
                })
                .collect::<CoreResult<Vec<_>>>()?,
            other => {
                return Err(CoreError::InvalidData(format!(
                    "admin list must be an array, got `{other}`"
                )))
            }
        };

        let candidate_count = candidates.len();
        let mut verified = Vec::with_capacity(candidate_count);
        for candidate in candidates {
            if read_admin_flag(gateway.as_ref(), &candidate).await? {
                verified.push(candidate);
            }
        }

        let admins = AdminSet::from_verified(verified);
        info!(
            "event=admins_listed module=admin_registry status=ok session={} candidates={} admins={}",
            self.ctx.session_id(),
            candidate_count,
            admins.len()
        );
        *self.cache.write() = Some(admins.clone());
        Ok(admins)
    }

    /// Direct, uncached read of the admin flag.
    pub async fn is_admin(&self, address: &Address) -> CoreResult<bool> {
        let gateway = self.ctx.gateway()?;
        read_admin_flag(gateway.as_ref(), address).await
    }

    /// Validates `target`, rejects existing admins, then submits the grant.
    pub async fn add(&self, target: &str, sender: &Address) -> CoreResult<Receipt> {
        let gateway = self.ctx.gateway()?;
        let target = Address::parse(target)?;
        let already_admin = read_admin_flag(gateway.as_ref(), &target).await?;
        guard::ensure_can_add_admin(&target, already_admin)?;

        let receipt = gateway
            .submit(methods::ADD_ADMIN, &[json!(target.as_str())], sender)
            .await?;
        info!(
            "event=admin_added module=admin_registry status=ok session={} block={}",
            self.ctx.session_id(),
            receipt.block_number
        );
        Ok(receipt)
    }

    /// Validates `target`, rejects self-removal locally, then submits the revoke.
    pub async fn remove(&self, target: &str, sender: &Address) -> CoreResult<Receipt> {
        let gateway = self.ctx.gateway()?;
        let target = Address::parse(target)?;
        guard::ensure_can_remove_admin(&target, sender)?;
        if !read_admin_flag(gateway.as_ref(), &target).await? {
            return Err(CoreError::NotAdmin(target));
        }

        let receipt = gateway
            .submit(methods::REMOVE_ADMIN, &[json!(target.as_str())], sender)
            .await?;
        info!(
            "event=admin_removed module=admin_registry status=ok session={} block={}",
            self.ctx.session_id(),
            receipt.block_number
        );
        Ok(receipt)
    }

    /// Last full `list()` result, if any.
    pub fn cached(&self) -> Option<AdminSet> {
        self.cache.read().clone()
    }

    pub fn invalidate(&self) {
        *self.cache.write() = None;
    }
}
