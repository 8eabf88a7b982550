//! Explicit ledger session context.
//!
//! # Invariants
//! - One context is constructed per connection and injected everywhere.
//! - A context without gateway fails every ledger operation with
//!   `GatewayNotReady`.

use crate::config::SyncConfig;
use crate::error::{CoreError, CoreResult};
use crate::gateway::LedgerGateway;
use std::sync::Arc;
use uuid::Uuid;

/// Correlation id attached to every log line of one session.
pub type SessionId = Uuid;

/// Shared handle to the ledger connection and sync settings.
#[derive(Clone)]
pub struct LedgerContext {
    gateway: Option<Arc<dyn LedgerGateway>>,
    config: SyncConfig,
    session_id: SessionId,
}

impl LedgerContext {
    pub fn connected(gateway: Arc<dyn LedgerGateway>, config: SyncConfig) -> Self {
        Self {
            gateway: Some(gateway),
            config,
            session_id: Uuid::new_v4(),
        }
    }

    pub fn disconnected(config: SyncConfig) -> Self {
        Self {
            gateway: None,
            config,
            session_id: Uuid::new_v4(),
        }
    }

    /// Returns the gateway, or `GatewayNotReady` when no connection exists.
    pub fn gateway(&self) -> CoreResult<&Arc<dyn LedgerGateway>> {
        self.gateway.as_ref().ok_or(CoreError::GatewayNotReady)
    }

    pub fn is_connected(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

impl std::fmt::Debug for LedgerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerContext")
            .field("connected", &self.is_connected())
            .field("config", &self.config)
            .field("session_id", &self.session_id)
            .finish()
    }
}
