//! Account and network change notifications.
//!
//! # Responsibility
//! - Publish typed context changes from the wallet/provider integration.
//! - Hand consumers an explicit, cancellable subscription.
//!
//! # Invariants
//! - A cancelled subscription never yields again.
//! - Lagging subscribers skip missed changes; any change forces a full resync,
//!   so the next delivered change is sufficient.

use crate::model::address::Address;
use log::warn;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

const FEED_CAPACITY: usize = 16;

/// External context change that invalidates every cached view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextChange {
    /// Connected account switched; `None` when the wallet disconnected.
    AccountChanged(Option<Address>),
    /// Wallet switched to another network.
    NetworkChanged { chain_id: u64 },
}

/// Publisher side of context changes.
pub struct ContextFeed {
    sender: broadcast::Sender<ContextChange>,
}

impl Default for ContextFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Publishes one change; returns how many live subscriptions received it.
    pub fn publish(&self, change: ContextChange) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    pub fn subscribe(&self) -> ContextSubscription {
        ContextSubscription {
            id: Uuid::new_v4(),
            receiver: Some(self.sender.subscribe()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Consumer side of context changes.
pub struct ContextSubscription {
    id: Uuid,
    receiver: Option<broadcast::Receiver<ContextChange>>,
}

impl ContextSubscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Waits for the next change; `None` once cancelled or the feed is gone.
    pub async fn next(&mut self) -> Option<ContextChange> {
        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "event=context_lagged module=session status=skipped subscription={} skipped={}",
                        self.id, skipped
                    );
                }
                Err(RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Stops delivery; later `next()` calls return `None` immediately.
    pub fn cancel(&mut self) {
        self.receiver = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.receiver.is_none()
    }
}
