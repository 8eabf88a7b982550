//! Merged activity feed over historical ledger event streams.
//!
//! # Responsibility
//! - Fetch typed event streams in parallel and tag each event.
//! - Produce the recent-activity feed ordered by block timestamp.
//! - Produce the operational history ordered by block number.
//!
//! # Invariants
//! - `recent()` and `history()` are all-or-nothing across streams.
//! - `recent(n)` yields at most `n` events, non-increasing by timestamp;
//!   ties fall back to block number, then stream insertion order.
//! - `history()` never resolves timestamps.
//! - Ledger history is never mutated, only re-ordered and truncated.

use crate::error::{CoreError, CoreResult};
use crate::gateway::{BlockRef, LedgerGateway};
use crate::model::activity::{ActivityEvent, ActivityKind};
use crate::session::context::LedgerContext;
use futures::future::{join3, try_join_all};
use log::{info, warn};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

/// Streams merged into the recent-activity feed.
pub const RECENT_STREAMS: [ActivityKind; 3] = [
    ActivityKind::TenderCreated,
    ActivityKind::TenderDeleted,
    ActivityKind::WinnerSelected,
];

/// Streams merged into the operational history table.
pub const HISTORY_STREAMS: [ActivityKind; 3] = [
    ActivityKind::TenderCreated,
    ActivityKind::ProposalSubmitted,
    ActivityKind::WinnerSelected,
];

/// Feed built under partial degradation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFeed {
    pub events: Vec<ActivityEvent>,
    /// Streams whose fetch failed and contributed nothing.
    pub failed_streams: Vec<ActivityKind>,
}

impl ActivityFeed {
    pub fn is_complete(&self) -> bool {
        self.failed_streams.is_empty()
    }
}

/// Activity feed reader bound to one ledger context.
pub struct ActivityLog {
    ctx: LedgerContext,
}

impl ActivityLog {
    pub fn new(ctx: LedgerContext) -> Self {
        Self { ctx }
    }

    /// Newest-first feed of at most `limit` events.
    ///
    /// Fails entirely when any of the three stream fetches fails.
    pub async fn recent(&self, limit: usize) -> CoreResult<Vec<ActivityEvent>> {
        let gateway = self.ctx.gateway()?;
        let [created, deleted, awarded] = RECENT_STREAMS;
        let (created, deleted, awarded) = futures::try_join!(
            self.fetch_stream(created),
            self.fetch_stream(deleted),
            self.fetch_stream(awarded),
        )?;

        let mut events = concat([created, deleted, awarded]);
        resolve_timestamps(gateway.as_ref(), &mut events).await?;
        sort_by_timestamp(&mut events);
        events.truncate(limit);

        info!(
            "event=activity_loaded module=activity status=ok session={} events={} limit={}",
            self.ctx.session_id(),
            events.len(),
            limit
        );
        Ok(events)
    }

    /// Like `recent`, but keeps the streams that succeeded.
    ///
    /// Timestamp resolution failures still fail the whole call.
    pub async fn recent_degraded(&self, limit: usize) -> CoreResult<ActivityFeed> {
        let gateway = self.ctx.gateway()?;
        let [created, deleted, awarded] = RECENT_STREAMS;
        let results = join3(
            self.fetch_stream(created),
            self.fetch_stream(deleted),
            self.fetch_stream(awarded),
        )
        .await;

        let mut feed = ActivityFeed::default();
        let mut streams = Vec::with_capacity(RECENT_STREAMS.len());
        let outcomes = [results.0, results.1, results.2];
        for (kind, result) in RECENT_STREAMS.into_iter().zip(outcomes) {
            match result {
                Ok(events) => streams.push(events),
                Err(err) => {
                    warn!(
                        "event=activity_stream_failed module=activity status=skipped session={} stream={} code={}",
                        self.ctx.session_id(),
                        kind.event_name(),
                        err.code()
                    );
                    feed.failed_streams.push(kind);
                }
            }
        }

        let mut events = streams.into_iter().flatten().collect::<Vec<_>>();
        resolve_timestamps(gateway.as_ref(), &mut events).await?;
        sort_by_timestamp(&mut events);
        events.truncate(limit);
        feed.events = events;
        Ok(feed)
    }

    /// Full operational history ordered by block number, newest first.
    pub async fn history(&self) -> CoreResult<Vec<ActivityEvent>> {
        self.ctx.gateway()?;
        let [created, submitted, awarded] = HISTORY_STREAMS;
        let (created, submitted, awarded) = futures::try_join!(
            self.fetch_stream(created),
            self.fetch_stream(submitted),
            self.fetch_stream(awarded),
        )?;

        let mut events = concat([created, submitted, awarded]);
        sort_by_block(&mut events);
        info!(
            "event=history_loaded module=activity status=ok session={} events={}",
            self.ctx.session_id(),
            events.len()
        );
        Ok(events)
    }

    async fn fetch_stream(&self, kind: ActivityKind) -> CoreResult<Vec<ActivityEvent>> {
        let gateway = self.ctx.gateway()?;
        let config = self.ctx.config();
        let raw_events = gateway
            .subscribe_events(kind.event_name(), config.from_tag(), config.to_block)
            .await?;
        raw_events
            .into_iter()
            .map(|raw| ActivityEvent::from_raw(kind, raw))
            .collect()
    }
}

fn concat<const N: usize>(streams: [Vec<ActivityEvent>; N]) -> Vec<ActivityEvent> {
    streams.into_iter().flatten().collect()
}

/// Resolves every event's block timestamp, one lookup per distinct transaction.
///
/// Lookups run concurrently; results are assigned back by transaction hash,
/// so ordering matches the sequential version.
async fn resolve_timestamps(
    gateway: &dyn LedgerGateway,
    events: &mut [ActivityEvent],
) -> CoreResult<()> {
    let mut hashes = Vec::new();
    {
        let mut seen = HashSet::new();
        for event in events.iter() {
            if seen.insert(event.transaction_hash.as_str()) {
                hashes.push(event.transaction_hash.clone());
            }
        }
    }

    let timestamps = try_join_all(hashes.iter().map(|hash| {
        let block = BlockRef::Transaction(hash.clone());
        async move { gateway.resolve_block_timestamp(&block).await }
    }))
    .await?;
    let by_hash = hashes
        .into_iter()
        .zip(timestamps)
        .collect::<HashMap<_, _>>();

    for event in events.iter_mut() {
        let timestamp = by_hash.get(&event.transaction_hash).copied().ok_or_else(|| {
            CoreError::InvalidData(format!(
                "no timestamp resolved for tx {}",
                event.transaction_hash
            ))
        })?;
        event.timestamp = Some(timestamp);
    }
    Ok(())
}

/// Stable: equal keys keep stream insertion order.
fn sort_by_timestamp(events: &mut [ActivityEvent]) {
    events.sort_by_key(|event| (Reverse(event.timestamp), Reverse(event.block_number)));
}

/// Stable: equal block numbers keep stream insertion order.
fn sort_by_block(events: &mut [ActivityEvent]) {
    events.sort_by_key(|event| Reverse(event.block_number));
}
