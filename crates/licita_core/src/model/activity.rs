//! Activity events read from ledger history.
//!
//! # Invariants
//! - Events are immutable once read; core only re-orders and truncates.
//! - `timestamp` stays `None` until resolved from the containing block.

use crate::error::{CoreError, CoreResult};
use crate::gateway::{events, RawEvent};
use crate::model::address::Address;
use crate::model::wire::de_u64;
use serde::{Deserialize, Serialize};

/// Kind of historical ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    TenderCreated,
    TenderDeleted,
    ProposalSubmitted,
    WinnerSelected,
}

impl ActivityKind {
    /// Ledger event stream name.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::TenderCreated => events::TENDER_CREATED,
            Self::TenderDeleted => events::TENDER_DELETED,
            Self::ProposalSubmitted => events::PROPOSAL_SUBMITTED,
            Self::WinnerSelected => events::WINNER_SELECTED,
        }
    }

    /// Return-value keys holding `(actor, subject id)` for this kind.
    fn fields(self) -> (&'static str, &'static str) {
        match self {
            Self::TenderCreated => ("creator", "id"),
            Self::TenderDeleted => ("deletedBy", "id"),
            Self::ProposalSubmitted => ("proponent", "proposalId"),
            Self::WinnerSelected => ("winner", "tenderId"),
        }
    }
}

/// One tagged entry of the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub actor: Address,
    pub subject_id: u64,
    pub transaction_hash: String,
    pub block_number: u64,
    /// Unix seconds of the containing block, once resolved.
    pub timestamp: Option<u64>,
}

#[derive(Deserialize)]
struct SubjectId(#[serde(deserialize_with = "de_u64")] u64);

impl ActivityEvent {
    /// Tags a raw ledger event with `kind` and extracts actor and subject.
    pub fn from_raw(kind: ActivityKind, raw: RawEvent) -> CoreResult<Self> {
        let (actor_key, subject_key) = kind.fields();
        let malformed = |detail: &str| {
            CoreError::InvalidData(format!(
                "{} event in tx {}: {detail}",
                kind.event_name(),
                raw.transaction_hash
            ))
        };

        let actor = raw
            .return_values
            .get(actor_key)
            .and_then(|value| value.as_str())
            .ok_or_else(|| malformed(&format!("missing `{actor_key}`")))?;
        let subject = raw
            .return_values
            .get(subject_key)
            .cloned()
            .ok_or_else(|| malformed(&format!("missing `{subject_key}`")))?;
        let SubjectId(subject_id) = serde_json::from_value(subject)
            .map_err(|err| malformed(&format!("bad `{subject_key}`: {err}")))?;

        Ok(Self {
            kind,
            actor: Address::from_ledger(actor),
            subject_id,
            transaction_hash: raw.transaction_hash,
            block_number: raw.block_number,
            timestamp: None,
        })
    }
}
