//! Tender domain model.
//!
//! # Responsibility
//! - Define the tender record mirrored from the ledger.
//! - Decode raw ledger slots and validate creation drafts.
//!
//! # Invariants
//! - `creator.is_zero()` marks a slot that was never written or was deleted.
//! - `winner.is_zero()` means no winner has been selected yet.
//! - `id` is the probed slot id, not a value trusted from the payload.

use crate::error::{CoreError, CoreResult};
use crate::gateway::amount_arg;
use crate::model::address::Address;
use crate::model::wire::{de_u128, de_u64, de_u8, decode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Positive ledger id of a tender slot.
pub type TenderId = u64;

/// Lifecycle flag as stored on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderRawStatus {
    Created,
    Open,
    InEvaluation,
    Awarded,
    Cancelled,
}

impl TenderRawStatus {
    /// Maps the ledger's numeric enum code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Created),
            1 => Some(Self::Open),
            2 => Some(Self::InEvaluation),
            3 => Some(Self::Awarded),
            4 => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Open => 1,
            Self::InEvaluation => 2,
            Self::Awarded => 3,
            Self::Cancelled => 4,
        }
    }
}

/// Public procurement request mirrored from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tender {
    pub id: TenderId,
    pub creator: Address,
    pub title: String,
    pub description: String,
    /// Budget ceiling in the smallest currency unit.
    pub budget: u128,
    /// Unix timestamp (seconds).
    pub deadline: u64,
    pub active: bool,
    pub winner: Address,
    pub raw_status: TenderRawStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenderRecord {
    creator: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(deserialize_with = "de_u128")]
    budget: u128,
    #[serde(deserialize_with = "de_u64")]
    deadline: u64,
    #[serde(default)]
    active: bool,
    winner: String,
    #[serde(deserialize_with = "de_u8")]
    status: u8,
}

impl Tender {
    /// Decodes the payload of slot `id`.
    ///
    /// Returns `Ok(None)` for an empty (`null`) payload, meaning "no data".
    pub fn from_ledger(id: TenderId, value: Value) -> CoreResult<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }

        let record: TenderRecord = decode(value, "tender record")?;
        let raw_status = TenderRawStatus::from_code(record.status).ok_or_else(|| {
            CoreError::InvalidData(format!(
                "invalid tender status code `{}` in slot {id}",
                record.status
            ))
        })?;

        Ok(Some(Self {
            id,
            creator: Address::from_ledger(record.creator),
            title: record.title,
            description: record.description,
            budget: record.budget,
            deadline: record.deadline,
            active: record.active,
            winner: Address::from_ledger(record.winner),
            raw_status,
        }))
    }

    /// Returns whether the slot holds no real record.
    pub fn is_placeholder(&self) -> bool {
        self.creator.is_zero()
    }

    pub fn has_winner(&self) -> bool {
        !self.winner.is_zero()
    }
}

/// Caller input for creating a tender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenderDraft {
    pub title: String,
    pub description: String,
    /// Budget ceiling in the smallest currency unit.
    pub budget: u128,
    /// Unix timestamp (seconds); must lie in the future.
    pub deadline: u64,
}

impl TenderDraft {
    /// Checks required fields before any ledger round trip.
    pub fn validate(&self, now: u64) -> CoreResult<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::InvalidInput("tender title is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "tender description is required".into(),
            ));
        }
        if self.budget == 0 {
            return Err(CoreError::InvalidInput(
                "tender budget must be positive".into(),
            ));
        }
        if self.deadline <= now {
            return Err(CoreError::InvalidInput(format!(
                "tender deadline {} is not in the future",
                self.deadline
            )));
        }
        Ok(())
    }

    pub(crate) fn to_args(&self) -> Vec<Value> {
        vec![
            json!(self.title),
            json!(self.description),
            amount_arg(self.budget),
            json!(self.deadline),
        ]
    }
}
