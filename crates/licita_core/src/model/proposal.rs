//! Proposal domain model.
//!
//! # Invariants
//! - `proposed_amount <= tender.budget` is required at submission time.
//! - Proposal ids are unique only within their tender.

use crate::error::{CoreError, CoreResult};
use crate::model::address::Address;
use crate::model::tender::TenderId;
use crate::model::wire::{de_u128, de_u64, de_u8, decode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ProposalId = u64;

/// Proposal flag as stored on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalRawStatus {
    Submitted,
    Selected,
    Rejected,
}

impl ProposalRawStatus {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Submitted),
            1 => Some(Self::Selected),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Bid against one tender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub tender_id: TenderId,
    pub proponent: Address,
    pub description: String,
    /// Amount in the smallest currency unit.
    pub proposed_amount: u128,
    pub selected: bool,
    pub raw_status: ProposalRawStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposalRecord {
    #[serde(deserialize_with = "de_u64")]
    id: u64,
    #[serde(deserialize_with = "de_u64")]
    tender_id: u64,
    proponent: String,
    #[serde(default)]
    description: String,
    #[serde(deserialize_with = "de_u128")]
    proposed_amount: u128,
    #[serde(default)]
    selected: bool,
    #[serde(deserialize_with = "de_u8")]
    status: u8,
}

impl TryFrom<ProposalRecord> for Proposal {
    type Error = CoreError;

    fn try_from(record: ProposalRecord) -> CoreResult<Self> {
        let raw_status = ProposalRawStatus::from_code(record.status).ok_or_else(|| {
            CoreError::InvalidData(format!(
                "invalid proposal status code `{}` for proposal {}",
                record.status, record.id
            ))
        })?;
        Ok(Self {
            id: record.id,
            tender_id: record.tender_id,
            proponent: Address::from_ledger(record.proponent),
            description: record.description,
            proposed_amount: record.proposed_amount,
            selected: record.selected,
            raw_status,
        })
    }
}

/// Decodes the full proposal list returned for one tender.
///
/// A `null` payload decodes as an empty list.
pub fn decode_proposals(value: Value) -> CoreResult<Vec<Proposal>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    let records: Vec<ProposalRecord> = decode(value, "proposal list")?;
    records.into_iter().map(Proposal::try_from).collect()
}

/// Caller input for submitting a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalDraft {
    pub description: String,
    /// Amount in the smallest currency unit.
    pub proposed_amount: u128,
}

impl ProposalDraft {
    pub fn validate(&self) -> CoreResult<()> {
        if self.description.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "proposal description is required".into(),
            ));
        }
        Ok(())
    }
}
