//! Ledger gateway contract consumed by the synchronization layer.
//!
//! # Responsibility
//! - Describe the external ledger RPC surface this core depends on.
//! - Name the contract methods and event streams in one place.
//!
//! # Invariants
//! - The core never implements the ledger; it only consumes this trait.
//! - Every method is a suspension point with no timeout or retry here.
//! - `submit` resolves only after ledger confirmation.

use crate::model::address::Address;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Contract read/write method names.
pub mod methods {
    /// Read one tender slot by id.
    pub const TENDERS: &str = "tenders";
    /// Read the full proposal list of one tender.
    pub const PROPOSALS: &str = "getProposals";
    /// Read the per-address admin flag.
    pub const ADMIN_FLAG: &str = "admins";
    /// Read the admin enumeration list (may contain stale entries).
    pub const ADMIN_LIST: &str = "getAdmins";

    pub const CREATE_TENDER: &str = "createTender";
    pub const DELETE_TENDER: &str = "deleteTender";
    pub const SUBMIT_PROPOSAL: &str = "submitProposal";
    pub const DELETE_PROPOSAL: &str = "deleteProposal";
    pub const SELECT_WINNER: &str = "selectWinner";
    pub const ADD_ADMIN: &str = "addAdmin";
    pub const REMOVE_ADMIN: &str = "removeAdmin";
}

/// Historical event stream names.
pub mod events {
    pub const TENDER_CREATED: &str = "TenderCreated";
    pub const TENDER_DELETED: &str = "TenderDeleted";
    pub const PROPOSAL_SUBMITTED: &str = "ProposalSubmitted";
    pub const WINNER_SELECTED: &str = "WinnerSelected";
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Opaque gateway-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The node or wallet provider cannot serve requests right now.
    Unavailable(String),
    /// The contract reverted the call or transaction.
    Rejected(String),
    /// The requested slot lies outside the written id space.
    OutOfRange(String),
    /// Transport/encoding failure between client and node.
    Transport(String),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "ledger unavailable: {message}"),
            Self::Rejected(message) => write!(f, "ledger rejected request: {message}"),
            Self::OutOfRange(message) => write!(f, "ledger slot out of range: {message}"),
            Self::Transport(message) => write!(f, "ledger transport error: {message}"),
        }
    }
}

impl Error for LedgerError {}

/// Block bound for historical event queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockTag {
    Number(u64),
    Latest,
}

impl BlockTag {
    /// Numeric height, `None` for `Latest`.
    pub fn number(self) -> Option<u64> {
        match self {
            Self::Number(value) => Some(value),
            Self::Latest => None,
        }
    }
}

/// Reference used to resolve a block timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockRef {
    Number(u64),
    Transaction(String),
}

/// One historical event as returned by the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub return_values: Value,
    pub transaction_hash: String,
    pub block_number: u64,
}

/// Confirmation of a submitted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: String,
    pub block_number: u64,
}

/// External ledger RPC surface.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Read-only contract call.
    async fn call(&self, method: &str, args: &[Value]) -> LedgerResult<Value>;

    /// State-changing call, awaited to confirmation.
    async fn submit(&self, method: &str, args: &[Value], sender: &Address)
        -> LedgerResult<Receipt>;

    /// Historical events named `event` within `[from, to]`.
    async fn subscribe_events(
        &self,
        event: &str,
        from: BlockTag,
        to: BlockTag,
    ) -> LedgerResult<Vec<RawEvent>>;

    /// Unix timestamp (seconds) of a block, or of the block containing a transaction.
    async fn resolve_block_timestamp(&self, block: &BlockRef) -> LedgerResult<u64>;
}

/// Encodes an unsigned amount as a decimal string argument.
///
/// Amounts may exceed the JSON safe-integer range, so they always travel as text.
pub fn amount_arg(value: u128) -> Value {
    Value::String(value.to_string())
}
