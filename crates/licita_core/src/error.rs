//! Core error model shared by repositories, guards and the activity feed.
//!
//! # Responsibility
//! - Name every failure the synchronization layer can surface to callers.
//! - Keep the opaque gateway cause attached for diagnostics.
//!
//! # Invariants
//! - Every operation fails fast with exactly one `CoreError`.
//! - Gateway causes are wrapped, never rewritten.

use crate::gateway::LedgerError;
use crate::model::address::Address;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Failure kinds surfaced by the ledger synchronization layer.
#[derive(Debug)]
pub enum CoreError {
    /// No ledger connection has been established for this context.
    GatewayNotReady,
    /// Sentinel creator/zero address found where a real record was expected.
    NotFound { entity: &'static str, id: String },
    /// A local authorization predicate rejected the write.
    PermissionDenied { action: &'static str },
    /// Address text failed the format check.
    InvalidAddress(String),
    /// Proposed amount is above the tender budget ceiling.
    BudgetExceeded { proposed: u128, budget: u128 },
    /// The connected account tried to drop its own admin capability.
    SelfRemovalRejected,
    /// Target already holds admin capability.
    AlreadyAdmin(Address),
    /// Target does not hold admin capability.
    NotAdmin(Address),
    /// Caller-provided input is unusable (drafts, amounts, config).
    InvalidInput(String),
    /// Ledger payload could not be decoded into a domain record.
    InvalidData(String),
    /// Network or ledger-level failure with opaque cause.
    Gateway(LedgerError),
}

impl CoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for logs and presentation mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::GatewayNotReady => "gateway_not_ready",
            Self::NotFound { .. } => "not_found",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::InvalidAddress(_) => "invalid_address",
            Self::BudgetExceeded { .. } => "budget_exceeded",
            Self::SelfRemovalRejected => "self_removal_rejected",
            Self::AlreadyAdmin(_) => "already_admin",
            Self::NotAdmin(_) => "not_admin",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Gateway(_) => "gateway_failure",
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GatewayNotReady => write!(f, "ledger gateway is not connected"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::PermissionDenied { action } => {
                write!(f, "account is not allowed to {action}")
            }
            Self::InvalidAddress(value) => write!(f, "invalid address: `{value}`"),
            Self::BudgetExceeded { proposed, budget } => write!(
                f,
                "proposed amount {proposed} exceeds tender budget {budget}"
            ),
            Self::SelfRemovalRejected => {
                write!(f, "the connected account cannot remove itself as admin")
            }
            Self::AlreadyAdmin(address) => write!(f, "address is already an admin: {address}"),
            Self::NotAdmin(address) => write!(f, "address is not an admin: {address}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidData(message) => write!(f, "invalid ledger data: {message}"),
            Self::Gateway(err) => write!(f, "ledger gateway failure: {err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Gateway(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LedgerError> for CoreError {
    fn from(value: LedgerError) -> Self {
        Self::Gateway(value)
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;
    use crate::gateway::LedgerError;
    use std::error::Error;

    #[test]
    fn gateway_errors_keep_their_cause() {
        let err = CoreError::from(LedgerError::Transport("socket closed".to_string()));
        assert_eq!(err.code(), "gateway_failure");
        assert!(err.source().is_some());
        assert!(err.to_string().contains("socket closed"));
    }

    #[test]
    fn not_found_names_entity_and_id() {
        let err = CoreError::not_found("tender", 7);
        assert_eq!(err.to_string(), "tender not found: 7");
        assert!(err.source().is_none());
    }
}
