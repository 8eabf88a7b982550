//! Ledger account address value type.
//!
//! # Responsibility
//! - Carry addresses in their original display case.
//! - Provide case-insensitive identity for every comparison in core.
//!
//! # Invariants
//! - `Eq` and `Hash` agree: both operate on the lower-cased form.
//! - The all-zero address is the "unset" sentinel for creator/winner fields.

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Canonical text of the sentinel zero address.
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"));

/// Account address as read from the ledger or typed by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parses user input, rejecting anything that is not `0x` + 40 hex digits.
    pub fn parse(value: &str) -> CoreResult<Self> {
        let trimmed = value.trim();
        if !ADDRESS_RE.is_match(trimmed) {
            return Err(CoreError::InvalidAddress(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wraps a value returned by the ledger without format checks.
    pub fn from_ledger(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn zero() -> Self {
        Self(ZERO_ADDRESS.to_string())
    }

    /// Returns whether this is the sentinel zero address.
    ///
    /// Short forms such as `0x0` and an empty payload count as zero too.
    pub fn is_zero(&self) -> bool {
        let digits = self
            .0
            .strip_prefix("0x")
            .or_else(|| self.0.strip_prefix("0X"))
            .unwrap_or(&self.0);
        digits.chars().all(|c| c == '0')
    }

    /// Original text, for display.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased text, for comparison and indexing.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Abbreviated display form: `0x1234...abcd`.
    ///
    /// Ledger text is taken as-is, so the cut is made on chars.
    pub fn short(&self) -> String {
        let chars = self.0.chars().collect::<Vec<_>>();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head = chars[..6].iter().collect::<String>();
        let tail = chars[chars.len() - 4..].iter().collect::<String>();
        format!("{head}...{tail}")
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
