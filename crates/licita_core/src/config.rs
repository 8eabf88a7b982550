//! Synchronization configuration.

use crate::error::{CoreError, CoreResult};
use crate::gateway::BlockTag;
use serde::Deserialize;

/// Failure policy for the multi-stream activity fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityPolicy {
    /// Any failed stream fails the whole feed.
    #[default]
    AllOrNothing,
    /// Keep the streams that succeeded and report the failed ones.
    Partial,
}

/// Configuration for ledger synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Exclusive upper bound of the tender id probe.
    ///
    /// Ids `1..scan_bound` are probed; a scan that reaches the bound reports
    /// `possibly_truncated`.
    pub scan_bound: u64,

    /// Default number of entries in the recent-activity feed.
    pub activity_limit: usize,

    /// First block of historical event queries.
    pub from_block: u64,

    /// Last block of historical event queries.
    pub to_block: BlockTag,

    /// Failure policy used by session bootstrap for the activity feed.
    pub activity_policy: ActivityPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            scan_bound: 100,
            activity_limit: 10,
            from_block: 0,
            to_block: BlockTag::Latest,
            activity_policy: ActivityPolicy::AllOrNothing,
        }
    }
}

impl SyncConfig {
    pub fn with_scan_bound(mut self, scan_bound: u64) -> Self {
        self.scan_bound = scan_bound;
        self
    }

    pub fn with_activity_limit(mut self, activity_limit: usize) -> Self {
        self.activity_limit = activity_limit;
        self
    }

    pub fn with_block_range(mut self, from_block: u64, to_block: BlockTag) -> Self {
        self.from_block = from_block;
        self.to_block = to_block;
        self
    }

    pub fn with_activity_policy(mut self, activity_policy: ActivityPolicy) -> Self {
        self.activity_policy = activity_policy;
        self
    }

    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|err| CoreError::InvalidInput(format!("invalid sync config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.scan_bound < 2 {
            return Err(CoreError::InvalidInput(format!(
                "scan_bound must be at least 2, got {}",
                self.scan_bound
            )));
        }
        if self.activity_limit == 0 {
            return Err(CoreError::InvalidInput(
                "activity_limit must be positive".into(),
            ));
        }
        if let Some(to_block) = self.to_block.number() {
            if self.from_block > to_block {
                return Err(CoreError::InvalidInput(format!(
                    "from_block {} is after to_block {to_block}",
                    self.from_block
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn from_tag(&self) -> BlockTag {
        BlockTag::Number(self.from_block)
    }
}
