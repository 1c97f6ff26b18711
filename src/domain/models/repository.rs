use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Current state of a repository within the synchronization lifecycle.
///
/// `Success` and `Failed` are not terminal: a later batch re-drives the same
/// record through `Cloning` or `Syncing` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Pending,
    Cloning,
    Syncing,
    Success,
    Failed,
}

impl SyncStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncStatus::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncStatus::Failed)
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, SyncStatus::Cloning | SyncStatus::Syncing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Cloning => "cloning",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Success => "success",
            SyncStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One repository to synchronize: a URL plus an optional branch override.
///
/// When no branch is given, the remote's default branch is used at clone
/// time and remembered on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySource {
    pub url: String,
    pub branch: Option<String>,
}

impl RepositorySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

impl From<&str> for RepositorySource {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// Per-URL synchronization metadata.
///
/// Created on the first sync attempt for a URL and mutated in place on every
/// later attempt; never deleted. `local_path` is a deterministic function of
/// the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub url: String,
    pub local_path: PathBuf,
    pub branch: Option<String>,
    pub status: SyncStatus,
    /// Unix seconds of the last successful clone.
    pub last_cloned_at: Option<i64>,
    /// Unix seconds of the last successful clone or sync.
    pub last_updated_at: Option<i64>,
    pub commit_hash: Option<String>,
}

impl RepositoryRecord {
    pub fn new(url: impl Into<String>, local_path: PathBuf, branch: Option<String>) -> Self {
        Self {
            url: url.into(),
            local_path,
            branch,
            status: SyncStatus::Pending,
            last_cloned_at: None,
            last_updated_at: None,
            commit_hash: None,
        }
    }

    pub fn mark_cloned(&mut self, commit_hash: Option<String>) {
        let now = current_timestamp();
        self.status = SyncStatus::Success;
        self.last_cloned_at = Some(now);
        self.last_updated_at = Some(now);
        self.commit_hash = commit_hash;
    }

    pub fn mark_synced(&mut self, commit_hash: Option<String>) {
        self.status = SyncStatus::Success;
        self.last_updated_at = Some(current_timestamp());
        self.commit_hash = commit_hash;
    }

    pub fn mark_failed(&mut self) {
        self.status = SyncStatus::Failed;
    }
}

/// Result of processing one repository in a batch.
///
/// A batch produces exactly one outcome per input URL; failures are carried
/// here instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub record: RepositoryRecord,
    pub success: bool,
    pub message: String,
    pub error_detail: Option<String>,
}

impl SyncOutcome {
    pub fn succeeded(record: RepositoryRecord, message: impl Into<String>) -> Self {
        Self {
            record,
            success: true,
            message: message.into(),
            error_detail: None,
        }
    }

    pub fn failed(
        record: RepositoryRecord,
        message: impl Into<String>,
        error_detail: Option<String>,
    ) -> Self {
        Self {
            record,
            success: false,
            message: message.into(),
            error_detail,
        }
    }

    pub fn url(&self) -> &str {
        &self.record.url
    }
}

pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
