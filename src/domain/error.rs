use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository not found: {message}")]
    RepositoryNotFound {
        message: String,
        detail: Option<String>,
    },

    #[error("Clone failed: {message}")]
    CloneFailed {
        message: String,
        detail: Option<String>,
    },

    #[error("Sync failed: {message}")]
    SyncFailed {
        message: String,
        detail: Option<String>,
    },

    #[error("Index has not been built")]
    IndexNotBuilt,

    #[error("Repository not indexed: {0}")]
    RepositoryNotIndexed(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DomainError {
    pub fn repository_not_found(
        message: impl Into<String>,
        detail: impl Into<Option<String>>,
    ) -> Self {
        Self::RepositoryNotFound {
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn clone_failed(message: impl Into<String>, detail: impl Into<Option<String>>) -> Self {
        Self::CloneFailed {
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn sync_failed(message: impl Into<String>, detail: impl Into<Option<String>>) -> Self {
        Self::SyncFailed {
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RepositoryNotFound { .. })
    }

    pub fn is_clone_failed(&self) -> bool {
        matches!(self, Self::CloneFailed { .. })
    }

    pub fn is_sync_failed(&self) -> bool {
        matches!(self, Self::SyncFailed { .. })
    }

    /// Underlying git/IO detail for sync-layer errors, when captured.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::RepositoryNotFound { detail, .. }
            | Self::CloneFailed { detail, .. }
            | Self::SyncFailed { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
