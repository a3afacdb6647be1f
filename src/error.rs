use thiserror::Error;

/// Unified error type for upsync operations
#[derive(Error, Debug)]
pub enum UpsyncError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No release found: {0}")]
    NoReleaseFound(String),

    #[error("Branch creation failed: {0}")]
    BranchCreate(String),

    #[error("Version write failed: {0}")]
    VersionWrite(String),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in upsync
pub type Result<T> = std::result::Result<T, UpsyncError>;

impl UpsyncError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        UpsyncError::Config(msg.into())
    }

    /// Create a no-release-found error with context
    pub fn no_release(msg: impl Into<String>) -> Self {
        UpsyncError::NoReleaseFound(msg.into())
    }

    /// Create a branch-creation error with context
    pub fn branch_create(msg: impl Into<String>) -> Self {
        UpsyncError::BranchCreate(msg.into())
    }

    /// Create a version-write error with context
    pub fn version_write(msg: impl Into<String>) -> Self {
        UpsyncError::VersionWrite(msg.into())
    }

    /// Create a commit error with context
    pub fn commit(msg: impl Into<String>) -> Self {
        UpsyncError::Commit(msg.into())
    }
}
