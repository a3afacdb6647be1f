//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations
//! the update workflow needs, with two implementations:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: a scripted in-memory implementation for testing
//!
//! Workflow code depends on the [Repository] trait rather than a concrete
//! implementation so the branch manager and orchestrator can be exercised
//! without a real working tree.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Outcome of staging the working tree and attempting a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created
    Committed { id: String },
    /// The staged tree was identical to HEAD; no commit was made
    NothingToCommit,
}

/// Common git operation trait for the update workflow.
///
/// Every call is blocking; the working tree and branch pointer are only
/// mutated by the branch-management methods, and callers are expected to
/// serialize runs against the same checkout.
///
/// All implementors must be `Send + Sync`.
pub trait Repository: Send + Sync {
    /// Make sure a remote exists under `name` pointing at `url`.
    ///
    /// Adds the remote when missing and rewrites its URL when it differs
    /// from the configured one.
    fn ensure_remote(&self, name: &str, url: &str) -> Result<()>;

    /// Refresh the local tag cache from a remote
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// List tag names advertised by a remote, without fetching objects
    fn list_remote_tags(&self, remote: &str) -> Result<Vec<String>>;

    /// List tag names known locally
    fn list_local_tags(&self) -> Result<Vec<String>>;

    /// One-line commit summaries (short hash + subject) strictly between
    /// two revisions, newest first.
    fn summaries_between(&self, from_rev: &str, to_rev: &str) -> Result<Vec<String>>;

    /// One-line summaries of the most recent commits reachable from a
    /// revision, newest first, at most `limit` entries.
    fn recent_summaries(&self, rev: &str, limit: usize) -> Result<Vec<String>>;

    /// Relative paths that differ between two revisions
    fn changed_paths_between(&self, from_rev: &str, to_rev: &str) -> Result<Vec<String>>;

    /// Check out an existing local branch, discarding working-tree edits
    /// that would block the switch.
    fn checkout_branch(&self, name: &str) -> Result<()>;

    /// Create a local branch at the current HEAD and check it out
    fn create_branch(&self, name: &str) -> Result<()>;

    /// Delete a local branch (must not be the checked-out branch)
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Restore a single path's content from a revision into the working
    /// tree, the way `git checkout <rev> -- <path>` does.
    fn restore_path(&self, rev: &str, path: &str) -> Result<()>;

    /// Stage the full working tree (additions, modifications, deletions)
    /// and commit it onto HEAD.
    fn commit_all(&self, message: &str) -> Result<CommitOutcome>;
}
