//! Domain logic - pure types independent of git operations

pub mod change;
pub mod version;

pub use change::{ChangeCategory, ChangeSet, CommitRecord};
pub use version::{Version, VersionOrdering};
