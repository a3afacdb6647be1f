use crate::domain::{ChangeSet, Version};
use crate::error::{Result, UpsyncError};
use crate::git::{CommitOutcome, Repository};
use crate::manifest::ProjectManifest;
use chrono::Utc;

/// Derive a branch name unique to this run
pub fn generate_branch_name() -> String {
    format!("upsync-update-{}", Utc::now().timestamp_millis())
}

/// What survived the per-file restore stage
#[derive(Debug, Clone, Default)]
pub struct RestoreOutcome {
    /// Paths actually restored from the target revision
    pub updated: Vec<String>,
    /// Non-fatal per-file failures, reported but never raised
    pub warnings: Vec<String>,
}

/// Stages a candidate update on an isolated branch.
///
/// The stages run in a fixed order (create, restore, version bump,
/// commit) and each returns a `Result` so any fatal outcome maps onto one
/// explicit recovery transition: [UpdateBranchManager::rollback], which
/// puts the working tree back on the base branch and deletes the update
/// branch. Only genuine pre-commit failures roll back; a commit attempt
/// that finds nothing to stage keeps the branch for inspection.
pub struct UpdateBranchManager<'a, R: Repository> {
    repo: &'a R,
    base_branch: String,
    branch_name: String,
}

impl<'a, R: Repository> UpdateBranchManager<'a, R> {
    pub fn new(repo: &'a R, base_branch: impl Into<String>, branch_name: impl Into<String>) -> Self {
        UpdateBranchManager {
            repo,
            base_branch: base_branch.into(),
            branch_name: branch_name.into(),
        }
    }

    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    /// Check out the base branch and create the update branch from it.
    ///
    /// Nothing else has happened yet, so a failure here needs no rollback.
    pub fn create(&self) -> Result<()> {
        self.repo.checkout_branch(&self.base_branch).map_err(|e| {
            UpsyncError::branch_create(format!(
                "cannot check out base branch '{}': {}",
                self.base_branch, e
            ))
        })?;

        self.repo.create_branch(&self.branch_name).map_err(|e| {
            UpsyncError::branch_create(format!(
                "cannot create update branch '{}': {}",
                self.branch_name, e
            ))
        })
    }

    /// Restore each included path from the target revision.
    ///
    /// Individual failures are collected as warnings and drop the file
    /// from the updated set; they never abort the run.
    pub fn restore_files(&self, target_rev: &str, paths: &[String]) -> RestoreOutcome {
        let mut outcome = RestoreOutcome::default();

        for path in paths {
            match self.repo.restore_path(target_rev, path) {
                Ok(()) => outcome.updated.push(path.clone()),
                Err(e) => outcome
                    .warnings
                    .push(format!("could not update {}: {}", path, e)),
            }
        }

        outcome
    }

    /// Rewrite the recorded version to the target version. Fatal on failure.
    pub fn bump_version(&self, manifest: &ProjectManifest, target: &Version) -> Result<()> {
        manifest.write_version(target)
    }

    /// Stage the whole working tree and commit the candidate update.
    pub fn commit(&self, target: &Version, changes: &ChangeSet) -> Result<CommitOutcome> {
        let message = format!(
            "feat: update to v{}\n\n\
             - Security updates: {}\n\
             - Bug fixes: {}\n\
             - Features skipped: {} (preserved customizations)\n\n\
             Essential files updated while preserving customizations.",
            target,
            changes.security_count(),
            changes.bugfix_count(),
            changes.feature_count(),
        );

        self.repo
            .commit_all(&message)
            .map_err(|e| UpsyncError::commit(e.to_string()))
    }

    /// Recovery transition: back to the base branch, update branch deleted.
    ///
    /// Callers report a rollback failure but propagate the error that
    /// triggered the rollback, never this one.
    pub fn rollback(&self) -> Result<()> {
        self.repo.checkout_branch(&self.base_branch)?;
        self.repo.delete_branch(&self.branch_name)?;
        Ok(())
    }
}
