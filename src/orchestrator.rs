use crate::analyzer::ChangeClassifier;
use crate::branch::{generate_branch_name, UpdateBranchManager};
use crate::config::Config;
use crate::container;
use crate::domain::{ChangeSet, Version, VersionOrdering};
use crate::error::Result;
use crate::filter::PathFilter;
use crate::git::{CommitOutcome, Repository};
use crate::manifest::ProjectManifest;
use crate::source::{UpstreamRelease, VersionSource};
use crate::ui;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a `check` run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub update_available: bool,
    pub current_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<ChangeSet>,
}

/// Terminal record of an `apply` run
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UpdateResult {
    /// Nothing to do: the fork already matches (or is ahead of) upstream
    #[serde(rename_all = "camelCase")]
    UpToDate {
        update_available: bool,
        current_version: String,
    },
    /// The run completed but staged nothing worth keeping
    #[serde(rename_all = "camelCase")]
    Skipped { success: bool, message: String },
    /// A candidate update branch was committed and awaits review
    #[serde(rename_all = "camelCase")]
    Completed {
        success: bool,
        previous_version: String,
        new_version: String,
        branch_name: String,
        change_set: ChangeSet,
    },
}

impl UpdateResult {
    fn up_to_date(current: &Version) -> Self {
        UpdateResult::UpToDate {
            update_available: false,
            current_version: current.to_string(),
        }
    }

    fn skipped(message: impl Into<String>) -> Self {
        UpdateResult::Skipped {
            success: false,
            message: message.into(),
        }
    }

    fn completed(
        previous: &Version,
        new: &Version,
        branch_name: impl Into<String>,
        change_set: ChangeSet,
    ) -> Self {
        UpdateResult::Completed {
            success: true,
            previous_version: previous.to_string(),
            new_version: new.to_string(),
            branch_name: branch_name.into(),
            change_set,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UpdateResult::Completed { .. })
    }
}

/// Result of the shared check phase, typed for internal reuse
struct CheckState {
    current: Version,
    /// Present only when the fork is behind upstream
    release: Option<UpstreamRelease>,
    changes: Option<ChangeSet>,
}

/// Internal outcome of the staged part of an apply run
enum Staged {
    Committed,
    NothingToCommit,
    NothingRestored,
}

/// Sequences the update workflow: version discovery, comparison,
/// classification, and (for `apply`) the branch manager stages.
pub struct UpdateOrchestrator<'a, R: Repository> {
    repo: &'a R,
    config: &'a Config,
    root: PathBuf,
    manifest: ProjectManifest,
}

impl<'a, R: Repository> UpdateOrchestrator<'a, R> {
    pub fn new(repo: &'a R, config: &'a Config, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let manifest = ProjectManifest::new(root.join(&config.version_file));
        UpdateOrchestrator {
            repo,
            config,
            root,
            manifest,
        }
    }

    /// Compare the fork against upstream without mutating anything.
    pub fn check(&self) -> Result<CheckReport> {
        let state = self.checked()?;
        Ok(CheckReport {
            update_available: state.release.is_some(),
            current_version: state.current.to_string(),
            latest_version: state.release.as_ref().map(|r| r.version.to_string()),
            changes: state.changes,
        })
    }

    /// Stage the latest upstream release on a new update branch.
    ///
    /// Runs the check first and returns immediately when the fork is not
    /// behind. Fatal stage errors roll the update branch back and
    /// propagate; an empty filtered set never creates a branch at all.
    pub fn apply(&self) -> Result<UpdateResult> {
        let state = self.checked()?;

        let release = match state.release {
            Some(release) => release,
            None => return Ok(UpdateResult::up_to_date(&state.current)),
        };
        let changes = state.changes.unwrap_or_default();

        // File selection always uses the full-range diff; unlike the
        // informational log it has no degraded fallback.
        let changed = self
            .repo
            .changed_paths_between(&state.current.tag_name(), &release.tag)?;
        ui::display_status(&format!("{} files changed upstream", changed.len()));

        let filter = PathFilter::compile(
            &self.config.patterns.essential,
            &self.config.patterns.preserved,
        )?;
        let included = filter.filter(changed.iter().map(|s| s.as_str()));

        if included.is_empty() {
            ui::display_warning("No essential files to update");
            return Ok(UpdateResult::skipped("No essential updates found"));
        }

        ui::display_status(&format!("{} essential files to update", included.len()));
        for path in &included {
            println!("  - {}", path);
        }

        let manager = UpdateBranchManager::new(
            self.repo,
            self.config.upstream.base_branch.as_str(),
            generate_branch_name(),
        );
        manager.create()?;
        ui::display_success(&format!("Created update branch: {}", manager.branch_name()));

        match self.stage_update(&manager, &state.current, &release, &changes, &included) {
            Ok(Staged::Committed) => {
                ui::display_success(&format!(
                    "Update to v{} staged on {}",
                    release.version,
                    manager.branch_name()
                ));
                ui::display_review_instructions(
                    &self.config.upstream.base_branch,
                    manager.branch_name(),
                );
                Ok(UpdateResult::completed(
                    &state.current,
                    &release.version,
                    manager.branch_name(),
                    changes,
                ))
            }
            Ok(Staged::NothingToCommit) => {
                // The branch stays for inspection; only genuine failures
                // before a commit attempt destroy it.
                ui::display_warning(&format!(
                    "Nothing to commit; branch {} kept for inspection",
                    manager.branch_name()
                ));
                Ok(UpdateResult::skipped("No changes to commit"))
            }
            Ok(Staged::NothingRestored) => {
                self.rollback(&manager);
                Ok(UpdateResult::skipped("No essential updates found"))
            }
            Err(e) => {
                self.rollback(&manager);
                Err(e)
            }
        }
    }

    /// The mutating stages after branch creation: restore, version bump,
    /// refresh-script artifact, commit.
    fn stage_update(
        &self,
        manager: &UpdateBranchManager<'a, R>,
        current: &Version,
        release: &UpstreamRelease,
        changes: &ChangeSet,
        included: &[String],
    ) -> Result<Staged> {
        let restore = manager.restore_files(&release.tag, included);
        for warning in &restore.warnings {
            ui::display_warning(warning);
        }
        if restore.updated.is_empty() {
            ui::display_warning("No files could be restored from the target revision");
            return Ok(Staged::NothingRestored);
        }
        ui::display_success(&format!("Restored {} files", restore.updated.len()));

        manager.bump_version(&self.manifest, &release.version)?;
        ui::display_success(&format!("Bumped recorded version to {}", release.version));

        match container::write_refresh_script(
            &self.root,
            &self.config.container,
            current,
            &release.version,
        ) {
            Ok(path) => ui::display_status(&format!(
                "Wrote container refresh script: {}",
                path.display()
            )),
            Err(e) => ui::display_warning(&format!("Could not write refresh script: {}", e)),
        }

        match manager.commit(&release.version, changes)? {
            CommitOutcome::Committed { .. } => Ok(Staged::Committed),
            CommitOutcome::NothingToCommit => Ok(Staged::NothingToCommit),
        }
    }

    /// Best-effort recovery; a rollback failure is reported but never
    /// replaces the error that triggered it.
    fn rollback(&self, manager: &UpdateBranchManager<'a, R>) {
        match manager.rollback() {
            Ok(()) => ui::display_status(&format!(
                "Rolled back update branch {}",
                manager.branch_name()
            )),
            Err(e) => ui::display_warning(&format!(
                "Could not roll back branch {}: {}",
                manager.branch_name(),
                e
            )),
        }
    }

    /// Shared check phase: versions, comparison, classified changes.
    fn checked(&self) -> Result<CheckState> {
        let source = VersionSource::new(self.repo, &self.config.upstream, &self.manifest);

        let current = source.current_version()?;
        ui::display_status(&format!("Current version: {}", current));

        let release = source.latest_upstream()?;
        for warning in &release.warnings {
            ui::display_warning(warning);
        }
        ui::display_status(&format!("Latest upstream version: {}", release.version));

        match current.compare(&release.version) {
            VersionOrdering::Behind => {
                ui::display_success("Update available");
                let changes = self.classify_changes(&current, &release);
                ui::display_change_summary(&changes);
                Ok(CheckState {
                    current,
                    release: Some(release),
                    changes: Some(changes),
                })
            }
            VersionOrdering::Equal => {
                ui::display_success("Already up to date");
                Ok(CheckState {
                    current,
                    release: None,
                    changes: None,
                })
            }
            VersionOrdering::Ahead => {
                ui::display_warning("Current version is newer than upstream");
                Ok(CheckState {
                    current,
                    release: None,
                    changes: None,
                })
            }
        }
    }

    /// Classify the commits the release brings.
    ///
    /// The full-range log is canonical; when it cannot be computed the
    /// input degrades to the most recent commits reachable from the
    /// release tag, and failing that to an empty set. Informational only.
    fn classify_changes(&self, current: &Version, release: &UpstreamRelease) -> ChangeSet {
        let classifier = ChangeClassifier::new(&self.config.security_keywords);

        let summaries = match self
            .repo
            .summaries_between(&current.tag_name(), &release.tag)
        {
            Ok(summaries) => summaries,
            Err(e) => {
                ui::display_warning(&format!(
                    "Could not read the full release log ({}); falling back to recent commits",
                    e
                ));
                match self.repo.recent_summaries(&release.tag, 20) {
                    Ok(summaries) => summaries,
                    Err(e) => {
                        ui::display_warning(&format!("Could not read recent commits: {}", e));
                        Vec::new()
                    }
                }
            }
        };

        classifier.classify(&summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_report_serializes_camel_case() {
        let report = CheckReport {
            update_available: true,
            current_version: "1.2.0".to_string(),
            latest_version: Some("1.3.0".to_string()),
            changes: Some(ChangeSet::default()),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["updateAvailable"], true);
        assert_eq!(json["currentVersion"], "1.2.0");
        assert_eq!(json["latestVersion"], "1.3.0");
    }

    #[test]
    fn test_check_report_omits_absent_fields() {
        let report = CheckReport {
            update_available: false,
            current_version: "1.2.0".to_string(),
            latest_version: None,
            changes: None,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("latestVersion").is_none());
        assert!(json.get("changes").is_none());
    }

    #[test]
    fn test_update_result_shapes() {
        let up_to_date = UpdateResult::up_to_date(&Version::new(1, 2, 0));
        let json = serde_json::to_value(&up_to_date).unwrap();
        assert_eq!(json["updateAvailable"], false);
        assert_eq!(json["currentVersion"], "1.2.0");

        let skipped = UpdateResult::skipped("No essential updates found");
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "No essential updates found");

        let completed = UpdateResult::completed(
            &Version::new(1, 2, 0),
            &Version::new(1, 3, 0),
            "upsync-update-1",
            ChangeSet::default(),
        );
        assert!(completed.is_success());
        let json = serde_json::to_value(&completed).unwrap();
        assert_eq!(json["previousVersion"], "1.2.0");
        assert_eq!(json["newVersion"], "1.3.0");
        assert_eq!(json["branchName"], "upsync-update-1");
        assert!(json.get("changeSet").is_some());
    }
}
