use crate::error::{Result, UpsyncError};
use crate::git::{CommitOutcome, Repository};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Scripted repository for testing the workflow without a working tree.
///
/// Tags, logs and diffs are seeded up front; branch operations, restores
/// and commits are recorded so tests can assert on the state machine, and
/// individual operations can be made to fail.
pub struct MockRepository {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    current_branch: String,
    branches: Vec<String>,
    deleted_branches: Vec<String>,
    remotes: HashMap<String, String>,
    local_tags: Vec<String>,
    remote_tags: Vec<String>,
    summaries: HashMap<(String, String), Vec<String>>,
    changed: HashMap<(String, String), Vec<String>>,
    restored: Vec<(String, String)>,
    commit_messages: Vec<String>,
    fail_fetch: bool,
    fail_remote_list: bool,
    fail_create_branch: bool,
    fail_restore: HashSet<String>,
    fail_commit: bool,
    nothing_to_commit: bool,
}

impl MockRepository {
    /// Create a mock repository checked out on `branch`
    pub fn new(branch: impl Into<String>) -> Self {
        let branch = branch.into();
        let state = MockState {
            current_branch: branch.clone(),
            branches: vec![branch],
            ..MockState::default()
        };
        MockRepository {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    // --- seeding ---

    pub fn add_local_tag(&self, name: impl Into<String>) {
        self.lock().local_tags.push(name.into());
    }

    pub fn add_remote_tag(&self, name: impl Into<String>) {
        self.lock().remote_tags.push(name.into());
    }

    pub fn set_summaries(&self, from: &str, to: &str, summaries: Vec<String>) {
        self.lock()
            .summaries
            .insert((from.to_string(), to.to_string()), summaries);
    }

    pub fn set_changed_paths(&self, from: &str, to: &str, paths: Vec<String>) {
        self.lock()
            .changed
            .insert((from.to_string(), to.to_string()), paths);
    }

    // --- failure injection ---

    pub fn fail_fetch(&self) {
        self.lock().fail_fetch = true;
    }

    pub fn fail_remote_list(&self) {
        self.lock().fail_remote_list = true;
    }

    pub fn fail_create_branch(&self) {
        self.lock().fail_create_branch = true;
    }

    pub fn fail_restore_of(&self, path: impl Into<String>) {
        self.lock().fail_restore.insert(path.into());
    }

    pub fn fail_commit(&self) {
        self.lock().fail_commit = true;
    }

    pub fn report_nothing_to_commit(&self) {
        self.lock().nothing_to_commit = true;
    }

    // --- assertions ---

    pub fn current_branch(&self) -> String {
        self.lock().current_branch.clone()
    }

    pub fn existing_branches(&self) -> Vec<String> {
        self.lock().branches.clone()
    }

    pub fn deleted_branches(&self) -> Vec<String> {
        self.lock().deleted_branches.clone()
    }

    pub fn restored_paths(&self) -> Vec<(String, String)> {
        self.lock().restored.clone()
    }

    pub fn commit_messages(&self) -> Vec<String> {
        self.lock().commit_messages.clone()
    }

    pub fn remote_url(&self, name: &str) -> Option<String> {
        self.lock().remotes.get(name).cloned()
    }
}

impl Repository for MockRepository {
    fn ensure_remote(&self, name: &str, url: &str) -> Result<()> {
        self.lock()
            .remotes
            .insert(name.to_string(), url.to_string());
        Ok(())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        if self.lock().fail_fetch {
            return Err(UpsyncError::Git(git2::Error::from_str(&format!(
                "cannot reach remote '{}'",
                remote
            ))));
        }
        Ok(())
    }

    fn list_remote_tags(&self, remote: &str) -> Result<Vec<String>> {
        let state = self.lock();
        if state.fail_remote_list {
            return Err(UpsyncError::Git(git2::Error::from_str(&format!(
                "cannot list tags on remote '{}'",
                remote
            ))));
        }
        Ok(state.remote_tags.clone())
    }

    fn list_local_tags(&self) -> Result<Vec<String>> {
        Ok(self.lock().local_tags.clone())
    }

    fn summaries_between(&self, from_rev: &str, to_rev: &str) -> Result<Vec<String>> {
        self.lock()
            .summaries
            .get(&(from_rev.to_string(), to_rev.to_string()))
            .cloned()
            .ok_or_else(|| {
                UpsyncError::Git(git2::Error::from_str(&format!(
                    "no log between '{}' and '{}'",
                    from_rev, to_rev
                )))
            })
    }

    fn recent_summaries(&self, _rev: &str, limit: usize) -> Result<Vec<String>> {
        // The scripted fallback window: whatever summaries were seeded for
        // any range, truncated to the limit.
        let state = self.lock();
        let mut recent: Vec<String> = state
            .summaries
            .values()
            .flat_map(|v| v.iter().cloned())
            .collect();
        recent.truncate(limit);
        Ok(recent)
    }

    fn changed_paths_between(&self, from_rev: &str, to_rev: &str) -> Result<Vec<String>> {
        self.lock()
            .changed
            .get(&(from_rev.to_string(), to_rev.to_string()))
            .cloned()
            .ok_or_else(|| {
                UpsyncError::Git(git2::Error::from_str(&format!(
                    "no diff between '{}' and '{}'",
                    from_rev, to_rev
                )))
            })
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        if !state.branches.iter().any(|b| b == name) {
            return Err(UpsyncError::Git(git2::Error::from_str(&format!(
                "branch '{}' not found",
                name
            ))));
        }
        state.current_branch = name.to_string();
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        if state.fail_create_branch {
            return Err(UpsyncError::Git(git2::Error::from_str(
                "cannot create branch",
            )));
        }
        if state.branches.iter().any(|b| b == name) {
            return Err(UpsyncError::Git(git2::Error::from_str(&format!(
                "branch '{}' already exists",
                name
            ))));
        }
        state.branches.push(name.to_string());
        state.current_branch = name.to_string();
        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        if state.current_branch == name {
            return Err(UpsyncError::Git(git2::Error::from_str(&format!(
                "cannot delete checked-out branch '{}'",
                name
            ))));
        }
        state.branches.retain(|b| b != name);
        state.deleted_branches.push(name.to_string());
        Ok(())
    }

    fn restore_path(&self, rev: &str, path: &str) -> Result<()> {
        let mut state = self.lock();
        if state.fail_restore.contains(path) {
            return Err(UpsyncError::Git(git2::Error::from_str(&format!(
                "path '{}' not found at {}",
                path, rev
            ))));
        }
        state.restored.push((rev.to_string(), path.to_string()));
        Ok(())
    }

    fn commit_all(&self, message: &str) -> Result<CommitOutcome> {
        let mut state = self.lock();
        if state.fail_commit {
            return Err(UpsyncError::Git(git2::Error::from_str("commit failed")));
        }
        if state.nothing_to_commit {
            return Ok(CommitOutcome::NothingToCommit);
        }
        state.commit_messages.push(message.to_string());
        Ok(CommitOutcome::Committed {
            id: format!("mock{:07}", state.commit_messages.len()),
        })
    }
}
