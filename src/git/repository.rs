use crate::error::{Result, UpsyncError};
use crate::git::CommitOutcome;
use git2::{BranchType, Repository as Git2Repo};
use std::path::Path;

/// Wrapper around git2::Repository implementing the [crate::git::Repository]
/// trait for a real working tree.
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository at or above `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Ok(Git2Repository { repo })
    }

    /// Resolve any revision string (tag, branch, hash) to its commit
    fn find_commit(&self, rev: &str) -> Result<git2::Commit<'_>> {
        let object = self.repo.revparse_single(rev)?;
        let commit = object.peel_to_commit()?;
        Ok(commit)
    }

    /// Credential callbacks trying SSH keys from ~/.ssh/, the SSH agent,
    /// and finally default credentials.
    fn credential_callbacks<'cb>() -> git2::RemoteCallbacks<'cb> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                let key_paths = vec![
                    format!("{}/.ssh/id_ed25519", home),
                    format!("{}/.ssh/id_rsa", home),
                    format!("{}/.ssh/id_ecdsa", home),
                ];

                for key_path in key_paths {
                    let path = std::path::Path::new(&key_path);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(
                            username_from_url.unwrap_or("git"),
                            None,
                            path,
                            None,
                        ) {
                            return Ok(cred);
                        }
                    }
                }

                if let Ok(cred) =
                    git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
                {
                    return Ok(cred);
                }
            }

            git2::Cred::default()
        });
        callbacks
    }

    fn short_summary(commit: &git2::Commit<'_>) -> String {
        let hash = commit.id().to_string();
        let short_hash = &hash[..hash.len().min(7)];
        let subject = commit.summary().unwrap_or("(empty message)");
        format!("{} {}", short_hash, subject)
    }
}

impl super::Repository for Git2Repository {
    fn ensure_remote(&self, name: &str, url: &str) -> Result<()> {
        match self.repo.find_remote(name) {
            Ok(remote) => {
                if remote.url() != Some(url) {
                    self.repo.remote_set_url(name, url)?;
                }
                Ok(())
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                self.repo.remote(name, url)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn fetch_tags(&self, remote_name: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name)?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(Self::credential_callbacks());

        remote.fetch(
            &["+refs/tags/*:refs/tags/*"],
            Some(&mut fetch_options),
            None,
        )?;

        Ok(())
    }

    fn list_remote_tags(&self, remote_name: &str) -> Result<Vec<String>> {
        let mut remote = self.repo.find_remote(remote_name)?;

        let connection = remote.connect_auth(
            git2::Direction::Fetch,
            Some(Self::credential_callbacks()),
            None,
        )?;

        // Peeled annotated-tag entries ("tag^{}") would duplicate the tag name
        let tags = connection
            .list()?
            .iter()
            .filter_map(|head| head.name().strip_prefix("refs/tags/"))
            .filter(|name| !name.ends_with("^{}"))
            .map(|name| name.to_string())
            .collect();

        Ok(tags)
    }

    fn list_local_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;
        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn summaries_between(&self, from_rev: &str, to_rev: &str) -> Result<Vec<String>> {
        let from = self.find_commit(from_rev)?;
        let to = self.find_commit(to_rev)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(to.id())?;
        revwalk.hide(from.id())?;

        let mut summaries = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            summaries.push(Self::short_summary(&commit));
        }

        Ok(summaries)
    }

    fn recent_summaries(&self, rev: &str, limit: usize) -> Result<Vec<String>> {
        let tip = self.find_commit(rev)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(tip.id())?;

        let mut summaries = Vec::new();
        for oid in revwalk.take(limit) {
            let commit = self.repo.find_commit(oid?)?;
            summaries.push(Self::short_summary(&commit));
        }

        Ok(summaries)
    }

    fn changed_paths_between(&self, from_rev: &str, to_rev: &str) -> Result<Vec<String>> {
        let old_tree = self.find_commit(from_rev)?.tree()?;
        let new_tree = self.find_commit(to_rev)?.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)?;

        let mut seen = std::collections::HashSet::new();
        let mut paths = Vec::new();
        for delta in diff.deltas() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path());
            if let Some(path) = path {
                let path = path.to_string_lossy().to_string();
                if seen.insert(path.clone()) {
                    paths.push(path);
                }
            }
        }

        Ok(paths)
    }

    fn checkout_branch(&self, name: &str) -> Result<()> {
        let branch = self.repo.find_branch(name, BranchType::Local)?;
        let reference = branch.into_reference();
        let ref_name = reference
            .name()
            .ok_or_else(|| UpsyncError::branch_create(format!("Branch '{}' has an invalid reference", name)))?;

        self.repo.set_head(ref_name)?;

        // Force so a switch-away still succeeds when the working tree holds
        // partially restored content that must be discarded.
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout))?;

        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.branch(name, &head, false)?;

        self.repo.set_head(&format!("refs/heads/{}", name))?;
        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_head(Some(&mut checkout))?;

        Ok(())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self.repo.find_branch(name, BranchType::Local)?;
        branch.delete()?;
        Ok(())
    }

    fn restore_path(&self, rev: &str, path: &str) -> Result<()> {
        let tree = self.find_commit(rev)?.tree()?;
        let entry = tree.get_path(Path::new(path))?;
        let object = entry.to_object(&self.repo)?;
        let blob = object
            .peel_to_blob()
            .map_err(|_| UpsyncError::config(format!("'{}' is not a file at {}", path, rev)))?;

        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| UpsyncError::config("Repository has no working tree".to_string()))?;

        let target = workdir.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, blob.content())?;

        Ok(())
    }

    fn commit_all(&self, message: &str) -> Result<CommitOutcome> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)?;
        // add_all does not record deletions; update_all does
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let head = self.repo.head()?.peel_to_commit()?;

        if head.tree_id() == tree_id {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&head])?;

        Ok(CommitOutcome::Committed {
            id: oid.to_string(),
        })
    }
}

// SAFETY: Git2Repository wraps git2::Repository which is Send.
// The workflow is strictly sequential; the Sync bound exists so the trait
// object can be shared, never for concurrent mutation.
unsafe impl Sync for Git2Repository {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_outside_repository_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(Git2Repository::open(temp_dir.path()).is_err());
    }
}
