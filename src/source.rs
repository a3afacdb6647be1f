use crate::config::UpstreamConfig;
use crate::domain::Version;
use crate::error::{Result, UpsyncError};
use crate::git::Repository;
use crate::manifest::ProjectManifest;
use regex::Regex;

/// A discovered upstream release: the exact tag name, its parsed version,
/// and any warnings accumulated while discovering it.
#[derive(Debug, Clone)]
pub struct UpstreamRelease {
    pub tag: String,
    pub version: Version,
    pub warnings: Vec<String>,
}

/// Discovers the deployed version and the latest upstream release.
///
/// The primary strategy lists tags straight off the upstream remote and
/// keeps strict `vX.Y.Z` matches; when that yields nothing the locally
/// cached tags serve as a fallback, flagged as possibly stale. A failed
/// remote refresh is tolerated only when the fallback produces a tag.
pub struct VersionSource<'a, R: Repository> {
    repo: &'a R,
    upstream: &'a UpstreamConfig,
    manifest: &'a ProjectManifest,
}

impl<'a, R: Repository> VersionSource<'a, R> {
    pub fn new(repo: &'a R, upstream: &'a UpstreamConfig, manifest: &'a ProjectManifest) -> Self {
        VersionSource {
            repo,
            upstream,
            manifest,
        }
    }

    /// The version currently recorded in the project manifest
    pub fn current_version(&self) -> Result<Version> {
        self.manifest.read_version()
    }

    /// The latest release tag discoverable upstream
    pub fn latest_upstream(&self) -> Result<UpstreamRelease> {
        self.repo
            .ensure_remote(&self.upstream.remote, &self.upstream.repo_url)?;

        let mut warnings = Vec::new();
        let mut remote_failure: Option<String> = None;

        if let Err(e) = self.repo.fetch_tags(&self.upstream.remote) {
            remote_failure = Some(e.to_string());
        }

        // Strict vX.Y.Z on the remote; the fallback also accepts bare X.Y.Z
        let remote_pattern = Regex::new(r"^v\d+\.\d+\.\d+$")
            .map_err(|e| UpsyncError::config(e.to_string()))?;
        let local_pattern = Regex::new(r"^v?\d+\.\d+\.\d+$")
            .map_err(|e| UpsyncError::config(e.to_string()))?;

        match self.repo.list_remote_tags(&self.upstream.remote) {
            Ok(tags) => {
                if let Some(release) = highest_release(&tags, &remote_pattern) {
                    if let Some(failure) = remote_failure {
                        warnings.push(format!(
                            "Tag refresh from '{}' failed ({}); tag listing still succeeded",
                            self.upstream.remote, failure
                        ));
                    }
                    return Ok(UpstreamRelease {
                        tag: release.0,
                        version: release.1,
                        warnings,
                    });
                }
            }
            Err(e) => {
                remote_failure.get_or_insert_with(|| e.to_string());
            }
        }

        // Fallback: locally cached tags, possibly months old
        let local_tags = self.repo.list_local_tags()?;
        if let Some(release) = highest_release(&local_tags, &local_pattern) {
            warnings.push(
                "Remote tag listing yielded nothing; using locally cached tags (may be stale)"
                    .to_string(),
            );
            if let Some(failure) = &remote_failure {
                warnings.push(format!("Remote failure was: {}", failure));
            }
            return Ok(UpstreamRelease {
                tag: release.0,
                version: release.1,
                warnings,
            });
        }

        let message = match remote_failure {
            Some(failure) => format!(
                "no release tag found upstream or locally (remote '{}' failed: {})",
                self.upstream.remote, failure
            ),
            None => "no release tag found upstream or locally".to_string(),
        };
        Err(UpsyncError::no_release(message))
    }
}

/// Pick the numerically highest release tag matching the pattern
fn highest_release(tags: &[String], pattern: &Regex) -> Option<(String, Version)> {
    tags.iter()
        .filter(|tag| pattern.is_match(tag))
        .filter_map(|tag| Version::parse(tag).ok().map(|v| (tag.clone(), v)))
        .max_by_key(|(_, v)| (v.major, v.minor, v.patch))
}
