use crate::domain::Version;
use crate::error::{Result, UpsyncError};
use std::fs;
use std::path::{Path, PathBuf};

/// The project manifest carrying the deployed version.
///
/// A JSON document with a top-level `"version"` string field
/// (`package.json` in the default deployment). The rest of the document is
/// preserved verbatim across a version rewrite.
pub struct ProjectManifest {
    path: PathBuf,
}

impl ProjectManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProjectManifest { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the deployed version from the manifest
    pub fn read_version(&self) -> Result<Version> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            UpsyncError::config(format!("Cannot read {}: {}", self.path.display(), e))
        })?;

        let document: serde_json::Value = serde_json::from_str(&contents).map_err(|e| {
            UpsyncError::config(format!("Cannot parse {}: {}", self.path.display(), e))
        })?;

        let version = document
            .get("version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                UpsyncError::config(format!(
                    "{} has no \"version\" field",
                    self.path.display()
                ))
            })?;

        Version::parse(version)
    }

    /// Rewrite the manifest's version field, keeping the rest of the
    /// document intact.
    pub fn write_version(&self, version: &Version) -> Result<()> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            UpsyncError::version_write(format!("Cannot read {}: {}", self.path.display(), e))
        })?;

        let mut document: serde_json::Value = serde_json::from_str(&contents).map_err(|e| {
            UpsyncError::version_write(format!("Cannot parse {}: {}", self.path.display(), e))
        })?;

        let object = document.as_object_mut().ok_or_else(|| {
            UpsyncError::version_write(format!(
                "{} is not a JSON object",
                self.path.display()
            ))
        })?;
        object.insert(
            "version".to_string(),
            serde_json::Value::String(version.to_string()),
        );

        let rendered = serde_json::to_string_pretty(&document).map_err(|e| {
            UpsyncError::version_write(format!("Cannot render manifest: {}", e))
        })?;

        fs::write(&self.path, rendered + "\n").map_err(|e| {
            UpsyncError::version_write(format!("Cannot write {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}
