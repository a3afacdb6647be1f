use crate::error::{Result, UpsyncError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Represents the complete configuration for upsync.
///
/// Covers the upstream remote, the manifest carrying the deployed version,
/// the path-pattern tables driving file selection, the classifier keyword
/// table, and the container refresh artifact.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Manifest file carrying the deployed version, relative to the
    /// repository root.
    #[serde(default = "default_version_file")]
    pub version_file: String,

    #[serde(default)]
    pub patterns: PatternsConfig,

    #[serde(default = "default_security_keywords")]
    pub security_keywords: Vec<String>,

    #[serde(default)]
    pub container: ContainerConfig,
}

/// Where the upstream project lives and how to branch off it
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_repo_url")]
    pub repo_url: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_base_branch")]
    pub base_branch: String,
}

/// Path-pattern tables deciding which changed files are pulled forward
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PatternsConfig {
    #[serde(default = "default_essential_patterns")]
    pub essential: Vec<String>,

    #[serde(default = "default_preserved_patterns")]
    pub preserved: Vec<String>,
}

/// Out-of-band container refresh artifact settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ContainerConfig {
    #[serde(default = "default_container_name")]
    pub name: String,

    /// Where the generated refresh script lands, relative to the
    /// repository root.
    #[serde(default = "default_refresh_script")]
    pub refresh_script: String,
}

fn default_repo_url() -> String {
    "https://github.com/homarr-labs/homarr.git".to_string()
}

fn default_remote() -> String {
    "upstream".to_string()
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_version_file() -> String {
    "package.json".to_string()
}

fn default_container_name() -> String {
    "dashboard-homarr".to_string()
}

fn default_refresh_script() -> String {
    "scripts/update-container-version.sh".to_string()
}

/// Default list of files worth pulling forward from upstream releases
fn default_essential_patterns() -> Vec<String> {
    [
        "apps/nextjs/src/components/**/*.tsx",
        "apps/nextjs/src/components/**/*.ts",
        "apps/nextjs/src/pages/**/*.tsx",
        "apps/nextjs/src/pages/**/*.ts",
        "apps/nextjs/src/app/**/*.tsx",
        "apps/nextjs/src/app/**/*.ts",
        "apps/nextjs/src/utils/**/*.ts",
        "apps/nextjs/src/hooks/**/*.ts",
        "apps/nextjs/src/lib/**/*.ts",
        "packages/*/src/**/*.ts",
        "packages/*/src/**/*.tsx",
        "apps/nextjs/public/**/*",
        "apps/nextjs/next.config.ts",
        "package.json",
        "packages/*/package.json",
        "apps/*/package.json",
        "pnpm-lock.yaml",
        "static-data/contributors.json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Default list of paths protected from any automatic update
fn default_preserved_patterns() -> Vec<String> {
    [
        ".devcontainer/**/*",
        "scripts/**/*",
        "docker/**/*",
        "docs/**/*",
        "Dockerfile",
        "project.json",
        ".env*",
        "README.md",
        "INFISICAL.md",
        "GROUP_SYNC.md",
        "KEYCLOAK_SETUP.md",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Default keyword table marking commits as security-relevant
pub fn default_security_keywords() -> Vec<String> {
    [
        "security",
        "vulnerability",
        "cve",
        "xss",
        "csrf",
        "injection",
        "auth",
        "fix",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            repo_url: default_repo_url(),
            remote: default_remote(),
            base_branch: default_base_branch(),
        }
    }
}

impl Default for PatternsConfig {
    fn default() -> Self {
        PatternsConfig {
            essential: default_essential_patterns(),
            preserved: default_preserved_patterns(),
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        ContainerConfig {
            name: default_container_name(),
            refresh_script: default_refresh_script(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            upstream: UpstreamConfig::default(),
            version_file: default_version_file(),
            patterns: PatternsConfig::default(),
            security_keywords: default_security_keywords(),
            container: ContainerConfig::default(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `upsync.toml` in the current directory
/// 3. `.upsync.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| UpsyncError::config(format!("Cannot read '{}': {}", path, e)))?
    } else if Path::new("./upsync.toml").exists() {
        fs::read_to_string("./upsync.toml")
            .map_err(|e| UpsyncError::config(format!("Cannot read upsync.toml: {}", e)))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".upsync.toml");
        if config_path.exists() {
            fs::read_to_string(&config_path).map_err(|e| {
                UpsyncError::config(format!("Cannot read {}: {}", config_path.display(), e))
            })?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config =
        toml::from_str(&config_str).map_err(|e| UpsyncError::config(e.to_string()))?;
    Ok(config)
}
