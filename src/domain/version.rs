use crate::error::{Result, UpsyncError};
use std::fmt;

/// Semantic version parsed from a manifest field or a release tag.
///
/// Parsing is deliberately permissive: a leading 'v'/'V' is stripped and
/// missing components default to 0, so "v1.2" reads as 1.2.0. The original
/// input string is kept alongside the numeric triple.
#[derive(Debug, Clone)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    raw: String,
}

/// Outcome of comparing one version against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrdering {
    /// Left side is newer
    Ahead,
    /// Left side is older
    Behind,
    Equal,
}

impl Version {
    /// Create a version from explicit components
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
            raw: format!("{}.{}.{}", major, minor, patch),
        }
    }

    /// Parse a version from a manifest field or tag string.
    ///
    /// Accepts "1.2.3", "v1.2.3", "V1.2.3" and shorter forms like "1.2"
    /// (missing components default to 0). Fails if the string carries no
    /// parsable numeric component at all, or a non-numeric one.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let clean = trimmed.trim_start_matches('v').trim_start_matches('V');

        if clean.is_empty() {
            return Err(UpsyncError::config(format!(
                "Invalid version format: '{}'",
                input
            )));
        }

        let mut components = [0u32; 3];
        let parts: Vec<&str> = clean.split('.').collect();
        if parts.len() > 3 {
            return Err(UpsyncError::config(format!(
                "Invalid version format: '{}' - expected at most X.Y.Z",
                input
            )));
        }

        for (i, part) in parts.iter().enumerate() {
            components[i] = part.parse::<u32>().map_err(|_| {
                UpsyncError::config(format!(
                    "Invalid version component '{}' in '{}'",
                    part, input
                ))
            })?;
        }

        Ok(Version {
            major: components[0],
            minor: components[1],
            patch: components[2],
            raw: trimmed.to_string(),
        })
    }

    /// The string this version was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The release tag name for this version (e.g. "v1.2.3")
    pub fn tag_name(&self) -> String {
        format!("v{}", self)
    }

    /// Compare this version against another, component by component.
    ///
    /// Lexicographic over (major, minor, patch); total for any two parsed
    /// versions.
    pub fn compare(&self, other: &Version) -> VersionOrdering {
        let left = (self.major, self.minor, self.patch);
        let right = (other.major, other.minor, other.patch);
        match left.cmp(&right) {
            std::cmp::Ordering::Greater => VersionOrdering::Ahead,
            std::cmp::Ordering::Less => VersionOrdering::Behind,
            std::cmp::Ordering::Equal => VersionOrdering::Equal,
        }
    }
}

// Equality considers the numeric triple only; "v1.2.0" and "1.2.0" are the
// same version.
impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        (self.major, self.minor, self.patch) == (other.major, other.minor, other.patch)
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("v1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
        assert_eq!(v.raw(), "v1.2.3");
    }

    #[test]
    fn test_version_parse_without_v() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_uppercase_v() {
        let v = Version::parse("V1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_missing_components_default_to_zero() {
        assert_eq!(Version::parse("1.2").unwrap(), Version::new(1, 2, 0));
        assert_eq!(Version::parse("2").unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("v").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("1.x.3").is_err());
        assert!(Version::parse("abc").is_err());
    }

    #[test]
    fn test_version_display_is_canonical() {
        assert_eq!(Version::parse("v1.2").unwrap().to_string(), "1.2.0");
    }

    #[test]
    fn test_version_tag_name() {
        assert_eq!(Version::parse("1.3.0").unwrap().tag_name(), "v1.3.0");
    }

    #[test]
    fn test_compare_equal_for_same_version() {
        let versions = ["0.0.0", "1.2.3", "v10.0.1", "3.9"];
        for raw in versions {
            let v = Version::parse(raw).unwrap();
            assert_eq!(v.compare(&v), VersionOrdering::Equal);
        }
    }

    #[test]
    fn test_compare_ahead_behind() {
        let old = Version::new(1, 2, 0);
        let new = Version::new(1, 3, 0);
        assert_eq!(old.compare(&new), VersionOrdering::Behind);
        assert_eq!(new.compare(&old), VersionOrdering::Ahead);
    }

    #[test]
    fn test_compare_is_antisymmetric() {
        let pairs = [
            (Version::new(1, 0, 0), Version::new(2, 0, 0)),
            (Version::new(1, 9, 9), Version::new(2, 0, 0)),
            (Version::new(0, 1, 0), Version::new(0, 1, 1)),
        ];
        for (a, b) in pairs {
            assert_eq!(a.compare(&b), VersionOrdering::Behind);
            assert_eq!(b.compare(&a), VersionOrdering::Ahead);
        }
    }

    #[test]
    fn test_compare_is_transitive() {
        let a = Version::new(1, 0, 0);
        let b = Version::new(1, 5, 0);
        let c = Version::new(2, 0, 0);
        assert_eq!(a.compare(&b), VersionOrdering::Behind);
        assert_eq!(b.compare(&c), VersionOrdering::Behind);
        assert_eq!(a.compare(&c), VersionOrdering::Behind);
    }

    #[test]
    fn test_equality_ignores_raw_form() {
        assert_eq!(
            Version::parse("v1.2.0").unwrap(),
            Version::parse("1.2").unwrap()
        );
    }
}
