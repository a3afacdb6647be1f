use crate::error::{Result, UpsyncError};
use regex::Regex;

/// Decides which changed upstream paths are worth pulling forward.
///
/// Two ordered pattern lists drive the decision: preserved patterns protect
/// local customizations and always win; essential patterns opt paths in;
/// anything matching neither list is excluded.
pub struct PathFilter {
    essential: Vec<Regex>,
    preserved: Vec<Regex>,
}

impl PathFilter {
    /// Compile essential and preserved glob patterns into a filter.
    ///
    /// Patterns use a restricted glob: `**` crosses path separators (a
    /// `**/` segment may match zero segments), `*` stays within a single
    /// segment, everything else is literal. Matches are anchored against
    /// the full relative path.
    pub fn compile(essential: &[String], preserved: &[String]) -> Result<Self> {
        Ok(PathFilter {
            essential: compile_patterns(essential)?,
            preserved: compile_patterns(preserved)?,
        })
    }

    /// Whether a single path should be updated from upstream.
    ///
    /// Preserved patterns are checked before essential ones; unmatched
    /// paths are excluded.
    pub fn includes(&self, path: &str) -> bool {
        if self.preserved.iter().any(|re| re.is_match(path)) {
            return false;
        }
        self.essential.iter().any(|re| re.is_match(path))
    }

    /// Filter a changed-file list down to the paths to update.
    ///
    /// Blank entries are dropped, duplicates appear once, and the input
    /// order of the survivors is preserved.
    pub fn filter<'a, I>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = std::collections::HashSet::new();
        let mut included = Vec::new();

        for path in paths {
            let path = path.trim();
            if path.is_empty() {
                continue;
            }
            if self.includes(path) && seen.insert(path.to_string()) {
                included.push(path.to_string());
            }
        }

        included
    }
}

/// Translate a restricted glob into an anchored regex.
fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    // "**/" may match zero segments so "a/**/b" covers "a/b"
                    if i + 2 < chars.len() && chars[i + 2] == '/' {
                        regex.push_str("(?:.*/)?");
                        i += 3;
                    } else {
                        regex.push_str(".*");
                        i += 2;
                    }
                } else {
                    regex.push_str("[^/]*");
                    i += 1;
                }
            }
            c => {
                regex.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }

    regex.push('$');

    Regex::new(&regex)
        .map_err(|e| UpsyncError::config(format!("Invalid path pattern '{}': {}", pattern, e)))
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| glob_to_regex(p)).collect()
}
