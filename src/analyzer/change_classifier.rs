use crate::domain::{ChangeCategory, ChangeSet, CommitRecord};

/// Buckets upstream commit summaries into security / bugfix / feature.
///
/// The keyword table comes from configuration; classification is purely
/// informational and never influences which files get updated.
pub struct ChangeClassifier {
    security_keywords: Vec<String>,
}

impl ChangeClassifier {
    /// Create a classifier with the given security keyword table.
    ///
    /// Keywords are matched case-insensitively as substrings of the commit
    /// summary.
    pub fn new(security_keywords: &[String]) -> Self {
        ChangeClassifier {
            security_keywords: security_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    /// Classify an ordered list of one-line commit summaries.
    ///
    /// First match wins: any security keyword makes the commit Security,
    /// otherwise "fix" or "bug" makes it Bugfix, anything else is Feature.
    /// Input order is preserved; blank lines are skipped; empty input yields
    /// an empty change set.
    pub fn classify(&self, summaries: &[String]) -> ChangeSet {
        let mut records = Vec::new();

        for summary in summaries {
            let line = summary.trim();
            if line.is_empty() {
                continue;
            }

            let lowered = line.to_lowercase();

            let category = if self
                .security_keywords
                .iter()
                .any(|keyword| lowered.contains(keyword))
            {
                ChangeCategory::Security
            } else if lowered.contains("fix") || lowered.contains("bug") {
                ChangeCategory::Bugfix
            } else {
                ChangeCategory::Feature
            };

            records.push(CommitRecord::new(line, category));
        }

        ChangeSet::new(records)
    }
}
