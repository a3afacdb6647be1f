use serde::Serialize;

/// Category assigned to a single upstream commit summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeCategory {
    Security,
    Bugfix,
    Feature,
}

/// One classified commit line from the upstream log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub summary: String,
    pub category: ChangeCategory,
}

impl CommitRecord {
    pub fn new(summary: impl Into<String>, category: ChangeCategory) -> Self {
        CommitRecord {
            summary: summary.into(),
            category,
        }
    }
}

/// Ordered set of classified commits between two upstream releases.
///
/// Built once per check and never re-sorted; the input order of the log is
/// preserved within each category bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    records: Vec<CommitRecord>,
}

impl ChangeSet {
    pub fn new(records: Vec<CommitRecord>) -> Self {
        ChangeSet { records }
    }

    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    fn in_category(&self, category: ChangeCategory) -> impl Iterator<Item = &CommitRecord> {
        self.records
            .iter()
            .filter(move |r| r.category == category)
    }

    pub fn security_count(&self) -> usize {
        self.in_category(ChangeCategory::Security).count()
    }

    pub fn bugfix_count(&self) -> usize {
        self.in_category(ChangeCategory::Bugfix).count()
    }

    pub fn feature_count(&self) -> usize {
        self.in_category(ChangeCategory::Feature).count()
    }
}

// Serialized as the three-bucket report shape the update summary prints.
impl Serialize for ChangeSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let collect = |category| -> Vec<&str> {
            self.in_category(category)
                .map(|r| r.summary.as_str())
                .collect()
        };

        let mut state = serializer.serialize_struct("ChangeSet", 3)?;
        state.serialize_field("security", &collect(ChangeCategory::Security))?;
        state.serialize_field("bugfixes", &collect(ChangeCategory::Bugfix))?;
        state.serialize_field("features", &collect(ChangeCategory::Feature))?;
        state.end()
    }
}
