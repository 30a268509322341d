//! Group — collect valid descriptors by logical log path and check that
//! every member of a group shares one schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use super::descriptor::LogFileDescriptor;
use crate::parser::Schema;

/// All valid files that declare the same logical log path, ordered by
/// physical path.
#[derive(Debug)]
pub struct LogGroup {
    log_path: String,
    schema: Arc<Schema>,
    descriptors: Vec<LogFileDescriptor>,
}

impl LogGroup {
    fn new(log_path: String, schema: Arc<Schema>) -> Self {
        Self {
            log_path,
            schema,
            descriptors: Vec::new(),
        }
    }

    pub fn log_path(&self) -> &str {
        &self.log_path
    }

    /// Schema of the first member.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn descriptors(&self) -> &[LogFileDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Members whose schema identity differs from the first member's.
    pub fn mismatched(&self) -> impl Iterator<Item = &LogFileDescriptor> + '_ {
        self.descriptors
            .iter()
            .filter(move |d| d.schema_id() != Some(self.schema.id()))
    }

    pub fn is_consistent(&self) -> bool {
        self.mismatched().next().is_none()
    }
}

/// Group valid descriptors by logical log path; invalid ones are dropped.
/// Within a group, members keep the order they were supplied in.
pub fn group_by_log_path<I>(descriptors: I) -> BTreeMap<String, LogGroup>
where
    I: IntoIterator<Item = LogFileDescriptor>,
{
    let mut groups: BTreeMap<String, LogGroup> = BTreeMap::new();
    for descriptor in descriptors {
        let Some(schema) = descriptor.schema().cloned() else {
            continue;
        };
        let log_path = schema.log_path().to_string();
        groups
            .entry(log_path.clone())
            .or_insert_with(|| LogGroup::new(log_path, schema))
            .descriptors
            .push(descriptor);
    }
    groups
}

/// Warn about every group whose members disagree on schema and return the
/// offending log paths. Groups are left as discovered.
pub fn check_consistency(groups: &BTreeMap<String, LogGroup>) -> Vec<String> {
    let mut mismatched = Vec::new();
    for group in groups.values().filter(|g| g.len() > 1) {
        if group.is_consistent() {
            continue;
        }
        for descriptor in group.mismatched() {
            warn!(
                log_path = %group.log_path(),
                file = %descriptor.path().display(),
                expected = %group.schema().id(),
                found = descriptor.schema_id().unwrap_or_default(),
                "Multiple types found for log path"
            );
        }
        mismatched.push(group.log_path().to_string());
    }
    mismatched
}
