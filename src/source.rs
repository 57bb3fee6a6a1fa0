//! Record sources
//!
//! Anything that can hand over a full snapshot of flat records implements
//! [`RecordSource`]. The tree builder never sees where the rows came from.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::TreeError;
use crate::record::CategoryRecord;

pub trait RecordSource {
    /// Short label used in logs and timing output
    fn name(&self) -> &str;

    /// Fetch every record in source order
    fn fetch_all(&self) -> Result<Vec<CategoryRecord>, TreeError>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_all(&self) -> Result<Vec<CategoryRecord>, TreeError> {
        (**self).fetch_all()
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_all(&self) -> Result<Vec<CategoryRecord>, TreeError> {
        (**self).fetch_all()
    }
}

/// Records held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<CategoryRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<CategoryRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_all(&self) -> Result<Vec<CategoryRecord>, TreeError> {
        Ok(self.records.clone())
    }
}

/// A JSON file holding an array of records
///
/// ```json
/// [
///   { "id": "6f1c...", "name": "Electronics", "parent_id": null },
///   { "id": "a2d4...", "name": "Computers", "parent_id": "6f1c..." }
/// ]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, message: impl std::fmt::Display) -> TreeError {
        TreeError::Source {
            source_name: self.path.display().to_string(),
            message: message.to_string(),
        }
    }
}

impl RecordSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    fn fetch_all(&self) -> Result<Vec<CategoryRecord>, TreeError> {
        let file = File::open(&self.path).map_err(|e| self.error(format!("Failed to open: {}", e)))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| self.error(format!("Failed to parse records: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use uuid::Uuid;

    #[test]
    fn test_memory_source_preserves_order() {
        let a = CategoryRecord::root(Uuid::from_u128(1), "A");
        let b = CategoryRecord::child(Uuid::from_u128(2), "B", a.id);
        let source = MemorySource::new(vec![b.clone(), a.clone()]);
        assert_eq!(source.fetch_all().unwrap(), vec![b, a]);
    }

    #[test]
    fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id":"00000000-0000-0000-0000-000000000001","name":"Electronics","parent_id":null}},
                {{"id":"00000000-0000-0000-0000-000000000002","name":"Computers","parent_id":"00000000-0000-0000-0000-000000000001"}}
            ]"#
        )
        .unwrap();

        let source = JsonFileSource::new(file.path());
        let records = source.fetch_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent_id, Some(Uuid::from_u128(1)));
    }

    #[test]
    fn test_json_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("absent.json"));
        match source.fetch_all() {
            Err(TreeError::Source { message, .. }) => assert!(message.starts_with("Failed to open")),
            other => panic!("expected source error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_file_source_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not an array").unwrap();
        let source = JsonFileSource::new(file.path());
        assert!(matches!(source.fetch_all(), Err(TreeError::Source { .. })));
    }
}
