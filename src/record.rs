//! Flat category records as supplied by a record source

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single flat category row.
///
/// Records are source-agnostic: the same shape comes out of a JSON file,
/// an in-memory fixture or any other [`RecordSource`](crate::source::RecordSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    /// Parent category, `None` for top-level categories
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl CategoryRecord {
    /// Create a top-level record
    pub fn root(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
        }
    }

    /// Create a record nested under `parent_id`
    pub fn child(id: Uuid, name: impl Into<String>, parent_id: Uuid) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: Some(parent_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_id_defaults_to_none() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000001","name":"Electronics"}"#;
        let record: CategoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "Electronics");
        assert_eq!(record.parent_id, None);
    }

    #[test]
    fn test_null_parent_id() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000002","name":"Clothing","parent_id":null}"#;
        let record: CategoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.parent_id, None);
    }
}
