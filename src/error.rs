//! Error types for category-tree

use thiserror::Error;

use crate::tree::MalformedHierarchyError;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error(transparent)]
    MalformedHierarchy(#[from] MalformedHierarchyError),

    #[error("Record source error ({source_name}): {message}")]
    Source { source_name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for TreeError {
    fn from(e: toml::de::Error) -> Self {
        TreeError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for TreeError {
    fn from(e: toml::ser::Error) -> Self {
        TreeError::Config(e.to_string())
    }
}
