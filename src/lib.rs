//! Category Tree - flat category records to in-memory hierarchies
//!
//! Two independent pieces:
//!
//! - **Tree building** ([`tree`]): an unordered list of `{id, name, parent_id}`
//!   records becomes a [`Forest`] of owned nodes. Dangling parents, duplicate
//!   ids and parent cycles are reported as [`HierarchyAnomaly`] values next to
//!   the forest instead of aborting the build.
//! - **Compact ids** ([`codec`]): a 128-bit id as a 22-character URL-safe
//!   token and back, decoded through fixed stack buffers.
//!
//! ## Pipeline
//!
//! ```text
//! RecordSource::fetch_all()  ->  build_forest()  ->  TreePrinter / JSON
//!     (JSON file, memory)         (ForestBuild)
//! ```
//!
//! [`TreeService`] wires a source to the builder and times both stages.

pub mod codec;
pub mod config;
pub mod error;
pub mod printer;
pub mod record;
pub mod service;
pub mod source;
pub mod tree;

// Re-exports
pub use codec::{ByteOrder, CompactId, CompactIdCodec, DecodeError};
pub use config::Config;
pub use error::TreeError;
pub use printer::TreePrinter;
pub use record::CategoryRecord;
pub use service::{TimedForest, TreeService};
pub use source::{JsonFileSource, MemorySource, RecordSource};
pub use tree::{
    build_forest, CategoryNode, CycleBreak, Forest, ForestBuild, HierarchyAnomaly,
    MalformedHierarchyError,
};
