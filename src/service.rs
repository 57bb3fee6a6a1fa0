//! Fetch-then-build pipeline with timing

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::TreeError;
use crate::source::RecordSource;
use crate::tree::{build_forest, ForestBuild};

/// A finished build together with how long each stage took
#[derive(Debug, Clone)]
pub struct TimedForest {
    pub build: ForestBuild,
    pub record_count: usize,
    pub fetch_time: Duration,
    pub build_time: Duration,
}

impl TimedForest {
    pub fn total_time(&self) -> Duration {
        self.fetch_time + self.build_time
    }
}

/// Builds category trees from a single record source
pub struct TreeService<S> {
    source: S,
    strict: bool,
}

impl<S: RecordSource> TreeService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            strict: false,
        }
    }

    /// Fail with [`TreeError::MalformedHierarchy`] instead of returning a
    /// forest with cut cycles
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn build_tree(&self) -> Result<TimedForest, TreeError> {
        let source = self.source.name();

        let started = Instant::now();
        let records = self.source.fetch_all()?;
        let fetch_time = started.elapsed();
        debug!(
            source,
            records = records.len(),
            elapsed_ms = fetch_time.as_secs_f64() * 1000.0,
            "Fetched records"
        );

        let started = Instant::now();
        let build = build_forest(&records);
        let build_time = started.elapsed();

        for anomaly in &build.anomalies {
            warn!(source, %anomaly, "Hierarchy anomaly");
        }

        if self.strict {
            build.check_well_formed()?;
        }

        info!(
            source,
            records = records.len(),
            roots = build.forest.len(),
            anomalies = build.anomalies.len(),
            build_ms = build_time.as_secs_f64() * 1000.0,
            "Tree built"
        );

        Ok(TimedForest {
            record_count: records.len(),
            build,
            fetch_time,
            build_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CategoryRecord;
    use crate::source::MemorySource;
    use uuid::Uuid;

    fn looped() -> MemorySource {
        MemorySource::new(vec![
            CategoryRecord::root(Uuid::from_u128(1), "Electronics"),
            CategoryRecord::child(Uuid::from_u128(2), "A", Uuid::from_u128(3)),
            CategoryRecord::child(Uuid::from_u128(3), "B", Uuid::from_u128(2)),
        ])
    }

    #[test]
    fn test_build_tree_lenient() {
        let service = TreeService::new(looped());
        assert_eq!(service.source().name(), "memory");
        let timed = service.build_tree().unwrap();
        assert_eq!(timed.record_count, 3);
        assert_eq!(timed.build.forest.node_count(), 3);
        assert_eq!(timed.build.cycles().count(), 1);
        assert!(timed.total_time() >= timed.build_time);
    }

    #[test]
    fn test_build_tree_strict() {
        let err = TreeService::new(looped()).strict(true).build_tree().unwrap_err();
        match err {
            TreeError::MalformedHierarchy(e) => {
                let lenient = TreeService::new(looped()).build_tree().unwrap();
                let expected: Vec<_> = lenient.build.cycles().copied().collect();
                assert_eq!(e.cycles, expected);
            }
            other => panic!("expected malformed hierarchy, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_accepts_dangling_parent() {
        let source = MemorySource::new(vec![CategoryRecord::child(
            Uuid::from_u128(5),
            "Orphan",
            Uuid::from_u128(404),
        )]);
        let timed = TreeService::new(source).strict(true).build_tree().unwrap();
        assert_eq!(timed.build.forest.len(), 1);
        assert_eq!(timed.build.dangling_parents().count(), 1);
    }

    #[test]
    fn test_source_errors_propagate() {
        let service = TreeService::new(crate::source::JsonFileSource::new("/nonexistent/records.json"));
        assert!(matches!(service.build_tree(), Err(TreeError::Source { .. })));
    }
}
