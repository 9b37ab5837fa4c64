use serde::{Deserialize, Serialize};

/// A single covered source line. Equality is bytewise on the canonical key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverageLine {
    pub file: String,
    pub line: u32,
}

impl CoverageLine {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Canonical string form `"<file>:<line>"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// One test as read from the store, identified by `<class_or_path>::<method>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub test_id: String,
    pub path: String,
    pub method: String,

    /// Wall-clock execution time in milliseconds.
    #[serde(default)]
    pub exec_time_ms: u64,

    /// Fraction of recent runs that failed, in [0, 1].
    #[serde(default)]
    pub recent_fail_rate: f64,

    /// Test source text. `None` means the store could not supply it and the
    /// engine falls back to reading `path` from disk.
    #[serde(default)]
    pub source_text: Option<String>,

    #[serde(default)]
    pub coverage_lines: Vec<CoverageLine>,
}

impl TestRecord {
    /// Deduplicated canonical coverage keys for this test.
    pub fn coverage_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.coverage_lines.iter().map(CoverageLine::key).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

/// Per-test metadata carried alongside the semantic vector into clustering
/// and analysis. `coverage_lines` is the raw, pre-exclusion key list used by
/// the analyzer's coverage-preservation gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMetadata {
    pub coverage_lines: Vec<String>,
    pub execution_time_ms: u64,
    pub lines_covered: usize,
    pub path: String,
    pub method: String,
}

/// Assembled feature record: one test, ready for clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestFeature {
    pub test_id: String,
    pub vector: Vec<f64>,
    pub metadata: FeatureMetadata,
}
