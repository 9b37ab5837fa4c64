use async_trait::async_trait;
use redundancy_engine::{RunSummary, StoreError, TestRunReader};
use redundancy_protocol::TestRecord;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// On-disk test-run document: the store export this CLI consumes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunFile {
    #[serde(default)]
    pub run_id: Option<String>,
    pub tests: Vec<TestRecord>,
}

impl TestRunFile {
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&raw).map_err(|err| StoreError::Malformed(err.to_string()))
    }

    pub fn summarize(&self) -> RunSummary {
        let files: HashSet<&str> = self
            .tests
            .iter()
            .flat_map(|t| t.coverage_lines.iter().map(|l| l.file.as_str()))
            .collect();
        RunSummary {
            test_count: self.tests.len(),
            coverage_line_count: self.tests.iter().map(|t| t.coverage_lines.len()).sum(),
            unique_files: files.len(),
        }
    }
}

#[async_trait]
impl TestRunReader for TestRunFile {
    async fn summary(&self) -> Result<RunSummary, StoreError> {
        Ok(self.summarize())
    }

    async fn tests(&self) -> Result<Vec<TestRecord>, StoreError> {
        Ok(self.tests.clone())
    }
}
