use async_trait::async_trait;
use redundancy_protocol::TestRecord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read test run: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed test-run data: {0}")]
    Malformed(String),
}

/// Headline counts for progress reporting. Never feeds the analysis.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub test_count: usize,
    pub coverage_line_count: usize,
    pub unique_files: usize,
}

/// Abstract test-run reader backing the pipeline. The record iterator is
/// buffered: `tests` materializes the full batch once per run.
#[async_trait]
pub trait TestRunReader: Send + Sync {
    async fn summary(&self) -> Result<RunSummary, StoreError>;
    async fn tests(&self) -> Result<Vec<TestRecord>, StoreError>;
}
