use crate::{ClusterPartition, RedundancyFinding};
use serde::{Deserialize, Serialize};

/// Aggregate counters reported with every successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_tests: usize,
    pub clusters_found: usize,
    pub redundancy_findings: usize,
    pub redundant_tests: usize,
    /// `redundant_tests / total_tests * 100`, rounded to two decimals.
    /// Zero when the run had no tests.
    pub reduction_percentage: f64,
}

impl RunMetrics {
    pub fn compute(
        total_tests: usize,
        clusters_found: usize,
        findings: &[RedundancyFinding],
    ) -> Self {
        let redundant_tests: usize = findings.iter().map(|f| f.redundant_test_ids.len()).sum();
        let reduction_percentage = if total_tests == 0 {
            0.0
        } else {
            let pct = redundant_tests as f64 / total_tests as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        };
        Self {
            total_tests,
            clusters_found,
            redundancy_findings: findings.len(),
            redundant_tests,
            reduction_percentage,
        }
    }
}

/// Result of a completed run: the ordered findings stream plus the partition
/// they were derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSuccess {
    pub findings: Vec<RedundancyFinding>,
    pub partition: ClusterPartition,
    pub metrics: RunMetrics,
    pub execution_time_sec: f64,
}

/// Result of an aborted run. Every error that caused the abort is preserved
/// as a rendered message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFailure {
    pub errors: Vec<String>,
    pub execution_time_sec: f64,
}

/// Tagged union carried over the CLI / findings-stream boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    Success(RunSuccess),
    Failure(RunFailure),
}
