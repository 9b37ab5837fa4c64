use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordinal priority of a finding, derived from the redundancy score and the
/// size of the redundant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Rank for sorting: high sorts before medium sorts before low.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Diagnostic block attached to each finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingAnalysis {
    pub avg_similarity: f64,
    pub cluster_size: usize,
    pub redundant_count: usize,
    pub execution_time_saved_sec: f64,
    pub coverage_overlap_pct: f64,
}

/// One redundancy finding: a cluster, its surviving representative, and the
/// members whose removal keeps coverage intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedundancyFinding {
    pub cluster_id: i64,
    pub representative_test_id: String,
    pub redundant_test_ids: Vec<String>,
    pub redundancy_score: f64,
    pub recommendation_text: String,
    pub priority: Priority,
    pub analysis: FindingAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

impl RedundancyFinding {
    /// Stable (priority desc, score desc) ordering for the findings stream.
    pub fn emit_order(a: &Self, b: &Self) -> Ordering {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| {
                b.redundancy_score
                    .partial_cmp(&a.redundancy_score)
                    .unwrap_or(Ordering::Equal)
            })
    }
}

/// Suggested handling, keyed off the redundancy score bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedAction {
    Merge,
    Consolidate,
    Review,
    Monitor,
}

impl RecommendedAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendedAction::Merge => "merge",
            RecommendedAction::Consolidate => "consolidate",
            RecommendedAction::Review => "review",
            RecommendedAction::Monitor => "monitor",
        }
    }
}

/// Estimated savings when the redundant set is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialSavings {
    pub time_saved_ms: u64,
    pub time_saved_sec: f64,
    pub lines_reduction: usize,
    pub test_count_reduction: usize,
    pub percentage_reduction: f64,
}

/// Composer enrichment attached to a finding before emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub rationale: Vec<String>,
    pub priority_score: f64,
    pub potential_savings: PotentialSavings,
}
