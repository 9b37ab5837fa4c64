use redundancy_protocol::{
    PotentialSavings, Priority, Recommendation, RecommendedAction, RedundancyFinding, TestFeature,
};
use std::collections::HashMap;

const MERGE_BAND: f64 = 0.95;
const CONSOLIDATE_BAND: f64 = 0.85;
const REVIEW_BAND: f64 = 0.70;

/// Enriches a finding with an action, rationale, numeric priority, and
/// savings estimates. Attached in place so the findings stream stays in its
/// emitted order.
pub fn compose_recommendation(
    finding: &mut RedundancyFinding,
    features: &HashMap<String, TestFeature>,
) {
    let score = finding.redundancy_score;
    let redundant_count = finding.redundant_test_ids.len();

    let action = if score >= MERGE_BAND {
        RecommendedAction::Merge
    } else if score >= CONSOLIDATE_BAND {
        RecommendedAction::Consolidate
    } else if score >= REVIEW_BAND {
        RecommendedAction::Review
    } else {
        RecommendedAction::Monitor
    };

    let mut time_saved_ms = 0u64;
    let mut lines_reduction = 0usize;
    for test_id in &finding.redundant_test_ids {
        if let Some(feature) = features.get(test_id) {
            time_saved_ms += feature.metadata.execution_time_ms;
            lines_reduction += feature.metadata.lines_covered;
        }
    }

    let pct = (score * 100.0).round() as i64;
    let mut rationale = Vec::new();
    match action {
        RecommendedAction::Merge => {
            rationale.push(format!(
                "Cluster members are {pct}% similar; one representative preserves the behavior under test"
            ));
        }
        RecommendedAction::Consolidate => {
            rationale.push(format!(
                "Cluster members overlap heavily ({pct}%); a parameterized test could replace them"
            ));
        }
        RecommendedAction::Review => {
            rationale.push(format!(
                "Moderate similarity ({pct}%) suggests partially duplicated intent"
            ));
        }
        RecommendedAction::Monitor => {
            rationale.push(format!(
                "Similarity ({pct}%) is below actionable bands; keep watching this cluster"
            ));
        }
    }
    rationale.push(format!(
        "{redundant_count} of {} tests add no coverage beyond the representative",
        finding.analysis.cluster_size
    ));
    if time_saved_ms > 0 {
        rationale.push(format!(
            "Removing them saves {:.1}s per suite run",
            time_saved_ms as f64 / 1000.0
        ));
    }

    let base = match finding.priority {
        Priority::High => 100.0,
        Priority::Medium => 50.0,
        Priority::Low => 10.0,
    };
    let priority_score = base
        + score * 20.0
        + ((redundant_count * 2) as f64).min(20.0)
        + (time_saved_ms as f64 / 100.0).min(10.0);

    let cluster_size = finding.analysis.cluster_size.max(1);
    let percentage_reduction =
        (redundant_count as f64 / cluster_size as f64 * 10_000.0).round() / 100.0;

    finding.recommendation = Some(Recommendation {
        action,
        rationale,
        priority_score,
        potential_savings: PotentialSavings {
            time_saved_ms,
            time_saved_sec: time_saved_ms as f64 / 1000.0,
            lines_reduction,
            test_count_reduction: redundant_count,
            percentage_reduction,
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use redundancy_protocol::{FeatureMetadata, FindingAnalysis};

    fn feature(test_id: &str, exec_ms: u64, lines: usize) -> TestFeature {
        TestFeature {
            test_id: test_id.to_string(),
            vector: vec![1.0],
            metadata: FeatureMetadata {
                coverage_lines: (0..lines).map(|l| format!("a.php:{l}")).collect(),
                execution_time_ms: exec_ms,
                lines_covered: lines,
                path: "a.php".to_string(),
                method: test_id.to_string(),
            },
        }
    }

    fn finding(score: f64, priority: Priority, redundant: &[&str]) -> RedundancyFinding {
        RedundancyFinding {
            cluster_id: 0,
            representative_test_id: "rep".to_string(),
            redundant_test_ids: redundant.iter().map(|r| r.to_string()).collect(),
            redundancy_score: score,
            recommendation_text: String::new(),
            priority,
            analysis: FindingAnalysis {
                avg_similarity: score,
                cluster_size: redundant.len() + 1,
                redundant_count: redundant.len(),
                execution_time_saved_sec: 0.0,
                coverage_overlap_pct: 0.0,
            },
            recommendation: None,
        }
    }

    fn features(pairs: &[(&str, u64, usize)]) -> HashMap<String, TestFeature> {
        pairs
            .iter()
            .map(|(id, ms, lines)| (id.to_string(), feature(id, *ms, *lines)))
            .collect()
    }

    #[test]
    fn merge_band_and_savings() {
        let features = features(&[("t2", 400, 12), ("t3", 600, 8)]);
        let mut finding = finding(0.97, Priority::High, &["t2", "t3"]);
        compose_recommendation(&mut finding, &features);

        let rec = finding.recommendation.unwrap();
        assert_eq!(rec.action, RecommendedAction::Merge);
        assert_eq!(rec.potential_savings.time_saved_ms, 1000);
        assert_eq!(rec.potential_savings.time_saved_sec, 1.0);
        assert_eq!(rec.potential_savings.lines_reduction, 20);
        assert_eq!(rec.potential_savings.test_count_reduction, 2);
        // 2 redundant of 3 tests.
        assert_eq!(rec.potential_savings.percentage_reduction, 66.67);
    }

    #[test]
    fn priority_score_composition() {
        let features = features(&[("t2", 400, 12), ("t3", 600, 8)]);
        let mut finding = finding(0.97, Priority::High, &["t2", "t3"]);
        compose_recommendation(&mut finding, &features);

        let rec = finding.recommendation.unwrap();
        // 100 + 0.97*20 + min(4, 20) + min(10, 10)
        assert!((rec.priority_score - (100.0 + 19.4 + 4.0 + 10.0)).abs() < 1e-9);
    }

    #[test]
    fn action_bands() {
        let empty = HashMap::new();
        for (score, expected) in [
            (0.96, RecommendedAction::Merge),
            (0.90, RecommendedAction::Consolidate),
            (0.75, RecommendedAction::Review),
            (0.40, RecommendedAction::Monitor),
        ] {
            let mut f = finding(score, Priority::Low, &["t2"]);
            compose_recommendation(&mut f, &empty);
            assert_eq!(f.recommendation.unwrap().action, expected);
        }
    }

    #[test]
    fn rationale_mentions_count_and_time() {
        let features = features(&[("t2", 1500, 3)]);
        let mut finding = finding(0.88, Priority::Medium, &["t2"]);
        compose_recommendation(&mut finding, &features);

        let rec = finding.recommendation.unwrap();
        assert!(rec.rationale.iter().any(|line| line.contains("1 of 2 tests")));
        assert!(rec.rationale.iter().any(|line| line.contains("1.5s")));
    }
}
