use crate::similarity::SimilarityMatrix;
use rayon::prelude::*;
use redundancy_protocol::{
    ClusterPartition, FindingAnalysis, Priority, RedundancyFinding, TestFeature,
};
use std::collections::{HashMap, HashSet};

/// Minimum representative-to-member similarity for redundancy candidacy.
const SIMILARITY_GATE: f64 = 0.85;

/// Minimum fraction of a candidate's coverage the representative must also
/// cover before removal is safe.
const COVERAGE_PRESERVATION: f64 = 0.95;

const HIGH_SCORE: f64 = 0.95;
const MEDIUM_SCORE: f64 = 0.85;
const HIGH_REDUNDANT_COUNT: usize = 10;
const MEDIUM_REDUNDANT_COUNT: usize = 5;

/// Bounded work for the coverage-overlap diagnostic.
const OVERLAP_SAMPLE: usize = 10;

/// Analyzes every non-noise cluster of the partition and returns the
/// findings stream, ordered (priority desc, score desc).
pub fn analyze_partition(
    partition: &ClusterPartition,
    features: &HashMap<String, TestFeature>,
) -> Vec<RedundancyFinding> {
    let clusters: Vec<(i64, &[String])> = partition.analyzable_clusters().collect();

    let mut findings: Vec<RedundancyFinding> = clusters
        .par_iter()
        .filter_map(|&(cluster_id, member_ids)| {
            let members: Vec<&TestFeature> = member_ids
                .iter()
                .map(|test_id| {
                    features
                        .get(test_id)
                        .unwrap_or_else(|| panic!("test '{test_id}' missing from feature set"))
                })
                .collect();
            analyze_cluster(cluster_id, &members)
        })
        .collect();

    findings.sort_by(RedundancyFinding::emit_order);
    log::info!(
        "analyzed {} clusters, {} findings",
        clusters.len(),
        findings.len()
    );
    findings
}

/// Analyzes one cluster. Returns `None` for singletons and for clusters
/// where no member survives both the similarity gate and the
/// coverage-preservation gate.
pub fn analyze_cluster(cluster_id: i64, members: &[&TestFeature]) -> Option<RedundancyFinding> {
    if members.len() < 2 {
        return None;
    }

    let vectors: Vec<&[f64]> = members.iter().map(|m| m.vector.as_slice()).collect();
    let matrix = SimilarityMatrix::build(&vectors);

    let representative = select_representative(members, &matrix);
    let rep_coverage: HashSet<&str> = members[representative]
        .metadata
        .coverage_lines
        .iter()
        .map(String::as_str)
        .collect();

    let mut redundant = Vec::new();
    for (index, member) in members.iter().enumerate() {
        if index == representative {
            continue;
        }
        if matrix.get(representative, index) < SIMILARITY_GATE {
            continue;
        }
        if preserves_coverage(&rep_coverage, &member.metadata.coverage_lines) {
            redundant.push(index);
        }
    }

    if redundant.is_empty() {
        return None;
    }

    let score = matrix.upper_triangle_mean();
    let priority = classify_priority(score, redundant.len());
    let saved_ms: u64 = redundant
        .iter()
        .map(|&i| members[i].metadata.execution_time_ms)
        .sum();

    Some(RedundancyFinding {
        cluster_id,
        representative_test_id: members[representative].test_id.clone(),
        redundant_test_ids: redundant
            .iter()
            .map(|&i| members[i].test_id.clone())
            .collect(),
        redundancy_score: score,
        recommendation_text: recommendation_text(score, redundant.len()),
        priority,
        analysis: FindingAnalysis {
            avg_similarity: score,
            cluster_size: members.len(),
            redundant_count: redundant.len(),
            execution_time_saved_sec: saved_ms as f64 / 1000.0,
            coverage_overlap_pct: coverage_overlap_pct(members),
        },
        recommendation: None,
    })
}

/// Highest combined score of mean similarity, speed, and breadth of
/// coverage; ties go to the earliest member.
fn select_representative(members: &[&TestFeature], matrix: &SimilarityMatrix) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (index, member) in members.iter().enumerate() {
        let avg_sim = matrix.avg_for(index);
        let speed = 1.0 / (1.0 + member.metadata.execution_time_ms as f64 / 1000.0);
        let breadth = (member.metadata.lines_covered as f64 / 100.0).min(1.0);
        let score = 0.7 * avg_sim + 0.2 * speed + 0.1 * breadth;
        if score > best_score {
            best_score = score;
            best = index;
        }
    }
    best
}

/// Removing a candidate is safe when at least 95% of its covered lines are
/// also covered by the representative. Empty coverage is trivially safe.
fn preserves_coverage(representative: &HashSet<&str>, candidate: &[String]) -> bool {
    if candidate.is_empty() {
        return true;
    }
    let candidate_set: HashSet<&str> = candidate.iter().map(String::as_str).collect();
    let retained = candidate_set
        .iter()
        .filter(|line| representative.contains(*line))
        .count();
    retained as f64 / candidate_set.len() as f64 >= COVERAGE_PRESERVATION
}

fn classify_priority(score: f64, redundant_count: usize) -> Priority {
    if score >= HIGH_SCORE || redundant_count >= HIGH_REDUNDANT_COUNT {
        Priority::High
    } else if score >= MEDIUM_SCORE || redundant_count >= MEDIUM_REDUNDANT_COUNT {
        Priority::Medium
    } else {
        Priority::Low
    }
}

fn recommendation_text(score: f64, redundant_count: usize) -> String {
    let pct = (score * 100.0).round() as i64;
    if score >= HIGH_SCORE {
        format!(
            "Remove {redundant_count} highly redundant tests ({pct}% similar). \
             Keep only the representative test for this functionality."
        )
    } else if score >= MEDIUM_SCORE {
        format!(
            "Consider consolidating {redundant_count} similar tests ({pct}% overlap). \
             Review for potential merge or parameterization opportunities."
        )
    } else {
        format!(
            "Review {redundant_count} related tests for optimization opportunities. \
             Minor redundancy detected ({pct}% similarity)."
        )
    }
}

/// Mean Jaccard similarity of coverage over the first 10 members' pairs.
fn coverage_overlap_pct(members: &[&TestFeature]) -> f64 {
    let sample = &members[..members.len().min(OVERLAP_SAMPLE)];
    let sets: Vec<HashSet<&str>> = sample
        .iter()
        .map(|m| m.metadata.coverage_lines.iter().map(String::as_str).collect())
        .collect();

    let mut sum = 0.0;
    let mut pairs = 0usize;
    for i in 0..sets.len() {
        for j in (i + 1)..sets.len() {
            sum += jaccard(&sets[i], &sets[j]);
            pairs += 1;
        }
    }
    if pairs == 0 {
        return 0.0;
    }
    sum / pairs as f64 * 100.0
}

fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
