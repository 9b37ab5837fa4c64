use redundancy_protocol::{FeatureMetadata, TestFeature, TestRecord};
use std::collections::HashMap;

/// Binds each test's semantic vector to its metadata, in record order.
///
/// `coverage_lines` is the raw canonical key list (pre-exclusion); the
/// analyzer's coverage-preservation gate depends on it.
pub fn assemble_features(
    records: &[TestRecord],
    vectors: &HashMap<String, Vec<f64>>,
) -> Vec<TestFeature> {
    records
        .iter()
        .map(|record| {
            let vector = vectors
                .get(&record.test_id)
                .unwrap_or_else(|| panic!("test '{}' has no semantic vector", record.test_id))
                .clone();
            let coverage_lines = record.coverage_keys();
            TestFeature {
                test_id: record.test_id.clone(),
                metadata: FeatureMetadata {
                    lines_covered: coverage_lines.len(),
                    coverage_lines,
                    execution_time_ms: record.exec_time_ms,
                    path: record.path.clone(),
                    method: record.method.clone(),
                },
                vector,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use redundancy_protocol::CoverageLine;

    #[test]
    fn features_follow_record_order_and_carry_raw_coverage() {
        let records = vec![
            TestRecord {
                test_id: "B::b".to_string(),
                path: "tests/B.php".to_string(),
                method: "b".to_string(),
                exec_time_ms: 42,
                recent_fail_rate: 0.0,
                source_text: Some(String::new()),
                coverage_lines: vec![
                    CoverageLine::new("x.php", 2),
                    CoverageLine::new("x.php", 1),
                    CoverageLine::new("x.php", 2),
                ],
            },
            TestRecord {
                test_id: "A::a".to_string(),
                path: "tests/A.php".to_string(),
                method: "a".to_string(),
                exec_time_ms: 7,
                recent_fail_rate: 0.0,
                source_text: Some(String::new()),
                coverage_lines: vec![],
            },
        ];
        let mut vectors = HashMap::new();
        vectors.insert("B::b".to_string(), vec![1.0, 0.0]);
        vectors.insert("A::a".to_string(), vec![0.0, 1.0]);

        let features = assemble_features(&records, &vectors);
        assert_eq!(features[0].test_id, "B::b");
        assert_eq!(features[0].metadata.coverage_lines, vec!["x.php:1", "x.php:2"]);
        assert_eq!(features[0].metadata.lines_covered, 2);
        assert_eq!(features[0].metadata.execution_time_ms, 42);
        assert_eq!(features[1].test_id, "A::a");
        assert!(features[1].metadata.coverage_lines.is_empty());
    }

    #[test]
    #[should_panic(expected = "has no semantic vector")]
    fn missing_vector_is_a_programmer_error() {
        let records = vec![TestRecord {
            test_id: "T::t".to_string(),
            path: "t.php".to_string(),
            method: "t".to_string(),
            exec_time_ms: 0,
            recent_fail_rate: 0.0,
            source_text: Some(String::new()),
            coverage_lines: vec![],
        }];
        assemble_features(&records, &HashMap::new());
    }
}
