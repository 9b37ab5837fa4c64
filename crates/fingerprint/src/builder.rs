use crate::cache::LineHashCache;
use crate::seeds::{seed_triples, SeedTriple};
use crate::FINGERPRINT_SIZE;
use redundancy_protocol::TestRecord;
use std::collections::HashMap;
use xxhash_rust::xxh3::xxh3_64;

const LINE_CACHE_CAPACITY: usize = 10_000;

/// Behavior switches for [`FingerprintBuilder::build`].
#[derive(Debug, Clone, Copy)]
pub struct FingerprintOptions {
    /// Remove lines covered by almost every test before sketching.
    pub exclude_shared_coverage: bool,
    /// Divide position hashes by the line's IDF so rare lines win minima.
    pub use_idf_weighting: bool,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            exclude_shared_coverage: true,
            use_idf_weighting: true,
        }
    }
}

/// Builds the per-test coverage MinHash signatures for one run.
///
/// Owns the run-scoped seed triples and the per-line hash cache; both are
/// dropped with the builder when the run ends.
pub struct FingerprintBuilder {
    seeds: Vec<SeedTriple>,
    cache: LineHashCache,
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self {
            seeds: seed_triples(),
            cache: LineHashCache::new(LINE_CACHE_CAPACITY),
        }
    }

    /// Produces `test_id -> [f64; 256]` signatures, each element in [0, 1].
    /// Tests whose post-exclusion coverage set is empty get the zero vector.
    pub fn build(
        &mut self,
        records: &[TestRecord],
        options: FingerprintOptions,
    ) -> HashMap<String, Vec<f64>> {
        let total_tests = records.len();
        let per_test: Vec<(String, Vec<String>)> = records
            .iter()
            .map(|record| (record.test_id.clone(), record.coverage_keys()))
            .collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for (_, keys) in &per_test {
            for key in keys {
                *df.entry(key.as_str()).or_insert(0) += 1;
            }
        }

        let shared_threshold = if options.exclude_shared_coverage {
            Some(shared_line_threshold(total_tests))
        } else {
            None
        };
        if let Some(threshold) = shared_threshold {
            let shared = df
                .values()
                .filter(|&&count| count as f64 >= threshold)
                .count();
            log::debug!(
                "shared-line exclusion: threshold {threshold:.1}, {shared} of {} lines excluded",
                df.len()
            );
        }

        let mut signatures = HashMap::with_capacity(total_tests);
        for (test_id, keys) in &per_test {
            let kept: Vec<&str> = keys
                .iter()
                .map(String::as_str)
                .filter(|key| match shared_threshold {
                    Some(threshold) => {
                        let count = *df
                            .get(key)
                            .unwrap_or_else(|| panic!("coverage line '{key}' has no document frequency"));
                        assert!(count > 0, "coverage line '{key}' has zero document frequency");
                        (count as f64) < threshold
                    }
                    None => true,
                })
                .collect();

            let signature = if kept.is_empty() {
                vec![0.0; FINGERPRINT_SIZE]
            } else {
                self.signature_for(&kept, &df, total_tests, options.use_idf_weighting)
            };
            signatures.insert(test_id.clone(), signature);
        }

        log::info!("built {} coverage fingerprints", signatures.len());
        signatures
    }

    fn signature_for(
        &mut self,
        lines: &[&str],
        df: &HashMap<&str, usize>,
        total_tests: usize,
        use_idf: bool,
    ) -> Vec<f64> {
        let mut minima = vec![f64::INFINITY; FINGERPRINT_SIZE];

        for &line in lines {
            let seeds = &self.seeds;
            let hashes = self
                .cache
                .get_or_insert_with(line, || position_hashes(line, seeds));

            let idf = if use_idf {
                let count = *df
                    .get(line)
                    .unwrap_or_else(|| panic!("coverage line '{line}' has no document frequency"));
                assert!(count > 0, "coverage line '{line}' has zero document frequency");
                (total_tests as f64 / count as f64).ln() + 1.0
            } else {
                1.0
            };

            for (minimum, &hash) in minima.iter_mut().zip(hashes.iter()) {
                let weighted = hash as f64 / idf;
                if weighted < *minimum {
                    *minimum = weighted;
                }
            }
        }

        minima
            .into_iter()
            .map(|minimum| (minimum / i64::MAX as f64).min(1.0))
            .collect()
    }
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Document-frequency cutoff above which a line counts as shared
/// scaffolding. Bands follow the run size so small suites still exclude
/// near-universal lines.
fn shared_line_threshold(total_tests: usize) -> f64 {
    let n = total_tests as f64;
    if total_tests > 100 {
        (0.6 * n).max(60.0)
    } else if total_tests > 50 {
        (0.7 * n).max(35.0)
    } else {
        (0.8 * n).max(2.0)
    }
}

/// The 256 unweighted position hashes for one coverage line key.
fn position_hashes(line: &str, seeds: &[SeedTriple]) -> Vec<u64> {
    let base = xxh3_64(line.as_bytes());
    let h1 = (base & 0xFFFF_FFFF) as u64;
    let h2 = (base >> 32) as u64;

    seeds
        .iter()
        .map(|seed| {
            let mixed = h1
                .wrapping_mul(seed.a)
                .wrapping_add(h2.wrapping_mul(seed.b))
                ^ seed.c;
            (mixed as i64).unsigned_abs()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use redundancy_protocol::CoverageLine;

    fn record(test_id: &str, lines: &[(&str, u32)]) -> TestRecord {
        TestRecord {
            test_id: test_id.to_string(),
            path: format!("tests/{test_id}.php"),
            method: "run".to_string(),
            exec_time_ms: 10,
            recent_fail_rate: 0.0,
            source_text: Some(String::new()),
            coverage_lines: lines
                .iter()
                .map(|(file, line)| CoverageLine::new(*file, *line))
                .collect(),
        }
    }

    #[test]
    fn signatures_are_deterministic_and_bounded() {
        let records = vec![
            record("t1", &[("a.php", 1), ("a.php", 2)]),
            record("t2", &[("a.php", 2), ("b.php", 9)]),
        ];
        let first = FingerprintBuilder::new().build(&records, FingerprintOptions::default());
        let second = FingerprintBuilder::new().build(&records, FingerprintOptions::default());
        assert_eq!(first, second);

        for signature in first.values() {
            assert_eq!(signature.len(), FINGERPRINT_SIZE);
            assert!(signature.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn identical_coverage_yields_identical_signatures() {
        let records = vec![
            record("t1", &[("a.php", 1), ("a.php", 2), ("b.php", 3)]),
            record("t2", &[("b.php", 3), ("a.php", 2), ("a.php", 1)]),
            record("t3", &[("z.php", 100)]),
        ];
        let options = FingerprintOptions {
            exclude_shared_coverage: false,
            use_idf_weighting: true,
        };
        let signatures = FingerprintBuilder::new().build(&records, options);
        assert_eq!(signatures["t1"], signatures["t2"]);
        assert_ne!(signatures["t1"], signatures["t3"]);
    }

    #[test]
    fn empty_coverage_yields_zero_vector() {
        let records = vec![record("empty", &[])];
        let signatures =
            FingerprintBuilder::new().build(&records, FingerprintOptions::default());
        assert!(signatures["empty"].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn universally_shared_lines_are_excluded() {
        // Every test covers the same two lines; with N = 3 the threshold is
        // max(0.8 * 3, 2) = 2.4 and df = 3 exceeds it, emptying every set.
        let records = vec![
            record("t1", &[("boot.php", 1), ("boot.php", 2)]),
            record("t2", &[("boot.php", 1), ("boot.php", 2)]),
            record("t3", &[("boot.php", 1), ("boot.php", 2)]),
        ];
        let signatures =
            FingerprintBuilder::new().build(&records, FingerprintOptions::default());
        for signature in signatures.values() {
            assert!(signature.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn unique_lines_survive_shared_exclusion() {
        // Ten tests share a bootstrap block but keep two unique lines each,
        // so the sketches must differ pairwise.
        let mut records = Vec::new();
        for i in 0..10u32 {
            let mut lines: Vec<(String, u32)> =
                (1..=100).map(|l| ("bootstrap.php".to_string(), l)).collect();
            lines.push((format!("unique_{i}.php"), 1));
            lines.push((format!("unique_{i}.php"), 2));
            let lines: Vec<(&str, u32)> =
                lines.iter().map(|(f, l)| (f.as_str(), *l)).collect();
            records.push(record(&format!("t{i}"), &lines));
        }
        let signatures =
            FingerprintBuilder::new().build(&records, FingerprintOptions::default());
        for i in 0..10 {
            let a = &signatures[&format!("t{i}")];
            assert!(a.iter().any(|&v| v > 0.0));
            for j in (i + 1)..10 {
                assert_ne!(a, &signatures[&format!("t{j}")]);
            }
        }
    }

    #[test]
    fn idf_weighting_prefers_rare_lines() {
        // t1 and t2 share a common line plus one rare line each. With IDF on,
        // the common line is down-weighted, so the rare lines should decide
        // more positions than they would unweighted.
        let records = vec![
            record("t1", &[("common.php", 1), ("rare_a.php", 1)]),
            record("t2", &[("common.php", 1), ("rare_b.php", 1)]),
            record("t3", &[("common.php", 1)]),
        ];
        let unweighted = FingerprintBuilder::new().build(
            &records,
            FingerprintOptions {
                exclude_shared_coverage: false,
                use_idf_weighting: false,
            },
        );
        let weighted = FingerprintBuilder::new().build(
            &records,
            FingerprintOptions {
                exclude_shared_coverage: false,
                use_idf_weighting: true,
            },
        );

        let agree = |map: &HashMap<String, Vec<f64>>| {
            map["t1"]
                .iter()
                .zip(map["t2"].iter())
                .filter(|(a, b)| a == b)
                .count()
        };
        assert!(agree(&weighted) <= agree(&unweighted));
    }
}
