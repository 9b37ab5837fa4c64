use crate::backend::ClusteringBackend;
use crate::contract::ClusterRequest;
use crate::error::{ClusterConsistencyError, ClusteringError, DispatchError};
use redundancy_protocol::{ClusterPartition, RunConfig, TestFeature, NOISE_CLUSTER_ID};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Validated result of one collaborator call.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub partition: ClusterPartition,
    /// Collaborator metadata plus any per-cluster scores, passed through for
    /// reporting.
    pub metadata: serde_json::Value,
}

/// Drives the single clustering call per run: timeout, then shape
/// validation of the returned partition against the inputs.
pub struct Dispatcher {
    backend: Arc<dyn ClusteringBackend>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn ClusteringBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn dispatch(
        &self,
        features: &[TestFeature],
        config: &RunConfig,
    ) -> Result<DispatchOutcome, DispatchError> {
        let request = ClusterRequest::from_features(features, config);
        log::debug!(
            "dispatching {} vectors ({} clustering)",
            request.vectors.len(),
            config.algorithm.as_str()
        );

        let response = tokio::time::timeout(self.timeout, self.backend.fit(&request))
            .await
            .map_err(|_| ClusteringError::Timeout(self.timeout.as_secs()))??;

        let mut clusters: BTreeMap<i64, Vec<String>> = BTreeMap::new();
        let mut scores = serde_json::Map::new();
        for (&cluster_id, members) in &response.clusters {
            clusters.insert(cluster_id, members.tests().to_vec());
            if let Some(score) = members.score() {
                scores.insert(cluster_id.to_string(), score.into());
            }
        }

        let partition = validate_partition(features, clusters)?;

        let mut metadata = serde_json::Map::new();
        if !response.metadata.is_null() {
            metadata.insert("collaborator".to_string(), response.metadata);
        }
        if !scores.is_empty() {
            metadata.insert("cluster_scores".to_string(), scores.into());
        }

        log::info!(
            "partition accepted: {} clusters over {} tests",
            partition.cluster_count(),
            partition.len()
        );
        Ok(DispatchOutcome {
            partition,
            metadata: metadata.into(),
        })
    }
}

/// Every input test id appears exactly once (noise bucket allowed); no ids
/// the run never sent.
fn validate_partition(
    features: &[TestFeature],
    clusters: BTreeMap<i64, Vec<String>>,
) -> Result<ClusterPartition, ClusterConsistencyError> {
    let known: HashSet<&str> = features.iter().map(|f| f.test_id.as_str()).collect();

    for members in clusters.values() {
        for test_id in members {
            if !known.contains(test_id.as_str()) {
                return Err(ClusterConsistencyError::UnknownTest {
                    test_id: test_id.clone(),
                });
            }
        }
    }

    let partition = ClusterPartition::from_clusters(clusters)?;

    for feature in features {
        if !partition.contains(&feature.test_id) {
            return Err(ClusterConsistencyError::MissingTest {
                test_id: feature.test_id.clone(),
            });
        }
    }

    debug_assert!(partition
        .clusters()
        .keys()
        .all(|&id| id >= NOISE_CLUSTER_ID));
    Ok(partition)
}
