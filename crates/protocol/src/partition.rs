use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// DBSCAN noise bucket: members were not assigned to any cluster and are
/// excluded from analysis.
pub const NOISE_CLUSTER_ID: i64 = -1;

#[derive(Error, Debug)]
pub enum PartitionError {
    #[error("test '{test_id}' appears in clusters {first} and {second}")]
    DuplicateAssignment {
        test_id: String,
        first: i64,
        second: i64,
    },

    #[error("cluster {cluster_id} has invalid id (expected small non-negative or -1)")]
    InvalidClusterId { cluster_id: i64 },
}

/// A validated partition of test ids into clusters, with its inverse map.
///
/// Invariants: every test id appears in exactly one cluster, the inverse map
/// is consistent, and cluster ids are non-negative except for the noise
/// bucket `-1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct ClusterPartition {
    clusters: BTreeMap<i64, Vec<String>>,
    assignments: HashMap<String, i64>,
}

impl TryFrom<BTreeMap<i64, Vec<String>>> for ClusterPartition {
    type Error = PartitionError;

    fn try_from(clusters: BTreeMap<i64, Vec<String>>) -> Result<Self, PartitionError> {
        Self::from_clusters(clusters)
    }
}

impl From<ClusterPartition> for BTreeMap<i64, Vec<String>> {
    fn from(partition: ClusterPartition) -> Self {
        partition.clusters
    }
}

// serde's internally-tagged enum support buffers fields through a generic
// `Content` deserializer that, unlike serde_json's top-level deserializer,
// does not coerce JSON string keys into integer map keys. Routing through a
// `String`-keyed map keeps the wire format identical (JSON object keys are
// always strings) while staying compatible with `RunOutcome`'s `tag = "status"`.
impl TryFrom<BTreeMap<String, Vec<String>>> for ClusterPartition {
    type Error = PartitionError;

    fn try_from(clusters: BTreeMap<String, Vec<String>>) -> Result<Self, PartitionError> {
        let clusters = clusters
            .into_iter()
            .map(|(id, members)| {
                let id: i64 = id
                    .parse()
                    .map_err(|_| PartitionError::InvalidClusterId { cluster_id: i64::MIN })?;
                Ok((id, members))
            })
            .collect::<Result<BTreeMap<i64, Vec<String>>, PartitionError>>()?;
        Self::from_clusters(clusters)
    }
}

impl From<ClusterPartition> for BTreeMap<String, Vec<String>> {
    fn from(partition: ClusterPartition) -> Self {
        partition
            .clusters
            .into_iter()
            .map(|(id, members)| (id.to_string(), members))
            .collect()
    }
}

impl ClusterPartition {
    pub fn from_clusters(clusters: BTreeMap<i64, Vec<String>>) -> Result<Self, PartitionError> {
        let mut assignments = HashMap::new();
        for (&cluster_id, members) in &clusters {
            if cluster_id < NOISE_CLUSTER_ID {
                return Err(PartitionError::InvalidClusterId { cluster_id });
            }
            for test_id in members {
                if let Some(&first) = assignments.get(test_id) {
                    return Err(PartitionError::DuplicateAssignment {
                        test_id: test_id.clone(),
                        first,
                        second: cluster_id,
                    });
                }
                assignments.insert(test_id.clone(), cluster_id);
            }
        }
        Ok(Self {
            clusters,
            assignments,
        })
    }

    pub fn empty() -> Self {
        Self {
            clusters: BTreeMap::new(),
            assignments: HashMap::new(),
        }
    }

    /// Clusters in ascending id order, noise bucket included.
    pub fn clusters(&self) -> &BTreeMap<i64, Vec<String>> {
        &self.clusters
    }

    /// Non-noise clusters only.
    pub fn analyzable_clusters(&self) -> impl Iterator<Item = (i64, &[String])> {
        self.clusters
            .iter()
            .filter(|(&id, _)| id != NOISE_CLUSTER_ID)
            .map(|(&id, members)| (id, members.as_slice()))
    }

    pub fn cluster_of(&self, test_id: &str) -> Option<i64> {
        self.assignments.get(test_id).copied()
    }

    pub fn contains(&self, test_id: &str) -> bool {
        self.assignments.contains_key(test_id)
    }

    /// Total assigned tests, noise included.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of non-noise clusters.
    pub fn cluster_count(&self) -> usize {
        self.clusters
            .keys()
            .filter(|&&id| id != NOISE_CLUSTER_ID)
            .count()
    }
}
