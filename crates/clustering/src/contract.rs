use redundancy_protocol::{Algorithm, HierarchicalLinkage, RunConfig, TestFeature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One test's vector as shipped to the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorEntry {
    pub test_id: String,
    pub vector: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmeansParams {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbscanParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    pub min_samples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchicalParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_clusters: Option<usize>,
    pub linkage: HierarchicalLinkage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterParams {
    pub kmeans: KmeansParams,
    pub dbscan: DbscanParams,
    pub hierarchical: HierarchicalParams,
    /// Dimensionality-reduction hint; the collaborator decides whether to
    /// honor it. The core never reduces.
    pub use_dimensionality_reduction: bool,
    pub reduced_dimensions: usize,
}

/// The single request issued per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRequest {
    pub vectors: Vec<VectorEntry>,
    pub algorithm: Algorithm,
    pub params: ClusterParams,
    pub debug: bool,
}

impl ClusterRequest {
    pub fn from_features(features: &[TestFeature], config: &RunConfig) -> Self {
        Self {
            vectors: features
                .iter()
                .map(|feature| VectorEntry {
                    test_id: feature.test_id.clone(),
                    vector: feature.vector.clone(),
                })
                .collect(),
            algorithm: config.algorithm,
            params: ClusterParams {
                kmeans: KmeansParams {
                    min: config.min_cluster_size,
                    max: config.max_clusters,
                },
                dbscan: DbscanParams {
                    eps: config.dbscan_eps,
                    min_samples: config.dbscan_min_samples,
                },
                hierarchical: HierarchicalParams {
                    n_clusters: config.hierarchical_n_clusters,
                    linkage: config.hierarchical_linkage,
                },
                use_dimensionality_reduction: config.use_dimensionality_reduction,
                reduced_dimensions: config.reduced_dimensions,
            },
            debug: false,
        }
    }
}

/// Cluster membership, in either wire form: a plain id list or the scored
/// object some collaborators emit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClusterMembers {
    Plain(Vec<String>),
    Scored {
        tests: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
    },
}

impl ClusterMembers {
    pub fn tests(&self) -> &[String] {
        match self {
            ClusterMembers::Plain(tests) => tests,
            ClusterMembers::Scored { tests, .. } => tests,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            ClusterMembers::Plain(_) => None,
            ClusterMembers::Scored { score, .. } => *score,
        }
    }
}

/// The collaborator's answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterResponse {
    pub clusters: BTreeMap<i64, ClusterMembers>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cluster_format_deserializes() {
        let raw = r#"{"clusters": {"0": ["t1", "t2"], "-1": ["noise"]}, "metadata": {}}"#;
        let response: ClusterResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.clusters[&0].tests(), ["t1", "t2"]);
        assert_eq!(response.clusters[&-1].tests(), ["noise"]);
        assert!(response.clusters[&0].score().is_none());
    }

    #[test]
    fn scored_cluster_format_deserializes() {
        let raw = r#"{
            "clusters": {"0": {"tests": ["t1", "t2"], "score": 0.91}},
            "metadata": {"silhouette": 0.4}
        }"#;
        let response: ClusterResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.clusters[&0].tests(), ["t1", "t2"]);
        assert_eq!(response.clusters[&0].score(), Some(0.91));
        assert_eq!(response.metadata["silhouette"], 0.4);
    }

    #[test]
    fn missing_metadata_defaults_to_null() {
        let raw = r#"{"clusters": {"0": ["t1"]}}"#;
        let response: ClusterResponse = serde_json::from_str(raw).unwrap();
        assert!(response.metadata.is_null());
    }

    #[test]
    fn request_carries_algorithm_and_params() {
        use redundancy_protocol::FeatureMetadata;

        let features = vec![TestFeature {
            test_id: "t1".to_string(),
            vector: vec![0.5; 4],
            metadata: FeatureMetadata {
                coverage_lines: vec![],
                execution_time_ms: 1,
                lines_covered: 0,
                path: "t.php".to_string(),
                method: "m".to_string(),
            },
        }];
        let config = RunConfig::new(Algorithm::Dbscan);
        let request = ClusterRequest::from_features(&features, &config);

        let raw = serde_json::to_value(&request).unwrap();
        assert_eq!(raw["algorithm"], "dbscan");
        assert_eq!(raw["params"]["dbscan"]["min_samples"], 3);
        assert_eq!(raw["params"]["kmeans"]["max"], 50);
        assert_eq!(raw["vectors"][0]["testId"], "t1");
    }
}
