use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("threshold {0} out of range [0, 1]")]
    ThresholdOutOfRange(f64),

    #[error("max_clusters must be at least 1, got {0}")]
    MaxClustersTooSmall(usize),

    #[error("min_cluster_size must be at least 2, got {0}")]
    MinClusterSizeTooSmall(usize),

    #[error("dbscan_eps {0} must be positive")]
    InvalidDbscanEps(f64),

    #[error("dbscan_min_samples must be at least 1, got {0}")]
    InvalidDbscanMinSamples(usize),

    #[error("hierarchical_n_clusters must be at least 1, got {0}")]
    InvalidHierarchicalClusters(usize),

    #[error("reduced_dimensions must be at least 1, got {0}")]
    InvalidReducedDimensions(usize),

    #[error("timeout must be positive, got {0}s")]
    InvalidTimeout(u64),
}

/// Clustering algorithm selector for the collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Kmeans,
    Dbscan,
    Hierarchical,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Kmeans => "kmeans",
            Algorithm::Dbscan => "dbscan",
            Algorithm::Hierarchical => "hierarchical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Json,
    Yaml,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchicalLinkage {
    Ward,
    Complete,
    Average,
    Single,
}

impl HierarchicalLinkage {
    pub fn as_str(self) -> &'static str {
        match self {
            HierarchicalLinkage::Ward => "ward",
            HierarchicalLinkage::Complete => "complete",
            HierarchicalLinkage::Average => "average",
            HierarchicalLinkage::Single => "single",
        }
    }
}

/// Full configuration surface of a run. The algorithm is always caller
/// supplied; everything else has the documented default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub algorithm: Algorithm,

    /// Documents intent only; the analyzer gates are constants.
    pub threshold: f64,

    pub output_format: OutputFormat,
    pub max_clusters: usize,
    pub min_cluster_size: usize,
    pub use_dimensionality_reduction: bool,
    pub reduced_dimensions: usize,
    pub timeout_secs: u64,

    pub dbscan_eps: Option<f64>,
    pub dbscan_min_samples: usize,
    pub hierarchical_n_clusters: Option<usize>,
    pub hierarchical_linkage: HierarchicalLinkage,

    pub exclude_shared_coverage: bool,
    pub use_idf_weighting: bool,
}

impl RunConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            threshold: 0.85,
            output_format: OutputFormat::Json,
            max_clusters: 50,
            min_cluster_size: 2,
            use_dimensionality_reduction: false,
            reduced_dimensions: 128,
            timeout_secs: 300,
            dbscan_eps: None,
            dbscan_min_samples: 3,
            hierarchical_n_clusters: None,
            hierarchical_linkage: HierarchicalLinkage::Ward,
            exclude_shared_coverage: true,
            use_idf_weighting: true,
        }
    }

    /// Rejects out-of-range values before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) || !self.threshold.is_finite() {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold));
        }
        if self.max_clusters == 0 {
            return Err(ConfigError::MaxClustersTooSmall(self.max_clusters));
        }
        if self.min_cluster_size < 2 {
            return Err(ConfigError::MinClusterSizeTooSmall(self.min_cluster_size));
        }
        if let Some(eps) = self.dbscan_eps {
            if !eps.is_finite() || eps <= 0.0 {
                return Err(ConfigError::InvalidDbscanEps(eps));
            }
        }
        if self.dbscan_min_samples == 0 {
            return Err(ConfigError::InvalidDbscanMinSamples(self.dbscan_min_samples));
        }
        if let Some(n) = self.hierarchical_n_clusters {
            if n == 0 {
                return Err(ConfigError::InvalidHierarchicalClusters(n));
            }
        }
        if self.use_dimensionality_reduction && self.reduced_dimensions == 0 {
            return Err(ConfigError::InvalidReducedDimensions(self.reduced_dimensions));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(self.timeout_secs));
        }
        Ok(())
    }
}
