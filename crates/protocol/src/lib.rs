//! # Redundancy Protocol
//!
//! Shared data model for the redundancy detection engine.
//!
//! Everything that crosses a crate or process boundary lives here: test
//! records read from the store, cluster partitions returned by the clustering
//! collaborator, redundancy findings emitted by the analyzer, and the run
//! configuration surface.
//!
//! ```text
//! TestRecord[]
//!     │
//!     ├──> fingerprints + semantic vectors
//!     │
//!     ├──> ClusterPartition (collaborator)
//!     │
//!     └──> RedundancyFinding[] ──> RunOutcome
//! ```

mod config;
mod finding;
mod outcome;
mod partition;
mod record;

pub use config::{Algorithm, ConfigError, HierarchicalLinkage, OutputFormat, RunConfig};
pub use finding::{
    FindingAnalysis, PotentialSavings, Priority, Recommendation, RecommendedAction,
    RedundancyFinding,
};
pub use outcome::{RunFailure, RunMetrics, RunOutcome, RunSuccess};
pub use partition::{ClusterPartition, PartitionError, NOISE_CLUSTER_ID};
pub use record::{CoverageLine, FeatureMetadata, TestFeature, TestRecord};
