//! # Redundancy Clustering
//!
//! The contract with the clustering collaborator and the machinery that
//! drives it: serializable request/response payloads, a transport-agnostic
//! backend trait, a subprocess transport exchanging JSON over stdio, and a
//! dispatcher that times the call out, validates the returned partition, and
//! hands a consistent [`ClusterPartition`] to the analyzer.
//!
//! The collaborator owns the k-means / DBSCAN / hierarchical implementations;
//! anything honoring the payload shape plugs in.

mod backend;
mod contract;
mod dispatcher;
mod error;
mod subprocess;

pub use backend::ClusteringBackend;
pub use contract::{
    ClusterMembers, ClusterParams, ClusterRequest, ClusterResponse, DbscanParams,
    HierarchicalParams, KmeansParams, VectorEntry,
};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{ClusterConsistencyError, ClusteringError, DispatchError};
pub use subprocess::SubprocessBackend;
