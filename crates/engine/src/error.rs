use crate::store::StoreError;
use redundancy_clustering::{ClusterConsistencyError, ClusteringError, DispatchError};
use redundancy_protocol::ConfigError;
use redundancy_semantic::VectorizationError;
use thiserror::Error;

/// Everything that aborts a run. Each kind maps onto one rendered message in
/// the resulting `RunFailure`.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Vectorization(#[from] VectorizationError),

    #[error(transparent)]
    Clustering(#[from] ClusteringError),

    #[error(transparent)]
    ClusterConsistency(#[from] ClusterConsistencyError),

    #[error("run cancelled")]
    Cancelled,
}

impl From<DispatchError> for EngineError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Clustering(inner) => EngineError::Clustering(inner),
            DispatchError::Consistency(inner) => EngineError::ClusterConsistency(inner),
        }
    }
}
