use crate::contract::{ClusterRequest, ClusterResponse};
use crate::error::ClusteringError;
use async_trait::async_trait;

/// A clustering collaborator. Exactly one `fit` call is made per run; the
/// transport (in-process, subprocess, RPC) is the implementor's business.
#[async_trait]
pub trait ClusteringBackend: Send + Sync {
    async fn fit(&self, request: &ClusterRequest) -> Result<ClusterResponse, ClusteringError>;
}
