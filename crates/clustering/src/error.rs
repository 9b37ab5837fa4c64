use redundancy_protocol::PartitionError;
use thiserror::Error;

/// Failures of the collaborator call itself.
#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error("clustering collaborator timed out after {0}s")]
    Timeout(u64),

    #[error("clustering collaborator failed (exit code {exit_code:?}): {cause}")]
    Collaborator {
        cause: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("clustering collaborator returned malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("io error talking to clustering collaborator: {0}")]
    Io(#[from] std::io::Error),
}

/// The collaborator answered, but the partition does not match the inputs.
#[derive(Error, Debug)]
pub enum ClusterConsistencyError {
    #[error("test '{test_id}' was sent to the collaborator but missing from the partition")]
    MissingTest { test_id: String },

    #[error("partition names unknown test '{test_id}'")]
    UnknownTest { test_id: String },

    #[error(transparent)]
    Partition(#[from] PartitionError),
}

/// Everything `Dispatcher::dispatch` can surface.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Clustering(#[from] ClusteringError),

    #[error(transparent)]
    Consistency(#[from] ClusterConsistencyError),
}
