use thiserror::Error;

/// A test whose source could not be turned into a vector. One failed test
/// invalidates the shared vocabulary, so the run aborts.
#[derive(Error, Debug)]
#[error("vectorization failed for test '{test_id}': {cause}")]
pub struct VectorizationError {
    pub test_id: String,
    pub cause: String,
}

impl VectorizationError {
    pub fn new(test_id: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            cause: cause.into(),
        }
    }
}
