use crate::backend::ClusteringBackend;
use crate::contract::{ClusterRequest, ClusterResponse};
use crate::error::ClusteringError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Collaborator reached by spawning a command and exchanging JSON over
/// stdio: request on stdin, response on stdout, diagnostics on stderr.
pub struct SubprocessBackend {
    program: String,
    args: Vec<String>,
}

impl SubprocessBackend {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a shell-ish command line on whitespace: first token is the
    /// program, the rest are arguments.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace();
        let program = parts.next()?.to_string();
        let args = parts.map(str::to_string).collect();
        Some(Self { program, args })
    }
}

#[async_trait]
impl ClusteringBackend for SubprocessBackend {
    async fn fit(&self, request: &ClusterRequest) -> Result<ClusterResponse, ClusteringError> {
        let payload = serde_json::to_vec(request)?;
        log::info!(
            "dispatching {} vectors to clustering collaborator '{}'",
            request.vectors.len(),
            self.program
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        {
            let mut stdin = child.stdin.take().ok_or_else(|| {
                ClusteringError::Collaborator {
                    cause: "collaborator stdin unavailable".to_string(),
                    stderr: None,
                    exit_code: None,
                }
            })?;
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ClusteringError::Collaborator {
                cause: "collaborator exited with failure".to_string(),
                stderr: (!stderr.is_empty()).then_some(stderr),
                exit_code: output.status.code(),
            });
        }

        let response: ClusterResponse = serde_json::from_slice(&output.stdout)?;
        log::debug!(
            "collaborator returned {} clusters",
            response.clusters.len()
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redundancy_protocol::{Algorithm, RunConfig};

    fn request() -> ClusterRequest {
        ClusterRequest::from_features(&[], &RunConfig::new(Algorithm::Kmeans))
    }

    #[tokio::test]
    async fn stdout_json_is_parsed() {
        let backend = SubprocessBackend::new(
            "sh",
            vec![
                "-c".to_string(),
                r#"cat > /dev/null; echo '{"clusters": {"0": ["t1"]}, "metadata": {}}'"#
                    .to_string(),
            ],
        );
        let response = backend.fit(&request()).await.unwrap();
        assert_eq!(response.clusters[&0].tests(), ["t1"]);
    }

    #[tokio::test]
    async fn nonzero_exit_captures_stderr_and_code() {
        let backend = SubprocessBackend::new(
            "sh",
            vec![
                "-c".to_string(),
                "cat > /dev/null; echo 'no such algorithm' >&2; exit 3".to_string(),
            ],
        );
        let err = backend.fit(&request()).await.unwrap_err();
        match err {
            ClusteringError::Collaborator {
                stderr, exit_code, ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr.as_deref(), Some("no such algorithm"));
            }
            other => panic!("expected Collaborator error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_stdout_is_malformed_response() {
        let backend = SubprocessBackend::new(
            "sh",
            vec![
                "-c".to_string(),
                "cat > /dev/null; echo 'not json'".to_string(),
            ],
        );
        let err = backend.fit(&request()).await.unwrap_err();
        assert!(matches!(err, ClusteringError::MalformedResponse(_)));
    }

    #[test]
    fn command_line_splits_program_and_args() {
        let backend =
            SubprocessBackend::from_command_line("python3 -m ml.cluster --quiet").unwrap();
        assert_eq!(backend.program, "python3");
        assert_eq!(backend.args, vec!["-m", "ml.cluster", "--quiet"]);
    }
}
