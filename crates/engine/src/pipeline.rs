use crate::assembler::assemble_features;
use crate::cancel::CancelFlag;
use crate::error::EngineError;
use crate::store::TestRunReader;
use redundancy_analyzer::{analyze_partition, compose_recommendation};
use redundancy_clustering::{ClusteringBackend, Dispatcher};
use redundancy_fingerprint::{FingerprintBuilder, FingerprintOptions};
use redundancy_protocol::{
    ClusterPartition, ConfigError, RedundancyFinding, RunConfig, RunFailure, RunMetrics,
    RunOutcome, RunSuccess, TestFeature, TestRecord,
};
use redundancy_semantic::SemanticVectorizer;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One engine per configuration. Every call to [`Engine::run`] processes a
/// single test run and owns all of its intermediate artifacts.
pub struct Engine {
    config: RunConfig,
    backend: Arc<dyn ClusteringBackend>,
}

impl Engine {
    /// Validates the configuration up front; an invalid configuration never
    /// starts work.
    pub fn new(
        config: RunConfig,
        backend: Arc<dyn ClusteringBackend>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    /// Runs the full pipeline. All aborts collapse into a `RunFailure`.
    pub async fn run(&self, reader: &dyn TestRunReader, cancel: &CancelFlag) -> RunOutcome {
        let started = Instant::now();
        match self.run_inner(reader, cancel).await {
            Ok((findings, partition)) => {
                let metrics = RunMetrics::compute(
                    partition.len(),
                    partition.cluster_count(),
                    &findings,
                );
                RunOutcome::Success(RunSuccess {
                    findings,
                    partition,
                    metrics,
                    execution_time_sec: started.elapsed().as_secs_f64(),
                })
            }
            Err(err) => {
                log::error!("run aborted: {err}");
                RunOutcome::Failure(RunFailure {
                    errors: vec![err.to_string()],
                    execution_time_sec: started.elapsed().as_secs_f64(),
                })
            }
        }
    }

    async fn run_inner(
        &self,
        reader: &dyn TestRunReader,
        cancel: &CancelFlag,
    ) -> Result<(Vec<RedundancyFinding>, ClusterPartition), EngineError> {
        let summary = reader.summary().await?;
        log::info!(
            "run: {} tests, {} coverage lines, {} files",
            summary.test_count,
            summary.coverage_line_count,
            summary.unique_files
        );

        let records = Arc::new(reader.tests().await?);
        if records.is_empty() {
            log::info!("empty test run, nothing to analyze");
            return Ok((Vec::new(), ClusterPartition::empty()));
        }
        check_cancel(cancel)?;

        let features = self.build_features(Arc::clone(&records), cancel).await?;
        check_cancel(cancel)?;

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.backend),
            Duration::from_secs(self.config.timeout_secs),
        );
        let outcome = dispatcher.dispatch(&features, &self.config).await?;
        check_cancel(cancel)?;

        let findings = analyze(outcome.partition.clone(), features).await;
        Ok((findings, outcome.partition))
    }

    /// C1 and C2 on parallel blocking workers; C3 binds the results.
    async fn build_features(
        &self,
        records: Arc<Vec<TestRecord>>,
        cancel: &CancelFlag,
    ) -> Result<Vec<TestFeature>, EngineError> {
        let fingerprint_options = FingerprintOptions {
            exclude_shared_coverage: self.config.exclude_shared_coverage,
            use_idf_weighting: self.config.use_idf_weighting,
        };

        let fingerprint_records = Arc::clone(&records);
        let fingerprint_task = tokio::task::spawn_blocking(move || {
            let mut builder = FingerprintBuilder::new();
            builder.build(&fingerprint_records, fingerprint_options)
        });

        let semantic_records = Arc::clone(&records);
        let semantic_task = tokio::task::spawn_blocking(move || {
            SemanticVectorizer::fit_transform(&semantic_records)
        });

        let (fingerprints, semantic) = tokio::join!(fingerprint_task, semantic_task);
        let fingerprints = fingerprints.expect("fingerprint stage panicked");
        let (_, vectors) = semantic.expect("semantic stage panicked")?;

        // Fingerprints are per-run diagnostics; nothing downstream consumes
        // them beyond this density summary.
        let nonzero = fingerprints
            .values()
            .filter(|sig| sig.iter().any(|&v| v > 0.0))
            .count();
        log::debug!(
            "fingerprints: {nonzero}/{} with distinctive coverage",
            fingerprints.len()
        );
        check_cancel(cancel)?;

        Ok(assemble_features(&records, &vectors))
    }
}

/// C5 and C6 on a blocking worker: per-cluster analysis fans out internally.
async fn analyze(
    partition: ClusterPartition,
    features: Vec<TestFeature>,
) -> Vec<RedundancyFinding> {
    tokio::task::spawn_blocking(move || {
        let by_id: HashMap<String, TestFeature> = features
            .into_iter()
            .map(|feature| (feature.test_id.clone(), feature))
            .collect();
        let mut findings = analyze_partition(&partition, &by_id);
        for finding in &mut findings {
            compose_recommendation(finding, &by_id);
        }
        findings
    })
    .await
    .expect("analysis stage panicked")
}

fn check_cancel(cancel: &CancelFlag) -> Result<(), EngineError> {
    if cancel.is_cancelled() {
        Err(EngineError::Cancelled)
    } else {
        Ok(())
    }
}
