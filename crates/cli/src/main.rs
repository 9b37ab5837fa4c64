use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand, ValueEnum};
use redundancy_clustering::SubprocessBackend;
use redundancy_engine::{CancelFlag, Engine};
use redundancy_protocol::{
    Algorithm, HierarchicalLinkage, OutputFormat, RunConfig, RunOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;

mod input;
mod report;

use input::TestRunFile;

#[derive(Parser)]
#[command(name = "redundancy-finder")]
#[command(about = "Detect redundant tests from coverage and source similarity", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a test run and report redundancy findings
    Analyze {
        /// Test-run JSON file exported from the store
        input: PathBuf,

        /// Clustering collaborator command (JSON over stdin/stdout)
        #[arg(long)]
        clusterer: String,

        /// Clustering algorithm
        #[arg(long, value_enum)]
        algorithm: AlgorithmFlag,

        /// Report format
        #[arg(long, value_enum, default_value_t = FormatFlag::Json)]
        format: FormatFlag,

        /// Documented similarity intent in [0, 1]
        #[arg(long)]
        threshold: Option<f64>,

        /// Upper bound on clusters requested from the collaborator
        #[arg(long)]
        max_clusters: Option<usize>,

        /// Smallest cluster worth analyzing
        #[arg(long)]
        min_cluster_size: Option<usize>,

        /// Collaborator timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// DBSCAN neighborhood radius
        #[arg(long)]
        dbscan_eps: Option<f64>,

        /// DBSCAN minimum samples per core point
        #[arg(long)]
        dbscan_min_samples: Option<usize>,

        /// Hierarchical cluster count
        #[arg(long)]
        hierarchical_n_clusters: Option<usize>,

        /// Hierarchical linkage
        #[arg(long, value_enum)]
        linkage: Option<LinkageFlag>,

        /// Keep lines covered by nearly every test in the fingerprints
        #[arg(long)]
        keep_shared_coverage: bool,

        /// Disable IDF weighting of coverage fingerprints
        #[arg(long)]
        no_idf_weighting: bool,

        /// Ask the collaborator to reduce vector dimensionality
        #[arg(long)]
        reduce_dimensions: Option<usize>,
    },

    /// Print the store summary for a test-run file
    Inspect {
        /// Test-run JSON file exported from the store
        input: PathBuf,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum AlgorithmFlag {
    Kmeans,
    Dbscan,
    Hierarchical,
}

impl AlgorithmFlag {
    const fn as_domain(self) -> Algorithm {
        match self {
            AlgorithmFlag::Kmeans => Algorithm::Kmeans,
            AlgorithmFlag::Dbscan => Algorithm::Dbscan,
            AlgorithmFlag::Hierarchical => Algorithm::Hierarchical,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum FormatFlag {
    Markdown,
    Json,
    Yaml,
    Html,
}

impl FormatFlag {
    const fn as_domain(self) -> OutputFormat {
        match self {
            FormatFlag::Markdown => OutputFormat::Markdown,
            FormatFlag::Json => OutputFormat::Json,
            FormatFlag::Yaml => OutputFormat::Yaml,
            FormatFlag::Html => OutputFormat::Html,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum LinkageFlag {
    Ward,
    Complete,
    Average,
    Single,
}

impl LinkageFlag {
    const fn as_domain(self) -> HierarchicalLinkage {
        match self {
            LinkageFlag::Ward => HierarchicalLinkage::Ward,
            LinkageFlag::Complete => HierarchicalLinkage::Complete,
            LinkageFlag::Average => HierarchicalLinkage::Average,
            LinkageFlag::Single => HierarchicalLinkage::Single,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .target(env_logger::Target::Stderr)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Stderr)
            .init();
    }

    match cli.command {
        Commands::Analyze {
            input,
            clusterer,
            algorithm,
            format,
            threshold,
            max_clusters,
            min_cluster_size,
            timeout,
            dbscan_eps,
            dbscan_min_samples,
            hierarchical_n_clusters,
            linkage,
            keep_shared_coverage,
            no_idf_weighting,
            reduce_dimensions,
        } => {
            let mut config = RunConfig::new(algorithm.as_domain());
            config.output_format = format.as_domain();
            if let Some(threshold) = threshold {
                config.threshold = threshold;
            }
            if let Some(max_clusters) = max_clusters {
                config.max_clusters = max_clusters;
            }
            if let Some(min_cluster_size) = min_cluster_size {
                config.min_cluster_size = min_cluster_size;
            }
            if let Some(timeout) = timeout {
                config.timeout_secs = timeout;
            }
            config.dbscan_eps = dbscan_eps.or(config.dbscan_eps);
            if let Some(min_samples) = dbscan_min_samples {
                config.dbscan_min_samples = min_samples;
            }
            config.hierarchical_n_clusters =
                hierarchical_n_clusters.or(config.hierarchical_n_clusters);
            if let Some(linkage) = linkage {
                config.hierarchical_linkage = linkage.as_domain();
            }
            config.exclude_shared_coverage = !keep_shared_coverage;
            config.use_idf_weighting = !no_idf_weighting;
            if let Some(dimensions) = reduce_dimensions {
                config.use_dimensionality_reduction = true;
                config.reduced_dimensions = dimensions;
            }

            cmd_analyze(&input, &clusterer, config).await?;
        }

        Commands::Inspect { input } => {
            cmd_inspect(&input).await?;
        }
    }

    Ok(())
}

async fn cmd_analyze(input: &std::path::Path, clusterer: &str, config: RunConfig) -> Result<()> {
    let run_file = TestRunFile::load(input)
        .await
        .with_context(|| format!("failed to load test run from {}", input.display()))?;

    let backend = SubprocessBackend::from_command_line(clusterer)
        .context("--clusterer must name a command")?;
    let format = config.output_format;
    let engine = Engine::new(config, Arc::new(backend)).context("invalid configuration")?;

    log::info!(
        "analyzing run {} from {}",
        run_file.run_id.as_deref().unwrap_or("unnamed"),
        input.display()
    );

    let outcome = engine.run(&run_file, &CancelFlag::new()).await;
    println!("{}", report::render(&outcome, format)?);

    if matches!(outcome, RunOutcome::Failure(_)) {
        std::process::exit(1);
    }
    Ok(())
}

async fn cmd_inspect(input: &std::path::Path) -> Result<()> {
    let run_file = TestRunFile::load(input)
        .await
        .with_context(|| format!("failed to load test run from {}", input.display()))?;
    let summary = run_file.summarize();

    let output = serde_json::json!({
        "runId": run_file.run_id,
        "testCount": summary.test_count,
        "coverageLineCount": summary.coverage_line_count,
        "uniqueFiles": summary.unique_files,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
