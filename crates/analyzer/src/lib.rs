//! # Redundancy Analyzer
//!
//! Per-cluster analysis: pairwise semantic similarity, representative
//! selection, coverage-preserving redundancy candidates, scoring, priority
//! classification, and recommendation composition.
//!
//! Clusters never read each other's data, so the per-cluster work fans out
//! across a rayon pool and is re-ordered deterministically afterwards.

mod cluster;
mod recommend;
mod similarity;

pub use cluster::{analyze_cluster, analyze_partition};
pub use recommend::compose_recommendation;
pub use similarity::{cosine, SimilarityMatrix};
