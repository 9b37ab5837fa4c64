//! # Redundancy Engine
//!
//! The deterministic pipeline that turns a test run into redundancy
//! findings.
//!
//! ```text
//! TestRunReader
//!     │
//!     ├──> Coverage fingerprints ──┐   (parallel, diagnostics)
//!     ├──> Semantic vectors ───────┤
//!     │                            │
//!     └──> Feature assembly ──> Clustering dispatch ──> Cluster analysis
//!                                                            │
//!                                                       findings stream
//! ```
//!
//! A run is cancellable between stages; every abort path collapses into a
//! single [`RunFailure`](redundancy_protocol::RunFailure) carrying the
//! rendered errors.

mod assembler;
mod cancel;
mod error;
mod pipeline;
mod store;

pub use assembler::assemble_features;
pub use cancel::CancelFlag;
pub use error::EngineError;
pub use pipeline::Engine;
pub use store::{RunSummary, StoreError, TestRunReader};
