//! # Redundancy Semantic
//!
//! Semantic TF-IDF vectors for test source code.
//!
//! Each test contributes a normalized token bag (method body tokens filtered
//! down to keywords, call sites, assertions, class references, meaningful
//! variables, and numeric markers). The corpus defines a shared vocabulary;
//! every test becomes a length-384 L2-normalized vector whose positions are
//! comparable across the run.

mod error;
mod tokenizer;
mod vectorizer;

pub use error::VectorizationError;
pub use tokenizer::tokenize_document;
pub use vectorizer::{resolve_source, SemanticVectorizer};

/// Length of every semantic vector. Compile-time constant of the engine.
pub const SEMANTIC_SIZE: usize = 384;

/// Vocabulary cap: the corpus keeps at most this many distinct terms.
pub const MAX_VOCABULARY: usize = 768;
