//! # Redundancy Fingerprint
//!
//! Coverage fingerprints: a length-256 MinHash sketch of each test's covered
//! `(file, line)` set, with optional shared-line exclusion and IDF weighting
//! so rare, distinctive lines dominate the sketch.
//!
//! ```text
//! coverage keys per test
//!     │
//!     ├──> document frequency ──> shared-line exclusion ──> IDF weights
//!     │
//!     └──> seeded position hashes ──> per-position min ──> [0,1]^256
//! ```
//!
//! Fingerprints are diagnostic artifacts: downstream similarity uses the
//! semantic vectors, never fingerprint cosine.

mod builder;
mod cache;
mod seeds;

pub use builder::{FingerprintBuilder, FingerprintOptions};

/// Number of positions in every fingerprint. Compile-time constant of the
/// engine; all sketches in a run share the same 256 hash seeds.
pub const FINGERPRINT_SIZE: usize = 256;

/// Near-equality tolerance used by [`signature_similarity`].
const POSITION_TOLERANCE: f64 = 1e-4;

/// Estimated Jaccard similarity between two signatures: the fraction of
/// positions whose values agree within `1e-4`.
///
/// Panics on dimension mismatch; callers constructing signatures by any
/// route other than [`FingerprintBuilder`] have a programmer error.
pub fn signature_similarity(a: &[f64], b: &[f64]) -> f64 {
    assert_eq!(
        a.len(),
        b.len(),
        "fingerprint dimension mismatch: have {}, want {}",
        b.len(),
        a.len(),
    );
    if a.is_empty() {
        return 0.0;
    }
    let matching = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| (*x - *y).abs() < POSITION_TOLERANCE)
        .count();
    matching as f64 / a.len() as f64
}
