use crate::FINGERPRINT_SIZE;
use xxhash_rust::xxh3::xxh3_64_with_seed;

const SEED_A: u64 = 0xC0FF_EE00_5EED_0001;
const SEED_B: u64 = 0xC0FF_EE00_5EED_0002;
const SEED_C: u64 = 0xC0FF_EE00_5EED_0003;

/// Multipliers and mask for one signature position. The same 256 triples are
/// reused across every test in a run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SeedTriple {
    pub a: u64,
    pub b: u64,
    pub c: u64,
}

/// Derives the position seeds deterministically from the position index.
/// Multipliers are forced odd so they never collapse a base hash to zero.
pub(crate) fn seed_triples() -> Vec<SeedTriple> {
    (0..FINGERPRINT_SIZE as u64)
        .map(|i| {
            let index = i.to_le_bytes();
            SeedTriple {
                a: xxh3_64_with_seed(&index, SEED_A) | 1,
                b: xxh3_64_with_seed(&index, SEED_B) | 1,
                c: xxh3_64_with_seed(&index, SEED_C),
            }
        })
        .collect()
}
