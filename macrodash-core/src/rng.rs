//! Deterministic per-series RNG streams.
//!
//! Each fallback series draws from one or more named streams. A stream's seed
//! is the BLAKE3 hash of `(series key, stream name)`, so output depends only
//! on the key and never on ingestion order, thread count or previous calls.

use crate::series::SeriesKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// 32-byte seed for one named stream of a series.
pub fn stream_seed(key: &SeriesKey, stream: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(key.manifest_key().as_bytes());
    hasher.update(&[0]);
    hasher.update(stream.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Seeded generator for one named stream of a series.
pub fn stream_rng(key: &SeriesKey, stream: &str) -> StdRng {
    StdRng::from_seed(stream_seed(key, stream))
}

/// One draw from N(mean, std_dev).
pub fn normal(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + std_dev * z
}
