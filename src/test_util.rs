//! Test-only helpers shared across `#[cfg(test)]` modules and `tests/`.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Generates `count` shards of `bytes` length each, deterministically from
/// `seed`.
pub fn generate_shards(count: usize, bytes: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut shard = vec![0u8; bytes];
            rng.fill_bytes(&mut shard);
            shard
        })
        .collect()
}

/// Hashes every shard's bytes, in order, and asserts the resulting SHA-256
/// digest matches `expected_hex`.
///
/// Useful for pinning a shard set's output to a known golden digest in a
/// regression test.
pub fn assert_hash(shards: &[Vec<u8>], expected_hex: &str) {
    let mut hasher = Sha256::new();
    for shard in shards {
        hasher.update(shard);
    }
    let got = hex::encode(hasher.finalize());
    assert_eq!(got, expected_hex, "shard set hash mismatch");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_shards_is_deterministic_for_a_fixed_seed() {
        let a = generate_shards(6, 16, 123);
        let b = generate_shards(6, 16, 123);
        assert_eq!(a, b);
    }

    #[test]
    fn generate_shards_differs_across_seeds() {
        let a = generate_shards(6, 16, 1);
        let b = generate_shards(6, 16, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn assert_hash_matches_freshly_computed_digest() {
        let shards = generate_shards(3, 4, 7);
        let mut hasher = Sha256::new();
        for shard in &shards {
            hasher.update(shard);
        }
        let hex_digest = hex::encode(hasher.finalize());
        assert_hash(&shards, &hex_digest);
    }
}
