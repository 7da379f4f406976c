#![doc = include_str!(concat!(env!("OUT_DIR"), "/README-rustdocified.md"))]
#![deny(missing_docs)]

pub use crate::{coding_loop::CodingLoop, error::Error, reed_solomon::ReedSolomon};

pub mod algorithm {
    #![doc = include_str!("algorithm.md")]
}
pub mod coding_loop;
pub mod error;
pub mod galois;
pub mod matrix;
mod reed_solomon;

#[cfg(test)]
mod test_util;

/// Builds a `(k, m)` [`ReedSolomon`] instance and runs one `encode_parity`
/// call.
///
/// Convenience wrapper for call sites that don't want to hold a long-lived
/// instance across many operations; equivalent to
/// `ReedSolomon::new(k, m)?.encode_parity(shards, offset, byte_count)`.
pub fn encode_parity(
    k: usize,
    m: usize,
    shards: &mut [Vec<u8>],
    offset: usize,
    byte_count: usize,
) -> Result<(), Error> {
    ReedSolomon::new(k, m)?.encode_parity(shards, offset, byte_count)
}

/// Builds a `(k, m)` [`ReedSolomon`] instance and runs one `decode_missing`
/// call.
///
/// Convenience wrapper; equivalent to
/// `ReedSolomon::new(k, m)?.decode_missing(shards, present, offset, byte_count)`.
pub fn decode_missing(
    k: usize,
    m: usize,
    shards: &mut [Vec<u8>],
    present: &[bool],
    offset: usize,
    byte_count: usize,
) -> Result<(), Error> {
    ReedSolomon::new(k, m)?.decode_missing(shards, present, offset, byte_count)
}
