//! The public façade: builds the generator matrix once at construction and
//! exposes `encode_parity`, `is_parity_correct`, and `decode_missing`.

use crate::{coding_loop::CodingLoop, error::Error, matrix::Matrix};

/// A Reed-Solomon code over GF(2^8) with `k` data shards and `m` parity
/// shards.
///
/// Immutable after construction (`k`, `m`, the generator matrix, and the
/// cached parity rows never change), and therefore `Send + Sync` and freely
/// shareable across threads: concurrent calls on disjoint shard buffers are
/// safe.
#[derive(Clone, Debug)]
pub struct ReedSolomon {
    k: usize,
    m: usize,
    n: usize,
    generator_matrix: Matrix,
    parity_rows: Vec<Vec<u8>>,
    coding_loop: CodingLoop,
}

impl ReedSolomon {
    /// Builds a `(k, m)` instance using the default coding loop.
    ///
    /// Fails with [`Error::TooManyShards`] if `k == 0`, `m == 0`, or
    /// `k + m > 256`.
    pub fn new(k: usize, m: usize) -> Result<Self, Error> {
        Self::with_coding_loop(k, m, CodingLoop::default())
    }

    /// Builds a `(k, m)` instance using an explicit [`CodingLoop`] strategy.
    pub fn with_coding_loop(k: usize, m: usize, coding_loop: CodingLoop) -> Result<Self, Error> {
        if k == 0 || m == 0 || k + m > 256 {
            return Err(Error::TooManyShards { k, m });
        }
        let n = k + m;

        // V[r][c] = generator^(r*c); top k rows form an invertible square
        // (MDS property), so inverting V_top and multiplying back through V
        // yields a systematic generator matrix: G's top k rows are identity.
        let vandermonde = Matrix::vandermonde(n, k);
        let top = vandermonde.submatrix(0, 0, k, k)?;
        let top_inv = top.invert()?;
        let generator_matrix = vandermonde.multiply(&top_inv)?;

        let parity_rows = (k..n).map(|r| generator_matrix.row(r)).collect();

        Ok(Self {
            k,
            m,
            n,
            generator_matrix,
            parity_rows,
            coding_loop,
        })
    }

    /// Number of data shards (`k`).
    pub fn data_shard_count(&self) -> usize {
        self.k
    }

    /// Number of parity shards (`m`).
    pub fn parity_shard_count(&self) -> usize {
        self.m
    }

    /// Total shard count (`n = k + m`).
    pub fn total_shard_count(&self) -> usize {
        self.n
    }

    /// The `n x k` generator matrix `G`.
    pub fn generator_matrix(&self) -> &Matrix {
        &self.generator_matrix
    }

    /// The coding-loop strategy this instance was built with.
    pub fn coding_loop(&self) -> &CodingLoop {
        &self.coding_loop
    }

    fn validate_shards(
        &self,
        shards: &[Vec<u8>],
        offset: usize,
        byte_count: usize,
    ) -> Result<usize, Error> {
        if shards.len() != self.n {
            return Err(Error::ShapeMismatch {
                expected: "n shards",
                got: format!("{} shards (n = {})", shards.len(), self.n),
            });
        }

        let length = shards[0].len();
        for (i, s) in shards.iter().enumerate() {
            if s.len() != length {
                return Err(Error::ShapeMismatch {
                    expected: "equal shard lengths",
                    got: format!("shard 0 has length {}, shard {} has length {}", length, i, s.len()),
                });
            }
        }

        let end = offset.checked_add(byte_count).ok_or_else(|| Error::RangeError {
            reason: "offset + byte_count overflowed".to_string(),
        })?;
        if end > length {
            return Err(Error::RangeError {
                reason: format!(
                    "offset + byte_count ({}) exceeds shard length ({})",
                    end, length
                ),
            });
        }

        Ok(length)
    }

    /// Reads `shards[0..k]` and writes `shards[k..n]` in the byte range
    /// `[offset, offset+byte_count)`. Data shards are left unchanged
    /// (systematic code).
    pub fn encode_parity(
        &self,
        shards: &mut [Vec<u8>],
        offset: usize,
        byte_count: usize,
    ) -> Result<(), Error> {
        self.validate_shards(shards, offset, byte_count)?;

        let (data, parity) = shards.split_at_mut(self.k);
        let inputs: Vec<&[u8]> = data.iter().map(|s| s.as_slice()).collect();
        let mut outputs: Vec<&mut [u8]> = parity.iter_mut().map(|s| s.as_mut_slice()).collect();
        let row_refs: Vec<&[u8]> = self.parity_rows.iter().map(|r| r.as_slice()).collect();

        self.coding_loop
            .code_some_shards(&row_refs, &inputs, &mut outputs, offset, byte_count);
        Ok(())
    }

    /// Returns whether `shards[k..n]` matches the parity `shards[0..k]`
    /// would produce. Never mutates any shard.
    ///
    /// `temp`, if given, must be at least `offset + byte_count` bytes long.
    pub fn is_parity_correct(
        &self,
        shards: &[Vec<u8>],
        offset: usize,
        byte_count: usize,
        temp: Option<&mut [u8]>,
    ) -> Result<bool, Error> {
        self.validate_shards(shards, offset, byte_count)?;

        if let Some(t) = &temp {
            let end = offset + byte_count;
            if t.len() < end {
                return Err(Error::RangeError {
                    reason: format!(
                        "temp buffer length {} is less than offset + byte_count ({})",
                        t.len(),
                        end
                    ),
                });
            }
        }

        let (data, parity) = shards.split_at(self.k);
        let inputs: Vec<&[u8]> = data.iter().map(|s| s.as_slice()).collect();
        let to_check: Vec<&[u8]> = parity.iter().map(|s| s.as_slice()).collect();
        let row_refs: Vec<&[u8]> = self.parity_rows.iter().map(|r| r.as_slice()).collect();

        Ok(self
            .coding_loop
            .check_some_shards(&row_refs, &inputs, &to_check, offset, byte_count, temp))
    }

    /// Reconstructs every shard whose `present[i]` is `false`, in place.
    /// Missing shard buffers must already be allocated with the same length
    /// as the survivors; their contents are overwritten.
    ///
    /// Fails with [`Error::NotEnoughShards`] if fewer than `k` shards are
    /// marked present. A no-op if all shards are present.
    pub fn decode_missing(
        &self,
        shards: &mut [Vec<u8>],
        present: &[bool],
        offset: usize,
        byte_count: usize,
    ) -> Result<(), Error> {
        self.validate_shards(shards, offset, byte_count)?;

        if present.len() != self.n {
            return Err(Error::ShapeMismatch {
                expected: "n-length present array",
                got: format!("{} entries (n = {})", present.len(), self.n),
            });
        }

        let present_count = present.iter().filter(|&&p| p).count();
        if present_count < self.k {
            return Err(Error::NotEnoughShards {
                k: self.k,
                present: present_count,
            });
        }
        if present_count == self.n {
            return Ok(());
        }

        // First k present shard indices, in order; their generator-matrix
        // rows form the invertible k x k system S, D = S^-1.
        let chosen: Vec<usize> = present
            .iter()
            .enumerate()
            .filter(|(_, &p)| p)
            .map(|(i, _)| i)
            .take(self.k)
            .collect();

        let mut sub = Matrix::zero(self.k, self.k);
        for (row_idx, &shard_idx) in chosen.iter().enumerate() {
            let row = self.generator_matrix.row_slice(shard_idx);
            for c in 0..self.k {
                sub.set(row_idx, c, row[c]);
            }
        }
        let inverted = sub.invert()?;

        let missing_data: Vec<usize> = (0..self.k).filter(|&i| !present[i]).collect();
        let missing_parity: Vec<usize> = (self.k..self.n).filter(|&i| !present[i]).collect();

        if !missing_data.is_empty() {
            let recon_rows: Vec<Vec<u8>> = missing_data.iter().map(|&i| inverted.row(i)).collect();
            let row_refs: Vec<&[u8]> = recon_rows.iter().map(|r| r.as_slice()).collect();

            let sub_inputs: Vec<Vec<u8>> = chosen.iter().map(|&idx| shards[idx].clone()).collect();
            let input_refs: Vec<&[u8]> = sub_inputs.iter().map(|v| v.as_slice()).collect();

            let mut outputs = gather_mut(shards, &missing_data);
            self.coding_loop
                .code_some_shards(&row_refs, &input_refs, &mut outputs, offset, byte_count);
        }

        if !missing_parity.is_empty() {
            let row_refs: Vec<&[u8]> = missing_parity
                .iter()
                .map(|&i| self.parity_rows[i - self.k].as_slice())
                .collect();

            let data_inputs: Vec<Vec<u8>> = (0..self.k).map(|idx| shards[idx].clone()).collect();
            let input_refs: Vec<&[u8]> = data_inputs.iter().map(|v| v.as_slice()).collect();

            let mut outputs = gather_mut(shards, &missing_parity);
            self.coding_loop
                .code_some_shards(&row_refs, &input_refs, &mut outputs, offset, byte_count);
        }

        Ok(())
    }
}

/// Returns mutable references to `shards[indices[0]], shards[indices[1]],
/// ...`, in order. `indices` must be sorted ascending with no duplicates.
fn gather_mut<'a>(shards: &'a mut [Vec<u8>], indices: &[usize]) -> Vec<&'a mut [u8]> {
    let mut result = Vec::with_capacity(indices.len());
    let mut remaining: &mut [Vec<u8>] = shards;
    let mut base = 0;
    for &idx in indices {
        let split_at = idx - base;
        let (_, rest) = remaining.split_at_mut(split_at);
        let (first, rest2) = rest.split_at_mut(1);
        result.push(first[0].as_mut_slice());
        remaining = rest2;
        base = idx + 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding_loop::{LoopOrder, MultiplyStrategy};
    use crate::test_util::generate_shards;
    use fixedbitset::FixedBitSet;

    #[test]
    fn construction_rejects_zero_or_oversized_shapes() {
        assert_eq!(
            ReedSolomon::new(0, 1).unwrap_err(),
            Error::TooManyShards { k: 0, m: 1 }
        );
        assert_eq!(
            ReedSolomon::new(1, 0).unwrap_err(),
            Error::TooManyShards { k: 1, m: 0 }
        );
        assert_eq!(
            ReedSolomon::new(200, 100).unwrap_err(),
            Error::TooManyShards { k: 200, m: 100 }
        );
    }

    #[test]
    fn generator_matrix_top_k_rows_are_identity() {
        let rs = ReedSolomon::new(4, 3).unwrap();
        let g = rs.generator_matrix();
        assert_eq!(g.rows(), 7);
        assert_eq!(g.cols(), 4);
        for r in 0..4 {
            for c in 0..4 {
                let expected = if r == c { 1 } else { 0 };
                assert_eq!(g.get(r, c), expected, "identity mismatch at ({}, {})", r, c);
            }
        }
    }

    #[test]
    fn coding_loop_accessor_reflects_the_strategy_built_with() {
        let strategy = CodingLoop::new(LoopOrder::BYTE_OUTPUT_INPUT, MultiplyStrategy::Exp);
        let rs = ReedSolomon::with_coding_loop(4, 2, strategy).unwrap();
        assert_eq!(rs.coding_loop().order(), LoopOrder::BYTE_OUTPUT_INPUT);
        assert_eq!(rs.coding_loop().multiply_strategy(), MultiplyStrategy::Exp);
    }

    #[test]
    fn scenario_worked_example_k4_m2() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards: Vec<Vec<u8>> = vec![
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7],
            vec![8, 9, 10, 11],
            vec![12, 13, 14, 15],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ];

        let original_data = shards[0..4].to_vec();
        rs.encode_parity(&mut shards, 0, 4).unwrap();

        assert_eq!(shards[0..4], original_data[..]);
        assert!(rs.is_parity_correct(&shards, 0, 4, None).unwrap());

        let original = shards.clone();

        let mut present = vec![true; 6];
        present[0] = false;
        present[4] = false;
        shards[0] = vec![0; 4];
        shards[4] = vec![0; 4];

        rs.decode_missing(&mut shards, &present, 0, 4).unwrap();
        assert_eq!(shards, original);
    }

    #[test]
    fn scenario_every_two_shard_drop_reconstructs_k4_m2() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 42);
        rs.encode_parity(&mut shards, 0, 4).unwrap();
        let original = shards.clone();

        for a in 0..6 {
            for b in (a + 1)..6 {
                let mut working = original.clone();
                let mut present = vec![true; 6];
                present[a] = false;
                present[b] = false;
                working[a] = vec![0; 4];
                working[b] = vec![0; 4];

                rs.decode_missing(&mut working, &present, 0, 4).unwrap();
                assert_eq!(working, original, "dropping shards {} and {} failed", a, b);
            }
        }
    }

    #[test]
    fn scenario_corrupted_byte_fails_parity_check() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 8, 7);
        rs.encode_parity(&mut shards, 0, 8).unwrap();
        assert!(rs.is_parity_correct(&shards, 0, 8, None).unwrap());

        shards[2][5] ^= 1;
        assert!(!rs.is_parity_correct(&shards, 0, 8, None).unwrap());
    }

    #[test]
    fn scenario_255_1_single_byte_shards() {
        let rs = ReedSolomon::new(255, 1).unwrap();
        let mut shards = generate_shards(256, 1, 99);
        rs.encode_parity(&mut shards, 0, 1).unwrap();
        let original = shards.clone();

        // Drop the single parity shard.
        let mut working = original.clone();
        let mut present = vec![true; 256];
        present[255] = false;
        working[255] = vec![0];
        rs.decode_missing(&mut working, &present, 0, 1).unwrap();
        assert_eq!(working, original);

        // Drop a single data shard.
        let mut working = original.clone();
        let mut present = vec![true; 256];
        present[0] = false;
        working[0] = vec![0];
        rs.decode_missing(&mut working, &present, 0, 1).unwrap();
        assert_eq!(working, original);
    }

    #[test]
    fn not_enough_shards_is_rejected() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 1);
        let mut present = vec![true; 6];
        present[0] = false;
        present[1] = false;
        present[2] = false;
        shards[0] = vec![0; 4];
        shards[1] = vec![0; 4];
        shards[2] = vec![0; 4];

        assert_eq!(
            rs.decode_missing(&mut shards, &present, 0, 4).unwrap_err(),
            Error::NotEnoughShards { k: 4, present: 3 }
        );
    }

    #[test]
    fn encode_parity_rejects_wrong_shard_count() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(5, 4, 1);
        assert!(matches!(
            rs.encode_parity(&mut shards, 0, 4).unwrap_err(),
            Error::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn encode_parity_rejects_unequal_shard_lengths() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 1);
        shards[3] = vec![0; 3];
        assert!(matches!(
            rs.encode_parity(&mut shards, 0, 4).unwrap_err(),
            Error::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn encode_parity_rejects_out_of_range_byte_count() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 1);
        assert!(matches!(
            rs.encode_parity(&mut shards, 1, 4).unwrap_err(),
            Error::RangeError { .. }
        ));
    }

    #[test]
    fn encode_parity_rejects_offset_plus_byte_count_overflow() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 1);
        assert!(matches!(
            rs.encode_parity(&mut shards, usize::MAX, 1).unwrap_err(),
            Error::RangeError { .. }
        ));
    }

    #[test]
    fn is_parity_correct_rejects_too_short_temp_buffer() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 8, 1);
        rs.encode_parity(&mut shards, 0, 8).unwrap();

        let mut temp = vec![0u8; 4];
        assert!(matches!(
            rs.is_parity_correct(&shards, 0, 8, Some(&mut temp)).unwrap_err(),
            Error::RangeError { .. }
        ));
    }

    #[test]
    fn decode_missing_rejects_wrong_present_array_length() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 1);
        rs.encode_parity(&mut shards, 0, 4).unwrap();

        let present = vec![true; 5];
        assert!(matches!(
            rs.decode_missing(&mut shards, &present, 0, 4).unwrap_err(),
            Error::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn idempotent_encode() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 5);
        rs.encode_parity(&mut shards, 0, 4).unwrap();
        let first = shards.clone();
        rs.encode_parity(&mut shards, 0, 4).unwrap();
        assert_eq!(shards, first);
    }

    #[test]
    fn decode_missing_is_noop_when_all_present() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 3);
        rs.encode_parity(&mut shards, 0, 4).unwrap();
        let before = shards.clone();
        let present = vec![true; 6];
        rs.decode_missing(&mut shards, &present, 0, 4).unwrap();
        assert_eq!(shards, before);
    }

    #[test]
    fn present_bitset_bookkeeping_matches_bool_vec() {
        let rs = ReedSolomon::new(4, 2).unwrap();
        let mut shards = generate_shards(6, 4, 11);
        rs.encode_parity(&mut shards, 0, 4).unwrap();
        let original = shards.clone();

        let mut bitset = FixedBitSet::with_capacity(6);
        for i in 0..6 {
            bitset.insert(i);
        }
        bitset.set(1, false);
        bitset.set(5, false);
        shards[1] = vec![0; 4];
        shards[5] = vec![0; 4];

        let present: Vec<bool> = (0..6).map(|i| bitset.contains(i)).collect();
        rs.decode_missing(&mut shards, &present, 0, 4).unwrap();
        assert_eq!(shards, original);
    }
}
