//! Reference packer: dense `[M, K]` weights → channel-major run-length streams.

use super::SparseWeightMatrix;
use crate::error::{Result, SparseConvError};

impl<W: Copy + Default + PartialEq> SparseWeightMatrix<W> {
    /// Pack a dense row-major `[M, K]` weight matrix, keeping every entry
    /// that is not `W::default()`.
    ///
    /// Jumps are element strides for an activation matrix with rows of
    /// `row_stride` elements. The last jump wraps back to the first nonzero.
    ///
    /// # Example
    ///
    /// ```
    /// use sparse_conv::SparseWeightMatrix;
    ///
    /// // 2×4 weights, activation rows of 5 columns.
    /// let dense = [1.0f32, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 3.0];
    /// let w = SparseWeightMatrix::from_dense(&dense, 2, 4, 5).unwrap();
    /// assert_eq!(w.values(), &[1.0, 2.0, 3.0]);
    /// assert_eq!(w.jumps(), &[10, 5, -15]);
    /// assert_eq!(w.channel_nnz_prefix(), &[2, 3]);
    /// ```
    pub fn from_dense(dense: &[W], m: usize, k: usize, row_stride: usize) -> Result<Self> {
        if dense.len() != m * k {
            return Err(SparseConvError::DenseShape {
                expected: m * k,
                got: dense.len(),
            });
        }

        let zero = W::default();
        let mut values = Vec::new();
        let mut offsets: Vec<isize> = Vec::new();
        let mut prefix = Vec::with_capacity(m);

        for row in dense.chunks(k.max(1)).take(m) {
            for (kk, &w) in row.iter().enumerate() {
                if w != zero {
                    values.push(w);
                    offsets.push((kk * row_stride) as isize);
                }
            }
            prefix.push(values.len());
        }
        // k == 0 yields no chunks.
        prefix.resize(m, values.len());

        let first_offset = offsets.first().copied().unwrap_or(0);
        let jumps = offsets
            .iter()
            .enumerate()
            .map(|(i, &here)| {
                let next = offsets.get(i + 1).copied().unwrap_or(first_offset);
                next - here
            })
            .collect();

        Self::new(
            m,
            k,
            row_stride,
            values,
            jumps,
            prefix,
            first_offset as usize,
        )
    }
}
