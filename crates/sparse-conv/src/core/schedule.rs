//! Block scheduling and the parallel traversal strategies.
//!
//! ```text
//! mxn (tile-major)                      nxm (channel-major)
//! for slice in ladder(N):               parallel for i in 0..M:
//!     parallel for i in 0..M:               for slice in ladder(N):
//!         tile(i, slice)                        tile(i, slice)
//!     barrier                           barrier
//! ```
//!
//! Each work item reads shared inputs and writes only its own output row,
//! so no synchronization beyond the end-of-region barrier is needed.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::kernel::KernelArgs;
use crate::config::Strategy;
use crate::simd::KernelTable;
use crate::types::Pipeline;

/// Run `f(i, row_i)` for every `n`-element row of `output`.
///
/// Rows are disjoint, so they are handed to the worker pool as independent
/// mutable slices. Returns once every row is done.
fn for_each_row<T, F>(output: &mut [T], n: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        output
            .par_chunks_mut(n)
            .enumerate()
            .for_each(|(i, row)| f(i, row));
    }

    #[cfg(not(feature = "parallel"))]
    {
        output
            .chunks_mut(n)
            .enumerate()
            .for_each(|(i, row)| f(i, row));
    }
}

/// Tile-major: each ladder slice is one parallel region over all channels.
///
/// # Safety
/// `args` must satisfy the contract of `core::run_tile` for every slice of
/// `n`, and `output` must be `[M, N]`.
pub(crate) unsafe fn run_tile_major<P: Pipeline>(
    args: &KernelArgs<'_, P>,
    table: &KernelTable<P>,
    output: &mut [P::Output],
    n: usize,
) {
    for slice in P::LADDER.slices(n) {
        let kernel = table.get(slice.rung);
        log::trace!(
            "sparse-conv mxn region: width {} at column {}",
            slice.width,
            slice.col
        );
        for_each_row(output, n, |i, row| {
            let out = &mut row[slice.col..slice.col + slice.width];
            // SAFETY: forwarded from this function's contract.
            unsafe { kernel(args, i, slice.col, out) }
        });
    }
}

/// Channel-major: one parallel region; each channel walks the full ladder.
///
/// # Safety
/// Same contract as [`run_tile_major`].
pub(crate) unsafe fn run_channel_major<P: Pipeline>(
    args: &KernelArgs<'_, P>,
    table: &KernelTable<P>,
    output: &mut [P::Output],
    n: usize,
) {
    for_each_row(output, n, |i, row| {
        for slice in P::LADDER.slices(n) {
            let out = &mut row[slice.col..slice.col + slice.width];
            // SAFETY: forwarded from this function's contract.
            unsafe { table.get(slice.rung)(args, i, slice.col, out) }
        }
    });
}

/// Drive one convolution with an already-resolved strategy.
///
/// # Safety
/// Same contract as [`run_tile_major`]; `n` must be nonzero.
pub(crate) unsafe fn run<P: Pipeline>(
    args: &KernelArgs<'_, P>,
    table: &KernelTable<P>,
    output: &mut [P::Output],
    n: usize,
    strategy: Strategy,
) {
    match strategy {
        Strategy::TileMajor => run_tile_major(args, table, output, n),
        Strategy::ChannelMajor | Strategy::Auto => run_channel_major(args, table, output, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SparseWeightMatrix;
    use crate::simd::SimdLevel;
    use crate::types::{Activation, F32Pipeline};

    fn run_both(m: usize, k: usize, n: usize) -> (Vec<f32>, Vec<f32>) {
        let dense: Vec<f32> = (0..m * k)
            .map(|i| if i % 3 == 0 { (i % 7) as f32 - 3.0 } else { 0.0 })
            .collect();
        let weights = SparseWeightMatrix::from_dense(&dense, m, k, n).unwrap();
        let input: Vec<f32> = (0..k * n).map(|i| (i % 11) as f32 * 0.125).collect();
        let act = Activation::Identity;
        let args = KernelArgs::<F32Pipeline> {
            weights: &weights,
            input: &input,
            bias: None,
            scale: None,
            activation: &act,
        };
        let table = KernelTable::new(SimdLevel::Portable);
        let mut a = vec![f32::NAN; m * n];
        let mut b = vec![f32::NAN; m * n];
        unsafe {
            run(&args, &table, &mut a, n, Strategy::TileMajor);
            run(&args, &table, &mut b, n, Strategy::ChannelMajor);
        }
        (a, b)
    }

    #[test]
    fn test_strategies_write_every_element() {
        let (a, b) = run_both(5, 9, 101);
        assert!(a.iter().all(|v| v.is_finite()));
        assert!(b.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_strategies_bit_identical() {
        for n in [1, 15, 48, 77] {
            let (a, b) = run_both(4, 13, n);
            let a: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
            let b: Vec<u32> = b.iter().map(|v| v.to_bits()).collect();
            assert_eq!(a, b, "n={n}");
        }
    }
}
