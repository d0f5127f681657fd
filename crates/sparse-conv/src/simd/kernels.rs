//! Per-ISA instantiations of the generic tile kernel.
//!
//! Each entry point is the same `run_tile` body compiled under different
//! target features; the fixed-width accumulator loops vectorize to the
//! register width of the enabled instruction set.

use crate::core::{run_tile, KernelArgs};
use crate::types::Pipeline;

/// Tile kernel compiled for the baseline target.
///
/// # Safety
/// See [`run_tile`].
pub(crate) unsafe fn portable_tile<P: Pipeline, const W: usize>(
    args: &KernelArgs<'_, P>,
    channel: usize,
    col: usize,
    out: &mut [P::Output],
) {
    run_tile::<P, W>(args, channel, col, out)
}

/// Tile kernel compiled with AVX2 enabled.
///
/// # Safety
/// See [`run_tile`]; additionally the CPU must support AVX2.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn avx2_tile<P: Pipeline, const W: usize>(
    args: &KernelArgs<'_, P>,
    channel: usize,
    col: usize,
    out: &mut [P::Output],
) {
    run_tile::<P, W>(args, channel, col, out)
}
