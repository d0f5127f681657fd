//! Tile-kernel selection.
//!
//! A [`KernelTable`] resolves one function pointer per ladder rung for the
//! chosen [`SimdLevel`] before any work starts, so the schedulers never
//! branch on the instruction set or the tile width inside their loops.

use super::detect::SimdLevel;
use super::kernels::portable_tile;
#[cfg(target_arch = "x86_64")]
use super::kernels::avx2_tile;
use crate::core::{KernelArgs, MAX_RUNGS};
use crate::types::Pipeline;

/// One `(channel, tile)` kernel for a fixed width.
pub(crate) type TileFn<P> =
    unsafe fn(&KernelArgs<'_, P>, usize, usize, &mut [<P as Pipeline>::Output]);

macro_rules! tile_for_width {
    ($kernel:ident, $pipeline:ty, $width:expr) => {
        match $width {
            64 => $kernel::<$pipeline, 64> as TileFn<$pipeline>,
            48 => $kernel::<$pipeline, 48> as TileFn<$pipeline>,
            32 => $kernel::<$pipeline, 32> as TileFn<$pipeline>,
            16 => $kernel::<$pipeline, 16> as TileFn<$pipeline>,
            8 => $kernel::<$pipeline, 8> as TileFn<$pipeline>,
            4 => $kernel::<$pipeline, 4> as TileFn<$pipeline>,
            2 => $kernel::<$pipeline, 2> as TileFn<$pipeline>,
            1 => $kernel::<$pipeline, 1> as TileFn<$pipeline>,
            other => unreachable!("no tile kernel for width {other}"),
        }
    };
}

/// Kernel for one tile width at one instruction-set level.
pub(crate) fn select_tile_kernel<P: Pipeline>(level: SimdLevel, width: usize) -> TileFn<P> {
    match level {
        #[cfg(target_arch = "x86_64")]
        SimdLevel::Avx2 => tile_for_width!(avx2_tile, P, width),
        _ => tile_for_width!(portable_tile, P, width),
    }
}

/// Kernels for every rung of a pipeline's ladder.
pub(crate) struct KernelTable<P: Pipeline> {
    kernels: [Option<TileFn<P>>; MAX_RUNGS],
    level: SimdLevel,
}

impl<P: Pipeline> KernelTable<P> {
    pub fn new(level: SimdLevel) -> Self {
        let mut kernels = [None; MAX_RUNGS];
        for (slot, &width) in kernels.iter_mut().zip(P::LADDER.rungs()) {
            *slot = Some(select_tile_kernel::<P>(level, width));
        }
        Self { kernels, level }
    }

    pub fn level(&self) -> SimdLevel {
        self.level
    }

    /// Kernel for ladder rung `rung`.
    #[inline]
    pub fn get(&self, rung: usize) -> TileFn<P> {
        match self.kernels[rung] {
            Some(kernel) => kernel,
            None => unreachable!("rung {rung} is outside the {} ladder", P::NAME),
        }
    }
}
