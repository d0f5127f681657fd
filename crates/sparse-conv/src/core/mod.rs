//! Core sparse 1×1 convolution algorithm.
//!
//! The engine computes `C = epilogue(A · B)` where `A` is a pruned `[M, K]`
//! weight matrix in channel-major run-length form, `B` is a dense `[K, N]`
//! activation matrix and `C` is the dense `[M, N]` output.
//!
//! # Algorithm Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Strategy (mxn or nxm): parallel over output channels i in 0..M  │
//! │   Tile ladder: peel widths W from {48,32,...,1} / {64,48,...,1} │
//! │     Microkernel: acc[0..W] = Σ_run value · B[row(value), j..j+W] │
//! │     Epilogue: dequantize → activation → requantize → store      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Tile Ladder
//!
//! [`TileLadder`] fixes the tile widths per pipeline. A fixed width lets the
//! microkernel keep a whole tile of accumulators in registers without bounds
//! checks; covering any `N` takes `O(log N)` residual passes.
//!
//! # Microkernel
//!
//! The microkernel walks one channel's run of `(value, jump)` pairs,
//! broadcasting each value against `W` consecutive activation columns and
//! then advancing the activation pointer by the jump. No index arithmetic
//! happens in the loop.
//!
//! # Strategies
//!
//! - **mxn** (tile-major): for each ladder slice, one parallel region over
//!   channels. Chosen when `M * N` exceeds the cache-fit threshold.
//! - **nxm** (channel-major): one parallel region over channels; each
//!   channel walks the whole ladder, keeping its run hot in cache.
//!
//! # Module Contents
//!
//! - [`kernel`](kernel): width-generic accumulation
//! - [`epilogue`](epilogue): bias/scale, activation and int8 requantization
//! - [`tiling`](tiling): the tile-width ladder
//! - [`schedule`](schedule): mxn and nxm traversal
//! - [`reference`](reference): dense golden reference

mod epilogue;
mod kernel;
mod reference;
mod schedule;
mod tiling;

pub use epilogue::{requantize_i8, INT8_LOWER_BOUND};
pub use reference::dense_conv1x1;
pub use tiling::{TileLadder, TileSlice, TileSlices, FP32_LADDER, INT8_LADDER};

pub(crate) use kernel::{run_tile, KernelArgs};
pub(crate) use schedule::run;
pub(crate) use tiling::MAX_RUNGS;
