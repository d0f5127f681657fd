//! SIMD-specialized microkernels for the sparse 1×1 convolution.
//!
//! The microkernel is written once, generic over the numeric pipeline and
//! the tile width. This module compiles it for each supported instruction
//! set and picks one at runtime.
//!
//! # Supported Architectures
//!
//! | Architecture | Level | Register Width | Notes |
//! |--------------|-------|----------------|-------|
//! | x86_64 | AVX2 | 256-bit | `#[target_feature(enable = "avx2")]` instantiation |
//! | aarch64 | NEON | 128-bit | baseline on aarch64, shares the portable code |
//! | Any | Portable | baseline | always available |
//!
//! # Runtime Dispatch
//!
//! 1. [`simd_level()`] detects CPU features once per process
//! 2. `KernelTable` resolves one kernel per tile-ladder rung for that level
//! 3. The schedulers call through the table, one call per `(channel, tile)`
//!
//! # Microkernel Design
//!
//! For the fp32 pipeline and a 16-wide tile:
//!
//! ```text
//! acc[0..16] = bias
//! for (value, jump) in run:
//!     acc[0..16] += broadcast(value) * x[0..16]   // two ymm registers on AVX2
//!     x += jump
//! ```
//!
//! Multiply and add are kept separate (no FMA contraction), so every level
//! produces bit-identical output.

mod detect;
pub(crate) mod dispatch;
mod kernels;

pub use detect::{simd_level, SimdLevel};
pub(crate) use dispatch::KernelTable;
