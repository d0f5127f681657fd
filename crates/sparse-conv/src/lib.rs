//! Sparse 1×1 convolution kernels for pruned networks.
//!
//! A 1×1 convolution over an `N`-pixel feature map is a matrix product of the
//! `[M, K]` weight matrix with the `[K, N]` activation matrix. When the
//! weights are pruned, only their nonzeros are stored, channel by channel,
//! together with precomputed activation-pointer jumps, and the kernel walks
//! each channel's run against a tile of activation columns.
//!
//! # Pipelines
//!
//! | Pipeline | Weights/Input | Accumulator | Output |
//! |----------|---------------|-------------|--------|
//! | [`F32Pipeline`] | `f32` | `f32` | `f32` |
//! | [`Int8F32Pipeline`] | `i8` | `i32` | `f32` (dequantized) |
//! | [`Int8Pipeline`] | `i8` | `i32` | `i8` (requantized) |
//!
//! # Quick Start
//!
//! ```
//! use sparse_conv::{sparse_conv_fp32, Activation, SparseWeightMatrix};
//!
//! // 2 output channels, 4 input channels, 5 pixels
//! let dense = [1.0f32, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 3.0];
//! let weights = SparseWeightMatrix::from_dense(&dense, 2, 4, 5).unwrap();
//! let input = vec![1.0f32; 4 * 5];
//! let mut output = vec![0.0f32; 2 * 5];
//!
//! sparse_conv_fp32(&weights, &input, 5, Some(&[0.0, -1.0]), &mut output, &Activation::Identity);
//! assert_eq!(output, [3.0, 3.0, 3.0, 3.0, 3.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
//! ```
//!
//! # Performance
//!
//! Kernels for every tile width are compiled per instruction set and picked
//! once per process (see [`simd`]). With the default `parallel` feature,
//! output channels are distributed over the rayon thread pool; results are
//! bit-identical for every thread count, strategy and instruction set.

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod simd;
pub mod types;

pub use api::{sparse_conv, sparse_conv_fp32, sparse_conv_int8, sparse_conv_int8_fp32, SparseConv};
pub use config::{ConvConfig, Strategy, DEFAULT_PARALLEL_THRESHOLD};
pub use error::{Result, SparseConvError};
pub use format::{ChannelRun, RunCursor, SparseWeightMatrix};
pub use simd::{simd_level, SimdLevel};
pub use types::{
    Activation, ActivationKind, ChannelParams, F32Pipeline, HardSwishParams, Int8F32Pipeline,
    Int8Pipeline, Pipeline,
};
