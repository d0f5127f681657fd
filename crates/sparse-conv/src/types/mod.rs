//! Numeric pipelines and epilogue value types.
//!
//! The sparse kernel is written once against the [`Pipeline`] trait. Each
//! pipeline fixes the weight, activation, accumulator and output element
//! types together with the scalar operations that combine them:
//!
//! | Pipeline | Weight × Input | Accumulator | Output | Tile ladder |
//! |----------|----------------|-------------|--------|-------------|
//! | [`F32Pipeline`] | f32 × f32 | f32 (seeded with bias) | f32 | 48, 32, 16, 8, 4, 2, 1 |
//! | [`Int8F32Pipeline`] | i8 × i8 | i32 | f32 | 64, 48, 32, 16, 8, 4, 1 |
//! | [`Int8Pipeline`] | i8 × i8 | i32 | i8 | 64, 48, 32, 16, 8, 4, 1 |
//!
//! For the int8 pipelines the accumulator is converted to float once per
//! tile as `bias + acc * scale[channel]`, then activated, then (for
//! [`Int8Pipeline`]) requantized.
//!
//! # Example
//!
//! ```rust
//! use sparse_conv::types::{Activation, ChannelParams, Int8Pipeline, Pipeline};
//!
//! let params = ChannelParams { bias: 0.5, scale: 0.25 };
//! let acc = Int8Pipeline::mac(Int8Pipeline::init_acc(params), 4, 5);
//! let mut lanes = [Int8Pipeline::dequantize(acc, params)];
//! Activation::Relu.apply(&mut lanes);
//! assert_eq!(Int8Pipeline::store(lanes[0]), 6);
//! ```

mod activation;
mod fp32;
mod int8;
mod traits;

pub use activation::{Activation, ActivationKind, HardSwishParams};
pub use fp32::F32Pipeline;
pub use int8::{Int8F32Pipeline, Int8Pipeline};
pub use traits::{ChannelParams, Pipeline};
