use std::fmt::Debug;

use crate::core::TileLadder;

/// Per-channel epilogue inputs.
///
/// `bias` defaults to `0.0` and `scale` to `1.0`; the fp32 pipeline never
/// reads `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelParams {
    pub bias: f32,
    pub scale: f32,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            bias: 0.0,
            scale: 1.0,
        }
    }
}

/// A numeric pipeline: the element types flowing through the kernel and the
/// scalar operations the microkernel and epilogue are built from.
///
/// The microkernel and epilogue are written once against this trait; each
/// implementation is a zero-sized marker type.
pub trait Pipeline: Copy + Send + Sync + 'static {
    /// Element type of the compressed weight values.
    type Weight: Copy + Default + PartialEq + Debug + Send + Sync;

    /// Element type of the dense activation matrix.
    type Input: Copy + Default + Debug + Send + Sync;

    /// Accumulator lane type.
    type Acc: Copy + Debug + Send + Sync;

    /// Element type written to the output matrix.
    type Output: Copy + Default + PartialEq + Debug + Send + Sync;

    /// Short name used in log lines and bench ids.
    const NAME: &'static str;

    /// Tile widths peeled by the block scheduler, widest first.
    const LADDER: TileLadder;

    /// Whether the pipeline needs a per-channel dequantization scale.
    const NEEDS_SCALE: bool;

    /// Initial accumulator value for a channel.
    fn init_acc(params: ChannelParams) -> Self::Acc;

    /// One multiply-accumulate step of a single lane.
    fn mac(acc: Self::Acc, weight: Self::Weight, input: Self::Input) -> Self::Acc;

    /// Convert a finished accumulator to the float domain the activation runs in.
    fn dequantize(acc: Self::Acc, params: ChannelParams) -> f32;

    /// Narrow an activated float to the output element type.
    fn store(value: f32) -> Self::Output;
}
