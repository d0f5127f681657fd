use super::traits::{ChannelParams, Pipeline};
use crate::core::{TileLadder, FP32_LADDER};

/// fp32 weights × fp32 activations → fp32 output.
///
/// The bias seeds the accumulators, so the dequantize step is the identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct F32Pipeline;

impl Pipeline for F32Pipeline {
    type Weight = f32;
    type Input = f32;
    type Acc = f32;
    type Output = f32;

    const NAME: &'static str = "fp32";
    const LADDER: TileLadder = FP32_LADDER;
    const NEEDS_SCALE: bool = false;

    #[inline(always)]
    fn init_acc(params: ChannelParams) -> f32 {
        params.bias
    }

    // Not fused: every SIMD level must round identically.
    #[inline(always)]
    fn mac(acc: f32, weight: f32, input: f32) -> f32 {
        acc + weight * input
    }

    #[inline(always)]
    fn dequantize(acc: f32, _params: ChannelParams) -> f32 {
        acc
    }

    #[inline(always)]
    fn store(value: f32) -> f32 {
        value
    }
}
