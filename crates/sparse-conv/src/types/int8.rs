use super::traits::{ChannelParams, Pipeline};
use crate::core::{requantize_i8, TileLadder, INT8_LADDER};

/// int8 weights × int8 activations → fp32 output.
///
/// Lanes accumulate in `i32`; the per-channel `bias + acc * scale`
/// dequantization happens once per tile in the epilogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int8F32Pipeline;

/// int8 weights × int8 activations → int8 output.
///
/// Same accumulation and dequantization as [`Int8F32Pipeline`], followed by
/// [`requantize_i8`] on store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int8Pipeline;

#[inline(always)]
fn widening_mac(acc: i32, weight: i8, input: i8) -> i32 {
    acc.wrapping_add(weight as i32 * input as i32)
}

#[inline(always)]
fn dequantize_i32(acc: i32, params: ChannelParams) -> f32 {
    params.bias + acc as f32 * params.scale
}

impl Pipeline for Int8F32Pipeline {
    type Weight = i8;
    type Input = i8;
    type Acc = i32;
    type Output = f32;

    const NAME: &'static str = "int8-fp32";
    const LADDER: TileLadder = INT8_LADDER;
    const NEEDS_SCALE: bool = true;

    #[inline(always)]
    fn init_acc(_params: ChannelParams) -> i32 {
        0
    }

    #[inline(always)]
    fn mac(acc: i32, weight: i8, input: i8) -> i32 {
        widening_mac(acc, weight, input)
    }

    #[inline(always)]
    fn dequantize(acc: i32, params: ChannelParams) -> f32 {
        dequantize_i32(acc, params)
    }

    #[inline(always)]
    fn store(value: f32) -> f32 {
        value
    }
}

impl Pipeline for Int8Pipeline {
    type Weight = i8;
    type Input = i8;
    type Acc = i32;
    type Output = i8;

    const NAME: &'static str = "int8-int8";
    const LADDER: TileLadder = INT8_LADDER;
    const NEEDS_SCALE: bool = true;

    #[inline(always)]
    fn init_acc(_params: ChannelParams) -> i32 {
        0
    }

    #[inline(always)]
    fn mac(acc: i32, weight: i8, input: i8) -> i32 {
        widening_mac(acc, weight, input)
    }

    #[inline(always)]
    fn dequantize(acc: i32, params: ChannelParams) -> f32 {
        dequantize_i32(acc, params)
    }

    #[inline(always)]
    fn store(value: f32) -> i8 {
        requantize_i8(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening_mac_does_not_overflow_i8() {
        let acc = Int8Pipeline::mac(0, -128, -128);
        assert_eq!(acc, 16384);
        let acc = Int8Pipeline::mac(acc, 127, -128);
        assert_eq!(acc, 16384 - 16256);
    }

    #[test]
    fn test_bias_applied_after_scale() {
        let params = ChannelParams {
            bias: 1.0,
            scale: 0.5,
        };
        assert_eq!(Int8F32Pipeline::init_acc(params), 0);
        assert_eq!(Int8F32Pipeline::dequantize(10, params), 6.0);
        assert_eq!(Int8Pipeline::dequantize(-4, params), -1.0);
    }

    #[test]
    fn test_int8_store_requantizes() {
        assert_eq!(Int8Pipeline::store(2.5), 3);
        assert_eq!(Int8Pipeline::store(-300.0), -127);
        assert_eq!(Int8F32Pipeline::store(-300.0), -300.0);
    }
}
