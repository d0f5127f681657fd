//! Fused epilogue: dequantize, activate, requantize, store.
//!
//! Runs once per `(channel, tile)` after accumulation. The activation is
//! matched once per tile (see [`Activation::apply`]).

use crate::types::{Activation, ChannelParams, Pipeline};

/// Lower clamp applied before int8 rounding.
pub const INT8_LOWER_BOUND: f32 = -127.0;

/// Requantize an activated float to int8.
///
/// Clamps below at `-127`, rounds half away from zero, then narrows with
/// signed saturation through `i32 → i16 → i8`. There is no float clamp at
/// `+127`; large positive values are bounded only by the saturating
/// narrowing, so they land on `127`.
///
/// ```
/// use sparse_conv::core::requantize_i8;
///
/// assert_eq!(requantize_i8(2.5), 3);
/// assert_eq!(requantize_i8(-2.5), -3);
/// assert_eq!(requantize_i8(-500.0), -127);
/// assert_eq!(requantize_i8(500.0), 127);
/// ```
#[inline(always)]
pub fn requantize_i8(value: f32) -> i8 {
    let rounded = value.max(INT8_LOWER_BOUND).round() as i32;
    let narrow = rounded.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    narrow.clamp(i8::MIN as i16, i8::MAX as i16) as i8
}

/// Finish one tile of accumulators and write it to `out`.
#[inline(always)]
pub(crate) fn finish_tile<P: Pipeline, const W: usize>(
    acc: &[P::Acc; W],
    params: ChannelParams,
    activation: &Activation,
    out: &mut [P::Output],
) {
    let mut lanes = [0.0f32; W];
    for (lane, &a) in lanes.iter_mut().zip(acc.iter()) {
        *lane = P::dequantize(a, params);
    }
    activation.apply(&mut lanes);
    for (o, &lane) in out.iter_mut().zip(lanes.iter()) {
        *o = P::store(lane);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{F32Pipeline, HardSwishParams, Int8F32Pipeline, Int8Pipeline};

    #[test]
    fn test_requantize_rounds_ties_away_from_zero() {
        assert_eq!(requantize_i8(0.5), 1);
        assert_eq!(requantize_i8(-0.5), -1);
        assert_eq!(requantize_i8(1.49), 1);
        assert_eq!(requantize_i8(-1.5), -2);
        assert_eq!(requantize_i8(0.0), 0);
    }

    #[test]
    fn test_requantize_lower_clamp() {
        assert_eq!(requantize_i8(-127.4), -127);
        // Would round to -128 without the float clamp.
        assert_eq!(requantize_i8(-127.6), -127);
        assert_eq!(requantize_i8(f32::NEG_INFINITY), -127);
    }

    #[test]
    fn test_requantize_upper_saturates_without_clamp() {
        assert_eq!(requantize_i8(126.6), 127);
        assert_eq!(requantize_i8(127.6), 127);
        assert_eq!(requantize_i8(40_000.0), 127);
        assert_eq!(requantize_i8(f32::INFINITY), 127);
    }

    #[test]
    fn test_finish_tile_int8_output() {
        let params = ChannelParams {
            bias: -1.0,
            scale: 0.5,
        };
        let acc = [10i32, -400, 1000, 3];
        let mut out = [0i8; 4];
        finish_tile::<Int8Pipeline, 4>(&acc, params, &Activation::Identity, &mut out);
        // 4.0, -201.0, 499.0, 0.5
        assert_eq!(out, [4, -127, 127, 1]);
    }

    #[test]
    fn test_finish_tile_int8_fp32_with_leaky() {
        let params = ChannelParams {
            bias: 0.0,
            scale: 0.25,
        };
        let acc = [-8i32, 8];
        let mut out = [0.0f32; 2];
        finish_tile::<Int8F32Pipeline, 2>(&acc, params, &Activation::LeakyRelu(0.5), &mut out);
        assert_eq!(out, [-1.0, 2.0]);
    }

    #[test]
    fn test_finish_tile_fp32_hard_swish() {
        let act = Activation::HardSwish(HardSwishParams::default());
        let mut out = [9.0f32; 3];
        finish_tile::<F32Pipeline, 3>(&[-3.0, 0.0, 3.0], ChannelParams::default(), &act, &mut out);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert!((out[2] - 3.0).abs() < 1e-6);
    }
}
