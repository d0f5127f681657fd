//! Fused activation epilogues.
//!
//! An [`Activation`] is chosen once per convolution call. The epilogue
//! matches on it once per tile and then runs a closed-form loop over the
//! tile's lanes, so no per-element dispatch happens in the hot path.

use std::fmt;

use crate::error::{Result, SparseConvError};

/// Activation kind as encoded by the calling operator's integer flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ActivationKind {
    Identity = 0,
    Relu = 1,
    Relu6 = 2,
    LeakyRelu = 4,
    HardSwish = 10,
}

impl TryFrom<i32> for ActivationKind {
    type Error = SparseConvError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Identity),
            1 => Ok(Self::Relu),
            2 => Ok(Self::Relu6),
            4 => Ok(Self::LeakyRelu),
            10 => Ok(Self::HardSwish),
            other => Err(SparseConvError::UnsupportedActivation(other)),
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Relu => "relu",
            Self::Relu6 => "relu6",
            Self::LeakyRelu => "leaky_relu",
            Self::HardSwish => "hard_swish",
        };
        f.write_str(name)
    }
}

/// Hard-swish parameters: `y = x * inverse_scale * clamp(x + offset, 0, threshold)`.
///
/// Immutable once built; `inverse_scale` is derived from `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardSwishParams {
    offset: f32,
    scale: f32,
    inverse_scale: f32,
    threshold: f32,
}

impl HardSwishParams {
    /// Build from the operator's `offset`, `scale` and `threshold` attributes.
    pub fn new(offset: f32, scale: f32, threshold: f32) -> Result<Self> {
        if scale == 0.0 || !scale.is_finite() {
            return Err(SparseConvError::HardSwish(format!(
                "scale must be finite and nonzero, got {scale}"
            )));
        }
        if !offset.is_finite() || threshold.is_nan() {
            return Err(SparseConvError::HardSwish(format!(
                "offset {offset} / threshold {threshold} must be numbers"
            )));
        }
        Ok(Self {
            offset,
            scale,
            inverse_scale: 1.0 / scale,
            threshold,
        })
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn inverse_scale(&self) -> f32 {
        self.inverse_scale
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for HardSwishParams {
    /// The MobileNetV3 form `x * relu6(x + 3) / 6`.
    fn default() -> Self {
        Self {
            offset: 3.0,
            scale: 6.0,
            inverse_scale: 1.0 / 6.0,
            threshold: 6.0,
        }
    }
}

/// Activation applied by the epilogue before the store.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Activation {
    #[default]
    Identity,
    /// `max(x, 0)`
    Relu,
    /// Clipped relu: `min(max(x, 0), alpha)`.
    Relu6(f32),
    /// `x >= 0 ? x : x * alpha`
    LeakyRelu(f32),
    HardSwish(HardSwishParams),
}

impl Activation {
    /// Standard relu6 with a clip of 6.
    pub fn relu6() -> Self {
        Self::Relu6(6.0)
    }

    /// Assemble from the operator's runtime configuration.
    ///
    /// `alpha` is the clip for relu6 and the slope for leaky relu; the
    /// hard-swish triple is only read for [`ActivationKind::HardSwish`].
    pub fn from_kind(kind: ActivationKind, alpha: f32, hard_swish: HardSwishParams) -> Self {
        match kind {
            ActivationKind::Identity => Self::Identity,
            ActivationKind::Relu => Self::Relu,
            ActivationKind::Relu6 => Self::Relu6(alpha),
            ActivationKind::LeakyRelu => Self::LeakyRelu(alpha),
            ActivationKind::HardSwish => Self::HardSwish(hard_swish),
        }
    }

    /// Decode the operator's integer activation flag.
    pub fn from_code(code: i32, alpha: f32, hard_swish: HardSwishParams) -> Result<Self> {
        ActivationKind::try_from(code).map(|kind| Self::from_kind(kind, alpha, hard_swish))
    }

    pub fn kind(&self) -> ActivationKind {
        match self {
            Self::Identity => ActivationKind::Identity,
            Self::Relu => ActivationKind::Relu,
            Self::Relu6(_) => ActivationKind::Relu6,
            Self::LeakyRelu(_) => ActivationKind::LeakyRelu,
            Self::HardSwish(_) => ActivationKind::HardSwish,
        }
    }

    /// Apply in place to a tile of lanes.
    ///
    /// Branches once on the variant, then runs a single closed-form loop.
    #[inline(always)]
    pub fn apply(&self, lanes: &mut [f32]) {
        match *self {
            Self::Identity => {}
            Self::Relu => {
                for x in lanes.iter_mut() {
                    *x = x.max(0.0);
                }
            }
            Self::Relu6(alpha) => {
                for x in lanes.iter_mut() {
                    *x = x.max(0.0).min(alpha);
                }
            }
            Self::LeakyRelu(alpha) => {
                for x in lanes.iter_mut() {
                    *x = if *x >= 0.0 { *x } else { *x * alpha };
                }
            }
            Self::HardSwish(p) => {
                for x in lanes.iter_mut() {
                    let t = (*x + p.offset).max(0.0).min(p.threshold);
                    *x = *x * p.inverse_scale * t;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(act: Activation, xs: &[f32]) -> Vec<f32> {
        let mut out = xs.to_vec();
        act.apply(&mut out);
        out
    }

    #[test]
    fn test_identity_and_relu() {
        let xs = [-2.0, -0.5, 0.0, 0.5, 7.0];
        assert_eq!(applied(Activation::Identity, &xs), xs.to_vec());
        assert_eq!(
            applied(Activation::Relu, &xs),
            vec![0.0, 0.0, 0.0, 0.5, 7.0]
        );
    }

    #[test]
    fn test_relu6_clips_to_alpha() {
        let xs = [-1.0, 3.0, 6.0, 9.0];
        assert_eq!(applied(Activation::relu6(), &xs), vec![0.0, 3.0, 6.0, 6.0]);
        assert_eq!(applied(Activation::Relu6(2.5), &xs), vec![0.0, 2.5, 2.5, 2.5]);
    }

    #[test]
    fn test_leaky_relu() {
        let xs = [-4.0, 0.0, 2.0];
        assert_eq!(applied(Activation::LeakyRelu(0.25), &xs), vec![-1.0, 0.0, 2.0]);
    }

    #[test]
    fn test_hard_swish_default_matches_closed_form() {
        let act = Activation::HardSwish(HardSwishParams::default());
        let xs = [-4.0f32, -3.0, -1.0, 0.0, 1.0, 3.0, 5.0];
        let out = applied(act, &xs);
        for (x, y) in xs.iter().zip(out.iter()) {
            let expected = x * (1.0 / 6.0) * (x + 3.0).clamp(0.0, 6.0);
            assert!((y - expected).abs() < 1e-6, "x={x}: {y} != {expected}");
        }
        // Saturated branch is linear.
        assert!((out[6] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_hard_swish_rejects_zero_scale() {
        assert!(matches!(
            HardSwishParams::new(3.0, 0.0, 6.0),
            Err(SparseConvError::HardSwish(_))
        ));
        let p = HardSwishParams::new(1.0, 4.0, 2.0).unwrap();
        assert_eq!(p.inverse_scale(), 0.25);
        assert_eq!(p.offset(), 1.0);
        assert_eq!(p.threshold(), 2.0);
        assert_eq!(p.scale(), 4.0);
    }

    #[test]
    fn test_decode_activation_codes() {
        let hs = HardSwishParams::default();
        assert_eq!(Activation::from_code(0, 0.0, hs).unwrap(), Activation::Identity);
        assert_eq!(Activation::from_code(1, 0.0, hs).unwrap(), Activation::Relu);
        assert_eq!(Activation::from_code(2, 6.0, hs).unwrap(), Activation::Relu6(6.0));
        assert_eq!(
            Activation::from_code(4, 0.1, hs).unwrap(),
            Activation::LeakyRelu(0.1)
        );
        assert_eq!(
            Activation::from_code(10, 0.0, hs).unwrap(),
            Activation::HardSwish(hs)
        );
        assert_eq!(
            Activation::from_code(5, 0.0, hs),
            Err(SparseConvError::UnsupportedActivation(5))
        );
    }

    #[test]
    fn test_kind_round_trips_through_display() {
        assert_eq!(Activation::relu6().kind(), ActivationKind::Relu6);
        assert_eq!(ActivationKind::HardSwish.to_string(), "hard_swish");
        assert_eq!(ActivationKind::LeakyRelu as i32, 4);
    }
}
