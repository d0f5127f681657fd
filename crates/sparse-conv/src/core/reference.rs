//! Dense golden reference.
//!
//! Straightforward `[M, K] × [K, N]` loop over uncompressed weights that
//! shares the accumulation order and epilogue with the sparse kernel. The
//! int8 pipelines match the sparse kernel exactly; fp32 matches up to the
//! rounding of the skipped zero products.

use super::epilogue::finish_tile;
use crate::types::{Activation, ChannelParams, Pipeline};

/// Dense 1×1 convolution: `out[i, j] = epilogue(Σ_k w[i, k] * x[k, j])`.
///
/// `weights` is row-major `[M, K]`, `input` row-major `[K, N]`; the result is
/// row-major `[M, N]`.
///
/// # Example
///
/// ```
/// use sparse_conv::core::dense_conv1x1;
/// use sparse_conv::types::{Activation, F32Pipeline};
///
/// let w = [1.0f32, 2.0]; // 1×2
/// let x = [1.0f32, 1.0, 3.0, -1.0]; // 2×2
/// let out = dense_conv1x1::<F32Pipeline>(&w, 1, 2, &x, 2, None, None, &Activation::Relu);
/// assert_eq!(out, vec![7.0, 0.0]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn dense_conv1x1<P: Pipeline>(
    weights: &[P::Weight],
    m: usize,
    k: usize,
    input: &[P::Input],
    n: usize,
    bias: Option<&[f32]>,
    scale: Option<&[f32]>,
    activation: &Activation,
) -> Vec<P::Output> {
    assert_eq!(weights.len(), m * k, "weights dimensions mismatch");
    assert_eq!(input.len(), k * n, "input dimensions mismatch");

    let mut out = vec![P::Output::default(); m * n];
    for i in 0..m {
        let params = ChannelParams {
            bias: bias.map_or(0.0, |b| b[i]),
            scale: scale.map_or(1.0, |s| s[i]),
        };
        for j in 0..n {
            let mut acc = P::init_acc(params);
            for kk in 0..k {
                acc = P::mac(acc, weights[i * k + kk], input[kk * n + j]);
            }
            finish_tile::<P, 1>(&[acc], params, activation, &mut out[i * n + j..i * n + j + 1]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Int8F32Pipeline, Int8Pipeline};

    #[test]
    fn test_dense_int8_pipelines() {
        let w = [2i8, -3];
        let x = [10i8, -10, 5, 5];
        let scale = [0.5f32];
        let bias = [1.0f32];
        let f = dense_conv1x1::<Int8F32Pipeline>(
            &w,
            1,
            2,
            &x,
            2,
            Some(&bias),
            Some(&scale),
            &Activation::Identity,
        );
        // acc = [20 - 15, -20 - 15] = [5, -35]
        assert_eq!(f, vec![3.5, -16.5]);
        let q = dense_conv1x1::<Int8Pipeline>(
            &w,
            1,
            2,
            &x,
            2,
            Some(&bias),
            Some(&scale),
            &Activation::Identity,
        );
        assert_eq!(q, vec![4, -17]);
    }

    #[test]
    fn test_dense_empty() {
        let out = dense_conv1x1::<Int8Pipeline>(&[], 0, 3, &[0; 6], 2, None, None, &Activation::Relu);
        assert!(out.is_empty());
    }
}
