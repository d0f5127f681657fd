use crate::config::{ConvConfig, Strategy};
use crate::core::{run, KernelArgs};
use crate::format::SparseWeightMatrix;
use crate::simd::KernelTable;
use crate::types::{Activation, F32Pipeline, Int8F32Pipeline, Int8Pipeline, Pipeline};

/// Sparse 1×1 convolution with fp32 weights, activations and output.
///
/// Computes `out[i, j] = act(bias[i] + Σ_k W[i, k] · x[k, j])` for the
/// `[M, K]` sparse `weights` and the row-major `[K, n]` `input`, writing the
/// row-major `[M, n]` result to `output`.
///
/// # Panics
/// If the buffer lengths do not match `weights` and `n`, or if the weights
/// were packed for a row stride other than `n`.
///
/// # Example
///
/// ```
/// use sparse_conv::{sparse_conv_fp32, Activation, SparseWeightMatrix};
///
/// // 1×2 weights, 2×3 activations
/// let weights = SparseWeightMatrix::from_dense(&[2.0f32, 0.0], 1, 2, 3).unwrap();
/// let input = [1.0f32, -2.0, 3.0, 9.0, 9.0, 9.0];
/// let mut output = [0.0f32; 3];
///
/// sparse_conv_fp32(&weights, &input, 3, None, &mut output, &Activation::Relu);
/// assert_eq!(output, [2.0, 0.0, 6.0]);
/// ```
pub fn sparse_conv_fp32(
    weights: &SparseWeightMatrix<f32>,
    input: &[f32],
    n: usize,
    bias: Option<&[f32]>,
    output: &mut [f32],
    activation: &Activation,
) {
    SparseConv::<F32Pipeline>::new(weights, n)
        .maybe_bias(bias)
        .activation(*activation)
        .execute(input, output);
}

/// Sparse 1×1 convolution with int8 weights and activations, fp32 output.
///
/// The int32 accumulator of channel `i` is dequantized once per tile as
/// `bias[i] + acc * scale[i]` before the activation.
///
/// # Panics
/// Same conditions as [`sparse_conv_fp32`], plus `scale.len() != M`.
pub fn sparse_conv_int8_fp32(
    weights: &SparseWeightMatrix<i8>,
    input: &[i8],
    n: usize,
    bias: Option<&[f32]>,
    scale: &[f32],
    output: &mut [f32],
    activation: &Activation,
) {
    SparseConv::<Int8F32Pipeline>::new(weights, n)
        .maybe_bias(bias)
        .scale(scale)
        .activation(*activation)
        .execute(input, output);
}

/// Sparse 1×1 convolution with int8 weights, activations and output.
///
/// Dequantizes like [`sparse_conv_int8_fp32`], then requantizes every value
/// with [`requantize_i8`](crate::core::requantize_i8).
///
/// # Example
///
/// ```
/// use sparse_conv::{sparse_conv_int8, Activation, SparseWeightMatrix};
///
/// let weights = SparseWeightMatrix::from_dense(&[100i8, 0, 0, -100], 2, 2, 1).unwrap();
/// let input = [100i8, 100];
/// let mut output = [0i8; 2];
///
/// sparse_conv_int8(&weights, &input, 1, None, &[0.5, 0.5], &mut output, &Activation::Identity);
/// // 5000.0 saturates at 127, -5000.0 clamps to -127
/// assert_eq!(output, [127, -127]);
/// ```
pub fn sparse_conv_int8(
    weights: &SparseWeightMatrix<i8>,
    input: &[i8],
    n: usize,
    bias: Option<&[f32]>,
    scale: &[f32],
    output: &mut [i8],
    activation: &Activation,
) {
    SparseConv::<Int8Pipeline>::new(weights, n)
        .maybe_bias(bias)
        .scale(scale)
        .activation(*activation)
        .execute(input, output);
}

/// Sparse 1×1 convolution for any pipeline, returning a fresh output buffer.
///
/// # Example
///
/// ```
/// use sparse_conv::{sparse_conv, Activation, F32Pipeline, SparseWeightMatrix};
///
/// let weights = SparseWeightMatrix::from_dense(&[1.0f32, 1.0], 1, 2, 2).unwrap();
/// let out = sparse_conv::<F32Pipeline>(&weights, &[1.0, 2.0, 3.0, 4.0], 2, None, None, &Activation::Identity);
/// assert_eq!(out, vec![4.0, 6.0]);
/// ```
pub fn sparse_conv<P: Pipeline>(
    weights: &SparseWeightMatrix<P::Weight>,
    input: &[P::Input],
    n: usize,
    bias: Option<&[f32]>,
    scale: Option<&[f32]>,
    activation: &Activation,
) -> Vec<P::Output> {
    let mut output = vec![P::Output::default(); weights.m() * n];
    let mut conv = SparseConv::<P>::new(weights, n)
        .maybe_bias(bias)
        .activation(*activation);
    if let Some(scale) = scale {
        conv = conv.scale(scale);
    }
    conv.execute(input, &mut output);
    output
}

/// Builder for configuring one sparse convolution.
///
/// Provides a fluent API for the epilogue parameters and the scheduling
/// knobs of [`ConvConfig`].
///
/// # Example
///
/// ```
/// use sparse_conv::{Activation, Int8F32Pipeline, SparseConv, SparseWeightMatrix, Strategy};
///
/// let weights = SparseWeightMatrix::from_dense(&[1i8, 0, -1, 0, 2, 0], 2, 3, 2).unwrap();
/// let input = [1i8, 2, 3, 4, 5, 6]; // 3x2
/// let mut out = [0.0f32; 4];
///
/// SparseConv::<Int8F32Pipeline>::new(&weights, 2)
///     .bias(&[0.5, 0.0])
///     .scale(&[1.0, 0.25])
///     .activation(Activation::Relu)
///     .strategy(Strategy::TileMajor)
///     .execute(&input, &mut out);
///
/// assert_eq!(out, [0.0, 0.0, 1.5, 2.0]);
/// ```
pub struct SparseConv<'a, P: Pipeline> {
    weights: &'a SparseWeightMatrix<P::Weight>,
    n: usize,
    bias: Option<&'a [f32]>,
    scale: Option<&'a [f32]>,
    activation: Activation,
    config: ConvConfig,
}

impl<'a, P: Pipeline> SparseConv<'a, P> {
    /// Create a builder for `weights` against `[K, n]` activations.
    pub fn new(weights: &'a SparseWeightMatrix<P::Weight>, n: usize) -> Self {
        Self {
            weights,
            n,
            bias: None,
            scale: None,
            activation: Activation::Identity,
            config: ConvConfig::default(),
        }
    }

    /// Per-channel bias, one entry per output channel.
    pub fn bias(mut self, bias: &'a [f32]) -> Self {
        self.bias = Some(bias);
        self
    }

    /// Per-channel dequantization scale. Required by the int8 pipelines.
    pub fn scale(mut self, scale: &'a [f32]) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn config(mut self, config: ConvConfig) -> Self {
        self.config = config;
        self
    }

    /// Force a traversal order instead of choosing by problem size.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    fn maybe_bias(mut self, bias: Option<&'a [f32]>) -> Self {
        self.bias = bias;
        self
    }

    /// Execute the convolution.
    ///
    /// # Arguments
    /// - `input`: row-major `[K, n]` activations
    /// - `output`: row-major `[M, n]` destination, fully overwritten
    pub fn execute(&self, input: &[P::Input], output: &mut [P::Output]) {
        let (m, k, n) = (self.weights.m(), self.weights.k(), self.n);
        assert_eq!(input.len(), k * n, "input dimensions mismatch");
        assert_eq!(output.len(), m * n, "output dimensions mismatch");
        self.check_params();

        if m == 0 || n == 0 {
            return;
        }

        let strategy = self.config.resolve_strategy(m, n);
        let table = KernelTable::<P>::new(self.config.resolve_simd());
        log::debug!(
            "sparse-conv {}: m={} k={} n={} nnz={} strategy={} simd={}",
            P::NAME,
            m,
            k,
            n,
            self.weights.nnz(),
            strategy,
            table.level()
        );

        let args = KernelArgs::<P> {
            weights: self.weights,
            input,
            bias: self.bias,
            scale: self.scale,
            activation: &self.activation,
        };
        // SAFETY: the matrix was validated against `K * row_stride` at
        // construction, `row_stride == n` and the buffer lengths were
        // checked above.
        unsafe { run(&args, &table, output, n, strategy) }
    }

    /// Execute over `batch` activation planes stored back to back.
    ///
    /// `inputs` holds `batch` row-major `[K, n]` planes and `outputs` receives
    /// `batch` `[M, n]` planes. Batches run one after another; each one uses
    /// the parallel channel loop.
    ///
    /// # Example
    ///
    /// ```
    /// use sparse_conv::{F32Pipeline, SparseConv, SparseWeightMatrix};
    ///
    /// let weights = SparseWeightMatrix::from_dense(&[3.0f32], 1, 1, 2).unwrap();
    /// let inputs = [1.0f32, 2.0, 10.0, 20.0]; // two 1x2 planes
    /// let mut outputs = [0.0f32; 4];
    ///
    /// SparseConv::<F32Pipeline>::new(&weights, 2).execute_batched(&inputs, &mut outputs, 2);
    /// assert_eq!(outputs, [3.0, 6.0, 30.0, 60.0]);
    /// ```
    pub fn execute_batched(&self, inputs: &[P::Input], outputs: &mut [P::Output], batch: usize) {
        let (m, k, n) = (self.weights.m(), self.weights.k(), self.n);
        let (in_plane, out_plane) = (k * n, m * n);
        assert_eq!(
            inputs.len(),
            batch * in_plane,
            "inputs dimensions mismatch: expected {} planes of {}",
            batch,
            in_plane
        );
        assert_eq!(
            outputs.len(),
            batch * out_plane,
            "outputs dimensions mismatch: expected {} planes of {}",
            batch,
            out_plane
        );

        for b in 0..batch {
            self.execute(
                &inputs[b * in_plane..(b + 1) * in_plane],
                &mut outputs[b * out_plane..(b + 1) * out_plane],
            );
        }
    }

    fn check_params(&self) {
        let m = self.weights.m();
        assert!(
            self.weights.nnz() == 0 || self.weights.row_stride() == self.n,
            "weights packed for row stride {} but n is {}",
            self.weights.row_stride(),
            self.n
        );
        if let Some(bias) = self.bias {
            assert_eq!(bias.len(), m, "bias length mismatch");
        }
        match self.scale {
            Some(scale) => assert_eq!(scale.len(), m, "scale length mismatch"),
            None => assert!(
                !P::NEEDS_SCALE,
                "the {} pipeline requires a per-channel scale",
                P::NAME
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dense_conv1x1;
    use crate::types::HardSwishParams;

    fn scenario_weights() -> SparseWeightMatrix<f32> {
        // channel 0: k=0 -> 1.0, k=2 -> 2.0; channel 1: k=3 -> 3.0
        let dense = [1.0f32, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 3.0];
        SparseWeightMatrix::from_dense(&dense, 2, 4, 5).unwrap()
    }

    fn assert_close(got: &[f32], want: &[f32]) {
        assert_eq!(got.len(), want.len());
        for (i, (g, w)) in got.iter().zip(want).enumerate() {
            assert!((g - w).abs() < 1e-5, "index {i}: {g} vs {w}");
        }
    }

    #[test]
    fn test_sparse_conv_fp32() {
        let weights = scenario_weights();
        let input = vec![1.0f32; 20];
        let mut out = vec![0.0f32; 10];

        sparse_conv_fp32(
            &weights,
            &input,
            5,
            Some(&[0.1, -0.2]),
            &mut out,
            &Activation::Identity,
        );

        assert_close(&out[..5], &[3.1; 5]);
        assert_close(&out[5..], &[2.8; 5]);
    }

    #[test]
    fn test_sparse_conv_fp32_relu6() {
        let weights = scenario_weights();
        let mut input = vec![1.0f32; 20];
        input[15..].fill(-1.0);
        let mut out = vec![f32::NAN; 10];

        sparse_conv_fp32(
            &weights,
            &input,
            5,
            Some(&[0.1, -0.2]),
            &mut out,
            &Activation::relu6(),
        );

        assert_close(&out[..5], &[3.1; 5]);
        assert_eq!(&out[5..], &[0.0; 5]);
    }

    #[test]
    fn test_sparse_conv_int8_pipelines_match_dense() {
        let (m, k, n) = (3, 5, 7);
        let dense: Vec<i8> = (0..m * k)
            .map(|i| if i % 2 == 0 { ((i * 7) % 23) as i8 - 11 } else { 0 })
            .collect();
        let input: Vec<i8> = (0..k * n).map(|i| ((i * 13) % 31) as i8 - 15).collect();
        let weights = SparseWeightMatrix::from_dense(&dense, m, k, n).unwrap();
        let bias = [0.5f32, -1.0, 2.0];
        let scale = [0.1f32, 0.05, 0.2];
        let act = Activation::LeakyRelu(0.1);

        let mut f = vec![0.0f32; m * n];
        sparse_conv_int8_fp32(&weights, &input, n, Some(&bias), &scale, &mut f, &act);
        let want = dense_conv1x1::<Int8F32Pipeline>(
            &dense,
            m,
            k,
            &input,
            n,
            Some(&bias),
            Some(&scale),
            &act,
        );
        assert_eq!(f, want);

        let mut q = vec![0i8; m * n];
        sparse_conv_int8(&weights, &input, n, Some(&bias), &scale, &mut q, &act);
        let want = dense_conv1x1::<Int8Pipeline>(
            &dense,
            m,
            k,
            &input,
            n,
            Some(&bias),
            Some(&scale),
            &act,
        );
        assert_eq!(q, want);
    }

    #[test]
    fn test_builder_api() {
        let weights = scenario_weights();
        let input: Vec<f32> = (0..20).map(|v| v as f32).collect();
        let hs = Activation::HardSwish(HardSwishParams::default());
        let mut a = vec![0.0f32; 10];
        let mut b = vec![0.0f32; 10];

        SparseConv::<F32Pipeline>::new(&weights, 5)
            .activation(hs)
            .strategy(Strategy::TileMajor)
            .execute(&input, &mut a);
        SparseConv::<F32Pipeline>::new(&weights, 5)
            .activation(hs)
            .config(ConvConfig::default().with_strategy(Strategy::ChannelMajor))
            .execute(&input, &mut b);

        assert_eq!(a, b);
        let want = sparse_conv::<F32Pipeline>(&weights, &input, 5, None, None, &hs);
        assert_eq!(a, want);
    }

    #[test]
    fn test_execute_batched() {
        let weights = scenario_weights();
        let inputs: Vec<f32> = (0..40).map(|v| (v % 9) as f32).collect();
        let mut outputs = vec![0.0f32; 20];

        SparseConv::<F32Pipeline>::new(&weights, 5)
            .bias(&[1.0, 2.0])
            .execute_batched(&inputs, &mut outputs, 2);

        for b in 0..2 {
            let want = sparse_conv::<F32Pipeline>(
                &weights,
                &inputs[b * 20..(b + 1) * 20],
                5,
                Some(&[1.0, 2.0]),
                None,
                &Activation::Identity,
            );
            assert_eq!(&outputs[b * 10..(b + 1) * 10], want.as_slice());
        }
    }

    #[test]
    fn test_execute_batched_empty() {
        let weights = scenario_weights();
        let mut outputs: Vec<f32> = vec![];
        SparseConv::<F32Pipeline>::new(&weights, 5).execute_batched(&[], &mut outputs, 0);
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_zero_width_is_noop() {
        let weights = SparseWeightMatrix::<f32>::from_dense(&[0.0; 8], 2, 4, 0).unwrap();
        let mut out: Vec<f32> = vec![];
        sparse_conv_fp32(&weights, &[], 0, None, &mut out, &Activation::Relu);
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_channels_is_noop() {
        let weights = SparseWeightMatrix::<i8>::from_dense(&[], 0, 4, 3).unwrap();
        let mut out: Vec<i8> = vec![];
        sparse_conv_int8(&weights, &[1; 12], 3, None, &[], &mut out, &Activation::Identity);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_channel_writes_epilogue_of_bias() {
        let weights = SparseWeightMatrix::from_dense(&[0.0f32, 0.0, 1.0, 0.0], 2, 2, 3).unwrap();
        let out = sparse_conv::<F32Pipeline>(
            &weights,
            &[1.0; 6],
            3,
            Some(&[-4.0, 0.5]),
            None,
            &Activation::Relu,
        );
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.5, 1.5, 1.5]);
    }

    #[test]
    #[should_panic(expected = "input dimensions mismatch")]
    fn test_input_length_checked() {
        let weights = scenario_weights();
        let mut out = vec![0.0f32; 10];
        sparse_conv_fp32(&weights, &[1.0; 19], 5, None, &mut out, &Activation::Identity);
    }

    #[test]
    #[should_panic(expected = "row stride")]
    fn test_row_stride_checked() {
        let weights = scenario_weights();
        let mut out = vec![0.0f32; 8];
        sparse_conv_fp32(&weights, &[1.0; 16], 4, None, &mut out, &Activation::Identity);
    }

    #[test]
    #[should_panic(expected = "requires a per-channel scale")]
    fn test_int8_requires_scale() {
        let weights = SparseWeightMatrix::from_dense(&[1i8], 1, 1, 1).unwrap();
        let _ = sparse_conv::<Int8Pipeline>(&weights, &[1], 1, None, None, &Activation::Identity);
    }
}
