//! Error types for format construction and configuration.
//!
//! Kernel entry points never fail: every check that can fail happens once,
//! when a [`SparseWeightMatrix`](crate::SparseWeightMatrix) is built or an
//! activation flag is decoded.

use thiserror::Error;

/// Errors that can occur while building kernel inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SparseConvError {
    /// `values` and `jumps` are not paired 1:1.
    #[error("values has {values} entries but jumps has {jumps}")]
    RunLengthMismatch { values: usize, jumps: usize },

    /// The per-channel prefix table does not have one entry per channel.
    #[error("channel prefix has {got} entries, expected {expected}")]
    PrefixLength { expected: usize, got: usize },

    /// The prefix sum decreases between two channels.
    #[error("channel prefix decreases at channel {channel}: {prev} -> {next}")]
    PrefixNotMonotone {
        channel: usize,
        prev: usize,
        next: usize,
    },

    /// The last prefix entry does not cover the whole value stream.
    #[error("channel prefix ends at {end} but there are {nnz} nonzeros")]
    PrefixEnd { end: usize, nnz: usize },

    /// A consumed activation position falls outside `[0, K * row_stride)`.
    #[error("channel {channel} entry {entry}: offset {offset} is outside the activation buffer ({len} elements)")]
    OffsetOutOfBounds {
        channel: usize,
        entry: usize,
        offset: isize,
        len: usize,
    },

    /// A consumed activation position does not land on a row start.
    #[error("channel {channel} entry {entry}: offset {offset} is not a multiple of the row stride {row_stride}")]
    MisalignedOffset {
        channel: usize,
        entry: usize,
        offset: isize,
        row_stride: usize,
    },

    /// A dense weight buffer has the wrong number of elements.
    #[error("dense weights: expected {expected} elements, got {got}")]
    DenseShape { expected: usize, got: usize },

    /// The operator's activation code has no fused epilogue.
    #[error("unsupported activation code {0}")]
    UnsupportedActivation(i32),

    /// Hard-swish parameters that cannot be applied.
    #[error("invalid hard-swish parameters: {0}")]
    HardSwish(String),
}

/// Result type for sparse-conv construction.
pub type Result<T> = std::result::Result<T, SparseConvError>;
