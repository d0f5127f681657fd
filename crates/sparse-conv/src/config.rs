//! Per-call scheduling configuration.

use std::fmt;

use crate::simd::SimdLevel;

/// `M * N` above which the tile-major strategy is chosen.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 131_072;

/// Parallel traversal order over `(tile, channel)` work items.
///
/// Both orders compute every output element with the same sequence of
/// operations, so the choice never changes results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Pick by problem size against [`ConvConfig::parallel_threshold`].
    #[default]
    Auto,
    /// "mxn": tiles outermost and sequential, channels in parallel per tile.
    TileMajor,
    /// "nxm": channels in parallel, each walking the whole tile ladder.
    ChannelMajor,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::TileMajor => "mxn",
            Self::ChannelMajor => "nxm",
        })
    }
}

/// Knobs for one convolution call.
///
/// ```
/// use sparse_conv::{ConvConfig, Strategy};
///
/// let config = ConvConfig::default().with_strategy(Strategy::ChannelMajor);
/// assert_eq!(config.resolve_strategy(1024, 1024), Strategy::ChannelMajor);
/// assert_eq!(ConvConfig::default().resolve_strategy(1024, 1024), Strategy::TileMajor);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvConfig {
    pub strategy: Strategy,
    pub parallel_threshold: usize,
    /// Force an instruction-set level. Unsupported levels fall back to
    /// [`SimdLevel::Portable`].
    pub simd: Option<SimdLevel>,
}

impl Default for ConvConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            simd: None,
        }
    }
}

impl ConvConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_simd(mut self, level: SimdLevel) -> Self {
        self.simd = Some(level);
        self
    }

    /// Concrete strategy for an `[M, N]` output; never returns `Auto`.
    pub fn resolve_strategy(&self, m: usize, n: usize) -> Strategy {
        match self.strategy {
            Strategy::Auto => {
                if m.saturating_mul(n) > self.parallel_threshold {
                    Strategy::TileMajor
                } else {
                    Strategy::ChannelMajor
                }
            }
            forced => forced,
        }
    }

    /// Instruction-set level the kernels will run at.
    pub fn resolve_simd(&self) -> SimdLevel {
        match self.simd {
            Some(level) if level.is_supported() => level,
            Some(_) => SimdLevel::Portable,
            None => crate::simd::simd_level(),
        }
    }
}
