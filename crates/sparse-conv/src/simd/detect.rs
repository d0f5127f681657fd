//! CPU feature detection.

use std::fmt;

use once_cell::sync::Lazy;

/// Instruction-set level the microkernels are compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimdLevel {
    /// Baseline target features only.
    Portable,
    /// aarch64 NEON (the aarch64 baseline, so it shares the portable code).
    Neon,
    /// x86_64 AVX2.
    Avx2,
}

impl SimdLevel {
    /// Whether the running CPU can execute kernels of this level.
    pub fn is_supported(self) -> bool {
        match self {
            SimdLevel::Portable => true,
            SimdLevel::Neon => {
                #[cfg(target_arch = "aarch64")]
                {
                    std::arch::is_aarch64_feature_detected!("neon")
                }
                #[cfg(not(target_arch = "aarch64"))]
                {
                    false
                }
            }
            SimdLevel::Avx2 => {
                #[cfg(target_arch = "x86_64")]
                {
                    is_x86_feature_detected!("avx2")
                }
                #[cfg(not(target_arch = "x86_64"))]
                {
                    false
                }
            }
        }
    }
}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SimdLevel::Portable => "portable",
            SimdLevel::Neon => "neon",
            SimdLevel::Avx2 => "avx2",
        })
    }
}

static DETECTED: Lazy<SimdLevel> = Lazy::new(|| {
    let level = [SimdLevel::Avx2, SimdLevel::Neon]
        .into_iter()
        .find(|level| level.is_supported())
        .unwrap_or(SimdLevel::Portable);
    log::info!("sparse-conv: selected {level} microkernels");
    level
});

/// Best level supported by this CPU, detected once per process.
pub fn simd_level() -> SimdLevel {
    *DETECTED
}
