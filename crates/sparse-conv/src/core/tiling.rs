//! Tile-width ladder.
//!
//! The output width `N` is covered by peeling fixed tile widths from a
//! descending ladder. The widest rung repeats while it fits; every narrower
//! rung fires at most once, gated by a bit test for power-of-two rungs and a
//! comparison otherwise; the final rung repeats until nothing is left.
//!
//! ```text
//! fp32, N = 111:  48 48 | 8 4 2 1          (111 = 96 + 15)
//! int8, N = 111:  64 | 32 | 8 4 | 1 1 1    (111 = 64 + 47)
//! ```

/// Most rungs any ladder has.
pub(crate) const MAX_RUNGS: usize = 8;

/// A descending sequence of tile widths ending in 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLadder {
    rungs: &'static [usize],
}

/// Ladder used by the fp32 pipeline.
pub const FP32_LADDER: TileLadder = TileLadder::new(&[48, 32, 16, 8, 4, 2, 1]);

/// Ladder used by both int8 pipelines.
pub const INT8_LADDER: TileLadder = TileLadder::new(&[64, 48, 32, 16, 8, 4, 1]);

impl TileLadder {
    const fn new(rungs: &'static [usize]) -> Self {
        assert!(!rungs.is_empty() && rungs.len() <= MAX_RUNGS);
        assert!(rungs[rungs.len() - 1] == 1);
        Self { rungs }
    }

    /// Tile widths, widest first.
    pub fn rungs(&self) -> &'static [usize] {
        self.rungs
    }

    /// Widest tile.
    pub fn max_width(&self) -> usize {
        self.rungs[0]
    }

    /// Iterate the slices covering `n` output columns, left to right.
    pub fn slices(&self, n: usize) -> TileSlices {
        TileSlices {
            rungs: self.rungs,
            rung: 0,
            col: 0,
            remaining: n,
        }
    }
}

/// One contiguous block of output columns processed by a single kernel width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSlice {
    /// First output column.
    pub col: usize,
    /// Tile width.
    pub width: usize,
    /// Index of the width in the ladder.
    pub rung: usize,
}

/// Iterator over the [`TileSlice`]s of one output row.
#[derive(Debug, Clone)]
pub struct TileSlices {
    rungs: &'static [usize],
    rung: usize,
    col: usize,
    remaining: usize,
}

impl Iterator for TileSlices {
    type Item = TileSlice;

    fn next(&mut self) -> Option<TileSlice> {
        while self.rung < self.rungs.len() && self.remaining > 0 {
            let rung = self.rung;
            let width = self.rungs[rung];
            let repeats = rung == 0 || rung + 1 == self.rungs.len();
            let fires = if repeats || !width.is_power_of_two() {
                self.remaining >= width
            } else {
                self.remaining & width != 0
            };
            if !(fires && repeats) {
                self.rung += 1;
            }
            if fires {
                let slice = TileSlice {
                    col: self.col,
                    width,
                    rung,
                };
                self.col += width;
                self.remaining -= width;
                return Some(slice);
            }
        }
        None
    }
}
