//! Channel-major run-length sparse weight format.
//!
//! A logical `[M, K]` weight matrix is stored as three streams:
//!
//! ```text
//! values  : [w00 w02 | w13 | ...]          nonzeros, channel-major
//! jumps   : [ +2N  +N | ...  | ...]        element delta to the next nonzero's row
//! prefix  : [2, 3, ...]                    cumulative nonzeros through channel i
//! ```
//!
//! Channel `i` owns `values[prefix[i-1]..prefix[i]]` (with `prefix[-1] == 0`)
//! paired 1:1 with the same slice of `jumps`. Consuming a pair reads the
//! weight at the current activation position and then moves the position by
//! the jump. The jump stream is chained: the last jump of one channel leads
//! to the first nonzero of the next non-empty channel, and the very last jump
//! wraps back to the first nonzero of the matrix.
//!
//! Jumps are typed element strides (`isize`), computed for one activation
//! row stride. The per-channel start positions are derived once when the
//! matrix is built, so channels can be traversed independently and in
//! parallel.

mod packing;

use crate::error::{Result, SparseConvError};

/// Validated sparse weight matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseWeightMatrix<W> {
    m: usize,
    k: usize,
    row_stride: usize,
    values: Vec<W>,
    jumps: Vec<isize>,
    channel_nnz_prefix: Vec<usize>,
    first_offset: usize,
    channel_offsets: Vec<usize>,
}

impl<W: Copy> SparseWeightMatrix<W> {
    /// Build from packed streams, checking every format invariant once.
    ///
    /// `first_offset` is the activation element offset of the first nonzero
    /// of the matrix; `row_stride` is the activation row length (`N`) the
    /// jumps were computed for.
    pub fn new(
        m: usize,
        k: usize,
        row_stride: usize,
        values: Vec<W>,
        jumps: Vec<isize>,
        channel_nnz_prefix: Vec<usize>,
        first_offset: usize,
    ) -> Result<Self> {
        if values.len() != jumps.len() {
            return Err(SparseConvError::RunLengthMismatch {
                values: values.len(),
                jumps: jumps.len(),
            });
        }
        if channel_nnz_prefix.len() != m {
            return Err(SparseConvError::PrefixLength {
                expected: m,
                got: channel_nnz_prefix.len(),
            });
        }

        let mut prev = 0usize;
        for (channel, &next) in channel_nnz_prefix.iter().enumerate() {
            if next < prev {
                return Err(SparseConvError::PrefixNotMonotone {
                    channel,
                    prev,
                    next,
                });
            }
            prev = next;
        }
        if prev != values.len() {
            return Err(SparseConvError::PrefixEnd {
                end: prev,
                nnz: values.len(),
            });
        }

        let channel_offsets =
            walk_channel_offsets(k, row_stride, &jumps, &channel_nnz_prefix, first_offset)?;

        Ok(Self {
            m,
            k,
            row_stride,
            values,
            jumps,
            channel_nnz_prefix,
            first_offset,
            channel_offsets,
        })
    }

    /// Number of output channels (`M`).
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of input channels (`K`).
    pub fn k(&self) -> usize {
        self.k
    }

    /// Activation row stride (`N`) the jumps were computed for.
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn values(&self) -> &[W] {
        &self.values
    }

    pub fn jumps(&self) -> &[isize] {
        &self.jumps
    }

    pub fn channel_nnz_prefix(&self) -> &[usize] {
        &self.channel_nnz_prefix
    }

    pub fn first_offset(&self) -> usize {
        self.first_offset
    }

    /// Total number of stored nonzeros.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Fraction of the logical `[M, K]` matrix that is stored.
    pub fn density(&self) -> f64 {
        let total = self.m * self.k;
        if total == 0 {
            0.0
        } else {
            self.nnz() as f64 / total as f64
        }
    }

    /// Half-open range of channel `i`'s run in the value/jump streams.
    #[inline]
    fn run_range(&self, channel: usize) -> (usize, usize) {
        let start = if channel == 0 {
            0
        } else {
            self.channel_nnz_prefix[channel - 1]
        };
        (start, self.channel_nnz_prefix[channel])
    }

    /// Run length of channel `i`.
    pub fn channel_nnz(&self, channel: usize) -> usize {
        let (start, end) = self.run_range(channel);
        end - start
    }

    /// Longest run over all channels.
    pub fn max_run_len(&self) -> usize {
        (0..self.m).map(|i| self.channel_nnz(i)).max().unwrap_or(0)
    }

    /// Borrow channel `i`'s run.
    #[inline]
    pub fn run(&self, channel: usize) -> ChannelRun<'_, W> {
        let (start, end) = self.run_range(channel);
        ChannelRun {
            values: &self.values[start..end],
            jumps: &self.jumps[start..end],
            start: self.channel_offsets[channel],
        }
    }

    /// Expand back to a dense row-major `[M, K]` matrix.
    pub fn to_dense(&self) -> Vec<W>
    where
        W: Default,
    {
        let mut dense = vec![W::default(); self.m * self.k];
        if self.row_stride == 0 {
            return dense;
        }
        for channel in 0..self.m {
            let row = &mut dense[channel * self.k..(channel + 1) * self.k];
            for (value, offset) in self.run(channel).cursor() {
                row[offset / self.row_stride] = value;
            }
        }
        dense
    }
}

/// Walk the chained jump stream once and record where each channel starts.
fn walk_channel_offsets(
    k: usize,
    row_stride: usize,
    jumps: &[isize],
    prefix: &[usize],
    first_offset: usize,
) -> Result<Vec<usize>> {
    let len = k * row_stride;
    let mut offsets = Vec::with_capacity(prefix.len());
    let mut pos = first_offset as isize;
    let mut start = 0usize;

    for (channel, &end) in prefix.iter().enumerate() {
        // Empty channels carry the position through unchanged.
        offsets.push(if pos >= 0 { pos as usize } else { 0 });
        for (entry, &jump) in jumps[start..end].iter().enumerate() {
            if pos < 0 || pos as usize >= len {
                return Err(SparseConvError::OffsetOutOfBounds {
                    channel,
                    entry,
                    offset: pos,
                    len,
                });
            }
            if pos as usize % row_stride != 0 {
                return Err(SparseConvError::MisalignedOffset {
                    channel,
                    entry,
                    offset: pos,
                    row_stride,
                });
            }
            pos = pos.wrapping_add(jump);
        }
        start = end;
    }
    Ok(offsets)
}

/// One channel's run: its nonzeros, their jumps, and where it starts.
#[derive(Debug, Clone, Copy)]
pub struct ChannelRun<'a, W> {
    pub values: &'a [W],
    pub jumps: &'a [isize],
    /// Activation element offset of the run's first nonzero.
    pub start: usize,
}

impl<'a, W: Copy> ChannelRun<'a, W> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Safe traversal yielding `(value, activation_offset)` pairs in order.
    pub fn cursor(&self) -> RunCursor<'a, W> {
        RunCursor {
            values: self.values.iter(),
            jumps: self.jumps.iter(),
            offset: self.start as isize,
        }
    }
}

/// Iterator over a run's `(value, activation_offset)` pairs.
#[derive(Debug, Clone)]
pub struct RunCursor<'a, W> {
    values: std::slice::Iter<'a, W>,
    jumps: std::slice::Iter<'a, isize>,
    offset: isize,
}

impl<'a, W: Copy> Iterator for RunCursor<'a, W> {
    type Item = (W, usize);

    fn next(&mut self) -> Option<(W, usize)> {
        let value = *self.values.next()?;
        let jump = *self.jumps.next()?;
        let here = self.offset as usize;
        self.offset = self.offset.wrapping_add(jump);
        Some((value, here))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<'a, W: Copy> ExactSizeIterator for RunCursor<'a, W> {}

/// Consume one `(value, jump)` pair.
///
/// Returns the weight together with the activation pointer it applies to,
/// and leaves `input` pointing at the next nonzero's row.
///
/// # Safety
/// `weight` and `jump` must point into the same run with at least one
/// remaining entry.
#[inline(always)]
pub(crate) unsafe fn advance<W: Copy, X>(
    weight: &mut *const W,
    jump: &mut *const isize,
    input: &mut *const X,
) -> (W, *const X) {
    let value = **weight;
    let here = *input;
    *input = here.wrapping_offset(**jump);
    *weight = (*weight).add(1);
    *jump = (*jump).add(1);
    (value, here)
}
