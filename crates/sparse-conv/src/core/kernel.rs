//! Width-generic sparse microkernel.
//!
//! For output channel `i` and a tile of `W` columns starting at `col`:
//!
//! ```text
//! acc[0..W] = init(bias[i])
//! x = input + run.start + col
//! for (value, jump) in run:
//!     acc[0..W] = mac(acc[0..W], broadcast(value), x[0..W])
//!     x += jump
//! ```
//!
//! `W` is a const generic so the accumulators live in a fixed-size array the
//! compiler keeps in vector registers. The run is consumed in groups of
//! [`group_size`] entries followed by a tail of the remainder; both walk the
//! same stream in the same order, so grouping never changes results.

use super::epilogue::finish_tile;
use crate::format::{advance, ChannelRun, SparseWeightMatrix};
use crate::types::{Activation, ChannelParams, Pipeline};

/// Everything a tile kernel reads, shared by all workers of one call.
pub(crate) struct KernelArgs<'a, P: Pipeline> {
    pub weights: &'a SparseWeightMatrix<P::Weight>,
    pub input: &'a [P::Input],
    pub bias: Option<&'a [f32]>,
    pub scale: Option<&'a [f32]>,
    pub activation: &'a Activation,
}

impl<'a, P: Pipeline> KernelArgs<'a, P> {
    #[inline(always)]
    pub fn channel_params(&self, channel: usize) -> ChannelParams {
        let mut params = ChannelParams::default();
        if let Some(bias) = self.bias {
            params.bias = bias[channel];
        }
        if let Some(scale) = self.scale {
            params.scale = scale[channel];
        }
        params
    }
}

/// Entries consumed per unrolled step of the main loop.
#[inline(always)]
pub(crate) const fn group_size(width: usize) -> usize {
    if width == 1 {
        8
    } else {
        4
    }
}

#[inline(always)]
unsafe fn mac_lanes<P: Pipeline, const W: usize>(
    acc: &mut [P::Acc; W],
    value: P::Weight,
    x: *const P::Input,
) {
    for (lane, a) in acc.iter_mut().enumerate() {
        *a = P::mac(*a, value, *x.add(lane));
    }
}

/// Accumulate one channel's run against `W` consecutive activation columns.
///
/// # Safety
/// `input.add(run.start)` and every position reached by the run's jumps,
/// plus `W` lanes, must be readable.
#[inline(always)]
pub(crate) unsafe fn accumulate<P: Pipeline, const W: usize>(
    run: &ChannelRun<'_, P::Weight>,
    input: *const P::Input,
    init: P::Acc,
) -> [P::Acc; W] {
    let mut acc = [init; W];
    let group = group_size(W);
    let len = run.len();
    let grouped = len - len % group;

    let mut w = run.values.as_ptr();
    let mut j = run.jumps.as_ptr();
    let mut x = input.wrapping_add(run.start);

    let mut consumed = 0;
    while consumed < grouped {
        for _ in 0..group {
            let (value, at) = advance(&mut w, &mut j, &mut x);
            mac_lanes::<P, W>(&mut acc, value, at);
        }
        consumed += group;
    }
    for _ in grouped..len {
        let (value, at) = advance(&mut w, &mut j, &mut x);
        mac_lanes::<P, W>(&mut acc, value, at);
    }
    acc
}

/// Compute and store one `(channel, tile)` pair.
///
/// # Safety
/// `args` must hold a weight matrix whose row stride equals the activation
/// row length, an activation buffer of `K * row_stride` elements, and
/// `col + W <= row_stride`. `out` must hold exactly `W` elements.
#[inline(always)]
pub(crate) unsafe fn run_tile<P: Pipeline, const W: usize>(
    args: &KernelArgs<'_, P>,
    channel: usize,
    col: usize,
    out: &mut [P::Output],
) {
    debug_assert_eq!(out.len(), W);
    let run = args.weights.run(channel);
    let params = args.channel_params(channel);
    let input = args.input.as_ptr().wrapping_add(col);
    let acc = accumulate::<P, W>(&run, input, P::init_acc(params));
    finish_tile::<P, W>(&acc, params, args.activation, out);
}
