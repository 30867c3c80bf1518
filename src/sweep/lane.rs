//! Lane-parallel sweep: `W` interleaved systems advance in lockstep.
//!
//! Position `i` of lane `l` lives at `base + i * stride + l`, which is how
//! systems along any axis but the fastest one are laid out. Each step is one
//! `W`-wide load per array and the scalar recurrence on [`Lanes`].

use super::{Coeffs, Rhs};
use crate::element::TridScalar;
use crate::lanes::Lanes;
use crate::options::DivisionMode;

/// Solve `W` interleaved systems of length `n`.
///
/// `scratch` must hold at least `2 * n * W` elements.
///
/// # Safety
/// Every index `base + i * stride + l` (`i < n`, `l < W`) must be in bounds
/// for the coefficient slices and both `rhs` buffers, and no other thread may
/// access those output elements during the call.
#[inline]
pub(crate) unsafe fn sweep_lanes<T: TridScalar, const W: usize>(
    coeffs: Coeffs<'_, T>,
    rhs: Rhs<'_, T>,
    base: usize,
    n: usize,
    stride: usize,
    mode: DivisionMode,
    scratch: &mut [T],
) {
    debug_assert!(n >= 1);
    let (cp, dp) = scratch[..2 * n * W].split_at_mut(n * W);
    let Coeffs { a, b, c } = coeffs;

    let mut idx = base;
    let inv = Lanes::<T, W>::from_slice(&b[idx..]).recip(mode);
    let mut cc = inv * Lanes::from_slice(&c[idx..]);
    let mut dd = inv * rhs.load::<W>(idx);
    cc.write_to(&mut cp[..W]);
    dd.write_to(&mut dp[..W]);
    for i in 1..n {
        idx += stride;
        let aa = Lanes::from_slice(&a[idx..]);
        let inv = (Lanes::from_slice(&b[idx..]) - aa * cc).recip(mode);
        dd = inv * (rhs.load::<W>(idx) - aa * dd);
        cc = inv * Lanes::from_slice(&c[idx..]);
        cc.write_to(&mut cp[i * W..]);
        dd.write_to(&mut dp[i * W..]);
    }

    rhs.put_lanes(idx, dd);
    for i in (0..n - 1).rev() {
        idx -= stride;
        dd = Lanes::from_slice(&dp[i * W..]) - Lanes::from_slice(&cp[i * W..]) * dd;
        rhs.put_lanes(idx, dd);
    }
}
