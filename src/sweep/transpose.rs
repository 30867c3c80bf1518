//! Transpose sweep for systems that are contiguous in memory.
//!
//! System `k` of the group occupies `base + k * pitch + [0, n)`. A naive
//! position-`i` gather would need `W` scattered loads, so positions are
//! processed in blocks of `W`: register `k` is loaded with `W` consecutive
//! elements of system `k`, the block is transposed into lane order and the
//! lane recurrence runs over it. Back substitution produces solution blocks
//! in lane order that are transposed back before being stored.
//!
//! When `n` is not a multiple of `W` the last block only loads, solves and
//! stores the valid positions.

use super::{Coeffs, Rhs};
use crate::element::TridScalar;
use crate::lanes::Lanes;
use crate::options::DivisionMode;
use crate::transpose::LaneTranspose;

/// Load `count <= W` positions starting at `start` from each of the `W`
/// systems and transpose them into lane order.
#[inline(always)]
fn load_block<T, const W: usize, K>(
    src: &[T],
    start: usize,
    pitch: usize,
    count: usize,
    regs: &mut [Lanes<T, W>; W],
) where
    T: TridScalar,
    K: LaneTranspose<T, W>,
{
    for (k, reg) in regs.iter_mut().enumerate() {
        let at = start + k * pitch;
        *reg = Lanes::from_prefix(&src[at..at + count], T::zero());
    }
    K::transpose(regs);
}

/// Solve `W` contiguous systems of length `n`.
///
/// `scratch` must hold at least `2 * n * W` elements.
///
/// # Safety
/// Every index `base + k * pitch + i` (`k < W`, `i < n`) must be in bounds for
/// the coefficient slices and both `rhs` buffers, and no other thread may
/// access those output elements during the call.
#[inline]
pub(crate) unsafe fn sweep_transposed<T, const W: usize, K>(
    coeffs: Coeffs<'_, T>,
    rhs: Rhs<'_, T>,
    base: usize,
    n: usize,
    pitch: usize,
    mode: DivisionMode,
    scratch: &mut [T],
) where
    T: TridScalar,
    K: LaneTranspose<T, W>,
{
    debug_assert!(n >= 1);
    let (cp, dp) = scratch[..2 * n * W].split_at_mut(n * W);
    let zero = Lanes::<T, W>::zero();

    let mut a_reg = [zero; W];
    let mut b_reg = [zero; W];
    let mut c_reg = [zero; W];
    let mut d_reg = [zero; W];
    let mut cc = zero;
    let mut dd = zero;

    // forward elimination, one block of W positions at a time
    for i in 0..n {
        let j = i % W;
        if j == 0 {
            let count = W.min(n - i);
            load_block::<T, W, K>(coeffs.a, base + i, pitch, count, &mut a_reg);
            load_block::<T, W, K>(coeffs.b, base + i, pitch, count, &mut b_reg);
            load_block::<T, W, K>(coeffs.c, base + i, pitch, count, &mut c_reg);
            for (k, reg) in d_reg.iter_mut().enumerate() {
                *reg = rhs.load_prefix(base + k * pitch + i, count);
            }
            K::transpose(&mut d_reg);
        }

        if i == 0 {
            let inv = b_reg[0].recip(mode);
            cc = inv * c_reg[0];
            dd = inv * d_reg[0];
        } else {
            let aa = a_reg[j];
            let inv = (b_reg[j] - aa * cc).recip(mode);
            dd = inv * (d_reg[j] - aa * dd);
            cc = inv * c_reg[j];
        }
        cc.write_to(&mut cp[i * W..]);
        dd.write_to(&mut dp[i * W..]);
    }

    // back substitution; `dd` already holds x[n-1]
    let mut out = [zero; W];
    for i in (0..n).rev() {
        if i + 1 < n {
            dd = Lanes::from_slice(&dp[i * W..]) - Lanes::from_slice(&cp[i * W..]) * dd;
        }
        out[i % W] = dd;
        if i % W == 0 {
            let count = W.min(n - i);
            K::transpose(&mut out);
            for (k, reg) in out.iter().enumerate() {
                rhs.put_prefix(base + k * pitch + i, *reg, count);
            }
        }
    }
}
