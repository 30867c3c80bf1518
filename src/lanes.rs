//! Fixed-width lane register used by the vector sweeps.
//!
//! `Lanes<T, W>` plays the role of one hardware vector register: lane `l`
//! belongs to system `l` of a group. The element-wise loops have constant trip
//! counts, which LLVM lowers to packed instructions.

use std::ops::{Add, Mul, Sub};

use crate::element::TridScalar;
use crate::options::DivisionMode;

/// `W` values processed together, one per independent system.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Lanes<T, const W: usize>(pub [T; W]);

impl<T: Copy, const W: usize> Lanes<T, W> {
    /// Broadcast `value` to every lane.
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Lanes([value; W])
    }

    /// Load `W` consecutive elements from the start of `src`.
    ///
    /// # Panics
    /// If `src` holds fewer than `W` elements.
    #[inline(always)]
    pub fn from_slice(src: &[T]) -> Self {
        let mut out = [src[0]; W];
        out.copy_from_slice(&src[..W]);
        Lanes(out)
    }

    /// Load `src.len() <= W` elements into the leading lanes, filling the rest with `fill`.
    #[inline(always)]
    pub fn from_prefix(src: &[T], fill: T) -> Self {
        debug_assert!(src.len() <= W);
        let mut out = [fill; W];
        out[..src.len()].copy_from_slice(src);
        Lanes(out)
    }

    /// Store every lane into the start of `dst`.
    #[inline(always)]
    pub fn write_to(self, dst: &mut [T]) {
        dst[..W].copy_from_slice(&self.0);
    }

    /// Lane `l`.
    #[inline(always)]
    pub fn lane(self, l: usize) -> T {
        self.0[l]
    }

    /// Interleave the low halves: `[s0, o0, s1, o1, ..]`.
    #[inline(always)]
    pub fn interleave_lo(self, other: Self) -> Self {
        let half = W / 2;
        let mut out = self;
        for k in 0..half {
            out.0[2 * k] = self.0[k];
            out.0[2 * k + 1] = other.0[k];
        }
        out
    }

    /// Interleave the high halves: `[s(h), o(h), s(h+1), o(h+1), ..]` with `h = W / 2`.
    #[inline(always)]
    pub fn interleave_hi(self, other: Self) -> Self {
        let half = W / 2;
        let mut out = self;
        for k in 0..half {
            out.0[2 * k] = self.0[half + k];
            out.0[2 * k + 1] = other.0[half + k];
        }
        out
    }
}

impl<T: TridScalar, const W: usize> Lanes<T, W> {
    /// All lanes zero.
    #[inline(always)]
    pub fn zero() -> Self {
        Self::splat(T::zero())
    }

    /// Lane-wise reciprocal computed as requested by `mode`.
    #[inline(always)]
    pub fn recip(self, mode: DivisionMode) -> Self {
        let mut out = self;
        for v in out.0.iter_mut() {
            *v = recip(*v, mode);
        }
        out
    }
}

/// Scalar reciprocal honouring the division mode.
#[inline(always)]
pub(crate) fn recip<T: TridScalar>(x: T, mode: DivisionMode) -> T {
    match mode {
        DivisionMode::Exact => T::one() / x,
        DivisionMode::Approximate => x.recip_approx(),
    }
}

macro_rules! impl_lane_op {
    ($tr:ident, $method:ident, $op:tt) => {
        impl<T: TridScalar, const W: usize> $tr for Lanes<T, W> {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                let mut out = self;
                for l in 0..W {
                    out.0[l] = self.0[l] $op rhs.0[l];
                }
                out
            }
        }
    };
}

impl_lane_op!(Add, add, +);
impl_lane_op!(Sub, sub, -);
impl_lane_op!(Mul, mul, *);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave() {
        let a = Lanes([0.0f64, 1.0, 2.0, 3.0]);
        let b = Lanes([10.0f64, 11.0, 12.0, 13.0]);
        assert_eq!(a.interleave_lo(b).0, [0.0, 10.0, 1.0, 11.0]);
        assert_eq!(a.interleave_hi(b).0, [2.0, 12.0, 3.0, 13.0]);
    }

    #[test]
    fn test_prefix_load_fills_tail() {
        let v = Lanes::<f32, 8>::from_prefix(&[1.0, 2.0, 3.0], 0.0);
        assert_eq!(v.0, [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let full = Lanes::<f32, 4>::from_slice(&[5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(full.0, [5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_arithmetic_is_lane_wise() {
        let a = Lanes([1.0f64, 2.0, 3.0, 4.0]);
        let b = Lanes::splat(2.0f64);
        assert_eq!((a + b).0, [3.0, 4.0, 5.0, 6.0]);
        assert_eq!((a - b).0, [-1.0, 0.0, 1.0, 2.0]);
        assert_eq!((a * b).0, [2.0, 4.0, 6.0, 8.0]);
        assert_eq!(a.recip(DivisionMode::Exact).0, [1.0, 0.5, 1.0 / 3.0, 0.25]);
    }

    #[test]
    fn test_write_to() {
        let mut dst = [0.0f64; 6];
        Lanes([1.0f64, 2.0, 3.0, 4.0]).write_to(&mut dst[1..]);
        assert_eq!(dst, [0.0, 1.0, 2.0, 3.0, 4.0, 0.0]);
    }
}
