//! Thomas-algorithm sweeps.
//!
//! Three kernels share one recurrence:
//!
//! - [`solve_system`]: one system, elements `stride` apart.
//! - [`solve_interleaved`]: `W` systems whose position `i` occupies `W`
//!   consecutive elements (solving along a non-unit-stride axis).
//! - [`solve_contiguous`]: `W` systems that are each contiguous (solving along
//!   axis 0); blocks are transposed into lane order and back.
//!
//! Forward elimination stores the eliminated super-diagonal `c'` and
//! right-hand side `d'` per position in a scratch buffer; back substitution
//! walks it in reverse. For every system
//!
//! ```text
//! c'[0] = c[0] / b[0]                 d'[0] = d[0] / b[0]
//! m     = 1 / (b[i] - a[i]·c'[i-1])
//! c'[i] = c[i]·m                      d'[i] = (d[i] - a[i]·d'[i-1])·m
//! x[N-1] = d'[N-1]                    x[i]  = d'[i] - c'[i]·x[i+1]
//! ```
//!
//! The pivot is never checked; a zero effective diagonal yields NaN/Inf.

mod lane;
mod scalar;
mod transpose;

use std::marker::PhantomData;

pub(crate) use lane::sweep_lanes;
pub(crate) use scalar::sweep_scalar;
pub(crate) use transpose::sweep_transposed;

use crate::element::TridScalar;
use crate::lanes::Lanes;
use crate::options::DivisionMode;
use crate::threading::SendPtr;
use crate::transpose::LaneTranspose;
use crate::{Result, TridError};

/// Read-only coefficient arrays of a batch.
#[derive(Clone, Copy)]
pub(crate) struct Coeffs<'a, T> {
    pub(crate) a: &'a [T],
    pub(crate) b: &'a [T],
    pub(crate) c: &'a [T],
}

/// Right-hand side and solution target of a batch.
///
/// In place, the solution overwrites the right-hand side. In increment mode
/// the right-hand side is only read and the solution is added into a separate
/// output array.
#[derive(Clone, Copy)]
pub(crate) struct Rhs<'a, T> {
    src: SendPtr<T>,
    dst: SendPtr<T>,
    accumulate: bool,
    src_len: usize,
    dst_len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T: TridScalar> Rhs<'a, T> {
    pub(crate) fn in_place(d: &'a mut [T]) -> Self {
        let ptr = SendPtr(d.as_mut_ptr());
        Self {
            src: ptr,
            dst: ptr,
            accumulate: false,
            src_len: d.len(),
            dst_len: d.len(),
            _marker: PhantomData,
        }
    }

    pub(crate) fn increment(d: &'a [T], u: &'a mut [T]) -> Self {
        Self {
            // Never written through.
            src: SendPtr(d.as_ptr() as *mut T),
            dst: SendPtr(u.as_mut_ptr()),
            accumulate: true,
            src_len: d.len(),
            dst_len: u.len(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// `idx < src_len`, and no other thread writes element `idx`.
    #[inline(always)]
    pub(crate) unsafe fn get(self, idx: usize) -> T {
        debug_assert!(idx < self.src_len);
        *self.src.as_const().add(idx)
    }

    /// # Safety
    /// `idx < dst_len`, and the caller exclusively owns element `idx`.
    #[inline(always)]
    pub(crate) unsafe fn put(self, idx: usize, x: T) {
        debug_assert!(idx < self.dst_len);
        let p = self.dst.as_ptr().add(idx);
        if self.accumulate {
            *p = *p + x;
        } else {
            *p = x;
        }
    }

    /// # Safety
    /// `idx + W <= src_len`.
    #[inline(always)]
    pub(crate) unsafe fn load<const W: usize>(self, idx: usize) -> Lanes<T, W> {
        debug_assert!(idx + W <= self.src_len);
        Lanes(std::ptr::read_unaligned(
            self.src.as_const().add(idx) as *const [T; W]
        ))
    }

    /// Load `count <= W` elements into the leading lanes, zero-filling the rest.
    ///
    /// # Safety
    /// `idx + count <= src_len`.
    #[inline(always)]
    pub(crate) unsafe fn load_prefix<const W: usize>(self, idx: usize, count: usize) -> Lanes<T, W> {
        debug_assert!(count <= W && idx + count <= self.src_len);
        let src = std::slice::from_raw_parts(self.src.as_const().add(idx), count);
        Lanes::from_prefix(src, T::zero())
    }

    /// # Safety
    /// `idx + W <= dst_len`, and the caller exclusively owns those elements.
    #[inline(always)]
    pub(crate) unsafe fn put_lanes<const W: usize>(self, idx: usize, v: Lanes<T, W>) {
        self.put_prefix(idx, v, W);
    }

    /// Store (or accumulate) the leading `count` lanes of `v`.
    ///
    /// # Safety
    /// `idx + count <= dst_len`, and the caller exclusively owns those elements.
    #[inline(always)]
    pub(crate) unsafe fn put_prefix<const W: usize>(self, idx: usize, v: Lanes<T, W>, count: usize) {
        debug_assert!(count <= W && idx + count <= self.dst_len);
        let p = self.dst.as_ptr().add(idx);
        if self.accumulate {
            for l in 0..count {
                *p.add(l) = *p.add(l) + v.0[l];
            }
        } else {
            for l in 0..count {
                *p.add(l) = v.0[l];
            }
        }
    }
}

/// `(count - 1) * step + tail`, the number of elements spanned by a strided run.
fn span(count: usize, step: usize, tail: usize) -> Result<usize> {
    (count - 1)
        .checked_mul(step)
        .and_then(|s| s.checked_add(tail))
        .ok_or(TridError::OffsetOverflow)
}

fn check_buffers<T>(a: &[T], b: &[T], c: &[T], d: &[T], required: usize) -> Result<()> {
    for (name, len) in [("a", a.len()), ("b", b.len()), ("c", c.len()), ("d", d.len())] {
        if len < required {
            return Err(TridError::BufferTooShort {
                name,
                required,
                actual: len,
            });
        }
    }
    Ok(())
}

/// Solve one tridiagonal system of length `n` whose elements are `stride` apart.
///
/// Element `i` of the system lives at index `i * stride` of every array; `d`
/// holds the right-hand side on entry and the solution on exit. `a[0]` and
/// `c[(n - 1) * stride]` are ignored.
pub fn solve_system<T: TridScalar>(
    a: &[T],
    b: &[T],
    c: &[T],
    d: &mut [T],
    n: usize,
    stride: usize,
    mode: DivisionMode,
) -> Result<()> {
    if n == 0 {
        return Ok(());
    }
    if n > 1 && stride == 0 {
        return Err(TridError::StrideTooSmall {
            stride,
            required: 1,
        });
    }
    check_buffers(a, b, c, d, span(n, stride, 1)?)?;

    let coeffs = Coeffs { a, b, c };
    let rhs = Rhs::in_place(d);
    T::with_scratch(2 * n, |scratch| {
        // SAFETY: every position was bounds-checked above and `d` is borrowed mutably.
        unsafe { sweep_scalar(coeffs, rhs, 0, n, stride, mode, scratch) }
    });
    Ok(())
}

/// Solve `W` interleaved systems of length `n` in lockstep.
///
/// Position `i` of system `l` lives at index `i * stride + l`, so each
/// position of the group is one `W`-wide load. Requires `stride >= W`.
pub fn solve_interleaved<T: TridScalar, const W: usize>(
    a: &[T],
    b: &[T],
    c: &[T],
    d: &mut [T],
    n: usize,
    stride: usize,
    mode: DivisionMode,
) -> Result<()> {
    if n == 0 {
        return Ok(());
    }
    if n > 1 && stride < W {
        return Err(TridError::StrideTooSmall {
            stride,
            required: W,
        });
    }
    check_buffers(a, b, c, d, span(n, stride, W)?)?;

    let coeffs = Coeffs { a, b, c };
    let rhs = Rhs::in_place(d);
    T::with_scratch(2 * n * W, |scratch| {
        // SAFETY: bounds checked above; positions don't overlap since stride >= W.
        unsafe { sweep_lanes::<T, W>(coeffs, rhs, 0, n, stride, mode, scratch) }
    });
    Ok(())
}

/// Solve `W` contiguous systems of length `n` through the transpose sweep.
///
/// System `k` occupies indices `k * pitch .. k * pitch + n`. Requires
/// `pitch >= n` and a power-of-two `W`. `K` supplies the in-register
/// transpose.
pub fn solve_contiguous<T, const W: usize, K>(
    a: &[T],
    b: &[T],
    c: &[T],
    d: &mut [T],
    n: usize,
    pitch: usize,
    mode: DivisionMode,
) -> Result<()>
where
    T: TridScalar,
    K: LaneTranspose<T, W>,
{
    if !W.is_power_of_two() {
        return Err(TridError::UnsupportedWidth(W));
    }
    if n == 0 {
        return Ok(());
    }
    if W > 1 && pitch < n {
        return Err(TridError::StrideTooSmall {
            stride: pitch,
            required: n,
        });
    }
    check_buffers(a, b, c, d, span(W, pitch, n)?)?;

    let coeffs = Coeffs { a, b, c };
    let rhs = Rhs::in_place(d);
    T::with_scratch(2 * n * W, |scratch| {
        // SAFETY: bounds checked above; systems don't overlap since pitch >= n.
        unsafe { sweep_transposed::<T, W, K>(coeffs, rhs, 0, n, pitch, mode, scratch) }
    });
    Ok(())
}
