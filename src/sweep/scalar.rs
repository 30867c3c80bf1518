//! Single-system Thomas sweep.

use super::{Coeffs, Rhs};
use crate::element::TridScalar;
use crate::lanes::recip;
use crate::options::DivisionMode;

/// Solve the system whose `n` elements sit at `base + i * stride`.
///
/// `scratch` must hold at least `2 * n` elements.
///
/// # Safety
/// Every index `base + i * stride` (`i < n`) must be in bounds for the
/// coefficient slices and both `rhs` buffers, and no other thread may access
/// those elements of the output during the call.
#[inline]
pub(crate) unsafe fn sweep_scalar<T: TridScalar>(
    coeffs: Coeffs<'_, T>,
    rhs: Rhs<'_, T>,
    base: usize,
    n: usize,
    stride: usize,
    mode: DivisionMode,
    scratch: &mut [T],
) {
    debug_assert!(n >= 1);
    let (cp, dp) = scratch[..2 * n].split_at_mut(n);
    let Coeffs { a, b, c } = coeffs;

    // forward elimination
    let mut idx = base;
    let inv = recip(b[idx], mode);
    let mut cc = inv * c[idx];
    let mut dd = inv * rhs.get(idx);
    cp[0] = cc;
    dp[0] = dd;
    for i in 1..n {
        idx += stride;
        let aa = a[idx];
        let inv = recip(b[idx] - aa * cc, mode);
        dd = inv * (rhs.get(idx) - aa * dd);
        cc = inv * c[idx];
        cp[i] = cc;
        dp[i] = dd;
    }

    // back substitution
    rhs.put(idx, dd);
    for i in (0..n - 1).rev() {
        idx -= stride;
        dd = dp[i] - cp[i] * dd;
        rhs.put(idx, dd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_increment_mode_accumulates() {
        let n = 5;
        let a = vec![-1.0f64; n];
        let b = vec![4.0f64; n];
        let c = vec![-1.0f64; n];
        let d: Vec<f64> = (0..n).map(|i| i as f64 + 1.0).collect();

        let mut expected = d.clone();
        let coeffs = Coeffs { a: &a, b: &b, c: &c };
        let mut scratch = vec![0.0; 2 * n];
        unsafe {
            sweep_scalar(
                coeffs,
                Rhs::in_place(&mut expected),
                0,
                n,
                1,
                DivisionMode::Exact,
                &mut scratch,
            );
        }

        let mut u = vec![10.0f64; n];
        unsafe {
            sweep_scalar(
                coeffs,
                Rhs::increment(&d, &mut u),
                0,
                n,
                1,
                DivisionMode::Exact,
                &mut scratch,
            );
        }
        for i in 0..n {
            assert_relative_eq!(u[i], 10.0 + expected[i], epsilon = 1e-12);
            assert_eq!(d[i], i as f64 + 1.0);
        }
    }

    #[test]
    fn test_residual_with_offset_base() {
        let n = 7;
        let base = 3;
        let len = base + n;
        let a: Vec<f64> = (0..len).map(|i| 0.3 + 0.01 * i as f64).collect();
        let b: Vec<f64> = (0..len).map(|i| 3.0 + 0.1 * i as f64).collect();
        let c: Vec<f64> = (0..len).map(|i| -0.7 + 0.02 * i as f64).collect();
        let rhs: Vec<f64> = (0..len).map(|i| (i as f64).cos()).collect();
        let mut x = rhs.clone();
        let mut scratch = vec![0.0; 2 * n];
        unsafe {
            sweep_scalar(
                Coeffs { a: &a, b: &b, c: &c },
                Rhs::in_place(&mut x),
                base,
                n,
                1,
                DivisionMode::Exact,
                &mut scratch,
            );
        }
        for i in 0..n {
            let k = base + i;
            let mut lhs = b[k] * x[k];
            if i > 0 {
                lhs += a[k] * x[k - 1];
            }
            if i + 1 < n {
                lhs += c[k] * x[k + 1];
            }
            assert_relative_eq!(lhs, rhs[k], epsilon = 1e-12);
        }
        assert_eq!(&x[..base], &rhs[..base]);
    }
}
