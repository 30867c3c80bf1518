//! Width-generic transpose built from interleave primitives.
//!
//! Each round pairs register `i` with register `i + W/2` and replaces them by
//! their low and high interleavings. After `log2(W)` rounds the block is
//! transposed; this is the same butterfly network the unpack-based
//! instruction-set kernels use, expressed on plain arrays.

use super::LaneTranspose;
use crate::lanes::Lanes;

/// Portable kernel for any element type and power-of-two width.
pub struct PortableKernel;

impl<T: Copy, const W: usize> LaneTranspose<T, W> for PortableKernel {
    #[inline(always)]
    fn transpose(regs: &mut [Lanes<T, W>; W]) {
        debug_assert!(W.is_power_of_two(), "lane width {W} is not a power of two");
        let half = W / 2;
        for _ in 0..W.trailing_zeros() {
            let src = *regs;
            for i in 0..half {
                regs[2 * i] = src[i].interleave_lo(src[i + half]);
                regs[2 * i + 1] = src[i].interleave_hi(src[i + half]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_transpose<const W: usize>() {
        let mut regs: [Lanes<f64, W>; W] =
            std::array::from_fn(|k| Lanes(std::array::from_fn(|j| (k * W + j) as f64)));
        PortableKernel::transpose(&mut regs);
        for j in 0..W {
            for k in 0..W {
                assert_eq!(regs[j].0[k], (k * W + j) as f64, "W={W} j={j} k={k}");
            }
        }
    }

    fn check_involution<const W: usize>() {
        let orig: [Lanes<f32, W>; W] = std::array::from_fn(|k| {
            Lanes(std::array::from_fn(|j| f32::from_bits(0x3f80_0000 + (k * 97 + j) as u32)))
        });
        let mut regs = orig;
        PortableKernel::transpose(&mut regs);
        PortableKernel::transpose(&mut regs);
        for k in 0..W {
            for j in 0..W {
                assert_eq!(regs[k].0[j].to_bits(), orig[k].0[j].to_bits());
            }
        }
    }

    #[test]
    fn test_portable_transpose_all_widths() {
        check_transpose::<1>();
        check_transpose::<2>();
        check_transpose::<4>();
        check_transpose::<8>();
        check_transpose::<16>();
    }

    #[test]
    fn test_portable_transpose_is_involution() {
        check_involution::<1>();
        check_involution::<2>();
        check_involution::<4>();
        check_involution::<8>();
        check_involution::<16>();
    }
}
