//! Array-order ⇄ lane-order transpose of a `W × W` register block.
//!
//! In array order register `k` holds `W` consecutive positions of system `k`.
//! In lane order register `j` holds position `j` of each of the `W` systems.
//! The transform is its own inverse, so the same kernel is used before the
//! forward sweep (after loading) and after the backward sweep (before storing).
//!
//! Kernels are keyed by element type and width so that each instruction set
//! can provide its own shuffle network without touching the sweeps.

mod portable;

#[cfg(all(feature = "simd", target_arch = "x86_64", target_feature = "avx"))]
mod avx;

#[cfg(all(feature = "simd", target_arch = "x86_64", target_feature = "avx"))]
pub use avx::AvxKernel;
pub use portable::PortableKernel;

use crate::lanes::Lanes;

/// In-register `W × W` transpose.
pub trait LaneTranspose<T: Copy, const W: usize> {
    /// Transpose `regs` in place: lane `j` of register `k` moves to lane `k` of register `j`.
    fn transpose(regs: &mut [Lanes<T, W>; W]);
}

/// Kernel used by the batch dispatcher for the native lane widths.
#[cfg(all(feature = "simd", target_arch = "x86_64", target_feature = "avx"))]
pub type NativeKernel = AvxKernel;

/// Kernel used by the batch dispatcher for the native lane widths.
#[cfg(not(all(feature = "simd", target_arch = "x86_64", target_feature = "avx")))]
pub type NativeKernel = PortableKernel;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{F32_LANES, F64_LANES};

    fn block<T: Copy, const W: usize>(f: impl Fn(usize, usize) -> T) -> [Lanes<T, W>; W] {
        std::array::from_fn(|k| Lanes(std::array::from_fn(|j| f(k, j))))
    }

    #[test]
    fn test_native_kernel_transposes_f64() {
        let mut regs = block::<f64, F64_LANES>(|k, j| (k * 10 + j) as f64);
        <NativeKernel as LaneTranspose<f64, F64_LANES>>::transpose(&mut regs);
        for (j, reg) in regs.iter().enumerate() {
            for k in 0..F64_LANES {
                assert_eq!(reg.0[k], (k * 10 + j) as f64);
            }
        }
    }

    #[test]
    fn test_native_kernel_self_inverse_bitwise() {
        let orig = block::<f32, F32_LANES>(|k, j| ((k * 37 + j * 11) as f32).sin() * 1e3);
        let mut regs = orig;
        <NativeKernel as LaneTranspose<f32, F32_LANES>>::transpose(&mut regs);
        assert_ne!(regs, orig);
        <NativeKernel as LaneTranspose<f32, F32_LANES>>::transpose(&mut regs);
        for (a, b) in regs.iter().zip(orig.iter()) {
            for l in 0..F32_LANES {
                assert_eq!(a.0[l].to_bits(), b.0[l].to_bits());
            }
        }
    }
}
