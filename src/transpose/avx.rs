//! AVX shuffle networks for the native widths (`f64 × 4`, `f32 × 8`).

use std::arch::x86_64::*;

use super::LaneTranspose;
use crate::lanes::Lanes;

/// 256-bit AVX kernel.
pub struct AvxKernel;

impl LaneTranspose<f64, 4> for AvxKernel {
    #[inline(always)]
    fn transpose(regs: &mut [Lanes<f64, 4>; 4]) {
        // SAFETY: compiled only when the target has AVX; unaligned loads/stores
        // read and write exactly the four lanes of each register.
        unsafe {
            let r0 = _mm256_loadu_pd(regs[0].0.as_ptr());
            let r1 = _mm256_loadu_pd(regs[1].0.as_ptr());
            let r2 = _mm256_loadu_pd(regs[2].0.as_ptr());
            let r3 = _mm256_loadu_pd(regs[3].0.as_ptr());

            let t0 = _mm256_unpacklo_pd(r0, r1);
            let t1 = _mm256_unpackhi_pd(r0, r1);
            let t2 = _mm256_unpacklo_pd(r2, r3);
            let t3 = _mm256_unpackhi_pd(r2, r3);

            _mm256_storeu_pd(regs[0].0.as_mut_ptr(), _mm256_permute2f128_pd::<0x20>(t0, t2));
            _mm256_storeu_pd(regs[1].0.as_mut_ptr(), _mm256_permute2f128_pd::<0x20>(t1, t3));
            _mm256_storeu_pd(regs[2].0.as_mut_ptr(), _mm256_permute2f128_pd::<0x31>(t0, t2));
            _mm256_storeu_pd(regs[3].0.as_mut_ptr(), _mm256_permute2f128_pd::<0x31>(t1, t3));
        }
    }
}

impl LaneTranspose<f32, 8> for AvxKernel {
    #[inline(always)]
    fn transpose(regs: &mut [Lanes<f32, 8>; 8]) {
        // SAFETY: see the f64 kernel.
        unsafe {
            let r: [__m256; 8] = std::array::from_fn(|k| _mm256_loadu_ps(regs[k].0.as_ptr()));

            let t0 = _mm256_unpacklo_ps(r[0], r[1]);
            let t1 = _mm256_unpackhi_ps(r[0], r[1]);
            let t2 = _mm256_unpacklo_ps(r[2], r[3]);
            let t3 = _mm256_unpackhi_ps(r[2], r[3]);
            let t4 = _mm256_unpacklo_ps(r[4], r[5]);
            let t5 = _mm256_unpackhi_ps(r[4], r[5]);
            let t6 = _mm256_unpacklo_ps(r[6], r[7]);
            let t7 = _mm256_unpackhi_ps(r[6], r[7]);

            let s0 = _mm256_shuffle_ps::<0x44>(t0, t2);
            let s1 = _mm256_shuffle_ps::<0xEE>(t0, t2);
            let s2 = _mm256_shuffle_ps::<0x44>(t1, t3);
            let s3 = _mm256_shuffle_ps::<0xEE>(t1, t3);
            let s4 = _mm256_shuffle_ps::<0x44>(t4, t6);
            let s5 = _mm256_shuffle_ps::<0xEE>(t4, t6);
            let s6 = _mm256_shuffle_ps::<0x44>(t5, t7);
            let s7 = _mm256_shuffle_ps::<0xEE>(t5, t7);

            let out = [
                _mm256_permute2f128_ps::<0x20>(s0, s4),
                _mm256_permute2f128_ps::<0x20>(s1, s5),
                _mm256_permute2f128_ps::<0x20>(s2, s6),
                _mm256_permute2f128_ps::<0x20>(s3, s7),
                _mm256_permute2f128_ps::<0x31>(s0, s4),
                _mm256_permute2f128_ps::<0x31>(s1, s5),
                _mm256_permute2f128_ps::<0x31>(s2, s6),
                _mm256_permute2f128_ps::<0x31>(s3, s7),
            ];
            for (reg, v) in regs.iter_mut().zip(out) {
                _mm256_storeu_ps(reg.0.as_mut_ptr(), v);
            }
        }
    }
}
