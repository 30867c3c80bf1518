//! Element types supported by the solvers.

use std::cell::RefCell;
use std::fmt::Debug;

use num_traits::Float;

use crate::batch::{solve_batch, BatchRequest};
use crate::options::SolveOptions;
use crate::transpose::NativeKernel;
use crate::Result;

/// Lane count for `f32` (eight lanes of a 256-bit register).
pub const F32_LANES: usize = 8;

/// Lane count for `f64` (four lanes of a 256-bit register).
pub const F64_LANES: usize = 4;

/// Floating-point element type of a tridiagonal batch.
///
/// Each implementation fixes its vector width at compile time and routes
/// batches to the sweeps instantiated for that width.
pub trait TridScalar: Float + Debug + Send + Sync + sealed::Sealed + 'static {
    /// Number of systems solved together by the vector sweeps.
    const LANES: usize;

    /// Cheap reciprocal estimate (bit-level seed plus two Newton-Raphson steps).
    ///
    /// Relative error is below `1e-5` (well above the rounding error of
    /// `1 / x`) for normal magnitudes the seed can represent. Larger
    /// magnitudes, zero, subnormals and non-finite values fall back to the
    /// exact `1 / x`.
    fn recip_approx(self) -> Self;

    /// Run `f` with a thread-local scratch buffer of exactly `len` elements.
    ///
    /// The buffer is reused across calls on the same thread. A nested call
    /// gets a fresh allocation instead.
    fn with_scratch<R>(len: usize, f: impl FnOnce(&mut [Self]) -> R) -> R;

    #[doc(hidden)]
    fn dispatch_batch(req: BatchRequest<'_, Self>, options: &SolveOptions) -> Result<()>;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

thread_local! {
    static SCRATCH_F32: RefCell<Vec<f32>> = const { RefCell::new(Vec::new()) };
    static SCRATCH_F64: RefCell<Vec<f64>> = const { RefCell::new(Vec::new()) };
}

macro_rules! impl_trid_scalar {
    ($t:ty, $magic:expr, $lanes:expr, $pool:ident) => {
        impl TridScalar for $t {
            const LANES: usize = $lanes;

            #[inline(always)]
            fn recip_approx(self) -> Self {
                let x = self.abs();
                let seed = $magic.checked_sub(x.to_bits()).map(<$t>::from_bits);
                let mut y = match seed {
                    Some(y) if y.is_normal() && x.is_normal() => y,
                    // zero, subnormal, non-finite, or too large for the seed
                    _ => return 1.0 / self,
                };
                y = y * (2.0 - x * y);
                y = y * (2.0 - x * y);
                y.copysign(self)
            }

            fn with_scratch<R>(len: usize, f: impl FnOnce(&mut [Self]) -> R) -> R {
                $pool.with(|cell| match cell.try_borrow_mut() {
                    Ok(mut buf) => {
                        if buf.len() < len {
                            buf.resize(len, 0.0);
                        }
                        f(&mut buf[..len])
                    }
                    // nested call: the pooled buffer is in use further up the stack
                    Err(_) => f(&mut vec![0.0; len]),
                })
            }

            fn dispatch_batch(req: BatchRequest<'_, Self>, options: &SolveOptions) -> Result<()> {
                solve_batch::<$t, $lanes, NativeKernel>(req, options)
            }
        }
    };
}

impl_trid_scalar!(f32, 0x7EF3_11C7u32, F32_LANES, SCRATCH_F32);
impl_trid_scalar!(f64, 0x7FDE_6238_22FC_16E6u64, F64_LANES, SCRATCH_F64);
