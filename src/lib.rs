//! Batched tridiagonal solvers for padded strided multidimensional arrays.
//!
//! Solves many independent systems
//! `a[i]·x[i-1] + b[i]·x[i] + c[i]·x[i+1] = d[i]` laid out along one axis of a
//! 1-, 2- or 3-dimensional array, as produced by line sweeps in ADI-type
//! structured-grid schemes. Each system is solved with the (unpivoted) Thomas
//! algorithm; the batch is vectorized across systems:
//!
//! - Along axis 0 (stride 1) each system is contiguous, so `W` systems are
//!   loaded block by block and transposed into lane order before running the
//!   recurrence ([`sweep::solve_contiguous`]).
//! - Along any other axis position `i` of `W` neighbouring systems is already
//!   contiguous, so the recurrence runs directly on lane registers
//!   ([`sweep::solve_interleaved`]).
//! - Systems that don't fill a full group of `W` fall back to the scalar sweep
//!   ([`sweep::solve_system`]).
//!
//! # Core Types
//!
//! - [`TridScalar`]: element types (`f32` with `W = 8`, `f64` with `W = 4`)
//! - [`Lanes`]: fixed-width register type used by the vector sweeps
//! - [`LaneTranspose`]: array-order ⇄ lane-order transpose kernels
//! - [`BatchLayout`]: validated shape descriptor (dims, padding, solve axis)
//! - [`TridSolver`] / [`SolveOptions`]: solver front end and configuration
//!
//! # Example
//!
//! ```rust
//! use strided_trid::solve_f64;
//!
//! // Two systems of length 4 along axis 0, padded to 8 elements each.
//! let (n, pad, count) = (4, 8, 2);
//! let len = pad * count;
//! let mut a = vec![0.0; len];
//! let mut b = vec![0.0; len];
//! let mut c = vec![0.0; len];
//! let mut d = vec![0.0; len];
//! for s in 0..count {
//!     for i in 0..n {
//!         let k = s * pad + i;
//!         a[k] = if i == 0 { 0.0 } else { -1.0 };
//!         b[k] = 2.0;
//!         c[k] = if i == n - 1 { 0.0 } else { -1.0 };
//!         d[k] = if i == 0 || i == n - 1 { 1.0 } else { 0.0 };
//!     }
//! }
//!
//! solve_f64(&a, &b, &c, &mut d, 0, &[n, count], &[pad, count]).unwrap();
//! assert!((d[0] - 1.0).abs() < 1e-12);
//! assert!((d[pad + 3] - 1.0).abs() < 1e-12);
//! ```
//!
//! # Features
//!
//! - `parallel` (default): distribute work items over rayon workers.
//! - `simd`: use hand-written AVX transpose kernels when the build targets AVX.

mod batch;
mod element;
mod lanes;
mod layout;
mod options;
mod solver;
pub mod sweep;
mod threading;
pub mod transpose;

#[doc(hidden)]
pub use batch::BatchRequest;
pub use element::{TridScalar, F32_LANES, F64_LANES};
pub use lanes::Lanes;
pub use layout::{BatchLayout, MAX_RANK};
pub use options::{DivisionMode, SolveOptions};
pub use solver::{
    solve, solve_add, solve_add_f32, solve_add_f64, solve_f32, solve_f64, TridSolver,
};
pub use transpose::{LaneTranspose, NativeKernel, PortableKernel};

/// Minimum number of array elements to justify multi-threaded execution.
pub const MIN_THREAD_LENGTH: usize = 1 << 15;

/// Errors reported by the batched solvers.
///
/// Every variant is raised during validation, before any output is written.
#[derive(Debug, thiserror::Error)]
pub enum TridError {
    /// Number of dimensions outside the supported range.
    #[error("unsupported rank {0} (expected 1..={max})", max = MAX_RANK)]
    UnsupportedRank(usize),

    /// `dims` and `pads` describe a different number of dimensions.
    #[error("dims has {dims} entries but pads has {pads}")]
    ShapeLengthMismatch { dims: usize, pads: usize },

    /// Solve axis is not a dimension of the array.
    #[error("invalid solve axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Padded size is smaller than the logical size.
    #[error("padding {pad} smaller than size {size} for dim {dim}")]
    PaddingTooSmall { dim: usize, size: usize, pad: usize },

    /// A buffer cannot hold every element addressed by the layout.
    #[error("buffer `{name}` too short: need {required} elements, got {actual}")]
    BufferTooShort {
        name: &'static str,
        required: usize,
        actual: usize,
    },

    /// Integer overflow while computing strides or buffer extents.
    #[error("offset overflow while computing layout")]
    OffsetOverflow,

    /// Sweep geometry would make systems or positions overlap.
    #[error("stride {stride} too small (need at least {required})")]
    StrideTooSmall { stride: usize, required: usize },

    /// Transpose kernels only exist for power-of-two lane widths.
    #[error("lane width {0} is not a power of two")]
    UnsupportedWidth(usize),

    /// Dedicated worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, TridError>;
