//! Solver front end and free-function entry points.

use crate::batch::BatchRequest;
use crate::element::TridScalar;
use crate::layout::BatchLayout;
use crate::options::SolveOptions;
use crate::Result;
#[cfg(feature = "parallel")]
use crate::TridError;

/// Batched tridiagonal solver.
///
/// Holds the [`SolveOptions`] and, when `num_threads` is set and the
/// `parallel` feature is enabled, a dedicated rayon pool that every solve runs
/// inside. Otherwise work is distributed over the global pool.
pub struct TridSolver {
    options: SolveOptions,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for TridSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TridSolver")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for TridSolver {
    fn default() -> Self {
        Self {
            options: SolveOptions::default(),
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }
}

impl TridSolver {
    pub fn new(options: SolveOptions) -> Result<Self> {
        #[cfg(feature = "parallel")]
        let pool = match options.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("trid-worker-{i}"))
                    .build()
                    .map_err(|e| TridError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        log::debug!(
            "tridiagonal solver: division={:?} num_threads={:?} min_parallel_len={}",
            options.division,
            options.num_threads,
            options.min_parallel_len
        );
        Ok(Self {
            options,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Solve every system along `solve_axis` in place.
    ///
    /// `a`, `b`, `c` and `d` share the padded layout described by `dims` and
    /// `pads`; on return `d` holds the solution. Padding elements are not
    /// read or written. Validation happens before any write.
    #[allow(clippy::too_many_arguments)]
    pub fn solve<T: TridScalar>(
        &self,
        a: &[T],
        b: &[T],
        c: &[T],
        d: &mut [T],
        solve_axis: usize,
        dims: &[usize],
        pads: &[usize],
    ) -> Result<()> {
        let layout = BatchLayout::new(dims, pads, solve_axis)?;
        let req = BatchRequest::in_place(a, b, c, d, layout)?;
        self.run(|| T::dispatch_batch(req, &self.options))
    }

    /// Like [`solve`](Self::solve), but `d` is left unchanged and the
    /// solution is added into `u`.
    #[allow(clippy::too_many_arguments)]
    pub fn solve_add<T: TridScalar>(
        &self,
        a: &[T],
        b: &[T],
        c: &[T],
        d: &[T],
        u: &mut [T],
        solve_axis: usize,
        dims: &[usize],
        pads: &[usize],
    ) -> Result<()> {
        let layout = BatchLayout::new(dims, pads, solve_axis)?;
        let req = BatchRequest::increment(a, b, c, d, u, layout)?;
        self.run(|| T::dispatch_batch(req, &self.options))
    }

    fn run<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            return pool.install(f);
        }
        f()
    }
}

/// Solve in place with default options. See [`TridSolver::solve`].
pub fn solve<T: TridScalar>(
    a: &[T],
    b: &[T],
    c: &[T],
    d: &mut [T],
    solve_axis: usize,
    dims: &[usize],
    pads: &[usize],
) -> Result<()> {
    TridSolver::default().solve(a, b, c, d, solve_axis, dims, pads)
}

/// Accumulate the solution into `u` with default options. See
/// [`TridSolver::solve_add`].
#[allow(clippy::too_many_arguments)]
pub fn solve_add<T: TridScalar>(
    a: &[T],
    b: &[T],
    c: &[T],
    d: &[T],
    u: &mut [T],
    solve_axis: usize,
    dims: &[usize],
    pads: &[usize],
) -> Result<()> {
    TridSolver::default().solve_add(a, b, c, d, u, solve_axis, dims, pads)
}

/// Single precision [`solve`] (`W = 8`).
pub fn solve_f32(
    a: &[f32],
    b: &[f32],
    c: &[f32],
    d: &mut [f32],
    solve_axis: usize,
    dims: &[usize],
    pads: &[usize],
) -> Result<()> {
    solve(a, b, c, d, solve_axis, dims, pads)
}

/// Double precision [`solve`] (`W = 4`).
pub fn solve_f64(
    a: &[f64],
    b: &[f64],
    c: &[f64],
    d: &mut [f64],
    solve_axis: usize,
    dims: &[usize],
    pads: &[usize],
) -> Result<()> {
    solve(a, b, c, d, solve_axis, dims, pads)
}

#[allow(clippy::too_many_arguments)]
pub fn solve_add_f32(
    a: &[f32],
    b: &[f32],
    c: &[f32],
    d: &[f32],
    u: &mut [f32],
    solve_axis: usize,
    dims: &[usize],
    pads: &[usize],
) -> Result<()> {
    solve_add(a, b, c, d, u, solve_axis, dims, pads)
}

#[allow(clippy::too_many_arguments)]
pub fn solve_add_f64(
    a: &[f64],
    b: &[f64],
    c: &[f64],
    d: &[f64],
    u: &mut [f64],
    solve_axis: usize,
    dims: &[usize],
    pads: &[usize],
) -> Result<()> {
    solve_add(a, b, c, d, u, solve_axis, dims, pads)
}
