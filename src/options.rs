//! Solver configuration.

use crate::MIN_THREAD_LENGTH;

/// Environment variable overriding the worker count.
pub const ENV_NUM_THREADS: &str = "TRID_NUM_THREADS";

/// Environment variable selecting the division mode (`exact` or `approx`).
pub const ENV_DIVISION: &str = "TRID_DIVISION";

/// How the sweeps divide by the eliminated diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DivisionMode {
    /// Correctly rounded `1 / b`.
    #[default]
    Exact,
    /// Reciprocal estimate refined by Newton-Raphson; faster, larger rounding error.
    Approximate,
}

impl DivisionMode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "div" => Some(DivisionMode::Exact),
            "approx" | "approximate" | "rcp" => Some(DivisionMode::Approximate),
            _ => None,
        }
    }
}

/// Options shared by every batch solved through a [`TridSolver`](crate::TridSolver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOptions {
    /// Division strategy used by all sweeps.
    pub division: DivisionMode,
    /// Dedicated worker count; `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
    /// Batches with fewer array elements than this run on the calling thread.
    pub min_parallel_len: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            division: DivisionMode::Exact,
            num_threads: None,
            min_parallel_len: MIN_THREAD_LENGTH,
        }
    }
}

impl SolveOptions {
    /// Default options with overrides taken from `TRID_NUM_THREADS` and `TRID_DIVISION`.
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();
        if let Some(raw) = lookup(ENV_NUM_THREADS) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => opts.num_threads = Some(n),
                _ => log::warn!("ignoring {ENV_NUM_THREADS}={raw:?}: expected a positive integer"),
            }
        }
        if let Some(raw) = lookup(ENV_DIVISION) {
            match DivisionMode::parse(&raw) {
                Some(mode) => opts.division = mode,
                None => log::warn!("ignoring {ENV_DIVISION}={raw:?}: expected `exact` or `approx`"),
            }
        }
        opts
    }

    pub fn with_division(mut self, division: DivisionMode) -> Self {
        self.division = division;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads.max(1));
        self
    }

    pub fn with_min_parallel_len(mut self, len: usize) -> Self {
        self.min_parallel_len = len;
        self
    }
}
