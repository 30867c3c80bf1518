//! Fork-join execution of independent work items.
//!
//! Work items touch disjoint element sets, so the only shared mutable state is
//! the raw output pointer wrapped in [`SendPtr`].

/// A raw pointer wrapper that is `Send` + `Sync`.
///
/// # Safety
/// The caller must guarantee that the pointed-to data is valid for the
/// lifetime of any parallel operation and that no data races occur
/// (different threads write to disjoint elements).
pub(crate) struct SendPtr<T>(pub(crate) *mut T);

impl<T> Clone for SendPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SendPtr<T> {}

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    pub(crate) fn as_ptr(self) -> *mut T {
        self.0
    }

    pub(crate) fn as_const(self) -> *const T {
        self.0 as *const T
    }
}

/// Call `f(i)` for every `i in 0..count`, fanning out over rayon workers when
/// `parallel` is set. No ordering between items is guaranteed.
pub(crate) fn for_each_index<F>(count: usize, parallel: bool, f: F)
where
    F: Fn(usize) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if parallel && count > 1 {
            use rayon::iter::{IntoParallelIterator, ParallelIterator};
            (0..count).into_par_iter().for_each(f);
            return;
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    for i in 0..count {
        f(i);
    }
}

/// Number of workers available to the current rayon context.
pub(crate) fn current_num_threads() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}
