//! Batch dispatch: split a validated layout into work items and run them.
//!
//! Systems are grouped along the lane dimension. Every full group of `W`
//! systems is one vector work item; when solving along axis 0 it runs the
//! transpose sweep, otherwise the lane sweep. The `lane_count % W` systems
//! left at the end of each outer row are scalar work items. Work items touch
//! disjoint elements and may run in any order or in parallel.

use crate::element::TridScalar;
use crate::layout::BatchLayout;
use crate::options::SolveOptions;
use crate::sweep::{sweep_lanes, sweep_scalar, sweep_transposed, Coeffs, Rhs};
use crate::threading::{current_num_threads, for_each_index};
use crate::transpose::LaneTranspose;
use crate::Result;

/// Buffers and layout of one batch, validated against each other.
#[doc(hidden)]
pub struct BatchRequest<'a, T> {
    coeffs: Coeffs<'a, T>,
    rhs: Rhs<'a, T>,
    layout: BatchLayout,
}

impl<'a, T: TridScalar> BatchRequest<'a, T> {
    /// Solve in place: `d` is overwritten with the solution.
    pub(crate) fn in_place(
        a: &'a [T],
        b: &'a [T],
        c: &'a [T],
        d: &'a mut [T],
        layout: BatchLayout,
    ) -> Result<Self> {
        check_coeffs(&layout, a, b, c)?;
        layout.check_buffer("d", d.len())?;
        Ok(Self {
            coeffs: Coeffs { a, b, c },
            rhs: Rhs::in_place(d),
            layout,
        })
    }

    /// Solve with `d` read-only, adding the solution into `u`.
    pub(crate) fn increment(
        a: &'a [T],
        b: &'a [T],
        c: &'a [T],
        d: &'a [T],
        u: &'a mut [T],
        layout: BatchLayout,
    ) -> Result<Self> {
        check_coeffs(&layout, a, b, c)?;
        layout.check_buffer("d", d.len())?;
        layout.check_buffer("u", u.len())?;
        Ok(Self {
            coeffs: Coeffs { a, b, c },
            rhs: Rhs::increment(d, u),
            layout,
        })
    }
}

fn check_coeffs<T>(layout: &BatchLayout, a: &[T], b: &[T], c: &[T]) -> Result<()> {
    layout.check_buffer("a", a.len())?;
    layout.check_buffer("b", b.len())?;
    layout.check_buffer("c", c.len())
}

/// One unit of independent work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkItem {
    /// `W` neighbouring systems starting at `lane`.
    Group { lane: usize, outer: usize },
    /// A single system.
    Single { lane: usize, outer: usize },
}

/// How a layout is split into work items for a lane width `W`.
#[derive(Debug, Clone, Copy)]
struct BatchPlan {
    groups_per_row: usize,
    singles_per_row: usize,
    rows: usize,
}

impl BatchPlan {
    fn new(layout: &BatchLayout, width: usize) -> Self {
        let lanes = layout.lane_count();
        Self {
            groups_per_row: lanes / width,
            singles_per_row: lanes % width,
            rows: layout.outer_count(),
        }
    }

    fn group_items(&self) -> usize {
        self.groups_per_row * self.rows
    }

    fn single_items(&self) -> usize {
        self.singles_per_row * self.rows
    }

    fn len(&self) -> usize {
        self.group_items() + self.single_items()
    }

    fn item(&self, index: usize, width: usize) -> WorkItem {
        if index < self.group_items() {
            let (outer, g) = (index / self.groups_per_row, index % self.groups_per_row);
            WorkItem::Group {
                lane: g * width,
                outer,
            }
        } else {
            let index = index - self.group_items();
            let (outer, s) = (index / self.singles_per_row, index % self.singles_per_row);
            WorkItem::Single {
                lane: self.groups_per_row * width + s,
                outer,
            }
        }
    }
}

/// Solve every system of `req`, `W` at a time where possible.
pub(crate) fn solve_batch<T, const W: usize, K>(
    req: BatchRequest<'_, T>,
    options: &SolveOptions,
) -> Result<()>
where
    T: TridScalar,
    K: LaneTranspose<T, W>,
{
    let BatchRequest {
        coeffs,
        rhs,
        layout,
    } = req;
    if layout.is_empty() {
        return Ok(());
    }

    let plan = BatchPlan::new(&layout, W);
    let n = layout.system_len();
    let mode = options.division;
    let parallel =
        layout.element_count() >= options.min_parallel_len && current_num_threads() > 1;
    log::debug!(
        "tridiagonal batch: dims={:?} axis={} width={} groups={} singles={} mode={:?} parallel={}",
        layout.dims(),
        layout.axis(),
        W,
        plan.group_items(),
        plan.single_items(),
        mode,
        parallel
    );

    let contiguous = layout.is_unit_stride();
    for_each_index(plan.len(), parallel, |index| match plan.item(index, W) {
        WorkItem::Group { lane, outer } => {
            let base = layout.system_offset(lane, outer);
            T::with_scratch(2 * n * W, |scratch| {
                // SAFETY: lanes `lane..lane + W` are below `lane_count`, so every
                // position lies inside the validated extent; groups are disjoint.
                unsafe {
                    if contiguous {
                        sweep_transposed::<T, W, K>(
                            coeffs,
                            rhs,
                            base,
                            n,
                            layout.lane_stride(),
                            mode,
                            scratch,
                        )
                    } else {
                        sweep_lanes::<T, W>(
                            coeffs,
                            rhs,
                            base,
                            n,
                            layout.system_stride(),
                            mode,
                            scratch,
                        )
                    }
                }
            });
        }
        WorkItem::Single { lane, outer } => {
            let base = layout.system_offset(lane, outer);
            T::with_scratch(2 * n, |scratch| {
                // SAFETY: as above, for a single system.
                unsafe {
                    sweep_scalar(
                        coeffs,
                        rhs,
                        base,
                        n,
                        layout.system_stride(),
                        mode,
                        scratch,
                    )
                }
            });
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DivisionMode;
    use crate::transpose::PortableKernel;
    use crate::TridError;

    #[test]
    fn test_plan_splits_groups_and_remainder() {
        // 11 systems along dimension 1 with width 8: one group, three singles.
        let layout = BatchLayout::new(&[5, 11], &[5, 11], 0).unwrap();
        let plan = BatchPlan::new(&layout, 8);
        assert_eq!(plan.group_items(), 1);
        assert_eq!(plan.single_items(), 3);
        assert_eq!(plan.item(0, 8), WorkItem::Group { lane: 0, outer: 0 });
        assert_eq!(plan.item(1, 8), WorkItem::Single { lane: 8, outer: 0 });
        assert_eq!(plan.item(3, 8), WorkItem::Single { lane: 10, outer: 0 });
    }

    #[test]
    fn test_plan_covers_every_system_once() {
        let layout = BatchLayout::new(&[10, 6, 3], &[12, 6, 3], 1).unwrap();
        let plan = BatchPlan::new(&layout, 4);
        let mut seen = vec![0usize; layout.system_count()];
        for i in 0..plan.len() {
            match plan.item(i, 4) {
                WorkItem::Group { lane, outer } => {
                    for l in lane..lane + 4 {
                        seen[outer * layout.lane_count() + l] += 1;
                    }
                }
                WorkItem::Single { lane, outer } => seen[outer * layout.lane_count() + lane] += 1,
            }
        }
        assert!(seen.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_width_larger_than_lane_count_is_all_scalar() {
        let layout = BatchLayout::new(&[7, 3], &[7, 3], 1).unwrap();
        let plan = BatchPlan::new(&layout, 8);
        assert_eq!(plan.group_items(), 0);
        assert_eq!(plan.single_items(), 7);
    }

    #[test]
    fn test_short_output_rejected_before_writes() {
        let layout = BatchLayout::new(&[4, 2], &[4, 2], 0).unwrap();
        let coeff = vec![1.0f64; 8];
        let d = vec![1.0f64; 8];
        let mut u = vec![3.0f64; 7];
        let err = BatchRequest::increment(&coeff, &coeff, &coeff, &d, &mut u, layout);
        assert!(matches!(
            err,
            Err(TridError::BufferTooShort { name: "u", required: 8, actual: 7 })
        ));
        assert_eq!(u, vec![3.0; 7]);
    }

    #[test]
    fn test_solve_batch_runs_scalar_and_vector_items() {
        // Diagonal systems: x = d / b.
        let layout = BatchLayout::new(&[3, 6], &[4, 6], 0).unwrap();
        let len = layout.required_len();
        let a = vec![0.0f64; len];
        let c = vec![0.0f64; len];
        let b = vec![2.0f64; len];
        let mut d: Vec<f64> = (0..len).map(|i| i as f64).collect();
        let req = BatchRequest::in_place(&a, &b, &c, &mut d, layout).unwrap();
        let options = SolveOptions::default().with_division(DivisionMode::Exact);
        solve_batch::<f64, 4, PortableKernel>(req, &options).unwrap();
        for lane in 0..6 {
            for i in 0..3 {
                let k = lane * 4 + i;
                assert_eq!(d[k], k as f64 / 2.0);
            }
            if lane < 5 {
                // padding row element untouched
                assert_eq!(d[lane * 4 + 3], (lane * 4 + 3) as f64);
            }
        }
    }
}
