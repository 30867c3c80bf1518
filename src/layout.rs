//! Shape descriptor for a batch of systems inside a padded array.
//!
//! Dimension 0 varies fastest. The memory stride of dimension `i` is the
//! product of the padded sizes of dimensions `0..i`. Systems run along the
//! solve axis; the remaining (at most two) dimensions enumerate them:
//!
//! - the *lane* dimension, along which `W` neighbouring systems are grouped
//!   (dimension 1 when solving along axis 0, otherwise dimension 0), and
//! - the *outer* dimension, whatever is left (extent 1 if absent).

use crate::{Result, TridError};

/// Maximum number of array dimensions.
pub const MAX_RANK: usize = 3;

/// Validated strided layout of a tridiagonal batch.
///
/// Vector groups of `W` systems are only formed along the lane dimension; the
/// outer dimension is never vectorized. When the lane extent is smaller than
/// `W` every system runs through the scalar sweep, e.g. `dims = [256, 3, 256]`
/// solved along axis 0 has 3 lanes and 256 outer rows, so all 768 systems are
/// solved one at a time. Prefer layouts whose lane dimension is the larger
/// non-solve dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLayout {
    ndim: usize,
    axis: usize,
    dims: [usize; MAX_RANK],
    pads: [usize; MAX_RANK],
    strides: [usize; MAX_RANK],
    lane_dim: usize,
    outer_dim: usize,
    required: usize,
}

impl BatchLayout {
    /// Build a layout from logical sizes, padded sizes and the solve axis.
    ///
    /// `dims.len()` is the number of dimensions and must match `pads.len()`.
    pub fn new(dims: &[usize], pads: &[usize], axis: usize) -> Result<Self> {
        let ndim = dims.len();
        if ndim == 0 || ndim > MAX_RANK {
            return Err(TridError::UnsupportedRank(ndim));
        }
        if pads.len() != ndim {
            return Err(TridError::ShapeLengthMismatch {
                dims: ndim,
                pads: pads.len(),
            });
        }
        if axis >= ndim {
            return Err(TridError::InvalidAxis { axis, rank: ndim });
        }

        let mut full_dims = [1usize; MAX_RANK];
        let mut full_pads = [1usize; MAX_RANK];
        for (dim, (&size, &pad)) in dims.iter().zip(pads).enumerate() {
            if pad < size {
                return Err(TridError::PaddingTooSmall { dim, size, pad });
            }
            full_dims[dim] = size;
            full_pads[dim] = pad;
        }

        let mut strides = [1usize; MAX_RANK];
        for i in 1..MAX_RANK {
            strides[i] = strides[i - 1]
                .checked_mul(full_pads[i - 1])
                .ok_or(TridError::OffsetOverflow)?;
        }

        let required = if full_dims.contains(&0) {
            0
        } else {
            full_dims
                .iter()
                .zip(strides.iter())
                .try_fold(1usize, |acc, (&d, &s)| {
                    (d - 1).checked_mul(s).and_then(|span| acc.checked_add(span))
                })
                .ok_or(TridError::OffsetOverflow)?
        };

        let lane_dim = if axis == 0 { 1 } else { 0 };
        let outer_dim = (0..MAX_RANK)
            .find(|&d| d != axis && d != lane_dim)
            .unwrap_or(MAX_RANK - 1);

        Ok(Self {
            ndim,
            axis,
            dims: full_dims,
            pads: full_pads,
            strides,
            lane_dim,
            outer_dim,
            required,
        })
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims[..self.ndim]
    }

    pub fn pads(&self) -> &[usize] {
        &self.pads[..self.ndim]
    }

    /// Memory strides of the declared dimensions.
    pub fn strides(&self) -> &[usize] {
        &self.strides[..self.ndim]
    }

    /// Length `N` of every system.
    pub fn system_len(&self) -> usize {
        self.dims[self.axis]
    }

    /// Distance between consecutive elements of one system.
    pub fn system_stride(&self) -> usize {
        self.strides[self.axis]
    }

    /// Whether systems are contiguous in memory (solving along axis 0).
    pub fn is_unit_stride(&self) -> bool {
        self.axis == 0
    }

    /// Number of independent systems.
    pub fn system_count(&self) -> usize {
        self.lane_count() * self.outer_count()
    }

    /// Extent of the lane dimension.
    pub fn lane_count(&self) -> usize {
        self.dims[self.lane_dim]
    }

    /// Distance between the first elements of neighbouring systems in a group.
    pub fn lane_stride(&self) -> usize {
        self.strides[self.lane_dim]
    }

    /// Extent of the outer dimension.
    pub fn outer_count(&self) -> usize {
        self.dims[self.outer_dim]
    }

    pub fn outer_stride(&self) -> usize {
        self.strides[self.outer_dim]
    }

    /// Offset of the first element of the system at (`lane`, `outer`).
    #[inline]
    pub fn system_offset(&self, lane: usize, outer: usize) -> usize {
        lane * self.lane_stride() + outer * self.outer_stride()
    }

    /// Whether the batch contains no elements.
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// Number of logical (non-padding) elements.
    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Minimum buffer length covering every addressed element.
    pub fn required_len(&self) -> usize {
        self.required
    }

    /// Check that a buffer named `name` can hold the layout.
    pub fn check_buffer(&self, name: &'static str, len: usize) -> Result<()> {
        let required = self.required_len();
        if len < required {
            return Err(TridError::BufferTooShort {
                name,
                required,
                actual: len,
            });
        }
        Ok(())
    }

    /// Linear offset of a full multi-index.
    pub fn offset_of(&self, index: &[usize]) -> usize {
        debug_assert_eq!(index.len(), self.ndim);
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(&i, &s)| i * s)
            .sum()
    }
}
