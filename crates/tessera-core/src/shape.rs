use std::fmt;

use crate::error::TesseraError;
use crate::Result;

/// Fixed-rank tensor shape: axis extents plus the cached element count.
///
/// The rank is part of the type, so a `Shape<2>` can never silently become
/// three-dimensional. Axis 0 is the fastest-varying axis: `stride(0) == 1`
/// and `stride(i)` is the product of all extents below axis `i`. This is the
/// dual of the usual row-major convention and is what the offset formula in
/// [`Shape::offset`] encodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape<const R: usize> {
    dims: [usize; R],
    size: usize,
}

impl<const R: usize> Shape<R> {
    /// Create a shape from axis extents.
    ///
    /// # Panics
    /// Panics if the product of extents overflows `usize`.
    pub fn new(dims: [usize; R]) -> Self {
        let mut size: usize = 1;
        for &d in &dims {
            size = size
                .checked_mul(d)
                .expect("tensor size overflows usize");
        }
        Self { dims, size }
    }

    /// Number of axes.
    pub const fn rank(&self) -> usize {
        R
    }

    /// Axis extents.
    pub fn dims(&self) -> &[usize; R] {
        &self.dims
    }

    /// Extent of a single axis.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    /// Total number of elements (cached product of extents).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Per-axis stride with axis 0 contiguous.
    pub fn strides(&self) -> [usize; R] {
        let mut strides = [1usize; R];
        for i in 1..R {
            strides[i] = strides[i - 1] * self.dims[i - 1];
        }
        strides
    }

    /// Map coordinates to a flat offset.
    ///
    /// `offset = sum(coords[i] * stride(i))`, accumulating the stride as the
    /// running product of extents. Each coordinate is checked against its
    /// axis extent before it contributes.
    pub fn offset(&self, coords: &[usize; R]) -> Result<usize> {
        let mut offset = 0usize;
        let mut multiplier = 1usize;
        for axis in 0..R {
            if coords[axis] >= self.dims[axis] {
                return Err(TesseraError::CoordOutOfBounds {
                    axis,
                    index: coords[axis],
                    extent: self.dims[axis],
                });
            }
            offset += coords[axis] * multiplier;
            multiplier *= self.dims[axis];
        }
        Ok(offset)
    }

    /// Recompute the cached size from the extents and return it.
    pub(crate) fn recompute(&mut self) -> usize {
        self.size = self.dims.iter().product();
        self.size
    }
}

impl<const R: usize> fmt::Debug for Shape<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.dims)
    }
}

impl<const R: usize> fmt::Display for Shape<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl<const R: usize> From<[usize; R]> for Shape<R> {
    fn from(dims: [usize; R]) -> Self {
        Shape::new(dims)
    }
}
