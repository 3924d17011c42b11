use std::fmt;
use std::mem;
use std::sync::Arc;

use parking_lot::RwLockWriteGuard;

use crate::alloc::{StorageAlloc, SystemAlloc};
use crate::error::TesseraError;
use crate::iter::TensorIter;
use crate::shape::Shape;
use crate::storage::{Storage, StorageInner};
use crate::Result;

/// A fixed-rank multi-dimensional array safe to share across threads.
///
/// The rank is a const parameter, so a `Tensor<f64, 2>` and a
/// `Tensor<f64, 3>` are different types and a tensor always has a declared
/// shape — there is no shapeless default construction. Elements live in one
/// flat buffer with axis 0 contiguous (`stride(0) == 1`); see
/// [`Shape::offset`] for the exact coordinate mapping.
///
/// Every instance owns a fresh reader/writer lock over its extents and
/// buffer. Coordinate reads take the shared half, so any number of threads
/// can call [`at`](Tensor::at) concurrently; structural mutation (resize,
/// assignment) takes the exclusive half and bumps the version counter
/// whenever the element count changes, which invalidates every outstanding
/// iterator. Cloning deep-copies under the source's shared lock: no two
/// tensors ever alias a buffer.
///
/// # Examples
///
/// ```
/// use tessera_core::Tensor;
///
/// let t: Tensor<i32, 2> = Tensor::new([2, 3]);
/// assert_eq!(t.size(), 6);
/// t.set_at([1, 0], 7).unwrap();
/// assert_eq!(t.at([1, 0]), Ok(7));
/// assert_eq!(t.get(1), Ok(7)); // offset([1, 0]) == 1
/// ```
pub struct Tensor<T, const R: usize, A = SystemAlloc> {
    storage: Arc<Storage<T, R>>,
    alloc: A,
}

/// Rank-2 tensor.
pub type Matrix<T, A = SystemAlloc> = Tensor<T, 2, A>;

impl<T, const R: usize, A: StorageAlloc<T>> Tensor<T, R, A> {
    /// Create a tensor with the given extents, elements allocator-initialized.
    ///
    /// # Panics
    /// Panics if the product of extents overflows `usize`.
    pub fn new(dims: [usize; R]) -> Self {
        Self::with_alloc(dims, A::default())
    }

    /// Create a tensor using a specific allocator instance.
    pub fn with_alloc(dims: [usize; R], alloc: A) -> Self {
        let shape = Shape::new(dims);
        let data = alloc.allocate(shape.size());
        Self {
            storage: Storage::new(shape, data),
            alloc,
        }
    }

    /// Create a tensor that takes ownership of an existing buffer.
    ///
    /// Fails with [`TesseraError::LengthMismatch`] when the buffer length
    /// does not equal the product of extents.
    pub fn from_vec(data: Vec<T>, dims: [usize; R]) -> Result<Self> {
        let shape = Shape::new(dims);
        if data.len() != shape.size() {
            return Err(TesseraError::LengthMismatch {
                expected: shape.size(),
                got: data.len(),
            });
        }
        Ok(Self {
            storage: Storage::new(shape, data),
            alloc: A::default(),
        })
    }

    /// Create a tensor with every element set to `value`.
    pub fn from_elem(dims: [usize; R], value: T) -> Self
    where
        T: Clone,
    {
        let shape = Shape::new(dims);
        let data = vec![value; shape.size()];
        Self {
            storage: Storage::new(shape, data),
            alloc: A::default(),
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Number of axes.
    pub const fn rank(&self) -> usize {
        R
    }

    /// Axis extents, copied out under the shared lock.
    pub fn dimensions(&self) -> [usize; R] {
        *self.storage.cell.read().shape.dims()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.storage.cell.read().shape.size()
    }

    /// Per-axis strides (axis 0 contiguous).
    pub fn strides(&self) -> [usize; R] {
        self.storage.cell.read().shape.strides()
    }

    /// Current version of the structural state. Iterators captured at an
    /// older version fail on their next element read.
    pub fn version(&self) -> u64 {
        self.storage.version()
    }

    /// Snapshot copy of the backing buffer in flat order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.storage.cell.read().data.clone()
    }

    // =========================================================================
    // Element access
    // =========================================================================

    /// Read the element at a flat index.
    pub fn get(&self, index: usize) -> Result<T>
    where
        T: Clone,
    {
        let guard = self.storage.cell.read();
        let size = guard.shape.size();
        if index >= size {
            return Err(TesseraError::IndexOutOfBounds { index, size });
        }
        Ok(guard.data[index].clone())
    }

    /// Write the element at a flat index. Value writes leave the version
    /// untouched: outstanding iterators stay valid.
    pub fn set(&self, index: usize, value: T) -> Result<()> {
        let mut guard = self.storage.cell.write();
        let size = guard.shape.size();
        if index >= size {
            return Err(TesseraError::IndexOutOfBounds { index, size });
        }
        guard.data[index] = value;
        Ok(())
    }

    /// Read the element at the given coordinates.
    pub fn at(&self, coords: [usize; R]) -> Result<T>
    where
        T: Clone,
    {
        let guard = self.storage.cell.read();
        let index = guard.shape.offset(&coords)?;
        Ok(guard.data[index].clone())
    }

    /// Write the element at the given coordinates.
    pub fn set_at(&self, coords: [usize; R], value: T) -> Result<()> {
        let mut guard = self.storage.cell.write();
        let index = guard.shape.offset(&coords)?;
        guard.data[index] = value;
        Ok(())
    }

    // =========================================================================
    // Structural mutation
    // =========================================================================

    /// Bump the version, invalidating every outstanding iterator.
    pub fn invalidate_iterators(&self) {
        let guard = self.storage.cell.write();
        self.storage.bump_version();
        drop(guard);
    }

    /// Recompute the cached size from the extents and return it.
    ///
    /// If the fresh product differs from the cached value, iterators are
    /// invalidated before the cache is updated.
    pub fn recompute_size(&self) -> usize {
        let mut guard = self.storage.cell.write();
        let old = guard.shape.size();
        let fresh = guard.shape.recompute();
        if fresh != old {
            self.storage.bump_version();
        }
        fresh
    }

    /// Replace the extents, keeping the leading `min(old, new)` elements.
    ///
    /// Reallocates through the tensor's allocator and bumps the version only
    /// when the element count changes; a pure shape change over the same
    /// buffer length leaves iterators valid.
    pub fn resize(&self, dims: [usize; R])
    where
        T: Clone,
    {
        let mut guard = self.storage.cell.write();
        let new_shape = Shape::new(dims);
        if new_shape.size() != guard.shape.size() {
            self.replace_buffer(&mut guard, new_shape.size());
            self.storage.bump_version();
        }
        guard.shape = new_shape;
    }

    /// Deep copy-assignment from another tensor.
    ///
    /// Takes the destination's exclusive lock and the source's shared lock.
    /// The two locks are acquired in storage-address order, so concurrent
    /// `a.assign_from(&b)` and `b.assign_from(&a)` cannot deadlock. Bumps
    /// the destination's version iff its size changed.
    pub fn assign_from(&self, other: &Self)
    where
        T: Clone,
    {
        if Arc::ptr_eq(&self.storage, &other.storage) {
            return;
        }
        let dst_first =
            (Arc::as_ptr(&self.storage) as usize) < (Arc::as_ptr(&other.storage) as usize);
        let (mut dst, src) = if dst_first {
            let dst = self.storage.cell.write();
            let src = other.storage.cell.read();
            (dst, src)
        } else {
            let src = other.storage.cell.read();
            let dst = self.storage.cell.write();
            (dst, src)
        };

        let size_changed = dst.shape.size() != src.shape.size();
        if size_changed {
            self.replace_buffer(&mut dst, src.shape.size());
        }
        dst.data.clone_from_slice(&src.data);
        dst.shape = src.shape;
        if size_changed {
            self.storage.bump_version();
        }
    }

    /// Swap the buffer for a freshly allocated one of `new_len` elements,
    /// preserving the leading `min(old, new)` values.
    fn replace_buffer(&self, guard: &mut RwLockWriteGuard<'_, StorageInner<T, R>>, new_len: usize)
    where
        T: Clone,
    {
        let mut fresh = self.alloc.allocate(new_len);
        let keep = guard.data.len().min(new_len);
        fresh[..keep].clone_from_slice(&guard.data[..keep]);
        let old = mem::replace(&mut guard.data, fresh);
        self.alloc.deallocate(old);
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Cursor over the whole flat range, stamped with the current version.
    pub fn iter(&self) -> TensorIter<T, R> {
        let guard = self.storage.cell.read();
        let end = guard.shape.size();
        TensorIter::new(Arc::downgrade(&self.storage), 0, end, self.storage.version())
    }

    /// Cursor over the flat sub-range `start..end`, for partitioning work
    /// across threads. Fails when the range exceeds the current size or is
    /// inverted.
    pub fn iter_range(&self, start: usize, end: usize) -> Result<TensorIter<T, R>> {
        let guard = self.storage.cell.read();
        let size = guard.shape.size();
        if end > size {
            return Err(TesseraError::IndexOutOfBounds { index: end, size });
        }
        if start > end {
            return Err(TesseraError::IndexOutOfBounds {
                index: start,
                size: end,
            });
        }
        Ok(TensorIter::new(
            Arc::downgrade(&self.storage),
            start,
            end,
            self.storage.version(),
        ))
    }
}

impl<T: Clone, const R: usize, A: StorageAlloc<T>> Clone for Tensor<T, R, A> {
    /// Deep copy under the source's shared lock. The copy gets its own lock
    /// and a fresh version history; iterators of the source never observe
    /// the copy.
    fn clone(&self) -> Self {
        let src = self.storage.cell.read();
        Self {
            storage: Storage::new(src.shape, src.data.clone()),
            alloc: self.alloc.clone(),
        }
    }
}

impl<T, const R: usize, A> fmt::Debug for Tensor<T, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.storage.cell.read();
        write!(
            f,
            "Tensor(shape={}, size={}, version={})",
            guard.shape,
            guard.shape.size(),
            self.storage.version()
        )
    }
}

/// Matrix pretty-printer: elements in flat order, padded to the widest
/// rendered element, one line per `dims[0]` elements. Because axis 0 is
/// contiguous, consecutive elements of a line share their second coordinate.
impl<T: fmt::Display, A> fmt::Display for Tensor<T, 2, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.storage.cell.read();
        let rows = guard.shape.dims()[0];
        if rows == 0 || guard.data.is_empty() {
            return Ok(());
        }
        let cells: Vec<String> = guard.data.iter().map(|v| v.to_string()).collect();
        let width = cells.iter().map(|s| s.len()).max().unwrap_or(0);
        for (i, cell) in cells.iter().enumerate() {
            write!(f, "{cell:>width$} ")?;
            if i % rows == rows - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_size_is_product() {
        let t: Tensor<f64, 3> = Tensor::new([2, 3, 4]);
        assert_eq!(t.rank(), 3);
        assert_eq!(t.size(), 24);
        assert_eq!(t.dimensions(), [2, 3, 4]);
        assert_eq!(t.version(), 0);
    }

    #[test]
    fn test_new_fills_defaults() {
        let t: Tensor<i32, 1> = Tensor::new([5]);
        assert_eq!(t.to_vec(), vec![0; 5]);
    }

    #[test]
    fn test_from_vec_validates_length() {
        let err = Tensor::<i32, 2>::from_vec(vec![1, 2, 3], [2, 2]).unwrap_err();
        assert_eq!(
            err,
            TesseraError::LengthMismatch {
                expected: 4,
                got: 3,
            }
        );
        let t = Tensor::<i32, 2>::from_vec(vec![1, 2, 3, 4], [2, 2]).unwrap();
        assert_eq!(t.to_vec(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_from_elem() {
        let t: Tensor<u8, 2> = Tensor::from_elem([3, 3], 7);
        assert_eq!(t.to_vec(), vec![7; 9]);
    }

    #[test]
    fn test_coordinate_mapping() {
        // The [2, 3] scenario: flat ramp 0..6, axis 0 contiguous.
        let t = Tensor::<i32, 2>::from_vec((0..6).collect(), [2, 3]).unwrap();
        assert_eq!(t.at([1, 0]), Ok(1));
        assert_eq!(t.at([0, 2]), Ok(4));
        assert_eq!(t.at([1, 2]), Ok(5));
        assert_eq!(t.strides(), [1, 2]);
    }

    #[test]
    fn test_at_out_of_bounds() {
        let t: Tensor<i32, 2> = Tensor::new([2, 3]);
        assert_eq!(
            t.at([2, 0]),
            Err(TesseraError::CoordOutOfBounds {
                axis: 0,
                index: 2,
                extent: 2,
            })
        );
        assert_eq!(
            t.at([0, 3]),
            Err(TesseraError::CoordOutOfBounds {
                axis: 1,
                index: 3,
                extent: 3,
            })
        );
    }

    #[test]
    fn test_flat_access_rejects_size() {
        let t: Tensor<i32, 2> = Tensor::new([2, 3]);
        assert!(t.get(5).is_ok());
        // The boundary slot itself is out of range.
        assert_eq!(
            t.get(6),
            Err(TesseraError::IndexOutOfBounds { index: 6, size: 6 })
        );
        assert_eq!(
            t.set(6, 1),
            Err(TesseraError::IndexOutOfBounds { index: 6, size: 6 })
        );
    }

    #[test]
    fn test_set_and_set_at_agree() {
        let t: Tensor<i32, 2> = Tensor::new([2, 3]);
        t.set_at([1, 2], 42).unwrap();
        assert_eq!(t.get(5), Ok(42));
        t.set(5, 43).unwrap();
        assert_eq!(t.at([1, 2]), Ok(43));
    }

    #[test]
    fn test_value_writes_keep_version() {
        let t: Tensor<i32, 1> = Tensor::new([4]);
        t.set(0, 1).unwrap();
        t.set_at([3], 2).unwrap();
        assert_eq!(t.version(), 0);
    }

    #[test]
    fn test_clone_is_deep() {
        let a = Tensor::<i32, 2>::from_vec(vec![1, 2, 3, 4], [2, 2]).unwrap();
        let b = a.clone();
        b.set(0, 99).unwrap();
        assert_eq!(a.get(0), Ok(1));
        assert_eq!(b.get(0), Ok(99));
        assert_eq!(b.version(), 0);
    }

    #[test]
    fn test_resize_preserves_prefix() {
        let t = Tensor::<i32, 1>::from_vec(vec![1, 2, 3, 4], [4]).unwrap();
        t.resize([6]);
        assert_eq!(t.to_vec(), vec![1, 2, 3, 4, 0, 0]);
        assert_eq!(t.version(), 1);
        t.resize([2]);
        assert_eq!(t.to_vec(), vec![1, 2]);
        assert_eq!(t.version(), 2);
    }

    #[test]
    fn test_resize_same_size_keeps_version() {
        let t = Tensor::<i32, 2>::from_vec((0..6).collect(), [2, 3]).unwrap();
        t.resize([3, 2]);
        assert_eq!(t.version(), 0);
        assert_eq!(t.dimensions(), [3, 2]);
        assert_eq!(t.to_vec(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_recompute_size_is_stable() {
        let t: Tensor<i32, 2> = Tensor::new([2, 3]);
        assert_eq!(t.recompute_size(), 6);
        assert_eq!(t.version(), 0);
    }

    #[test]
    fn test_assign_from_copies_state() {
        let dst: Tensor<i32, 2> = Tensor::new([1, 1]);
        let src = Tensor::<i32, 2>::from_vec((0..6).collect(), [2, 3]).unwrap();
        dst.assign_from(&src);
        assert_eq!(dst.dimensions(), [2, 3]);
        assert_eq!(dst.to_vec(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(dst.version(), 1);

        // Independent after assignment.
        src.set(0, 77).unwrap();
        assert_eq!(dst.get(0), Ok(0));
    }

    #[test]
    fn test_assign_from_same_size_keeps_version() {
        let dst = Tensor::<i32, 1>::from_vec(vec![0, 0, 0], [3]).unwrap();
        let src = Tensor::<i32, 1>::from_vec(vec![1, 2, 3], [3]).unwrap();
        dst.assign_from(&src);
        assert_eq!(dst.to_vec(), vec![1, 2, 3]);
        assert_eq!(dst.version(), 0);
    }

    #[test]
    fn test_assign_self_is_noop() {
        let t = Tensor::<i32, 1>::from_vec(vec![1, 2], [2]).unwrap();
        t.assign_from(&t);
        assert_eq!(t.to_vec(), vec![1, 2]);
        assert_eq!(t.version(), 0);
    }

    #[test]
    fn test_invalidate_iterators_bumps_version() {
        let t: Tensor<i32, 1> = Tensor::new([2]);
        t.invalidate_iterators();
        t.invalidate_iterators();
        assert_eq!(t.version(), 2);
    }

    #[test]
    fn test_zero_extent_tensor() {
        let t: Tensor<i32, 2> = Tensor::new([0, 5]);
        assert_eq!(t.size(), 0);
        assert!(t.get(0).is_err());
        assert_eq!(t.iter().count(), 0);
    }

    #[test]
    fn test_rank_zero_scalar() {
        let t: Tensor<i32, 0> = Tensor::new([]);
        assert_eq!(t.size(), 1);
        t.set_at([], 5).unwrap();
        assert_eq!(t.at([]), Ok(5));
    }

    #[test]
    fn test_debug_format() {
        let t: Tensor<i32, 2> = Tensor::new([2, 3]);
        assert_eq!(format!("{t:?}"), "Tensor(shape=[2, 3], size=6, version=0)");
    }

    #[test]
    fn test_matrix_display() {
        let m = Matrix::<i32>::from_vec((0..6).collect(), [2, 3]).unwrap();
        assert_eq!(format!("{m}"), "0 1 \n2 3 \n4 5 \n");
    }

    #[test]
    fn test_matrix_display_pads_to_widest() {
        let m = Matrix::<i32>::from_vec(vec![1, 10, 100, 5], [2, 2]).unwrap();
        assert_eq!(format!("{m}"), "  1  10 \n100   5 \n");
    }
}
