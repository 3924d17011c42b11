//! Shared storage cell behind every tensor.
//!
//! A tensor owns exactly one `Storage` through an `Arc`; iterators hold a
//! `Weak` to the same cell so a dereference after the tensor is gone fails
//! with [`crate::TesseraError::TensorDropped`] instead of touching freed
//! memory. The `Arc` is never shared between two tensors: cloning a tensor
//! deep-copies into a fresh cell with its own lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::shape::Shape;

/// Lock-guarded structural state: extents plus the flat element buffer.
pub(crate) struct StorageInner<T, const R: usize> {
    pub(crate) shape: Shape<R>,
    pub(crate) data: Vec<T>,
}

/// Version counter plus the reader/writer lock over the structural state.
///
/// The version lives outside the lock so iterators can stamp themselves
/// without blocking, but it is only ever bumped while the write half of
/// `cell` is held, so readers inside a shared section never observe a bump
/// mid-flight.
pub(crate) struct Storage<T, const R: usize> {
    pub(crate) version: AtomicU64,
    pub(crate) cell: RwLock<StorageInner<T, R>>,
}

impl<T, const R: usize> Storage<T, R> {
    pub(crate) fn new(shape: Shape<R>, data: Vec<T>) -> Arc<Self> {
        debug_assert_eq!(shape.size(), data.len());
        Arc::new(Self {
            version: AtomicU64::new(0),
            cell: RwLock::new(StorageInner { shape, data }),
        })
    }

    pub(crate) fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Bump the version. Callers must hold the write half of `cell`.
    pub(crate) fn bump_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }
}
