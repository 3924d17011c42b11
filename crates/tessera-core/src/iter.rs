//! Random-access iteration with staleness detection.
//!
//! A [`TensorIter`] is a cursor over the flat buffer of the tensor it was
//! created from. It carries the version stamp the tensor reported at
//! creation time; every element read re-validates that stamp, so an iterator
//! that survived a structural change fails with
//! [`TesseraError::IteratorInvalidated`] at the first point where stale data
//! would actually be observed. Arithmetic and comparison operate on the
//! index alone and never validate.
//!
//! One cursor type serves both directions: `Iterator` walks forward,
//! `DoubleEndedIterator` backward, so `.rev()` is the reverse family.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Weak;

use crate::error::TesseraError;
use crate::storage::Storage;
use crate::Result;

/// Cursor over a tensor's flat buffer, valid while the tensor keeps the
/// size it had when the cursor was created.
pub struct TensorIter<T, const R: usize> {
    storage: Weak<Storage<T, R>>,
    index: usize,
    end: usize,
    version: u64,
}

impl<T, const R: usize> TensorIter<T, R> {
    pub(crate) fn new(
        storage: Weak<Storage<T, R>>,
        index: usize,
        end: usize,
        version: u64,
    ) -> Self {
        Self {
            storage,
            index,
            end,
            version,
        }
    }

    /// Flat index this cursor currently points at.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Version stamp captured at creation time.
    pub fn captured_version(&self) -> u64 {
        self.version
    }

    /// Step the cursor by a signed offset without validating.
    pub fn advance(&mut self, delta: isize) {
        self.index = (self.index as isize + delta) as usize;
    }

    /// Signed index distance from `other` to `self`.
    pub fn offset_from(&self, other: &Self) -> isize {
        self.index as isize - other.index as isize
    }

    /// Whether the originating tensor still exists at the captured version.
    pub fn is_valid(&self) -> bool {
        match self.storage.upgrade() {
            Some(storage) => storage.version() == self.version,
            None => false,
        }
    }

    fn read_at(&self, index: usize) -> Result<T>
    where
        T: Clone,
    {
        let storage = self
            .storage
            .upgrade()
            .ok_or(TesseraError::TensorDropped)?;
        let guard = storage.cell.read();
        // Bumps happen under the write lock, so this load is stable for the
        // whole shared section.
        let current = storage.version.load(Ordering::Acquire);
        if current != self.version {
            return Err(TesseraError::IteratorInvalidated {
                captured: self.version,
                current,
            });
        }
        let size = guard.shape.size();
        if index >= size {
            return Err(TesseraError::IndexOutOfBounds { index, size });
        }
        Ok(guard.data[index].clone())
    }

    /// Read the element under the cursor, validating liveness and version.
    pub fn get(&self) -> Result<T>
    where
        T: Clone,
    {
        self.read_at(self.index)
    }
}

impl<T, const R: usize> Clone for TensorIter<T, R> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            index: self.index,
            end: self.end,
            version: self.version,
        }
    }
}

impl<T, const R: usize> fmt::Debug for TensorIter<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TensorIter(index={}, end={}, version={})",
            self.index, self.end, self.version
        )
    }
}

impl<T, const R: usize> PartialEq for TensorIter<T, R> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T, const R: usize> Eq for TensorIter<T, R> {}

impl<T, const R: usize> PartialOrd for TensorIter<T, R> {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl<T, const R: usize> Ord for TensorIter<T, R> {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.index.cmp(&other.index)
    }
}

impl<T: Clone, const R: usize> Iterator for TensorIter<T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        let item = self.read_at(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Clone, const R: usize> DoubleEndedIterator for TensorIter<T, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.end {
            return None;
        }
        self.end -= 1;
        Some(self.read_at(self.end))
    }
}

impl<T: Clone, const R: usize> ExactSizeIterator for TensorIter<T, R> {}
