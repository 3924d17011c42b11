//! Backing-buffer allocator contract.
//!
//! The allocator is a type parameter of [`crate::Tensor`], checked entirely
//! at compile time: any type that is default-constructible, cloneable, and
//! exposes `allocate`/`deallocate` over the element type satisfies it. The
//! tensor routes every buffer replacement (resize, assignment) through its
//! allocator; the final buffer is released by `Vec`'s own drop when the last
//! handle to the tensor goes away.

/// Capability set a backing-storage allocator must provide.
///
/// Length arguments are in elements, not bytes. `deallocate` receives
/// ownership of the retired buffer so pooling allocators can recycle it; the
/// default simply drops it.
pub trait StorageAlloc<T>: Default + Clone {
    /// Produce a buffer of `len` initialized elements.
    fn allocate(&self, len: usize) -> Vec<T>;

    /// Release a buffer previously produced by `allocate`.
    fn deallocate(&self, buf: Vec<T>) {
        drop(buf);
    }
}

/// Default allocator: plain heap buffers filled with `T::default()`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemAlloc;

impl<T: Default + Clone> StorageAlloc<T> for SystemAlloc {
    fn allocate(&self, len: usize) -> Vec<T> {
        vec![T::default(); len]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::Tensor;

    /// Test allocator that counts allocate/deallocate calls.
    #[derive(Clone, Default)]
    struct CountingAlloc {
        allocs: Arc<AtomicUsize>,
        frees: Arc<AtomicUsize>,
    }

    impl<T: Default + Clone> StorageAlloc<T> for CountingAlloc {
        fn allocate(&self, len: usize) -> Vec<T> {
            self.allocs.fetch_add(1, Ordering::Relaxed);
            vec![T::default(); len]
        }

        fn deallocate(&self, buf: Vec<T>) {
            self.frees.fetch_add(1, Ordering::Relaxed);
            drop(buf);
        }
    }

    #[test]
    fn test_system_alloc_fills_defaults() {
        let buf: Vec<i32> = SystemAlloc.allocate(5);
        assert_eq!(buf, vec![0; 5]);
        StorageAlloc::<i32>::deallocate(&SystemAlloc, buf);
    }

    #[test]
    fn test_resize_goes_through_allocator() {
        let alloc = CountingAlloc::default();
        let t: Tensor<i32, 2, CountingAlloc> = Tensor::with_alloc([2, 3], alloc.clone());
        assert_eq!(alloc.allocs.load(Ordering::Relaxed), 1);
        assert_eq!(alloc.frees.load(Ordering::Relaxed), 0);

        // Size changes: a fresh buffer is allocated and the old one retired.
        t.resize([4, 4]);
        assert_eq!(alloc.allocs.load(Ordering::Relaxed), 2);
        assert_eq!(alloc.frees.load(Ordering::Relaxed), 1);

        // Same size, different extents: buffer is reused.
        t.resize([8, 2]);
        assert_eq!(alloc.allocs.load(Ordering::Relaxed), 2);
        assert_eq!(alloc.frees.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_assign_goes_through_allocator() {
        let alloc = CountingAlloc::default();
        let dst: Tensor<i32, 1, CountingAlloc> = Tensor::with_alloc([4], alloc.clone());
        let src: Tensor<i32, 1, CountingAlloc> = Tensor::with_alloc([6], CountingAlloc::default());

        dst.assign_from(&src);
        assert_eq!(dst.size(), 6);
        assert_eq!(alloc.allocs.load(Ordering::Relaxed), 2);
        assert_eq!(alloc.frees.load(Ordering::Relaxed), 1);
    }
}
