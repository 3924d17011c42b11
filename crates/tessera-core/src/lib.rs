//! # tessera-core
//!
//! Concurrent fixed-rank tensor engine.
//!
//! Provides the foundational `Tensor<T, R, A>` type with:
//! - Flat storage with a precise coordinate-to-offset mapping (axis 0 contiguous)
//! - A reader/writer lock allowing many concurrent readers, exclusive writers
//! - Version-stamped iterators that detect use after a structural change,
//!   even across threads
//! - A compile-time allocator capability contract for the backing buffer
//!
//! ```
//! use tessera_core::Tensor;
//!
//! let t = Tensor::<i64, 2>::from_vec((0..6).collect(), [2, 3]).unwrap();
//! assert_eq!(t.at([0, 2]), Ok(4));
//!
//! let stale = t.iter();
//! t.resize([3, 3]);
//! assert!(stale.get().is_err()); // size changed: iterator invalidated
//! assert_eq!(t.iter().map(|v| v.unwrap()).count(), 9);
//! ```

pub mod alloc;
pub mod error;
pub mod iter;
pub mod prelude;
pub mod shape;
mod storage;
pub mod tensor;

pub use alloc::{StorageAlloc, SystemAlloc};
pub use error::TesseraError;
pub use iter::TensorIter;
pub use shape::Shape;
pub use tensor::{Matrix, Tensor};

pub type Result<T> = std::result::Result<T, TesseraError>;
