//! Convenience re-exports for common tessera-core types.
//!
//! ```rust
//! use tessera_core::prelude::*;
//! ```

pub use crate::Matrix;
pub use crate::Result;
pub use crate::Shape;
pub use crate::StorageAlloc;
pub use crate::SystemAlloc;
pub use crate::Tensor;
pub use crate::TensorIter;
pub use crate::TesseraError;
