//! Error type shared by all tessera-core operations.

/// Errors from tensor access, mutation and iteration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TesseraError {
    /// Flat index is outside the backing buffer.
    #[error("flat index {index} out of bounds for tensor of size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    /// One coordinate of a multi-dimensional access exceeds its axis extent.
    #[error("coordinate {index} out of bounds for axis {axis} with extent {extent}")]
    CoordOutOfBounds {
        axis: usize,
        index: usize,
        extent: usize,
    },

    /// The tensor's size changed after this iterator was created.
    #[error("iterator invalidated: captured version {captured}, tensor is at {current}")]
    IteratorInvalidated { captured: u64, current: u64 },

    /// The tensor backing this iterator has been dropped.
    #[error("tensor backing this iterator no longer exists")]
    TensorDropped,

    /// Provided element count does not match the requested shape.
    #[error("data length {got} does not match shape size {expected}")]
    LengthMismatch { expected: usize, got: usize },
}
