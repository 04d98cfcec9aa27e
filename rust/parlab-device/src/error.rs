//! Error types for the simulated device.

use parlab_matrix::dims::DimsError;
use thiserror::Error;

/// Errors raised by device buffers, streams, and kernel launches.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// A host-side slice does not match the device buffer's length.
    #[error("copy length mismatch: device buffer holds {expected} elements, host side has {got}")]
    CopyLength { expected: usize, got: usize },

    /// A device buffer does not hold the number of elements a launch expects.
    #[error("buffer length mismatch: launch expects {expected} elements, buffer holds {got}")]
    BufferLength { expected: usize, got: usize },

    /// A launch's index space extends past the output buffer.
    #[error("launch covers {elements} elements but the output buffer holds {len}")]
    LaunchOutOfBounds { elements: usize, len: usize },

    /// A grid was requested with a zero block size.
    #[error("grid block size must be nonzero")]
    ZeroBlockSize,

    /// The stream's dispatcher has shut down; no further commands are accepted.
    #[error("stream is shut down")]
    StreamShutDown,

    /// Operand dims were rejected before touching the device.
    #[error(transparent)]
    Dims(#[from] DimsError),
}

/// Errors raised by timeline events.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EventError {
    /// The event has no timestamp yet; it was never recorded on a stream
    /// (or the record command has not been reached).
    #[error("event has not been recorded")]
    NotRecorded,
}
