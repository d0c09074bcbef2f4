//! Error types for bridge construction and callback failures.

use crate::allocate::AllocateError;
use crate::bridge::Direction;
use core::ffi::c_int;
use thiserror::Error;

/// Errors raised while creating a [`StreamBridge`](crate::StreamBridge).
///
/// These are the only errors surfaced to the caller directly. Anything that goes wrong once
/// native code is driving the callbacks becomes a [`CallbackError`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The stream does not support the direction the bridge was created for.
    #[error("The stream should be {}.", .requested.required_capability())]
    InvalidMode {
        /// Direction the bridge was requested for.
        requested: Direction,
    },

    /// A scratch buffer size of zero was configured.
    #[error("Scratch buffer size must be greater than zero")]
    InvalidBufferSize,

    /// The scratch buffer could not be allocated.
    #[error(transparent)]
    Allocate(#[from] AllocateError),
}

/// A failure that happened inside a callback and was converted into the native sentinel.
///
/// The native library only ever sees `-1`; the bridge keeps the most recent one of these so
/// the caller can report what actually went wrong once the native call returns.
#[derive(Debug, Error)]
pub enum CallbackError<E> {
    /// The underlying stream reported an error.
    #[error("Stream error: {0}")]
    Stream(E),

    /// A callback was invoked after the bridge was disposed.
    #[error("Callback invoked on a disposed bridge")]
    Closed,

    /// Native code passed a null buffer with a non-zero length.
    #[error("Null pointer provided for buffer parameter")]
    NullPointer,

    /// `read` was invoked on a writing bridge, or `write` on a reading bridge.
    #[error("Callback does not match the bridge direction")]
    WrongDirection,

    /// Native code passed a seek origin other than start, current or end.
    #[error("Invalid seek origin: {0}")]
    InvalidWhence(c_int),

    /// A write request was larger than can be reported back to native code.
    #[error("Byte count exceeds isize::MAX")]
    CountOverflow,

    /// The stream position does not fit in the native offset type.
    #[error("Stream position exceeds i64::MAX")]
    PositionOverflow,

    /// The stream panicked; the panic was caught at the callback boundary.
    #[error("Stream panicked inside a callback")]
    Panicked,
}

impl<E> CallbackError<E> {
    /// Returns the stream's own error, if this failure came from the stream.
    pub fn stream_error(&self) -> Option<&E> {
        match self {
            CallbackError::Stream(e) => Some(e),
            _ => None,
        }
    }
}
