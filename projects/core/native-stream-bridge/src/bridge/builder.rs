//! Builder for bridges with a non-default configuration.

use super::{DEFAULT_BUFFER_SIZE, Direction, StreamBridge};
use crate::error::BridgeError;
use crate::stream::BridgeStream;

/// Stream bridge configuration builder.
///
/// [`StreamBridge::for_reading`] and [`StreamBridge::for_writing`] cover the common case;
/// use this builder when the scratch buffer size needs tuning, for example to match the
/// block size of the underlying device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamBridgeBuilder {
    buffer_size: Option<usize>,
}

impl StreamBridgeBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self { buffer_size: None }
    }

    /// Set the scratch buffer size in bytes.
    ///
    /// Each callback moves data through this buffer in chunks of at most this many bytes.
    /// Defaults to [`DEFAULT_BUFFER_SIZE`]. Zero is rejected when the bridge is built.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Build a bridge through which native code reads from `stream`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidMode`] if the stream is not readable.
    /// - [`BridgeError::InvalidBufferSize`] if a buffer size of zero was set.
    /// - [`BridgeError::Allocate`] if the scratch buffer cannot be allocated.
    pub fn for_reading<S: BridgeStream>(self, stream: S) -> Result<StreamBridge<S>, BridgeError> {
        StreamBridge::new(stream, Direction::Reading, self.resolved_buffer_size())
    }

    /// Build a bridge through which native code writes to `stream`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidMode`] if the stream is not writable.
    /// - [`BridgeError::InvalidBufferSize`] if a buffer size of zero was set.
    /// - [`BridgeError::Allocate`] if the scratch buffer cannot be allocated.
    pub fn for_writing<S: BridgeStream>(self, stream: S) -> Result<StreamBridge<S>, BridgeError> {
        StreamBridge::new(stream, Direction::Writing, self.resolved_buffer_size())
    }

    fn resolved_buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }
}
