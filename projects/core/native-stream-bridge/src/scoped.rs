//! Scoped helpers that tie a bridge's lifetime to a single native call.
//!
//! The bridge is created right before `native_call` runs and disposed as soon as it returns,
//! including when it panics, so callers never have to remember to clean up.

use crate::bridge::{StreamBridge, StreamBridgeBuilder};
use crate::c_api::NsbStreamCallbacks;
use crate::error::{BridgeError, CallbackError};
use crate::stream::BridgeStream;

/// Result of a native call made through a scoped bridge.
#[derive(Debug)]
pub struct CallOutcome<R, E> {
    /// Whatever the native call returned.
    pub value: R,
    /// The last failure a callback reported to native code as `-1`, if any.
    ///
    /// Native libraries usually turn a `-1` into their own generic error; this carries the
    /// underlying reason.
    pub last_error: Option<CallbackError<E>>,
}

impl<R, E> CallOutcome<R, E> {
    /// Whether every callback during the call succeeded.
    pub fn is_clean(&self) -> bool {
        self.last_error.is_none()
    }
}

impl<S: BridgeStream> StreamBridge<S> {
    /// Runs `native_call` with this bridge's callbacks, then disposes the bridge.
    pub fn run<R>(
        mut self,
        native_call: impl FnOnce(&NsbStreamCallbacks) -> R,
    ) -> CallOutcome<R, S::Error> {
        let value = self.with_callbacks(native_call);
        let last_error = self.take_last_error();
        self.dispose();

        CallOutcome { value, last_error }
    }
}

impl StreamBridgeBuilder {
    /// Builds a reading bridge over `stream` and runs `native_call` with its callbacks.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] if the bridge cannot be created; `native_call` is not run.
    pub fn read_with_callbacks<S: BridgeStream, R>(
        self,
        stream: S,
        native_call: impl FnOnce(&NsbStreamCallbacks) -> R,
    ) -> Result<CallOutcome<R, S::Error>, BridgeError> {
        Ok(self.for_reading(stream)?.run(native_call))
    }

    /// Builds a writing bridge over `stream` and runs `native_call` with its callbacks.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] if the bridge cannot be created; `native_call` is not run.
    pub fn write_with_callbacks<S: BridgeStream, R>(
        self,
        stream: S,
        native_call: impl FnOnce(&NsbStreamCallbacks) -> R,
    ) -> Result<CallOutcome<R, S::Error>, BridgeError> {
        Ok(self.for_writing(stream)?.run(native_call))
    }
}

/// Lets native code read from `stream` for the duration of `native_call`.
///
/// Uses the default scratch buffer size; see [`StreamBridgeBuilder::read_with_callbacks`]
/// to change it.
///
/// # Errors
///
/// Returns [`BridgeError`] if the bridge cannot be created; `native_call` is not run.
pub fn read_with_callbacks<S: BridgeStream, R>(
    stream: S,
    native_call: impl FnOnce(&NsbStreamCallbacks) -> R,
) -> Result<CallOutcome<R, S::Error>, BridgeError> {
    StreamBridgeBuilder::new().read_with_callbacks(stream, native_call)
}

/// Lets native code write to `stream` for the duration of `native_call`.
///
/// Uses the default scratch buffer size; see [`StreamBridgeBuilder::write_with_callbacks`]
/// to change it.
///
/// # Errors
///
/// Returns [`BridgeError`] if the bridge cannot be created; `native_call` is not run.
pub fn write_with_callbacks<S: BridgeStream, R>(
    stream: S,
    native_call: impl FnOnce(&NsbStreamCallbacks) -> R,
) -> Result<CallOutcome<R, S::Error>, BridgeError> {
    StreamBridgeBuilder::new().write_with_callbacks(stream, native_call)
}
