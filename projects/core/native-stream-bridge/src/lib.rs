#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]
#![cfg_attr(not(feature = "std"), no_std)]

/// Fixed address scratch buffer allocation.
pub mod allocate;

/// The bridge itself and its builder.
pub mod bridge;

/// C-compatible callback table and `extern "C"` trampolines.
pub mod c_api;

/// Construction and callback error types.
pub mod error;

/// Helpers that bind a bridge to the duration of one native call.
pub mod scoped;

/// The stream abstraction the bridge reads from and writes to.
pub mod stream;

#[cfg(test)]
pub(crate) mod test_prelude;

pub use allocate::{AllocateError, ScratchBuffer};
pub use bridge::{
    DEFAULT_BUFFER_SIZE, Direction, IO_ERROR, POSITION_ERROR, StreamBridge, StreamBridgeBuilder,
};
pub use c_api::{NsbReadFn, NsbSeekFn, NsbStreamCallbacks, NsbTellFn, NsbWriteFn};
pub use error::{BridgeError, CallbackError};
pub use scoped::{CallOutcome, read_with_callbacks, write_with_callbacks};
#[cfg(feature = "std")]
pub use stream::{ReadOnly, ReadWrite, WriteOnly};
pub use stream::{BridgeStream, SeekOrigin};
