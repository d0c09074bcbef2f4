//! # C API (FFI) Callback Table
//!
//! Native libraries that do their I/O through callbacks take a table of function pointers
//! plus an opaque user context. [`NsbStreamCallbacks`] is that table in C layout, and
//! [`StreamBridge::with_callbacks`] fills it in for one bridge:
//!
//! ```c
//! typedef struct NsbStreamCallbacks {
//!     void* context;
//!     ptrdiff_t (*read)(uint8_t* data, size_t count, void* context);        // may be NULL
//!     ptrdiff_t (*write)(const uint8_t* data, size_t count, void* context); // may be NULL
//!     int64_t (*seek)(int64_t offset, int whence, void* context);
//!     int64_t (*tell)(void* context);
//! } NsbStreamCallbacks;
//! ```
//!
//! Only the pointer matching the bridge's direction is set; the other is `NULL`.
//!
//! ## Error Handling
//!
//! Every callback returns `-1` on failure and never unwinds. With the `std` feature, panics
//! raised by the stream are caught at the boundary as well. The reason for the last failure
//! is available afterwards through [`StreamBridge::last_error`].

use crate::bridge::{Direction, IO_ERROR, Operation, POSITION_ERROR, StreamBridge};
use crate::stream::BridgeStream;
use core::ffi::{c_int, c_void};

/// Function pointer type for the read callback.
///
/// # Parameters
/// - `data`: Native buffer to fill
/// - `count`: Maximum number of bytes to deliver
/// - `context`: The bridge, as passed in [`NsbStreamCallbacks::context`]
///
/// # Returns
/// Bytes delivered, 0 at end of stream, -1 on failure
pub type NsbReadFn =
    unsafe extern "C" fn(data: *mut u8, count: usize, context: *mut c_void) -> isize;

/// Function pointer type for the write callback.
///
/// # Parameters
/// - `data`: Native buffer holding the bytes to write
/// - `count`: Number of bytes to write
/// - `context`: The bridge, as passed in [`NsbStreamCallbacks::context`]
///
/// # Returns
/// `count` on success, -1 on failure
pub type NsbWriteFn =
    unsafe extern "C" fn(data: *const u8, count: usize, context: *mut c_void) -> isize;

/// Function pointer type for the seek callback.
///
/// # Parameters
/// - `offset`: Signed offset relative to `whence`
/// - `whence`: 0 (`SEEK_SET`), 1 (`SEEK_CUR`) or 2 (`SEEK_END`)
/// - `context`: The bridge, as passed in [`NsbStreamCallbacks::context`]
///
/// # Returns
/// New absolute position, -1 on failure
pub type NsbSeekFn = unsafe extern "C" fn(offset: i64, whence: c_int, context: *mut c_void) -> i64;

/// Function pointer type for the tell callback.
///
/// # Returns
/// Current absolute position, -1 on failure
pub type NsbTellFn = unsafe extern "C" fn(context: *mut c_void) -> i64;

/// C-compatible callback table bound to a single [`StreamBridge`].
#[repr(C)]
#[derive(Debug)]
pub struct NsbStreamCallbacks {
    /// User context passed to every callback. Points at the bridge.
    pub context: *mut c_void,
    /// Read callback. `None` (null) on writing bridges.
    pub read: Option<NsbReadFn>,
    /// Write callback. `None` (null) on reading bridges.
    pub write: Option<NsbWriteFn>,
    /// Seek callback.
    pub seek: NsbSeekFn,
    /// Tell callback.
    pub tell: NsbTellFn,
}

impl<S: BridgeStream> StreamBridge<S> {
    /// Runs `native_call` with a callback table bound to this bridge.
    ///
    /// The table's context points at `self`, so it must not be used once `native_call`
    /// returns. Failures inside callbacks are recorded in [`StreamBridge::last_error`].
    pub fn with_callbacks<R>(&mut self, native_call: impl FnOnce(&NsbStreamCallbacks) -> R) -> R {
        let callbacks = unsafe { self.raw_callbacks() };
        native_call(&callbacks)
    }

    /// Builds a callback table whose context points at `self`.
    ///
    /// # Safety
    ///
    /// The table is valid only while `self` is neither moved nor dropped, and no other
    /// reference to `self` is used while native code may invoke the callbacks.
    pub unsafe fn raw_callbacks(&mut self) -> NsbStreamCallbacks {
        let (read, write): (Option<NsbReadFn>, Option<NsbWriteFn>) = match self.direction() {
            Direction::Reading => (Some(read_callback::<S> as NsbReadFn), None),
            Direction::Writing => (None, Some(write_callback::<S> as NsbWriteFn)),
        };

        NsbStreamCallbacks {
            context: self as *mut Self as *mut c_void,
            read,
            write,
            seek: seek_callback::<S>,
            tell: tell_callback::<S>,
        }
    }
}

/// Read trampoline. Context must be a `*mut StreamBridge<S>` or null.
unsafe extern "C" fn read_callback<S: BridgeStream>(
    data: *mut u8,
    count: usize,
    context: *mut c_void,
) -> isize {
    let bridge = context as *mut StreamBridge<S>;
    if bridge.is_null() {
        return IO_ERROR;
    }
    let read = |b: &mut StreamBridge<S>| unsafe { b.read(data, count) };
    unsafe { contain(bridge, Operation::Read, IO_ERROR, read) }
}

/// Write trampoline. Context must be a `*mut StreamBridge<S>` or null.
unsafe extern "C" fn write_callback<S: BridgeStream>(
    data: *const u8,
    count: usize,
    context: *mut c_void,
) -> isize {
    let bridge = context as *mut StreamBridge<S>;
    if bridge.is_null() {
        return IO_ERROR;
    }
    let write = |b: &mut StreamBridge<S>| unsafe { b.write(data, count) };
    unsafe { contain(bridge, Operation::Write, IO_ERROR, write) }
}

/// Seek trampoline. Context must be a `*mut StreamBridge<S>` or null.
unsafe extern "C" fn seek_callback<S: BridgeStream>(
    offset: i64,
    whence: c_int,
    context: *mut c_void,
) -> i64 {
    let bridge = context as *mut StreamBridge<S>;
    if bridge.is_null() {
        return POSITION_ERROR;
    }
    unsafe { contain(bridge, Operation::Seek, POSITION_ERROR, |b| b.seek(offset, whence)) }
}

/// Tell trampoline. Context must be a `*mut StreamBridge<S>` or null.
unsafe extern "C" fn tell_callback<S: BridgeStream>(context: *mut c_void) -> i64 {
    let bridge = context as *mut StreamBridge<S>;
    if bridge.is_null() {
        return POSITION_ERROR;
    }
    unsafe { contain(bridge, Operation::Tell, POSITION_ERROR, |b| b.tell()) }
}

/// Runs `f` on the bridge, turning a panic into `sentinel`.
///
/// # Safety
///
/// `bridge` must be valid and not aliased for the duration of the call.
#[cfg(feature = "std")]
unsafe fn contain<S: BridgeStream, T>(
    bridge: *mut StreamBridge<S>,
    operation: Operation,
    sentinel: T,
    f: impl FnOnce(&mut StreamBridge<S>) -> T,
) -> T {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    match catch_unwind(AssertUnwindSafe(|| f(unsafe { &mut *bridge }))) {
        Ok(result) => result,
        Err(_) => {
            unsafe { (*bridge).record_panic(operation) };
            sentinel
        }
    }
}

/// Runs `f` on the bridge. Without `std` panics cannot be caught; unwinding out of an
/// `extern "C"` function aborts.
///
/// # Safety
///
/// `bridge` must be valid and not aliased for the duration of the call.
#[cfg(not(feature = "std"))]
unsafe fn contain<S: BridgeStream, T>(
    bridge: *mut StreamBridge<S>,
    _operation: Operation,
    _sentinel: T,
    f: impl FnOnce(&mut StreamBridge<S>) -> T,
) -> T {
    f(unsafe { &mut *bridge })
}
