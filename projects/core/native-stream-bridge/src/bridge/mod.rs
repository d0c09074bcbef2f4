//! The stream bridge: copies bytes between native memory and a [`BridgeStream`].
//!
//! A [`StreamBridge`] is created for exactly one direction, right before a native operation
//! starts, and disposed as soon as it returns. Every entry point returns the native
//! convention directly: a byte count or position on success, `-1` on failure. Failures are
//! never propagated; the most recent one is kept in [`StreamBridge::last_error`].

mod builder;
pub use builder::*;

use crate::allocate::ScratchBuffer;
use crate::error::{BridgeError, CallbackError};
use crate::stream::{BridgeStream, SeekOrigin};
use core::ffi::c_int;
use core::fmt;
use log::{debug, error, trace, warn};

/// Default size of the scratch buffer data is staged through, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Returned by `read` and `write` when the operation failed.
pub const IO_ERROR: isize = -1;

/// Returned by `seek` and `tell` when the operation failed.
pub const POSITION_ERROR: i64 = -1;

/// Which way data flows through a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Native code reads from the stream.
    Reading,
    /// Native code writes to the stream.
    Writing,
}

impl Direction {
    pub(crate) fn required_capability(self) -> &'static str {
        match self {
            Direction::Reading => "readable",
            Direction::Writing => "writeable",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Reading => f.write_str("reading"),
            Direction::Writing => f.write_str("writing"),
        }
    }
}

/// Callback entry point, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Read,
    Write,
    Seek,
    Tell,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Seek => "seek",
            Operation::Tell => "tell",
        })
    }
}

/// Adapts a [`BridgeStream`] to the read/write/seek/tell callback contract of a native
/// library.
///
/// The bridge owns a fixed address [`ScratchBuffer`] and lends from the stream it was given;
/// pass `&mut stream` to keep ownership with the caller. Disposal (explicit through
/// [`StreamBridge::dispose`], or on drop) releases the buffer and stops referencing the
/// stream. After disposal every callback returns `-1`.
pub struct StreamBridge<S: BridgeStream> {
    direction: Direction,
    buffer_size: usize,
    scratch: Option<ScratchBuffer>,
    stream: Option<S>,
    last_error: Option<CallbackError<S::Error>>,
}

impl<S: BridgeStream> StreamBridge<S> {
    /// Creates a bridge through which native code reads from `stream`, using
    /// [`DEFAULT_BUFFER_SIZE`].
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidMode`] if the stream is not readable.
    /// - [`BridgeError::Allocate`] if the scratch buffer cannot be allocated.
    pub fn for_reading(stream: S) -> Result<Self, BridgeError> {
        StreamBridgeBuilder::new().for_reading(stream)
    }

    /// Creates a bridge through which native code writes to `stream`, using
    /// [`DEFAULT_BUFFER_SIZE`].
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidMode`] if the stream is not writable.
    /// - [`BridgeError::Allocate`] if the scratch buffer cannot be allocated.
    pub fn for_writing(stream: S) -> Result<Self, BridgeError> {
        StreamBridgeBuilder::new().for_writing(stream)
    }

    pub(crate) fn new(
        stream: S,
        direction: Direction,
        buffer_size: usize,
    ) -> Result<Self, BridgeError> {
        let supported = match direction {
            Direction::Reading => stream.can_read(),
            Direction::Writing => stream.can_write(),
        };
        if !supported {
            return Err(BridgeError::InvalidMode {
                requested: direction,
            });
        }
        if buffer_size == 0 {
            return Err(BridgeError::InvalidBufferSize);
        }

        let scratch = ScratchBuffer::new(buffer_size)?;
        trace!(
            "Created {direction} bridge with {buffer_size} byte scratch buffer at {:p}",
            scratch.as_ptr()
        );

        Ok(Self {
            direction,
            buffer_size,
            scratch: Some(scratch),
            stream: Some(stream),
            last_error: None,
        })
    }

    /// The direction this bridge was created for.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Size of the scratch buffer; the largest chunk moved per stream call.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Whether the bridge has not been disposed yet.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.scratch.is_some()
    }

    /// Address of the scratch buffer, or `None` once disposed.
    /// The address does not change between construction and disposal.
    #[inline]
    pub fn scratch_address(&self) -> Option<*const u8> {
        self.scratch.as_ref().map(ScratchBuffer::as_ptr)
    }

    /// The most recent failure a callback converted into `-1`.
    #[inline]
    pub fn last_error(&self) -> Option<&CallbackError<S::Error>> {
        self.last_error.as_ref()
    }

    /// Takes the most recent failure, leaving `None` in its place.
    #[inline]
    pub fn take_last_error(&mut self) -> Option<CallbackError<S::Error>> {
        self.last_error.take()
    }

    /// Copies up to `count` bytes from the stream to `data`.
    ///
    /// Returns the number of bytes delivered, which is less than `count` only when the stream
    /// ran out of data, or `-1` if anything failed. Bytes delivered before a failure are not
    /// reported. Requests above `isize::MAX` are clamped.
    ///
    /// # Safety
    ///
    /// `data` must be null or valid for writes of `count` bytes, and must not overlap the
    /// scratch buffer.
    pub unsafe fn read(&mut self, data: *mut u8, count: usize) -> isize {
        if count == 0 {
            return 0;
        }

        match unsafe { self.read_into(data, count) } {
            Ok(total) => total as isize,
            Err(e) => {
                self.record(Operation::Read, e);
                IO_ERROR
            }
        }
    }

    unsafe fn read_into(
        &mut self,
        data: *mut u8,
        count: usize,
    ) -> Result<usize, CallbackError<S::Error>> {
        let (Some(stream), Some(scratch)) = (self.stream.as_mut(), self.scratch.as_mut()) else {
            return Err(CallbackError::Closed);
        };
        if self.direction != Direction::Reading {
            return Err(CallbackError::WrongDirection);
        }
        if data.is_null() {
            return Err(CallbackError::NullPointer);
        }

        let mut remaining = count.min(isize::MAX as usize);
        let mut total = 0;
        while remaining > 0 {
            let length = remaining.min(scratch.len());
            let chunk = scratch.prefix_mut(length);
            let read = stream.read(chunk).map_err(CallbackError::Stream)?;
            if read == 0 {
                break;
            }

            // Streams claiming more than the chunk they were given are clamped to it.
            let read = read.min(length);
            unsafe { core::ptr::copy_nonoverlapping(chunk.as_ptr(), data.add(total), read) };

            total += read;
            remaining -= read;
        }

        Ok(total)
    }

    /// Copies `count` bytes from `data` into the stream.
    ///
    /// Returns `count` once every byte has been accepted, or `-1` if anything failed. Chunks
    /// written before a failure stay in the stream.
    ///
    /// # Safety
    ///
    /// `data` must be null or valid for reads of `count` bytes.
    pub unsafe fn write(&mut self, data: *const u8, count: usize) -> isize {
        if count == 0 {
            return 0;
        }

        match unsafe { self.write_from(data, count) } {
            Ok(()) => count as isize,
            Err(e) => {
                self.record(Operation::Write, e);
                IO_ERROR
            }
        }
    }

    unsafe fn write_from(
        &mut self,
        data: *const u8,
        count: usize,
    ) -> Result<(), CallbackError<S::Error>> {
        let (Some(stream), Some(scratch)) = (self.stream.as_mut(), self.scratch.as_mut()) else {
            return Err(CallbackError::Closed);
        };
        if self.direction != Direction::Writing {
            return Err(CallbackError::WrongDirection);
        }
        if data.is_null() {
            return Err(CallbackError::NullPointer);
        }
        if count > isize::MAX as usize {
            return Err(CallbackError::CountOverflow);
        }

        let mut written = 0;
        while written < count {
            let length = (count - written).min(scratch.len());
            let chunk = scratch.prefix_mut(length);
            unsafe { core::ptr::copy_nonoverlapping(data.add(written), chunk.as_mut_ptr(), length) };
            stream.write(chunk).map_err(CallbackError::Stream)?;
            written += length;
        }

        Ok(())
    }

    /// Moves the stream position. `whence` is `0` (start), `1` (current) or `2` (end).
    ///
    /// Returns the new absolute position, or `-1` if the origin is unknown, the stream failed
    /// or the result would be before the start of the stream.
    pub fn seek(&mut self, offset: i64, whence: c_int) -> i64 {
        match self.seek_to(offset, whence) {
            Ok(position) => position,
            Err(e) => {
                self.record(Operation::Seek, e);
                POSITION_ERROR
            }
        }
    }

    fn seek_to(&mut self, offset: i64, whence: c_int) -> Result<i64, CallbackError<S::Error>> {
        let stream = self.stream.as_mut().ok_or(CallbackError::Closed)?;
        let origin = SeekOrigin::try_from(whence).map_err(CallbackError::InvalidWhence)?;
        let position = stream
            .seek(offset, origin)
            .map_err(CallbackError::Stream)?;
        i64::try_from(position).map_err(|_| CallbackError::PositionOverflow)
    }

    /// Current absolute position of the stream, or `-1` if it cannot be determined.
    pub fn tell(&mut self) -> i64 {
        match self.position() {
            Ok(position) => position,
            Err(e) => {
                self.record(Operation::Tell, e);
                POSITION_ERROR
            }
        }
    }

    fn position(&mut self) -> Result<i64, CallbackError<S::Error>> {
        let stream = self.stream.as_mut().ok_or(CallbackError::Closed)?;
        let position = stream.position().map_err(CallbackError::Stream)?;
        i64::try_from(position).map_err(|_| CallbackError::PositionOverflow)
    }

    /// Releases the scratch buffer and stops referencing the stream.
    ///
    /// Calling this more than once is a no-op. Dropping the bridge disposes it as well.
    pub fn dispose(&mut self) {
        if self.scratch.is_none() && self.stream.is_none() {
            return;
        }

        self.scratch = None;
        self.stream = None;
        trace!("Disposed {} bridge", self.direction);
    }

    fn record(&mut self, operation: Operation, e: CallbackError<S::Error>) {
        match &e {
            CallbackError::Closed => {
                warn!("{operation} callback invoked on a disposed {} bridge", self.direction)
            }
            _ => debug!("{operation} callback failed, returning -1 to native code: {e}"),
        }
        self.last_error = Some(e);
    }

    pub(crate) fn record_panic(&mut self, operation: Operation) {
        error!("Stream panicked during {operation} callback, returning -1 to native code");
        self.last_error = Some(CallbackError::Panicked);
    }
}

impl<S: BridgeStream> Drop for StreamBridge<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<S: BridgeStream> fmt::Debug for StreamBridge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBridge")
            .field("direction", &self.direction)
            .field("buffer_size", &self.buffer_size)
            .field("scratch", &self.scratch)
            .field("open", &self.is_open())
            .field("last_error", &self.last_error)
            .finish()
    }
}
