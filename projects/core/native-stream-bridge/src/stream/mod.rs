//! The stream abstraction a bridge consumes.
//!
//! A [`BridgeStream`] is anything that can move bytes in one or both directions, report its
//! position and seek. The bridge never closes or owns a stream; callers lend one by passing
//! `&mut stream`, which works because [`BridgeStream`] is implemented for `&mut T`.

use core::ffi::c_int;
use core::fmt::{Debug, Display};

#[cfg(feature = "std")]
mod io_impl;
#[cfg(feature = "std")]
pub use io_impl::*;

/// Origin a seek offset is relative to.
///
/// The discriminants match the C `SEEK_SET`, `SEEK_CUR` and `SEEK_END` constants that native
/// libraries pass as `whence`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekOrigin {
    /// Offset from the start of the stream.
    Start = 0,
    /// Offset from the current position.
    Current = 1,
    /// Offset from the end of the stream.
    End = 2,
}

impl TryFrom<c_int> for SeekOrigin {
    type Error = c_int;

    fn try_from(whence: c_int) -> Result<Self, Self::Error> {
        match whence {
            0 => Ok(SeekOrigin::Start),
            1 => Ok(SeekOrigin::Current),
            2 => Ok(SeekOrigin::End),
            other => Err(other),
        }
    }
}

/// A seekable byte stream that can be exposed to native code through a
/// [`StreamBridge`](crate::StreamBridge).
///
/// Implementations report failures through [`BridgeStream::Error`]; the bridge turns every
/// failure into the native sentinel `-1` and keeps the error for later inspection.
pub trait BridgeStream {
    /// Error produced by the stream's operations.
    type Error: Debug + Display;

    /// Whether the stream supports [`BridgeStream::read`].
    fn can_read(&self) -> bool;

    /// Whether the stream supports [`BridgeStream::write`].
    fn can_write(&self) -> bool;

    /// Reads up to `buf.len()` bytes, returning how many were read.
    /// `Ok(0)` for a non-empty `buf` means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Writes the entire buffer.
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Moves the stream position and returns the new absolute position.
    ///
    /// A resulting position before the start of the stream is an error.
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64, Self::Error>;

    /// Current absolute position.
    fn position(&mut self) -> Result<u64, Self::Error>;
}

impl<T: BridgeStream + ?Sized> BridgeStream for &mut T {
    type Error = T::Error;

    #[inline]
    fn can_read(&self) -> bool {
        (**self).can_read()
    }

    #[inline]
    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }

    #[inline]
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        (**self).write(buf)
    }

    #[inline]
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64, Self::Error> {
        (**self).seek(offset, origin)
    }

    #[inline]
    fn position(&mut self) -> Result<u64, Self::Error> {
        (**self).position()
    }
}
