//! Fixed address scratch buffers handed to native code.
//!
//! Native callbacks receive raw pointers and may hold onto them for the duration of a call,
//! so the memory a bridge stages data through must never move. [`ScratchBuffer`] owns a
//! single [`RawAlloc`] which is allocated once, aligned to the cache line size and released
//! only when the buffer is dropped.
//!
//! ## Cache Line Sizes by Architecture
//!
//! - **x86/x86_64**: 64 bytes (Intel/AMD mainstream)
//! - **aarch64**: 64 bytes (ARM64 typical, but can vary)
//! - **Other architectures**: 64 bytes (conservative default)

use core::alloc::{Layout, LayoutError};
use safe_allocator_api::RawAlloc;
use safe_allocator_api::allocator_api::*;
use thiserror::Error;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const CACHE_LINE_SIZE: usize = 64;

#[cfg(target_arch = "aarch64")]
const CACHE_LINE_SIZE: usize = 64;

// Default for other architectures (RISC-V, ARM32, etc.)
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
const CACHE_LINE_SIZE: usize = 64;

/// An error that happened while allocating a scratch buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocateError {
    /// An error that occurred while creating a layout for allocation.
    #[error(
        "Invalid layout provided. Likely due to `num_bytes` being larger than isize::MAX. {0}"
    )]
    LayoutError(#[from] LayoutError),

    /// An error that occurred while allocating memory.
    #[error(transparent)]
    AllocationFailed(#[from] AllocError),
}

/// A zero initialized, cache line aligned byte buffer whose address is fixed for its
/// entire lifetime.
///
/// Moving a [`ScratchBuffer`] moves only the handle; the bytes stay where they were
/// allocated, so pointers obtained from [`ScratchBuffer::as_ptr`] remain valid until drop.
pub struct ScratchBuffer {
    alloc: RawAlloc,
    len: usize,
}

impl ScratchBuffer {
    /// Allocates a new scratch buffer of `num_bytes` bytes.
    ///
    /// # Parameters
    ///
    /// - `num_bytes`: The number of bytes to allocate. Must be non-zero.
    ///
    /// # Returns
    ///
    /// A [`ScratchBuffer`] with every byte set to zero.
    pub fn new(num_bytes: usize) -> Result<Self, AllocateError> {
        let layout = Layout::from_size_align(num_bytes, CACHE_LINE_SIZE)?;
        let mut alloc = RawAlloc::new(layout)?;

        // Slices are only ever created over initialized memory.
        unsafe { core::ptr::write_bytes(alloc.as_mut_ptr(), 0, num_bytes) };

        Ok(Self {
            alloc,
            len: num_bytes,
        })
    }

    /// Number of bytes in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer has no capacity. Always `false` for buffers made by [`Self::new`]
    /// with a non-zero size.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Address of the first byte. Stable until the buffer is dropped.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.alloc.as_ptr()
    }

    /// Mutable address of the first byte. Stable until the buffer is dropped.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.alloc.as_mut_ptr()
    }

    /// The first `len` bytes of the buffer.
    ///
    /// # Panics
    ///
    /// If `len` exceeds [`Self::len`].
    #[inline]
    pub fn prefix(&self, len: usize) -> &[u8] {
        assert!(len <= self.len);
        unsafe { core::slice::from_raw_parts(self.as_ptr(), len) }
    }

    /// The first `len` bytes of the buffer, mutably.
    ///
    /// # Panics
    ///
    /// If `len` exceeds [`Self::len`].
    #[inline]
    pub fn prefix_mut(&mut self, len: usize) -> &mut [u8] {
        assert!(len <= self.len);
        unsafe { core::slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }
}

impl core::fmt::Debug for ScratchBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScratchBuffer")
            .field("address", &self.as_ptr())
            .field("len", &self.len)
            .finish()
    }
}
