//! Common test imports and utilities for bridge tests
//!
//! This module provides a common prelude for test modules to avoid
//! duplicate imports across the codebase.
#![allow(unused_imports)]
#![allow(dead_code)]

// External crate declaration for no_std compatibility
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

// Re-export commonly used alloc types for tests
pub use alloc::{boxed::Box, format, string::String, string::ToString, vec, vec::Vec};

// External crates commonly used in tests
pub use rstest::rstest;

use crate::stream::{BridgeStream, SeekOrigin};
use core::fmt;

/// Errors injected by [`MemoryStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStreamError {
    Read,
    Write,
    Seek,
    Position,
    NegativePosition,
}

impl fmt::Display for TestStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestStreamError::Read => "injected read failure",
            TestStreamError::Write => "injected write failure",
            TestStreamError::Seek => "injected seek failure",
            TestStreamError::Position => "injected position failure",
            TestStreamError::NegativePosition => "seek before start of stream",
        })
    }
}

/// In-memory stream with configurable capabilities and failure injection.
///
/// Records the size of every read and write request so tests can assert on chunking.
#[derive(Debug, Default)]
pub struct MemoryStream {
    data: Vec<u8>,
    position: usize,
    read_disabled: bool,
    write_disabled: bool,
    fail_read_after: Option<usize>,
    fail_write_after: Option<usize>,
    fail_seek: bool,
    fail_position: bool,
    panic_on_read: bool,
    panic_on_write: bool,
    panic_on_seek: bool,
    panic_on_position: bool,
    max_read: Option<usize>,
    pub read_requests: Vec<usize>,
    pub write_requests: Vec<usize>,
}

impl MemoryStream {
    /// Empty readable and writable stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Readable and writable stream positioned at the start of `data`.
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn read_only(mut self) -> Self {
        self.write_disabled = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.read_disabled = true;
        self
    }

    /// Fail every read after `successful` reads have completed.
    pub fn failing_reads_after(mut self, successful: usize) -> Self {
        self.fail_read_after = Some(successful);
        self
    }

    /// Fail every write after `successful` writes have completed.
    pub fn failing_writes_after(mut self, successful: usize) -> Self {
        self.fail_write_after = Some(successful);
        self
    }

    pub fn failing_seeks(mut self) -> Self {
        self.fail_seek = true;
        self
    }

    pub fn failing_position(mut self) -> Self {
        self.fail_position = true;
        self
    }

    pub fn panicking_reads(mut self) -> Self {
        self.panic_on_read = true;
        self
    }

    pub fn panicking_writes(mut self) -> Self {
        self.panic_on_write = true;
        self
    }

    pub fn panicking_seeks(mut self) -> Self {
        self.panic_on_seek = true;
        self
    }

    pub fn panicking_position(mut self) -> Self {
        self.panic_on_position = true;
        self
    }

    /// Never return more than `max` bytes from a single read.
    pub fn short_reads(mut self, max: usize) -> Self {
        self.max_read = Some(max);
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn current_position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl BridgeStream for MemoryStream {
    type Error = TestStreamError;

    fn can_read(&self) -> bool {
        !self.read_disabled
    }

    fn can_write(&self) -> bool {
        !self.write_disabled
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TestStreamError> {
        if self.panic_on_read {
            panic!("injected read panic");
        }
        if self
            .fail_read_after
            .is_some_and(|limit| self.read_requests.len() >= limit)
        {
            return Err(TestStreamError::Read);
        }
        self.read_requests.push(buf.len());

        let available = self.data.len().saturating_sub(self.position);
        let mut length = buf.len().min(available);
        if let Some(max) = self.max_read {
            length = length.min(max);
        }
        if length == 0 {
            return Ok(0);
        }

        buf[..length].copy_from_slice(&self.data[self.position..self.position + length]);
        self.position += length;
        Ok(length)
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TestStreamError> {
        if self.panic_on_write {
            panic!("injected write panic");
        }
        if self
            .fail_write_after
            .is_some_and(|limit| self.write_requests.len() >= limit)
        {
            return Err(TestStreamError::Write);
        }
        self.write_requests.push(buf.len());

        let end = self.position + buf.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].copy_from_slice(buf);
        self.position = end;
        Ok(())
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64, TestStreamError> {
        if self.panic_on_seek {
            panic!("injected seek panic");
        }
        if self.fail_seek {
            return Err(TestStreamError::Seek);
        }

        let base = match origin {
            SeekOrigin::Start => 0,
            SeekOrigin::Current => self.position as i64,
            SeekOrigin::End => self.data.len() as i64,
        };
        let target = base + offset;
        if target < 0 {
            return Err(TestStreamError::NegativePosition);
        }

        self.position = target as usize;
        Ok(target as u64)
    }

    fn position(&mut self) -> Result<u64, TestStreamError> {
        if self.panic_on_position {
            panic!("injected position panic");
        }
        if self.fail_position {
            return Err(TestStreamError::Position);
        }
        Ok(self.position as u64)
    }
}

/// Deterministic repeating byte pattern.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
