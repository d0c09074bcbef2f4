//! [`BridgeStream`] adapters over `std::io` types.
//!
//! `std::io` has no capability flags, so the direction is picked by the wrapper:
//! [`ReadOnly`], [`WriteOnly`] or [`ReadWrite`].

use super::{BridgeStream, SeekOrigin};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};

/// Exposes a [`Read`] + [`Seek`] source. Writes fail with [`ErrorKind::Unsupported`].
#[derive(Debug)]
pub struct ReadOnly<R>(pub R);

/// Exposes a [`Write`] + [`Seek`] sink. Reads fail with [`ErrorKind::Unsupported`].
#[derive(Debug)]
pub struct WriteOnly<W>(pub W);

/// Exposes a stream that is both readable and writable, such as a
/// [`File`](std::fs::File) or a [`Cursor<Vec<u8>>`](std::io::Cursor).
#[derive(Debug)]
pub struct ReadWrite<T>(pub T);

macro_rules! impl_into_inner {
    ($($wrapper:ident),*) => {
        $(
            impl<T> $wrapper<T> {
                /// Unwraps the underlying stream.
                pub fn into_inner(self) -> T {
                    self.0
                }

                /// Borrows the underlying stream.
                pub fn get_ref(&self) -> &T {
                    &self.0
                }

                /// Mutably borrows the underlying stream.
                pub fn get_mut(&mut self) -> &mut T {
                    &mut self.0
                }
            }
        )*
    };
}

impl_into_inner!(ReadOnly, WriteOnly, ReadWrite);

fn read_retrying<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

fn seek_from(offset: i64, origin: SeekOrigin) -> io::Result<SeekFrom> {
    Ok(match origin {
        SeekOrigin::Start => {
            let offset = u64::try_from(offset).map_err(|_| {
                io::Error::new(ErrorKind::InvalidInput, "negative offset from stream start")
            })?;
            SeekFrom::Start(offset)
        }
        SeekOrigin::Current => SeekFrom::Current(offset),
        SeekOrigin::End => SeekFrom::End(offset),
    })
}

fn unsupported(operation: &str) -> io::Error {
    io::Error::new(
        ErrorKind::Unsupported,
        format!("stream does not support {operation}"),
    )
}

impl<R: Read + Seek> BridgeStream for ReadOnly<R> {
    type Error = io::Error;

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_retrying(&mut self.0, buf)
    }

    fn write(&mut self, _buf: &[u8]) -> io::Result<()> {
        Err(unsupported("writing"))
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> io::Result<u64> {
        self.0.seek(seek_from(offset, origin)?)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.0.stream_position()
    }
}

impl<W: Write + Seek> BridgeStream for WriteOnly<W> {
    type Error = io::Error;

    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(unsupported("reading"))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.write_all(buf)
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> io::Result<u64> {
        self.0.seek(seek_from(offset, origin)?)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.0.stream_position()
    }
}

impl<T: Read + Write + Seek> BridgeStream for ReadWrite<T> {
    type Error = io::Error;

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_retrying(&mut self.0, buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.write_all(buf)
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> io::Result<u64> {
        self.0.seek(seek_from(offset, origin)?)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.0.stream_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;
    use std::io::Cursor;

    /// Fails the first read with `Interrupted`, then behaves like the inner cursor.
    struct InterruptOnce {
        inner: Cursor<Vec<u8>>,
        interrupted: bool,
    }

    impl Read for InterruptOnce {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    impl Seek for InterruptOnce {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn capability_flags_follow_wrapper() {
        let reader = ReadOnly(Cursor::new(Vec::<u8>::new()));
        let writer = WriteOnly(Cursor::new(Vec::<u8>::new()));
        let both = ReadWrite(Cursor::new(Vec::<u8>::new()));

        assert!(reader.can_read() && !reader.can_write());
        assert!(!writer.can_read() && writer.can_write());
        assert!(both.can_read() && both.can_write());
    }

    #[test]
    fn unsupported_direction_errors() {
        let mut reader = ReadOnly(Cursor::new(vec![1u8, 2, 3]));
        let mut writer = WriteOnly(Cursor::new(Vec::<u8>::new()));

        let write_error = BridgeStream::write(&mut reader, &[1]).unwrap_err();
        assert_eq!(write_error.kind(), ErrorKind::Unsupported);

        let read_error = BridgeStream::read(&mut writer, &mut [0u8; 4]).unwrap_err();
        assert_eq!(read_error.kind(), ErrorKind::Unsupported);
    }

    #[rstest]
    #[case(4, SeekOrigin::Start, 4)]
    #[case(2, SeekOrigin::Current, 5)]
    #[case(-3, SeekOrigin::Current, 0)]
    #[case(0, SeekOrigin::End, 10)]
    #[case(-4, SeekOrigin::End, 6)]
    fn seek_translates_origin(
        #[case] offset: i64,
        #[case] origin: SeekOrigin,
        #[case] expected: u64,
    ) {
        let mut stream = ReadWrite(Cursor::new(vec![0u8; 10]));
        stream.0.set_position(3);

        assert_eq!(BridgeStream::seek(&mut stream, offset, origin).unwrap(), expected);
        assert_eq!(BridgeStream::position(&mut stream).unwrap(), expected);
    }

    #[rstest]
    #[case(-1, SeekOrigin::Start)]
    #[case(-4, SeekOrigin::Current)]
    #[case(-11, SeekOrigin::End)]
    fn seek_before_start_is_an_error(#[case] offset: i64, #[case] origin: SeekOrigin) {
        let mut stream = ReadWrite(Cursor::new(vec![0u8; 10]));
        stream.0.set_position(3);

        let error = BridgeStream::seek(&mut stream, offset, origin).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(stream.0.position(), 3);
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut stream = ReadOnly(InterruptOnce {
            inner: Cursor::new(vec![7u8; 8]),
            interrupted: false,
        });

        let mut buf = [0u8; 8];
        assert_eq!(BridgeStream::read(&mut stream, &mut buf).unwrap(), 8);
        assert_eq!(buf, [7u8; 8]);
    }

    #[test]
    fn write_commits_whole_buffer() {
        let mut stream = WriteOnly(Cursor::new(Vec::new()));
        BridgeStream::write(&mut stream, &[1, 2, 3]).unwrap();
        BridgeStream::write(&mut stream, &[4, 5]).unwrap();

        assert_eq!(stream.into_inner().into_inner(), vec![1, 2, 3, 4, 5]);
    }
}
