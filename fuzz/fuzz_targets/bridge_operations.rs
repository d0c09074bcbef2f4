#![no_main]

// Drives a bridge through its native callbacks with random operations and checks every
// result against the same operation performed directly on a std::io::Cursor.

use libfuzzer_sys::{arbitrary, fuzz_target};
use native_stream_bridge::{POSITION_ERROR, ReadWrite, StreamBridgeBuilder};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub enum Operation {
    Read { count: u16 },
    Write { data: Vec<u8> },
    Seek { offset: i32, whence: u8 },
    Tell,
}

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct Input {
    pub initial: Vec<u8>,
    pub buffer_size: u8,
    pub writing: bool,
    pub operations: Vec<Operation>,
}

fn expected_seek(model: &mut Cursor<Vec<u8>>, offset: i64, whence: u8) -> i64 {
    let target = match whence {
        0 => match u64::try_from(offset) {
            Ok(offset) => SeekFrom::Start(offset),
            Err(_) => return POSITION_ERROR,
        },
        1 => SeekFrom::Current(offset),
        2 => SeekFrom::End(offset),
        _ => return POSITION_ERROR,
    };
    model.seek(target).map_or(POSITION_ERROR, |p| p as i64)
}

fuzz_target!(|input: Input| {
    // Keep the stream bounded; far seeks followed by writes would otherwise allocate a lot.
    const MAX_POSITION: i64 = 1 << 20;

    let buffer_size = usize::from(input.buffer_size).max(1);
    let mut model = Cursor::new(input.initial.clone());
    let mut stream = ReadWrite(Cursor::new(input.initial));

    let builder = StreamBridgeBuilder::new().buffer_size(buffer_size);
    let mut bridge = if input.writing {
        builder.for_writing(&mut stream)
    } else {
        builder.for_reading(&mut stream)
    }
    .unwrap();

    bridge.with_callbacks(|callbacks| {
        let ctx = callbacks.context;
        for operation in &input.operations {
            match operation {
                Operation::Read { count } => {
                    let count = usize::from(*count);
                    let mut actual = vec![0u8; count];
                    let result = match callbacks.read {
                        Some(read) => unsafe { read(actual.as_mut_ptr(), count, ctx) },
                        None => continue,
                    };

                    let mut expected = vec![0u8; count];
                    let mut total = 0;
                    while total < count {
                        match model.read(&mut expected[total..]).unwrap() {
                            0 => break,
                            n => total += n,
                        }
                    }
                    assert_eq!(result, total as isize);
                    assert_eq!(actual[..total], expected[..total]);
                }
                Operation::Write { data } => {
                    let result = match callbacks.write {
                        Some(write) => unsafe { write(data.as_ptr(), data.len(), ctx) },
                        None => continue,
                    };

                    model.write_all(data).unwrap();
                    assert_eq!(result, data.len() as isize);
                }
                Operation::Seek { offset, whence } => {
                    let offset = i64::from(*offset);
                    let whence = i32::from(*whence % 4);
                    let expected = expected_seek(&mut model, offset, whence as u8);
                    let result = unsafe { (callbacks.seek)(offset, whence, ctx) };
                    assert_eq!(result, expected);

                    if expected > MAX_POSITION {
                        unsafe { (callbacks.seek)(0, 0, ctx) };
                        model.set_position(0);
                    }
                }
                Operation::Tell => {
                    let result = unsafe { (callbacks.tell)(ctx) };
                    assert_eq!(result, model.position() as i64);
                }
            }
        }
    });

    drop(bridge);
    assert_eq!(stream.get_ref().get_ref(), model.get_ref());
});
