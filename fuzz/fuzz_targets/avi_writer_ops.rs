#![no_main]

//! Fuzz target for the AVI writer.
//!
//! Drives a writer through arbitrary configurations and operation sequences
//! and checks the size fields patched at close.

use arbitrary::Arbitrary;
use avi_writer::{AudioConfig, AviWriter, WriterConfig};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

#[derive(Arbitrary, Debug)]
struct WriterInput {
    width: u16,
    height: u16,
    codec: [u8; 4],
    fps: u16,
    audio: Option<(u8, u8, u16)>,
    ops: Vec<Op>,
}

#[derive(Arbitrary, Debug)]
enum Op {
    /// Append a video frame
    Frame(Vec<u8>),
    /// Append an audio chunk
    Audio(Vec<u8>),
    /// Change the frame rate
    SetFramerate(u16),
    /// Change the codec
    SetCodec([u8; 4]),
    /// Change the frame size
    SetSize(u16, u16),
}

fuzz_target!(|input: WriterInput| {
    if input.ops.len() > 256 {
        return;
    }

    let mut config = WriterConfig::new(
        input.width as u32,
        input.height as u32,
        input.codec,
        input.fps as u32,
    );
    if let Some((channels, bytes, rate)) = input.audio {
        config = config.with_audio(AudioConfig::new(
            channels as u16,
            bytes as u16 * 8,
            rate as u32,
        ));
    }

    // Invalid configurations must be rejected, never panic
    let Ok(mut writer) = AviWriter::new(Cursor::new(Vec::new()), config) else {
        return;
    };

    for op in &input.ops {
        let _ = match op {
            Op::Frame(data) => writer.add_frame(data),
            Op::Audio(data) => writer.add_audio(data),
            Op::SetFramerate(fps) => writer.set_framerate(*fps as u32),
            Op::SetCodec(codec) => writer.set_codec(*codec),
            Op::SetSize(w, h) => writer.set_size(*w as u32, *h as u32),
        };
    }

    let chunks = writer.chunk_count();
    let data = writer.close().expect("in-memory close cannot fail").into_inner();

    let riff_size = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    assert_eq!(riff_size as usize, data.len() - 8);

    let idx1 = data.len() - 8 - chunks * 16;
    assert_eq!(&data[idx1..idx1 + 4], b"idx1");
    let idx_size = u32::from_le_bytes([data[idx1 + 4], data[idx1 + 5], data[idx1 + 6], data[idx1 + 7]]);
    assert_eq!(idx_size as usize, chunks * 16);
});
