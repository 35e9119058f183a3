//! Test pattern example.
//!
//! Writes a few seconds of uncompressed moving color bars with a 440 Hz
//! tone, which any AVI player can open.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example test_pattern -- pattern.avi
//! ```

use avi_writer::{codec, AudioConfig, AviFileWriter, Result, WriterConfig};
use std::env;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const FPS: u32 = 25;
const SECONDS: u32 = 4;
const SAMPLE_RATE: u32 = 44100;

fn frame(index: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((WIDTH * HEIGHT * 3) as usize);
    for _y in 0..HEIGHT {
        for x in 0..WIDTH {
            let bar = ((x + index * 4) / (WIDTH / 8)) % 8;
            let b = if bar & 1 != 0 { 0xFF } else { 0 };
            let g = if bar & 2 != 0 { 0xFF } else { 0 };
            let r = if bar & 4 != 0 { 0xFF } else { 0 };
            pixels.extend_from_slice(&[b, g, r]);
        }
    }
    pixels
}

fn tone(frame_index: u32) -> Vec<u8> {
    let samples_per_frame = SAMPLE_RATE / FPS;
    let mut pcm = Vec::with_capacity(samples_per_frame as usize * 2);
    for i in 0..samples_per_frame {
        let n = (frame_index * samples_per_frame + i) as f64;
        let t = n / SAMPLE_RATE as f64;
        let sample = ((t * 440.0 * std::f64::consts::TAU).sin() * 8000.0) as i16;
        pcm.extend_from_slice(&sample.to_le_bytes());
    }
    pcm
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let output = args.get(1).map(String::as_str).unwrap_or("pattern.avi");

    let config = WriterConfig::new(WIDTH, HEIGHT, codec::DIB, FPS)
        .with_audio(AudioConfig::new(1, 16, SAMPLE_RATE));
    let mut writer = AviFileWriter::create(output, config)?;

    for i in 0..FPS * SECONDS {
        writer.add_frame(&frame(i))?;
        writer.add_audio(&tone(i))?;
    }

    let frames = writer.frame_count();
    writer.close_file()?;

    println!("Wrote {} frames to {}", frames, output);
    Ok(())
}
