//! AVI Container Writer
//!
//! This crate writes AVI (Audio Video Interleave) files incrementally. AVI is
//! based on the RIFF (Resource Interchange File Format) structure.
//!
//! # Features
//!
//! - One video stream with any FourCC codec, payloads stored as-is
//! - Optional PCM audio stream
//! - Chunks padded to 4-byte boundaries
//! - `idx1` index and deferred size patching at close
//!
//! # File layout
//!
//! ```text
//! RIFF <size> 'AVI '
//!   LIST <size> 'hdrl'
//!     'avih' main header
//!     LIST 'strl' 'strh' 'strf'      video
//!     LIST 'strl' 'strh' 'strf'      audio (optional)
//!   LIST <size> 'movi'
//!     '00dc' / '01wb' chunks in write order
//!   'idx1' one 16-byte entry per chunk
//! ```
//!
//! # Example
//!
//! ```no_run
//! use avi_writer::{AudioConfig, AviFileWriter, WriterConfig};
//!
//! let config = WriterConfig::new(320, 240, *b"MJPG", 25)
//!     .with_audio(AudioConfig::new(2, 16, 44100));
//! let mut writer = AviFileWriter::create("out.avi", config)?;
//!
//! let frame: Vec<u8> = std::fs::read("frame.jpg")?;
//! writer.add_frame(&frame)?;
//! writer.add_audio(&[0u8; 7056])?;
//!
//! writer.close_file()?;
//! # Ok::<(), avi_writer::AviError>(())
//! ```

mod chunks;
mod config;
mod error;
mod header;
mod index;
mod patch;
mod types;
mod writer;

pub use chunks::{chunk_ids, FourCC, IndexEntry, RiffChunk, RiffWrite};
pub use config::{AudioConfig, WriterConfig, MAX_FPS, MAX_PALETTE_ENTRIES};
pub use error::{AviError, Result};
pub use header::{AudioTrack, HeaderModel, VideoTrack, PCM_HANDLER};
pub use index::{ChunkKind, OffsetIndex, TaggedEntry, INDEX_GROWTH, MAX_CHUNK_SIZE};
pub use patch::{Patch, PatchList};
pub use types::{
    codec, AudioFormat, AviHeader, Rect, StreamHeader, StreamType, VideoFormat,
};
pub use writer::{AviFileWriter, AviWriter, WriterState};
