//! AVI header structures and their on-disk layout

use crate::chunks::{chunk_ids, FourCC, RiffChunk};
use crate::error::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// AVI main header (avih chunk)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AviHeader {
    /// Microseconds per frame
    pub microseconds_per_frame: u32,
    /// Maximum bytes per second
    pub max_bytes_per_sec: u32,
    /// Padding granularity
    pub padding_granularity: u32,
    /// AVIF_* flags
    pub flags: u32,
    /// Total number of video frames
    pub total_frames: u32,
    /// Initial frames (for interleaved files)
    pub initial_frames: u32,
    /// Number of streams
    pub streams: u32,
    /// Suggested buffer size
    pub suggested_buffer_size: u32,
    /// Video width
    pub width: u32,
    /// Video height
    pub height: u32,
}

impl AviHeader {
    /// Payload size of the avih chunk
    pub const CHUNK_SIZE: u32 = 56;

    /// AVIF_HASINDEX: the file ends with an idx1 index
    pub const HAS_INDEX: u32 = 0x10;

    /// Write the complete avih chunk
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut data = Vec::with_capacity(Self::CHUNK_SIZE as usize);

        data.write_u32::<LittleEndian>(self.microseconds_per_frame)?;
        data.write_u32::<LittleEndian>(self.max_bytes_per_sec)?;
        data.write_u32::<LittleEndian>(self.padding_granularity)?;
        data.write_u32::<LittleEndian>(self.flags)?;
        data.write_u32::<LittleEndian>(self.total_frames)?;
        data.write_u32::<LittleEndian>(self.initial_frames)?;
        data.write_u32::<LittleEndian>(self.streams)?;
        data.write_u32::<LittleEndian>(self.suggested_buffer_size)?;
        data.write_u32::<LittleEndian>(self.width)?;
        data.write_u32::<LittleEndian>(self.height)?;
        data.write_all(&[0u8; 16])?; // reserved

        RiffChunk::new(chunk_ids::AVIH, data).write(writer)
    }
}

/// Stream type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Video,
    Audio,
}

impl StreamType {
    pub fn to_fourcc(self) -> FourCC {
        match self {
            StreamType::Video => FourCC(*b"vids"),
            StreamType::Audio => FourCC(*b"auds"),
        }
    }
}

/// Rectangle structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

/// Stream header (strh chunk)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Stream type (vids, auds)
    pub stream_type: StreamType,
    /// FourCC handler/codec
    pub handler: FourCC,
    /// Stream flags
    pub flags: u32,
    /// Priority
    pub priority: u16,
    /// Language
    pub language: u16,
    /// Initial frames
    pub initial_frames: u32,
    /// Time scale
    pub scale: u32,
    /// Rate (units per second = rate/scale)
    pub rate: u32,
    /// Start time
    pub start: u32,
    /// Length: frames for video, bytes for PCM audio
    pub length: u32,
    /// Suggested buffer size
    pub suggested_buffer_size: u32,
    /// Quality (-1 selects the driver default)
    pub quality: i32,
    /// Sample size (0 for variable)
    pub sample_size: u32,
    /// Frame rectangle
    pub frame: Rect,
}

impl StreamHeader {
    /// Payload size of the strh chunk
    pub const CHUNK_SIZE: u32 = 56;

    /// Write the complete strh chunk
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut data = Vec::with_capacity(Self::CHUNK_SIZE as usize);

        data.write_all(self.stream_type.to_fourcc().as_bytes())?;
        data.write_all(self.handler.as_bytes())?;
        data.write_u32::<LittleEndian>(self.flags)?;
        data.write_u16::<LittleEndian>(self.priority)?;
        data.write_u16::<LittleEndian>(self.language)?;
        data.write_u32::<LittleEndian>(self.initial_frames)?;
        data.write_u32::<LittleEndian>(self.scale)?;
        data.write_u32::<LittleEndian>(self.rate)?;
        data.write_u32::<LittleEndian>(self.start)?;
        data.write_u32::<LittleEndian>(self.length)?;
        data.write_u32::<LittleEndian>(self.suggested_buffer_size)?;
        data.write_i32::<LittleEndian>(self.quality)?;
        data.write_u32::<LittleEndian>(self.sample_size)?;
        data.write_i16::<LittleEndian>(self.frame.left)?;
        data.write_i16::<LittleEndian>(self.frame.top)?;
        data.write_i16::<LittleEndian>(self.frame.right)?;
        data.write_i16::<LittleEndian>(self.frame.bottom)?;

        RiffChunk::new(chunk_ids::STRH, data).write(writer)
    }
}

/// Video format (BITMAPINFOHEADER)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFormat {
    /// Structure size
    pub size: u32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Number of planes (always 1)
    pub planes: u16,
    /// Bits per pixel
    pub bit_count: u16,
    /// Compression FourCC
    pub compression: FourCC,
    /// Image size in bytes
    pub image_size: u32,
    /// Horizontal resolution
    pub x_pels_per_meter: i32,
    /// Vertical resolution
    pub y_pels_per_meter: i32,
    /// Colors used
    pub colors_used: u32,
    /// Important colors
    pub colors_important: u32,
    /// RGBQUAD palette entries following the header
    pub palette: Vec<u32>,
}

impl VideoFormat {
    /// Payload size of the strf chunk
    pub fn chunk_size(&self) -> u32 {
        self.size + 4 * self.palette.len() as u32
    }

    /// Write the complete strf chunk
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut data = Vec::with_capacity(self.chunk_size() as usize);

        data.write_u32::<LittleEndian>(self.size)?;
        data.write_i32::<LittleEndian>(self.width)?;
        data.write_i32::<LittleEndian>(self.height)?;
        data.write_u16::<LittleEndian>(self.planes)?;
        data.write_u16::<LittleEndian>(self.bit_count)?;
        data.write_u32::<LittleEndian>(self.compression.packed())?;
        data.write_u32::<LittleEndian>(self.image_size)?;
        data.write_i32::<LittleEndian>(self.x_pels_per_meter)?;
        data.write_i32::<LittleEndian>(self.y_pels_per_meter)?;
        data.write_u32::<LittleEndian>(self.colors_used)?;
        data.write_u32::<LittleEndian>(self.colors_important)?;
        for &entry in &self.palette {
            data.write_u32::<LittleEndian>(entry)?;
        }

        RiffChunk::new(chunk_ids::STRF, data).write(writer)
    }
}

/// Audio format (WAVEFORMATEX)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFormat {
    /// Format tag
    pub format_tag: u16,
    /// Number of channels
    pub channels: u16,
    /// Samples per second
    pub samples_per_sec: u32,
    /// Average bytes per second
    pub avg_bytes_per_sec: u32,
    /// Block alignment
    pub block_align: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
    /// Extra data size (cbSize)
    pub extra_size: u16,
}

impl AudioFormat {
    /// WAVE_FORMAT_PCM
    pub const PCM: u16 = 0x0001;

    /// Payload size of the strf chunk
    pub const CHUNK_SIZE: u32 = 18;

    /// Write the complete strf chunk
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut data = Vec::with_capacity(Self::CHUNK_SIZE as usize);

        data.write_u16::<LittleEndian>(self.format_tag)?;
        data.write_u16::<LittleEndian>(self.channels)?;
        data.write_u32::<LittleEndian>(self.samples_per_sec)?;
        data.write_u32::<LittleEndian>(self.avg_bytes_per_sec)?;
        data.write_u16::<LittleEndian>(self.block_align)?;
        data.write_u16::<LittleEndian>(self.bits_per_sample)?;
        data.write_u16::<LittleEndian>(self.extra_size)?;

        RiffChunk::new(chunk_ids::STRF, data).write(writer)
    }
}

/// Common AVI codec FourCCs
pub mod codec {
    use crate::chunks::FourCC;

    /// Uncompressed RGB
    pub const DIB: FourCC = FourCC(*b"DIB ");
    /// Uncompressed packed YUV
    pub const YUY2: FourCC = FourCC(*b"YUY2");
    pub const UYVY: FourCC = FourCC(*b"UYVY");
    pub const YV12: FourCC = FourCC(*b"YV12");
    pub const I420: FourCC = FourCC(*b"I420");
    /// MPEG-4 variants
    pub const DIVX: FourCC = FourCC(*b"DIVX");
    pub const XVID: FourCC = FourCC(*b"XVID");
    pub const DX50: FourCC = FourCC(*b"DX50");
    pub const FMP4: FourCC = FourCC(*b"FMP4");
    pub const MP4V: FourCC = FourCC(*b"MP4V");
    /// H.264
    pub const H264: FourCC = FourCC(*b"H264");
    pub const AVC1: FourCC = FourCC(*b"avc1");
    pub const X264: FourCC = FourCC(*b"X264");
    /// Motion JPEG
    pub const MJPG: FourCC = FourCC(*b"MJPG");
    /// Huffyuv
    pub const HFYU: FourCC = FourCC(*b"HFYU");
    /// FFV1
    pub const FFV1: FourCC = FourCC(*b"FFV1");

    const KNOWN: &[FourCC] = &[
        DIB, YUY2, UYVY, YV12, I420, DIVX, XVID, DX50, FMP4, MP4V, H264, AVC1, X264, MJPG, HFYU,
        FFV1,
    ];

    /// Whether the code is one of the codecs listed above (case-insensitive)
    pub fn is_known(fourcc: FourCC) -> bool {
        KNOWN
            .iter()
            .any(|known| known.as_bytes().eq_ignore_ascii_case(fourcc.as_bytes()))
    }
}
