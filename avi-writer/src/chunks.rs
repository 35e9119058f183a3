//! RIFF chunk primitives and FourCC codes

use crate::error::{AviError, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// FourCC (Four Character Code) identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Create from bytes
    pub const fn new(bytes: [u8; 4]) -> Self {
        FourCC(bytes)
    }

    /// Parse a codec code, requiring exactly four ASCII bytes
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !s.is_ascii() {
            return Err(AviError::InvalidFourCC(s.to_string()));
        }
        Ok(FourCC([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Get as string
    pub fn as_str(&self) -> String {
        String::from_utf8_lossy(&self.0).to_string()
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Pack into a little-endian integer (byte 0 in bits 0-7), the form
    /// BITMAPINFOHEADER stores in `biCompression`
    pub fn packed(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl std::fmt::Debug for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FourCC(\"{}\")", self.as_str())
    }
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        FourCC(bytes)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(bytes: &[u8; 4]) -> Self {
        FourCC(*bytes)
    }
}

impl TryFrom<&str> for FourCC {
    type Error = AviError;

    fn try_from(s: &str) -> Result<Self> {
        FourCC::parse(s)
    }
}

/// Well-known chunk IDs
pub mod chunk_ids {
    use super::FourCC;

    pub const RIFF: FourCC = FourCC(*b"RIFF");
    pub const AVI: FourCC = FourCC(*b"AVI ");
    pub const LIST: FourCC = FourCC(*b"LIST");
    pub const HDRL: FourCC = FourCC(*b"hdrl");
    pub const AVIH: FourCC = FourCC(*b"avih");
    pub const STRL: FourCC = FourCC(*b"strl");
    pub const STRH: FourCC = FourCC(*b"strh");
    pub const STRF: FourCC = FourCC(*b"strf");
    pub const MOVI: FourCC = FourCC(*b"movi");
    pub const IDX1: FourCC = FourCC(*b"idx1");
    /// Compressed video frame of stream 0
    pub const VIDEO_FRAME: FourCC = FourCC(*b"00dc");
    /// Audio data of stream 1
    pub const AUDIO_DATA: FourCC = FourCC(*b"01wb");
}

/// Byte-sink primitives every structure in the file is written with.
///
/// Implemented for all `Write` types; integers are always little-endian.
pub trait RiffWrite: Write {
    /// Write a FourCC verbatim
    fn write_fourcc(&mut self, id: FourCC) -> Result<()> {
        self.write_all(id.as_bytes())?;
        Ok(())
    }

    /// Write a chunk header: id followed by the 32-bit payload size
    fn write_chunk_header(&mut self, id: FourCC, size: u32) -> Result<()> {
        self.write_fourcc(id)?;
        self.write_u32::<LittleEndian>(size)?;
        Ok(())
    }

    /// Write `count` zero bytes
    fn write_zeros(&mut self, count: usize) -> Result<()> {
        const ZEROS: [u8; 4] = [0; 4];
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(ZEROS.len());
            self.write_all(&ZEROS[..n])?;
            remaining -= n;
        }
        Ok(())
    }
}

impl<W: Write + ?Sized> RiffWrite for W {}

/// RIFF chunk with a fully buffered payload
#[derive(Debug, Clone)]
pub struct RiffChunk {
    /// Chunk ID
    pub id: FourCC,
    /// Chunk data
    pub data: Vec<u8>,
}

impl RiffChunk {
    /// Create new chunk
    pub fn new(id: FourCC, data: Vec<u8>) -> Self {
        RiffChunk { id, data }
    }

    /// Create a `LIST` chunk whose payload starts with `list_type`
    pub fn list(list_type: FourCC, body: &[u8]) -> Self {
        let mut data = Vec::with_capacity(4 + body.len());
        data.extend_from_slice(list_type.as_bytes());
        data.extend_from_slice(body);
        RiffChunk::new(chunk_ids::LIST, data)
    }

    /// Size field value (payload only, without header)
    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    /// Write chunk to writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_chunk_header(self.id, self.size())?;
        writer.write_all(&self.data)?;

        // Pad to word boundary
        if self.data.len() % 2 != 0 {
            writer.write_all(&[0])?;
        }

        Ok(())
    }
}

/// `idx1` index entry (AVIINDEXENTRY) as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Chunk ID
    pub chunk_id: FourCC,
    /// Flags
    pub flags: u32,
    /// Offset of the chunk header, relative to the `movi` list type
    pub offset: u32,
    /// Size of chunk data including alignment padding
    pub size: u32,
}

impl IndexEntry {
    /// Index flags
    pub const KEYFRAME: u32 = 0x10;

    /// Bytes per entry on disk
    pub const SIZE: u32 = 16;

    /// Write to writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_fourcc(self.chunk_id)?;
        writer.write_u32::<LittleEndian>(self.flags)?;
        writer.write_u32::<LittleEndian>(self.offset)?;
        writer.write_u32::<LittleEndian>(self.size)?;
        Ok(())
    }
}
