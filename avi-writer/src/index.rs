//! Offset index kept in memory until close
//!
//! Each chunk appended to `movi` records one 32-bit value. The low 31 bits
//! hold the chunk size including alignment padding and bit 31 marks an audio
//! chunk. This is enough to rebuild the full `idx1` table at close time:
//! the tag follows from the stream bit and offsets follow from the running
//! sum of chunk sizes.

use crate::chunks::{chunk_ids, FourCC, IndexEntry, RiffWrite};
use crate::error::{AviError, Result};
use std::io::Write;

/// Entries reserved at open and added every time the index fills up
pub const INDEX_GROWTH: usize = 1024;

/// Offset of the first chunk header relative to the `movi` list type
pub const FIRST_CHUNK_OFFSET: u32 = 4;

const AUDIO_BIT: u32 = 0x8000_0000;

/// Largest chunk size the 31-bit size field can record
pub const MAX_CHUNK_SIZE: u32 = !AUDIO_BIT;

/// Stream a chunk belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Video,
    Audio,
}

impl ChunkKind {
    /// Chunk tag written in `movi` and `idx1`
    pub fn tag(self) -> FourCC {
        match self {
            ChunkKind::Video => chunk_ids::VIDEO_FRAME,
            ChunkKind::Audio => chunk_ids::AUDIO_DATA,
        }
    }
}

/// Stored index value: chunk size with the stream kind in bit 31
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedEntry(u32);

impl TaggedEntry {
    /// Encode a chunk; `size` must not exceed [`MAX_CHUNK_SIZE`]
    pub fn new(kind: ChunkKind, size: u32) -> Self {
        debug_assert!(size <= MAX_CHUNK_SIZE);
        match kind {
            ChunkKind::Video => TaggedEntry(size),
            ChunkKind::Audio => TaggedEntry(size | AUDIO_BIT),
        }
    }

    /// Wrap a raw stored value
    pub fn from_raw(raw: u32) -> Self {
        TaggedEntry(raw)
    }

    /// Raw stored value
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn kind(self) -> ChunkKind {
        if self.0 & AUDIO_BIT != 0 {
            ChunkKind::Audio
        } else {
            ChunkKind::Video
        }
    }

    /// Chunk size including padding
    pub fn size(self) -> u32 {
        self.0 & MAX_CHUNK_SIZE
    }

    /// Decoded `(kind, size)` pair
    pub fn decode(self) -> (ChunkKind, u32) {
        (self.kind(), self.size())
    }
}

/// Growable list of tagged entries, one per written chunk
#[derive(Debug)]
pub struct OffsetIndex {
    entries: Vec<TaggedEntry>,
}

impl OffsetIndex {
    /// Allocate the initial block of entries
    pub fn new() -> Result<Self> {
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(INDEX_GROWTH)
            .map_err(|_| AviError::Allocation {
                requested: INDEX_GROWTH,
            })?;
        Ok(OffsetIndex { entries })
    }

    /// Record a chunk, growing by [`INDEX_GROWTH`] entries when full
    pub fn push(&mut self, entry: TaggedEntry) -> Result<()> {
        if self.entries.len() == self.entries.capacity() {
            self.entries
                .try_reserve_exact(INDEX_GROWTH)
                .map_err(|_| AviError::Allocation {
                    requested: INDEX_GROWTH,
                })?;
            log::trace!("Index grown to {} entries", self.entries.capacity());
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn entries(&self) -> &[TaggedEntry] {
        &self.entries
    }

    /// Byte length of the `idx1` payload
    pub fn table_size(&self) -> u64 {
        self.entries.len() as u64 * IndexEntry::SIZE as u64
    }

    /// Expand into on-disk `idx1` entries with offsets relative to `movi`
    pub fn disk_entries(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        let mut offset = FIRST_CHUNK_OFFSET;
        self.entries.iter().map(move |entry| {
            let (kind, size) = entry.decode();
            let disk = IndexEntry {
                chunk_id: kind.tag(),
                flags: IndexEntry::KEYFRAME,
                offset,
                size,
            };
            offset = offset.wrapping_add(8).wrapping_add(size);
            disk
        })
    }

    /// Write the complete `idx1` chunk
    pub fn write_table<W: Write>(&self, writer: &mut W) -> Result<()> {
        let table_size = u32::try_from(self.table_size())
            .map_err(|_| AviError::FileTooLarge(self.table_size()))?;

        writer.write_chunk_header(chunk_ids::IDX1, table_size)?;
        for entry in self.disk_entries() {
            entry.write(writer)?;
        }

        log::debug!("Wrote idx1 with {} entries", self.entries.len());
        Ok(())
    }
}
