//! Deferred writes applied when the file is closed
//!
//! Sizes that are unknown while chunks are being appended are reserved as
//! zero placeholders and recorded here as `(offset, bytes)` descriptors.
//! Close applies them in insertion order and returns to the end of file.

use crate::error::Result;
use std::io::{Seek, SeekFrom, Write};

/// Bytes to write at an absolute offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// What is being patched, for logging
    pub label: &'static str,
    /// Absolute offset in the sink
    pub offset: u64,
    /// Replacement bytes
    pub bytes: Vec<u8>,
}

/// Ordered list of deferred writes
#[derive(Debug, Default)]
pub struct PatchList {
    patches: Vec<Patch>,
}

impl PatchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a little-endian 32-bit value
    pub fn push_u32(&mut self, label: &'static str, offset: u64, value: u32) {
        self.push(label, offset, value.to_le_bytes().to_vec());
    }

    /// Queue raw bytes
    pub fn push(&mut self, label: &'static str, offset: u64, bytes: Vec<u8>) {
        self.patches.push(Patch {
            label,
            offset,
            bytes,
        });
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Write every patch, then seek back to where the sink was
    pub fn apply<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let end = writer.stream_position()?;

        for patch in &self.patches {
            writer.seek(SeekFrom::Start(patch.offset))?;
            writer.write_all(&patch.bytes)?;
            log::trace!(
                "Patched {} at offset {} ({} bytes)",
                patch.label,
                patch.offset,
                patch.bytes.len()
            );
        }

        writer.seek(SeekFrom::Start(end))?;
        Ok(())
    }
}
