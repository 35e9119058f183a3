//! Error types for the AVI writer

use std::io;
use thiserror::Error;

/// Result type for AVI writer operations
pub type Result<T> = std::result::Result<T, AviError>;

/// Errors that can occur while writing an AVI file.
///
/// Any error returned by an operation that touches the sink leaves the
/// writer poisoned: the bytes already written are not rolled back, so the
/// only remaining operation is to drop it.
#[derive(Error, Debug)]
pub enum AviError {
    /// IO error while opening, seeking, writing or flushing the sink
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A buffer could not be grown
    #[error("Allocation failed: could not reserve {requested} index entries")]
    Allocation {
        /// Number of additional entries that were requested
        requested: usize,
    },

    /// Codec identifier is not four ASCII bytes
    #[error("Invalid FourCC {0:?}: expected exactly 4 ASCII characters")]
    InvalidFourCC(String),

    /// Frame geometry is zero or too large for the 32-bit header fields
    #[error("Invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Why the geometry was rejected
        reason: &'static str,
    },

    /// Frame rate is zero or above one million frames per second
    #[error("Invalid frame rate: {0} fps")]
    InvalidFrameRate(u32),

    /// Palette has more entries than BITMAPINFOHEADER allows
    #[error("Palette of {0} entries exceeds the 256-entry limit")]
    InvalidPalette(usize),

    /// Audio configuration cannot describe PCM audio
    #[error("Invalid audio configuration: {0}")]
    InvalidAudioConfig(String),

    /// Audio data was written to a writer opened without an audio stream
    #[error("Writer has no audio stream")]
    NoAudioStream,

    /// Chunk payload does not fit into the 31-bit index size field
    #[error("Chunk of {0} bytes exceeds the maximum AVI chunk size")]
    ChunkTooLarge(usize),

    /// File grew past the 32-bit RIFF size limit
    #[error("File size {0} exceeds the 4 GiB RIFF limit")]
    FileTooLarge(u64),

    /// Operation is not permitted in the writer's current state
    #[error("Cannot {operation} while writer is {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the writer was in
        state: &'static str,
    },
}
