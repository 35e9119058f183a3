//! Writer configuration

use crate::chunks::FourCC;
use crate::error::{AviError, Result};

/// Highest accepted frame rate; above this the per-frame delay rounds to 0µs.
pub const MAX_FPS: u32 = 1_000_000;

/// Largest palette a BITMAPINFOHEADER can describe
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// PCM audio track configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioConfig {
    /// Number of interleaved channels
    pub channels: u16,
    /// Bits per sample (a multiple of 8)
    pub bits_per_sample: u16,
    /// Samples per second per channel
    pub sample_rate: u32,
}

impl AudioConfig {
    /// Create audio config
    pub fn new(channels: u16, bits_per_sample: u16, sample_rate: u32) -> Self {
        AudioConfig {
            channels,
            bits_per_sample,
            sample_rate,
        }
    }

    /// Bytes per sample frame across all channels
    pub fn block_align(&self) -> u32 {
        self.channels as u32 * (self.bits_per_sample as u32 / 8)
    }

    /// Bytes per second of PCM data
    pub fn byte_rate(&self) -> u64 {
        self.block_align() as u64 * self.sample_rate as u64
    }

    /// Check that the values describe a representable PCM format
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(AviError::InvalidAudioConfig(
                "channel count must be non-zero".into(),
            ));
        }
        if self.bits_per_sample == 0 || self.bits_per_sample % 8 != 0 {
            return Err(AviError::InvalidAudioConfig(format!(
                "{} bits per sample is not a whole number of bytes",
                self.bits_per_sample
            )));
        }
        if self.sample_rate == 0 {
            return Err(AviError::InvalidAudioConfig(
                "sample rate must be non-zero".into(),
            ));
        }
        if self.block_align() > u16::MAX as u32 {
            return Err(AviError::InvalidAudioConfig(format!(
                "block alignment {} does not fit in 16 bits",
                self.block_align()
            )));
        }
        if self.byte_rate() > u32::MAX as u64 {
            return Err(AviError::InvalidAudioConfig(format!(
                "byte rate {} does not fit in 32 bits",
                self.byte_rate()
            )));
        }
        Ok(())
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig::new(2, 16, 44100)
    }
}

/// Writer configuration: video geometry and codec plus optional audio
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriterConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Video codec FourCC
    pub codec: FourCC,
    /// Frames per second
    pub fps: u32,
    /// Optional RGBQUAD palette for indexed formats
    #[cfg_attr(feature = "serde", serde(default))]
    pub palette: Vec<u32>,
    /// Audio track, if any
    #[cfg_attr(feature = "serde", serde(default))]
    pub audio: Option<AudioConfig>,
}

impl WriterConfig {
    /// Create a video-only config
    pub fn new(width: u32, height: u32, codec: impl Into<FourCC>, fps: u32) -> Self {
        WriterConfig {
            width,
            height,
            codec: codec.into(),
            fps,
            palette: Vec::new(),
            audio: None,
        }
    }

    /// Add a PCM audio track
    pub fn with_audio(mut self, audio: AudioConfig) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Attach a palette to the video format
    pub fn with_palette(mut self, palette: Vec<u32>) -> Self {
        self.palette = palette;
        self
    }

    /// Check every field, including the derived header values
    pub fn validate(&self) -> Result<()> {
        validate_codec(self.codec)?;
        frame_bytes(self.width, self.height)?;
        validate_fps(self.fps)?;
        if self.palette.len() > MAX_PALETTE_ENTRIES {
            return Err(AviError::InvalidPalette(self.palette.len()));
        }
        if let Some(audio) = &self.audio {
            audio.validate()?;
        }
        Ok(())
    }
}

/// Size in bytes of one 24-bit RGB frame, checked against the 32-bit
/// header fields it is stored in
pub(crate) fn frame_bytes(width: u32, height: u32) -> Result<u32> {
    let invalid = |reason| AviError::InvalidDimensions {
        width,
        height,
        reason,
    };

    if width == 0 || height == 0 {
        return Err(invalid("width and height must be non-zero"));
    }
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(invalid("dimension does not fit BITMAPINFOHEADER"));
    }
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(3))
        .ok_or_else(|| invalid("frame size overflows 32 bits"))
}

pub(crate) fn validate_fps(fps: u32) -> Result<()> {
    if fps == 0 || fps > MAX_FPS {
        return Err(AviError::InvalidFrameRate(fps));
    }
    Ok(())
}

pub(crate) fn validate_codec(codec: FourCC) -> Result<()> {
    if !codec.as_bytes().is_ascii() {
        return Err(AviError::InvalidFourCC(codec.as_str()));
    }
    if !crate::types::codec::is_known(codec) {
        log::debug!("Codec {} is not a well-known AVI FourCC", codec);
    }
    Ok(())
}
