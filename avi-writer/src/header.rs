//! Header model: the `hdrl` list and the structures inside it

use crate::chunks::{chunk_ids, FourCC, RiffChunk};
use crate::config::{frame_bytes, validate_codec, validate_fps, AudioConfig, WriterConfig};
use crate::error::Result;
use crate::types::{AudioFormat, AviHeader, Rect, StreamHeader, StreamType, VideoFormat};

/// Handler code of the PCM audio stream
pub const PCM_HANDLER: FourCC = FourCC([1, 0, 0, 0]);

/// Video stream header and format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTrack {
    pub header: StreamHeader,
    pub format: VideoFormat,
}

/// Audio stream header and format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub header: StreamHeader,
    pub format: AudioFormat,
}

/// Everything written into the `hdrl` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderModel {
    pub avi: AviHeader,
    pub video: VideoTrack,
    pub audio: Option<AudioTrack>,
}

impl HeaderModel {
    /// Validate `config` and populate every header field from it
    pub fn from_config(config: &WriterConfig) -> Result<Self> {
        config.validate()?;
        let frame_size = frame_bytes(config.width, config.height)?;

        let avi = AviHeader {
            microseconds_per_frame: 1_000_000 / config.fps,
            max_bytes_per_sec: frame_size,
            padding_granularity: 0,
            flags: AviHeader::HAS_INDEX,
            total_frames: 0,
            initial_frames: 0,
            streams: if config.audio.is_some() { 2 } else { 1 },
            suggested_buffer_size: frame_size,
            width: config.width,
            height: config.height,
        };

        let video = VideoTrack {
            header: StreamHeader {
                stream_type: StreamType::Video,
                handler: config.codec,
                flags: 0,
                priority: 0,
                language: 0,
                initial_frames: 0,
                scale: 1,
                rate: config.fps,
                start: 0,
                length: 0,
                suggested_buffer_size: frame_size,
                quality: 0,
                sample_size: 0,
                frame: Rect::default(),
            },
            format: VideoFormat {
                size: 40,
                width: config.width as i32,
                height: config.height as i32,
                planes: 1,
                bit_count: 24,
                compression: config.codec,
                image_size: frame_size,
                x_pels_per_meter: 0,
                y_pels_per_meter: 0,
                colors_used: config.palette.len() as u32,
                colors_important: 0,
                palette: config.palette.clone(),
            },
        };

        Ok(HeaderModel {
            avi,
            video,
            audio: config.audio.as_ref().map(audio_track),
        })
    }

    /// Serialize the complete `LIST hdrl` chunk
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.avi.write(&mut body)?;

        let mut strl = Vec::new();
        self.video.header.write(&mut strl)?;
        self.video.format.write(&mut strl)?;
        RiffChunk::list(chunk_ids::STRL, &strl).write(&mut body)?;

        if let Some(audio) = &self.audio {
            let mut strl = Vec::new();
            audio.header.write(&mut strl)?;
            audio.format.write(&mut strl)?;
            RiffChunk::list(chunk_ids::STRL, &strl).write(&mut body)?;
        }

        let mut out = Vec::with_capacity(body.len() + 12);
        RiffChunk::list(chunk_ids::HDRL, &body).write(&mut out)?;
        Ok(out)
    }

    /// Change the frame rate, updating the stream rate and frame delay
    pub fn set_framerate(&mut self, fps: u32) -> Result<()> {
        validate_fps(fps)?;
        self.video.header.rate = fps;
        self.avi.microseconds_per_frame = 1_000_000 / fps;
        Ok(())
    }

    /// Change the video codec in both the stream header and the format
    pub fn set_codec(&mut self, codec: FourCC) -> Result<()> {
        validate_codec(codec)?;
        self.video.header.handler = codec;
        self.video.format.compression = codec;
        Ok(())
    }

    /// Change the frame geometry and every size derived from it
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
        let frame_size = frame_bytes(width, height)?;

        self.avi.max_bytes_per_sec = frame_size;
        self.avi.width = width;
        self.avi.height = height;
        self.avi.suggested_buffer_size = frame_size;
        self.video.header.suggested_buffer_size = frame_size;
        self.video.format.width = width as i32;
        self.video.format.height = height as i32;
        self.video.format.image_size = frame_size;
        Ok(())
    }
}

/// `config` must already be validated: block alignment fits 16 bits and
/// byte rate fits 32 bits.
fn audio_track(config: &AudioConfig) -> AudioTrack {
    let byte_rate = config.byte_rate() as u32;
    let block_align = config.block_align();

    AudioTrack {
        header: StreamHeader {
            stream_type: StreamType::Audio,
            handler: PCM_HANDLER,
            flags: 0,
            priority: 0,
            language: 0,
            initial_frames: 0,
            scale: 1,
            rate: config.sample_rate,
            start: 0,
            length: 0,
            suggested_buffer_size: byte_rate,
            quality: -1,
            sample_size: block_align,
            frame: Rect::default(),
        },
        format: AudioFormat {
            format_tag: AudioFormat::PCM,
            channels: config.channels,
            samples_per_sec: config.sample_rate,
            avg_bytes_per_sec: byte_rate,
            block_align: block_align as u16,
            bits_per_sample: config.bits_per_sample,
            extra_size: 0,
        },
    }
}
