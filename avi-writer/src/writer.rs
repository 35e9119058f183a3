//! Incremental AVI writer

use crate::chunks::{chunk_ids, FourCC, RiffWrite};
use crate::config::WriterConfig;
use crate::error::{AviError, Result};
use crate::header::HeaderModel;
use crate::index::{ChunkKind, OffsetIndex, TaggedEntry, MAX_CHUNK_SIZE};
use crate::patch::PatchList;
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

/// Offset of the RIFF size field from the start of the file
const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the `hdrl` list: after `"RIFF"`, size and `"AVI "`
const HEADER_LIST_OFFSET: u64 = 12;

/// Lifecycle of a writer. Closing consumes it, so there is no closed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Header written, no chunk yet; setters are allowed
    Configuring,
    /// At least one chunk written
    Writing,
    /// A write failed; the file is no longer consistent
    Failed,
}

impl WriterState {
    fn name(self) -> &'static str {
        match self {
            WriterState::Configuring => "configuring",
            WriterState::Writing => "writing",
            WriterState::Failed => "failed",
        }
    }
}

/// AVI file writer backed by a buffered file
pub type AviFileWriter = AviWriter<BufWriter<File>>;

/// AVI writer.
///
/// The header is written as soon as the writer is created, with zero
/// placeholders for the sizes that depend on the payload. Frames and audio
/// are appended to the `movi` list as they arrive and [`close`](Self::close)
/// writes the `idx1` index and patches the placeholders.
pub struct AviWriter<W: Write + Seek> {
    sink: W,
    header: HeaderModel,
    index: OffsetIndex,
    base_offset: u64,
    header_len: usize,
    movi_marker: u64,
    state: WriterState,
}

impl AviFileWriter {
    /// Create (or truncate) `path` and write the header to it
    pub fn create<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        log::debug!("Creating AVI file {}", path.as_ref().display());
        AviWriter::new(BufWriter::new(file), config)
    }

    /// Close the writer and sync the file to disk
    pub fn close_file(self) -> Result<()> {
        let buffered = self.close()?;
        let file = buffered.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    }
}

impl<W: Write + Seek> AviWriter<W> {
    /// Validate `config` and write the header skeleton to `sink`.
    ///
    /// All offsets are taken relative to the sink's current position.
    pub fn new(mut sink: W, config: WriterConfig) -> Result<Self> {
        let header = HeaderModel::from_config(&config)?;
        let header_bytes = header.to_bytes()?;
        let index = OffsetIndex::new()?;

        let base_offset = sink.stream_position()?;
        sink.write_chunk_header(chunk_ids::RIFF, 0)?;
        sink.write_fourcc(chunk_ids::AVI)?;
        sink.write_all(&header_bytes)?;

        sink.write_fourcc(chunk_ids::LIST)?;
        let movi_marker = sink.stream_position()?;
        sink.write_u32::<LittleEndian>(0)?;
        sink.write_fourcc(chunk_ids::MOVI)?;

        log::debug!(
            "AVI header written: {}x{} {} @ {} fps, {} stream(s), movi size at {}",
            config.width,
            config.height,
            config.codec,
            config.fps,
            header.avi.streams,
            movi_marker
        );

        Ok(AviWriter {
            sink,
            header,
            index,
            base_offset,
            header_len: header_bytes.len(),
            movi_marker,
            state: WriterState::Configuring,
        })
    }

    /// Append an encoded video frame as a `00dc` chunk
    pub fn add_frame(&mut self, data: &[u8]) -> Result<()> {
        let size = self.append_chunk(ChunkKind::Video, data)?;
        self.header.video.header.length += 1;
        log::trace!(
            "Video frame {} ({} bytes)",
            self.header.video.header.length,
            size
        );
        Ok(())
    }

    /// Append PCM audio as a `01wb` chunk
    pub fn add_audio(&mut self, data: &[u8]) -> Result<()> {
        if self.header.audio.is_none() {
            return Err(AviError::NoAudioStream);
        }
        let size = self.append_chunk(ChunkKind::Audio, data)?;
        if let Some(audio) = self.header.audio.as_mut() {
            audio.header.length = audio.header.length.wrapping_add(size);
        }
        log::trace!("Audio chunk ({} bytes)", size);
        Ok(())
    }

    /// Change the frame rate; only allowed before the first chunk
    pub fn set_framerate(&mut self, fps: u32) -> Result<()> {
        self.ensure_configuring("set frame rate")?;
        self.header.set_framerate(fps)
    }

    /// Change the video codec; only allowed before the first chunk
    pub fn set_codec(&mut self, codec: impl Into<FourCC>) -> Result<()> {
        self.ensure_configuring("set codec")?;
        self.header.set_codec(codec.into())
    }

    /// Change the frame size; only allowed before the first chunk
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.ensure_configuring("set size")?;
        self.header.set_size(width, height)
    }

    /// Write the index, patch the deferred sizes and return the sink.
    ///
    /// Consumes the writer whether or not it succeeds; on error the file may
    /// be missing its index or still carry placeholder sizes.
    pub fn close(self) -> Result<W> {
        if self.state == WriterState::Failed {
            return Err(AviError::InvalidState {
                operation: "close",
                state: self.state.name(),
            });
        }

        let AviWriter {
            mut sink,
            mut header,
            index,
            base_offset,
            header_len,
            movi_marker,
            ..
        } = self;

        let movi_end = sink.stream_position()?;
        let movi_size = movi_end - movi_marker - 4;

        index.write_table(&mut sink)?;
        let chunks = index.len();
        drop(index);

        let file_end = sink.stream_position()?;
        let riff_size = u32::try_from(file_end - base_offset - 8)
            .map_err(|_| AviError::FileTooLarge(file_end))?;

        header.avi.total_frames = header.video.header.length;
        let header_bytes = header.to_bytes()?;
        debug_assert_eq!(header_bytes.len(), header_len);

        // idx1 is already on disk; the patches keep movi, hdrl, RIFF order
        let mut patches = PatchList::new();
        patches.push_u32("movi size", movi_marker, movi_size as u32);
        patches.push("header list", base_offset + HEADER_LIST_OFFSET, header_bytes);
        patches.push_u32("riff size", base_offset + RIFF_SIZE_OFFSET, riff_size);
        patches.apply(&mut sink)?;

        sink.flush()?;

        log::debug!(
            "AVI closed: {} frames, {} chunks, {} bytes",
            header.avi.total_frames,
            chunks,
            file_end - base_offset
        );

        Ok(sink)
    }

    /// Current header model
    pub fn header(&self) -> &HeaderModel {
        &self.header
    }

    /// Video frames written so far
    pub fn frame_count(&self) -> u32 {
        self.header.video.header.length
    }

    /// Audio bytes written so far (including padding), if audio is enabled
    pub fn audio_bytes(&self) -> Option<u32> {
        self.header.audio.as_ref().map(|audio| audio.header.length)
    }

    /// Chunks written across both streams
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    pub fn has_audio(&self) -> bool {
        self.header.audio.is_some()
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn index(&self) -> &OffsetIndex {
        &self.index
    }

    /// Reference to the underlying sink
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    fn ensure_configuring(&self, operation: &'static str) -> Result<()> {
        if self.state != WriterState::Configuring {
            return Err(AviError::InvalidState {
                operation,
                state: self.state.name(),
            });
        }
        Ok(())
    }

    /// Write chunk header, payload and padding; returns the padded size
    fn append_chunk(&mut self, kind: ChunkKind, data: &[u8]) -> Result<u32> {
        if self.state == WriterState::Failed {
            return Err(AviError::InvalidState {
                operation: "add chunk",
                state: self.state.name(),
            });
        }

        let padding = (4 - data.len() % 4) % 4;
        let size = data
            .len()
            .checked_add(padding)
            .and_then(|size| u32::try_from(size).ok())
            .filter(|&size| size <= MAX_CHUNK_SIZE)
            .ok_or(AviError::ChunkTooLarge(data.len()))?;

        self.state = WriterState::Writing;
        let result = self.write_chunk(kind, data, size, padding);
        if result.is_err() {
            log::warn!(
                "Write of {:?} chunk failed, writer is no longer usable",
                kind
            );
            self.state = WriterState::Failed;
        }
        result.map(|()| size)
    }

    fn write_chunk(
        &mut self,
        kind: ChunkKind,
        data: &[u8],
        size: u32,
        padding: usize,
    ) -> Result<()> {
        self.index.push(TaggedEntry::new(kind, size))?;
        self.sink.write_chunk_header(kind.tag(), size)?;
        self.sink.write_all(data)?;
        self.sink.write_zeros(padding)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AudioConfig;
    use std::io::{self, Cursor, SeekFrom};

    fn read_u32(data: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    }

    fn new_writer(config: WriterConfig) -> AviWriter<Cursor<Vec<u8>>> {
        AviWriter::new(Cursor::new(Vec::new()), config).unwrap()
    }

    #[test]
    fn test_open_writes_skeleton() {
        let writer = new_writer(WriterConfig::new(320, 240, *b"XVID", 25));
        let data = writer.get_ref().get_ref();

        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(read_u32(data, 4), 0);
        assert_eq!(&data[8..12], b"AVI ");
        assert_eq!(&data[12..16], b"LIST");
        assert_eq!(&data[data.len() - 4..], b"movi");
        assert_eq!(writer.movi_marker as usize, data.len() - 8);
        assert_eq!(writer.state(), WriterState::Configuring);
        assert_eq!(writer.index().capacity(), crate::index::INDEX_GROWTH);
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let result = AviWriter::new(
            Cursor::new(Vec::new()),
            WriterConfig::new(0, 240, *b"XVID", 25),
        );
        assert!(matches!(result, Err(AviError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_add_frame_pads_to_four_bytes() {
        let mut writer = new_writer(WriterConfig::new(16, 16, *b"MJPG", 30));
        let before = writer.get_ref().get_ref().len();

        writer.add_frame(&[0xAB; 5]).unwrap();

        let data = writer.get_ref().get_ref();
        assert_eq!(data.len() - before, 8 + 8);
        assert_eq!(&data[before..before + 4], b"00dc");
        assert_eq!(read_u32(data, before + 4), 8);
        assert_eq!(&data[before + 8..before + 13], &[0xAB; 5]);
        assert_eq!(&data[before + 13..before + 16], &[0, 0, 0]);
        assert_eq!(writer.frame_count(), 1);
        assert_eq!(writer.chunk_count(), 1);
        assert_eq!(writer.state(), WriterState::Writing);
    }

    #[test]
    fn test_empty_frame() {
        let mut writer = new_writer(WriterConfig::new(16, 16, *b"MJPG", 30));
        writer.add_frame(&[]).unwrap();

        assert_eq!(writer.index().entries()[0].raw(), 0);
        let data = writer.get_ref().get_ref();
        assert_eq!(&data[data.len() - 8..data.len() - 4], b"00dc");
        assert_eq!(read_u32(data, data.len() - 4), 0);
    }

    #[test]
    fn test_add_audio_tags_entry() {
        let config =
            WriterConfig::new(16, 16, *b"MJPG", 30).with_audio(AudioConfig::default());
        let mut writer = new_writer(config);

        writer.add_audio(&[1; 6]).unwrap();
        writer.add_frame(&[2; 4]).unwrap();

        let entries = writer.index().entries();
        assert_eq!(entries[0].raw(), 8 | 0x8000_0000);
        assert_eq!(entries[0].decode(), (ChunkKind::Audio, 8));
        assert_eq!(entries[1].decode(), (ChunkKind::Video, 4));
        assert_eq!(writer.audio_bytes(), Some(8));
        assert_eq!(writer.frame_count(), 1);
        assert_eq!(writer.chunk_count(), 2);
    }

    #[test]
    fn test_add_audio_without_stream() {
        let mut writer = new_writer(WriterConfig::new(16, 16, *b"MJPG", 30));
        assert!(matches!(writer.add_audio(&[0; 4]), Err(AviError::NoAudioStream)));
        assert_eq!(writer.chunk_count(), 0);
        assert_eq!(writer.state(), WriterState::Configuring);
    }

    #[test]
    fn test_setters_rejected_after_first_chunk() {
        let mut writer = new_writer(WriterConfig::new(320, 240, *b"XVID", 25));
        writer.set_framerate(30).unwrap();
        writer.set_codec(*b"DIVX").unwrap();
        writer.set_size(640, 480).unwrap();

        writer.add_frame(&[0; 4]).unwrap();

        let err = writer.set_framerate(25).unwrap_err();
        assert!(matches!(err, AviError::InvalidState { state: "writing", .. }));
        assert!(writer.set_codec(*b"XVID").is_err());
        assert!(writer.set_size(320, 240).is_err());
        assert_eq!(writer.header().avi.width, 640);
    }

    #[test]
    fn test_close_patches_sizes() {
        let mut writer = new_writer(WriterConfig::new(320, 240, *b"XVID", 25));
        let movi_marker = writer.movi_marker as usize;
        writer.add_frame(&[0; 10]).unwrap();
        writer.add_frame(&[0; 4]).unwrap();

        let data = writer.close().unwrap().into_inner();

        assert_eq!(read_u32(&data, 4) as usize, data.len() - 8);
        // movi type + two chunk headers + padded payloads
        assert_eq!(read_u32(&data, movi_marker), 4 + 8 + 12 + 8 + 4);
        // avih total frames
        assert_eq!(read_u32(&data, 12 + 12 + 8 + 16), 2);

        let idx1 = movi_marker + 4 + read_u32(&data, movi_marker) as usize;
        assert_eq!(&data[idx1..idx1 + 4], b"idx1");
        assert_eq!(read_u32(&data, idx1 + 4), 32);
        assert_eq!(data.len(), idx1 + 8 + 32);
    }

    #[test]
    fn test_close_relative_to_start_position() {
        let mut cursor = Cursor::new(vec![0xEE; 10]);
        cursor.seek(SeekFrom::End(0)).unwrap();

        let writer = AviWriter::new(cursor, WriterConfig::new(8, 8, *b"MJPG", 10)).unwrap();
        let data = writer.close().unwrap().into_inner();

        assert_eq!(&data[0..10], &[0xEE; 10]);
        assert_eq!(&data[10..14], b"RIFF");
        assert_eq!(read_u32(&data, 14) as usize, data.len() - 10 - 8);
    }

    /// Sink that accepts a fixed number of bytes and then fails
    #[derive(Debug)]
    struct LimitedSink {
        inner: Cursor<Vec<u8>>,
        limit: usize,
    }

    impl Write for LimitedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.inner.get_ref().len() + buf.len() > self.limit {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "sink full"));
            }
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for LimitedSink {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_failed_write_poisons_writer() {
        let sink = LimitedSink {
            inner: Cursor::new(Vec::new()),
            limit: 400,
        };
        let mut writer = AviWriter::new(sink, WriterConfig::new(8, 8, *b"MJPG", 10)).unwrap();

        let err = writer.add_frame(&[0; 512]).unwrap_err();
        assert!(matches!(err, AviError::Io(_)));
        assert_eq!(writer.state(), WriterState::Failed);

        assert!(matches!(
            writer.add_frame(&[0; 4]),
            Err(AviError::InvalidState { .. })
        ));
        assert!(writer.close().is_err());
    }

    #[test]
    fn test_close_reports_index_write_failure() {
        let sink = LimitedSink {
            inner: Cursor::new(Vec::new()),
            limit: usize::MAX,
        };
        let mut writer = AviWriter::new(sink, WriterConfig::new(8, 8, *b"MJPG", 10)).unwrap();
        writer.add_frame(&[1; 16]).unwrap();
        writer.add_frame(&[2; 16]).unwrap();

        // idx1 header plus part of the first entry fit, the rest does not
        let movi_end = writer.get_ref().inner.get_ref().len();
        writer.sink.limit = movi_end + 8 + 4;

        let err = writer.close().unwrap_err();
        assert!(matches!(err, AviError::Io(_)));
    }

    #[test]
    fn test_open_fails_on_unwritable_sink() {
        let sink = LimitedSink {
            inner: Cursor::new(Vec::new()),
            limit: 16,
        };
        let result = AviWriter::new(sink, WriterConfig::new(8, 8, *b"MJPG", 10));
        assert!(matches!(result, Err(AviError::Io(_))));
    }
}
