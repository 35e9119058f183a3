//! Minimal AVI reader used to check what the writer produced.

#![allow(dead_code)]

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

#[derive(Debug, Clone)]
pub struct ParsedStream {
    pub stream_type: [u8; 4],
    pub handler: [u8; 4],
    pub scale: u32,
    pub rate: u32,
    pub length: u32,
    pub suggested_buffer_size: u32,
    pub quality: i32,
    pub sample_size: u32,
    pub format: Vec<u8>,
}

impl ParsedStream {
    pub fn format_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.format[offset], self.format[offset + 1]])
    }

    pub fn format_u32(&self, offset: usize) -> u32 {
        read_u32(&self.format, offset)
    }
}

#[derive(Debug, Clone)]
pub struct ParsedChunk {
    pub tag: [u8; 4],
    /// Offset of the chunk header relative to the `movi` list type
    pub offset: u32,
    pub size: u32,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct ParsedIndexEntry {
    pub tag: [u8; 4],
    pub flags: u32,
    pub offset: u32,
    pub size: u32,
}

#[derive(Debug, Clone)]
pub struct ParsedAvi {
    pub riff_size: u32,
    pub microseconds_per_frame: u32,
    pub max_bytes_per_sec: u32,
    pub flags: u32,
    pub total_frames: u32,
    pub streams: u32,
    pub suggested_buffer_size: u32,
    pub width: u32,
    pub height: u32,
    pub stream_lists: Vec<ParsedStream>,
    pub movi_size: u32,
    pub chunks: Vec<ParsedChunk>,
    pub index: Vec<ParsedIndexEntry>,
}

impl ParsedAvi {
    pub fn video(&self) -> &ParsedStream {
        &self.stream_lists[0]
    }

    pub fn fps(&self) -> f64 {
        let video = self.video();
        video.rate as f64 / video.scale as f64
    }
}

pub fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_tag(cursor: &mut Cursor<&[u8]>) -> [u8; 4] {
    let mut tag = [0u8; 4];
    cursor.read_exact(&mut tag).unwrap();
    tag
}

fn parse_strh(data: &[u8]) -> ParsedStream {
    let mut c = Cursor::new(data);
    let stream_type = read_tag(&mut c);
    let handler = read_tag(&mut c);
    let _flags = c.read_u32::<LittleEndian>().unwrap();
    let _priority_language = c.read_u32::<LittleEndian>().unwrap();
    let _initial_frames = c.read_u32::<LittleEndian>().unwrap();
    let scale = c.read_u32::<LittleEndian>().unwrap();
    let rate = c.read_u32::<LittleEndian>().unwrap();
    let _start = c.read_u32::<LittleEndian>().unwrap();
    let length = c.read_u32::<LittleEndian>().unwrap();
    let suggested_buffer_size = c.read_u32::<LittleEndian>().unwrap();
    let quality = c.read_i32::<LittleEndian>().unwrap();
    let sample_size = c.read_u32::<LittleEndian>().unwrap();
    ParsedStream {
        stream_type,
        handler,
        scale,
        rate,
        length,
        suggested_buffer_size,
        quality,
        sample_size,
        format: Vec::new(),
    }
}

fn parse_strl(data: &[u8]) -> ParsedStream {
    assert_eq!(&data[0..4], b"strl");
    let strh_size = read_u32(data, 8) as usize;
    assert_eq!(&data[4..8], b"strh");
    let mut stream = parse_strh(&data[12..12 + strh_size]);

    let strf = 12 + strh_size;
    assert_eq!(&data[strf..strf + 4], b"strf");
    let strf_size = read_u32(data, strf + 4) as usize;
    stream.format = data[strf + 8..strf + 8 + strf_size].to_vec();
    stream
}

/// Parse a complete file, panicking on anything malformed
pub fn parse(data: &[u8]) -> ParsedAvi {
    assert_eq!(&data[0..4], b"RIFF");
    let riff_size = read_u32(data, 4);
    assert_eq!(&data[8..12], b"AVI ");

    assert_eq!(&data[12..16], b"LIST");
    let hdrl_size = read_u32(data, 16) as usize;
    assert_eq!(&data[20..24], b"hdrl");
    let hdrl = &data[24..20 + hdrl_size];

    assert_eq!(&hdrl[0..4], b"avih");
    assert_eq!(read_u32(hdrl, 4), 56);
    let avih = &hdrl[8..64];

    let mut stream_lists = Vec::new();
    let mut pos = 64;
    while pos < hdrl.len() {
        assert_eq!(&hdrl[pos..pos + 4], b"LIST");
        let size = read_u32(hdrl, pos + 4) as usize;
        stream_lists.push(parse_strl(&hdrl[pos + 8..pos + 8 + size]));
        pos += 8 + size;
    }

    let movi = 20 + hdrl_size;
    assert_eq!(&data[movi..movi + 4], b"LIST");
    let movi_size = read_u32(data, movi + 4);
    assert_eq!(&data[movi + 8..movi + 12], b"movi");

    let movi_type = movi + 8;
    let movi_end = movi_type + movi_size as usize;
    let mut chunks = Vec::new();
    let mut pos = movi_type + 4;
    while pos < movi_end {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&data[pos..pos + 4]);
        let size = read_u32(data, pos + 4);
        chunks.push(ParsedChunk {
            tag,
            offset: (pos - movi_type) as u32,
            size,
            payload: data[pos + 8..pos + 8 + size as usize].to_vec(),
        });
        pos += 8 + size as usize;
    }
    assert_eq!(pos, movi_end);

    assert_eq!(&data[movi_end..movi_end + 4], b"idx1");
    let idx_size = read_u32(data, movi_end + 4) as usize;
    let mut c = Cursor::new(&data[movi_end + 8..movi_end + 8 + idx_size]);
    let mut index = Vec::new();
    for _ in 0..idx_size / 16 {
        index.push(ParsedIndexEntry {
            tag: read_tag(&mut c),
            flags: c.read_u32::<LittleEndian>().unwrap(),
            offset: c.read_u32::<LittleEndian>().unwrap(),
            size: c.read_u32::<LittleEndian>().unwrap(),
        });
    }
    assert_eq!(movi_end + 8 + idx_size, data.len());

    ParsedAvi {
        riff_size,
        microseconds_per_frame: read_u32(avih, 0),
        max_bytes_per_sec: read_u32(avih, 4),
        flags: read_u32(avih, 12),
        total_frames: read_u32(avih, 16),
        streams: read_u32(avih, 24),
        suggested_buffer_size: read_u32(avih, 28),
        width: read_u32(avih, 32),
        height: read_u32(avih, 36),
        stream_lists,
        movi_size,
        chunks,
        index,
    }
}
