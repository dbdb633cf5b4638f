//! Frame layout and transport framing.
//!
//! A frame is one transport message:
//!
//! ```text
//! [command u8 = SYNC][host_time f32][message]*
//! ```
//!
//! On a byte stream each frame is preceded by its length as `u32` LE.
//! [`FrameDecoder`] reassembles frames from arbitrary read chunks.

use bytes::{Buf, Bytes, BytesMut};
use bytestream::{ByteReader, ByteWriter};

use crate::error::{DecodeError, WireResult};
use crate::header::MessageHeader;
use crate::limits::Limits;

/// Size of the transport length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Size of the sync header at the start of every frame.
pub const SYNC_HEADER_SIZE: usize = 1 + 4;

/// Leading command byte of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
#[repr(u8)]
pub enum FrameCommand {
    /// State synchronization frame.
    Sync = 0x01,
}

impl FrameCommand {
    /// Parses a command from a raw byte.
    pub const fn parse(command: u8) -> WireResult<Self> {
        match command {
            0x01 => Ok(Self::Sync),
            _ => Err(DecodeError::UnknownCommand { command }),
        }
    }
}

/// Header at the start of a sync frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncHeader {
    /// Host clock in seconds when the frame was produced.
    pub host_time: f32,
}

impl SyncHeader {
    pub fn encode(&self, writer: &mut ByteWriter) {
        writer.write_u8(FrameCommand::Sync as u8);
        writer.write_f32(self.host_time);
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> WireResult<Self> {
        FrameCommand::parse(reader.read_u8()?)?;
        Ok(Self {
            host_time: reader.read_f32()?,
        })
    }
}

/// Starts a frame writer with the sync header already written.
#[must_use]
pub fn begin_frame(host_time: f32, capacity: usize) -> ByteWriter {
    let mut writer = ByteWriter::with_capacity(SYNC_HEADER_SIZE + capacity);
    SyncHeader { host_time }.encode(&mut writer);
    writer
}

/// Walks the messages of one frame.
///
/// The reader yields headers; the caller must consume each payload through
/// [`payload`](Self::payload) before asking for the next header.
#[derive(Debug)]
pub struct FrameReader<'a> {
    header: SyncHeader,
    reader: ByteReader<'a>,
}

impl<'a> FrameReader<'a> {
    /// Reads the sync header of `frame`.
    pub fn new(frame: &'a [u8]) -> WireResult<Self> {
        let mut reader = ByteReader::new(frame);
        let header = SyncHeader::decode(&mut reader)?;
        Ok(Self { header, reader })
    }

    #[must_use]
    pub const fn header(&self) -> SyncHeader {
        self.header
    }

    /// Reads the next message header, or `None` at the end of the frame.
    pub fn next_message(&mut self) -> WireResult<Option<MessageHeader>> {
        if self.reader.is_empty() {
            return Ok(None);
        }
        MessageHeader::decode(&mut self.reader).map(Some)
    }

    /// Reader positioned at the current message payload.
    pub fn payload(&mut self) -> &mut ByteReader<'a> {
        &mut self.reader
    }
}

/// Returns the length prefix for a frame of `frame_len` bytes.
pub fn length_prefix(frame_len: usize, limits: &Limits) -> WireResult<[u8; LENGTH_PREFIX_SIZE]> {
    let too_large = DecodeError::FrameTooLarge {
        length: frame_len,
        limit: limits.max_frame_bytes,
    };
    if frame_len > limits.max_frame_bytes {
        return Err(too_large);
    }
    let len = u32::try_from(frame_len).map_err(|_| too_large)?;
    Ok(len.to_le_bytes())
}

/// Reassembles length-prefixed frames from a byte stream.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: BytesMut,
    limits: Limits,
}

impl FrameDecoder {
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            buf: BytesMut::with_capacity(8 * 1024),
            limits,
        }
    }

    /// Appends bytes read from the stream.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet returned as frames.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Pops the next complete frame, if one is buffered.
    ///
    /// An oversized length prefix is an error; the stream cannot be resynced
    /// after it.
    pub fn next_frame(&mut self) -> WireResult<Option<Bytes>> {
        if self.buf.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        prefix.copy_from_slice(&self.buf[..LENGTH_PREFIX_SIZE]);
        let length = u32::from_le_bytes(prefix) as usize;
        if length > self.limits.max_frame_bytes {
            return Err(DecodeError::FrameTooLarge {
                length,
                limit: self.limits.max_frame_bytes,
            });
        }
        if self.buf.len() < LENGTH_PREFIX_SIZE + length {
            return Ok(None);
        }
        self.buf.advance(LENGTH_PREFIX_SIZE);
        Ok(Some(self.buf.split_to(length).freeze()))
    }
}
