//! Per-message header.
//!
//! Every message inside a frame starts with
//! `[entity u32 LE][kind code 3 x ASCII][change flags u8]` followed by the
//! payload. The payload length is implied by the kind and the flags, so the
//! header carries no length.

use std::fmt;

use bytestream::{ByteReader, ByteWriter};

use crate::error::{DecodeError, WireResult};

/// Header size in bytes (8 total).
pub const HEADER_SIZE: usize = 4 + 3 + 1;

/// Three-letter ASCII code naming a component kind on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindCode([u8; 3]);

impl KindCode {
    /// Code of the tombstone message that removes an entity.
    pub const DESTROY: Self = Self(*b"DST");

    /// Creates a code from raw bytes without validation.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// Parses a code, accepting only uppercase ASCII letters.
    pub fn parse(bytes: [u8; 3]) -> WireResult<Self> {
        if bytes.iter().all(u8::is_ascii_uppercase) {
            Ok(Self(bytes))
        } else {
            Err(DecodeError::InvalidKindCode { bytes })
        }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    /// Returns the code as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("???")
    }

    /// Returns `true` for the tombstone code.
    #[must_use]
    pub fn is_destroy(&self) -> bool {
        *self == Self::DESTROY
    }
}

impl fmt::Debug for KindCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KindCode({})", self.as_str())
    }
}

impl fmt::Display for KindCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header preceding every message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Mirror entity the message applies to.
    pub entity: u32,
    /// Component kind (or [`KindCode::DESTROY`]).
    pub code: KindCode,
    /// Raw change flags; meaning depends on `code`.
    pub flags: u8,
}

impl MessageHeader {
    #[must_use]
    pub const fn new(entity: u32, code: KindCode, flags: u8) -> Self {
        Self {
            entity,
            code,
            flags,
        }
    }

    /// Creates the header of a tombstone message.
    #[must_use]
    pub const fn tombstone(entity: u32) -> Self {
        Self::new(entity, KindCode::DESTROY, 0)
    }

    /// Returns `true` if this header is a tombstone.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.code.is_destroy()
    }

    pub fn encode(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.entity);
        writer.write_bytes(self.code.as_bytes());
        writer.write_u8(self.flags);
    }

    /// Reads a header and validates the kind code.
    pub fn decode(reader: &mut ByteReader<'_>) -> WireResult<Self> {
        let entity = reader.read_u32()?;
        let raw = reader.read_bytes(3)?;
        let code = KindCode::parse([raw[0], raw[1], raw[2]])?;
        let flags = reader.read_u8()?;
        if code.is_destroy() && flags != 0 {
            return Err(DecodeError::TombstoneFlags { entity, flags });
        }
        Ok(Self {
            entity,
            code,
            flags,
        })
    }
}
