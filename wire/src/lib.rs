//! Message headers and transport framing for scenecast.
//!
//! This crate knows the shape of a frame (sync header, message headers,
//! length prefixes) but not the component payloads inside it.
//!
//! # Design Principles
//!
//! - **Bounded decoding** - Frame lengths are validated against [`Limits`] before buffering.
//! - **No domain knowledge** - Payload layout belongs to the codec.
//! - **Explicit errors** - Malformed input returns a [`DecodeError`], never panics.

mod error;
mod frame;
mod header;
mod limits;

pub use error::{DecodeError, WireResult};
pub use frame::{
    begin_frame, length_prefix, FrameCommand, FrameDecoder, FrameReader, SyncHeader,
    LENGTH_PREFIX_SIZE, SYNC_HEADER_SIZE,
};
pub use header::{KindCode, MessageHeader, HEADER_SIZE};
pub use limits::Limits;

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn public_api_exports() {
        let _ = HEADER_SIZE;
        let _ = KindCode::DESTROY;
        let _ = MessageHeader::tombstone(1);
        let _ = Limits::default();
        let _ = FrameCommand::Sync;
        let _: WireResult<()> = Ok(());
    }

    #[test]
    fn header_size_constant_correct() {
        assert_eq!(
            HEADER_SIZE,
            size_of::<u32>() // entity
                + 3 // kind code
                + size_of::<u8>() // flags
        );
        assert_eq!(SYNC_HEADER_SIZE, size_of::<u8>() + size_of::<f32>());
    }
}
