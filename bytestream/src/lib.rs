//! Little-endian byte primitives for the scenecast wire format.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] plus the small value
//! types that appear inside component payloads: [`Color`], [`Color32`] and
//! [`AssetId`]. Vectors and quaternions are `glam` types, re-exported here so
//! downstream crates agree on one math library.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded reads** - Every read is bounds-checked and returns a [`ByteError`].
//! - **No domain knowledge** - This crate knows nothing about entities or components.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter, Vec3};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_varu32(300);
//! writer.write_vec3(Vec3::new(1.0, 2.0, 3.0));
//! writer.write_str("cube");
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_varu32().unwrap(), 300);
//! assert_eq!(reader.read_vec3().unwrap(), Vec3::new(1.0, 2.0, 3.0));
//! assert_eq!(reader.read_str(64).unwrap(), "cube");
//! assert!(reader.is_empty());
//! ```

mod asset_id;
mod color;
mod error;
mod reader;
mod writer;

pub use asset_id::{AssetId, ParseAssetIdError};
pub use color::{Color, Color32};
pub use error::{ByteError, ByteResult};
pub use glam::{Quat, Vec2, Vec3, Vec4};
pub use reader::ByteReader;
pub use writer::{ByteWriter, VARINT_MAX_BYTES};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let bytes = ByteWriter::new().finish();
        assert!(bytes.is_empty());
        assert!(ByteReader::new(&bytes).is_empty());
    }

    #[test]
    fn mixed_roundtrip() {
        let mut writer = ByteWriter::new();
        writer.write_bool(true);
        writer.write_u8(0x42);
        writer.write_i32(-12345);
        writer.write_f32(f32::NAN);
        writer.write_varu32(1 << 21);
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_i32().unwrap(), -12345);
        assert!(reader.read_f32().unwrap().is_nan());
        assert_eq!(reader.read_varu32().unwrap(), 1 << 21);
        assert!(reader.is_empty());
    }

    #[test]
    fn position_tracks_reads() {
        let mut writer = ByteWriter::new();
        writer.write_u32(1);
        writer.write_u16(2);
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        reader.read_u32().unwrap();
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.remaining(), 2);
    }
}
