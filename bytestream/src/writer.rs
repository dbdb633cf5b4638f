//! Byte writer for encoding fixed-layout primitives.

use glam::{Quat, Vec2, Vec3, Vec4};

use crate::asset_id::AssetId;
use crate::color::{Color, Color32};

/// Maximum encoded size of a varint `u32`.
pub const VARINT_MAX_BYTES: usize = 5;

/// A growable little-endian writer.
///
/// Call [`finish`](Self::finish) to take the byte buffer.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    /// Creates a new empty `ByteWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ByteWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Discards written bytes, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn write_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a LEB128 varint `u32` (1 to 5 bytes).
    pub fn write_varu32(&mut self, mut value: u32) {
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.bytes.push(byte);
            if value == 0 {
                break;
            }
        }
    }

    /// Writes a varint length followed by UTF-8 bytes.
    ///
    /// Lengths are bounded by codec limits long before `u32::MAX`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_str(&mut self, value: &str) {
        self.write_varu32(value.len() as u32);
        self.bytes.extend_from_slice(value.as_bytes());
    }

    pub fn write_vec2(&mut self, value: Vec2) {
        self.write_f32(value.x);
        self.write_f32(value.y);
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    pub fn write_vec4(&mut self, value: Vec4) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
        self.write_f32(value.w);
    }

    /// Writes a quaternion as `x, y, z, w`.
    pub fn write_quat(&mut self, value: Quat) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
        self.write_f32(value.w);
    }

    pub fn write_color(&mut self, value: Color) {
        self.write_f32(value.r);
        self.write_f32(value.g);
        self.write_f32(value.b);
        self.write_f32(value.a);
    }

    pub fn write_color32(&mut self, value: Color32) {
        self.bytes.extend_from_slice(&[value.r, value.g, value.b, value.a]);
    }

    pub fn write_asset_id(&mut self, value: AssetId) {
        self.bytes.extend_from_slice(value.as_bytes());
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        buf.append(&mut self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writer() {
        let writer = ByteWriter::new();
        assert_eq!(writer.len(), 0);
        assert!(writer.is_empty());
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn write_bool_bytes() {
        let mut writer = ByteWriter::new();
        writer.write_bool(true);
        writer.write_bool(false);
        assert_eq!(writer.finish(), vec![1, 0]);
    }

    #[test]
    fn write_integers_little_endian() {
        let mut writer = ByteWriter::new();
        writer.write_u16(0xBEEF);
        writer.write_u32(0x1234_5678);
        writer.write_i32(-1);
        assert_eq!(
            writer.finish(),
            vec![0xEF, 0xBE, 0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn write_f32_bits() {
        let mut writer = ByteWriter::new();
        writer.write_f32(1.0);
        assert_eq!(writer.finish(), 1.0f32.to_le_bytes().to_vec());
    }

    #[test]
    fn write_varu32_sizes() {
        let cases: [(u32, usize); 5] = [
            (0, 1),
            (127, 1),
            (128, 2),
            (300, 2),
            (u32::MAX, VARINT_MAX_BYTES),
        ];
        for (value, size) in cases {
            let mut writer = ByteWriter::new();
            writer.write_varu32(value);
            assert_eq!(writer.len(), size, "varint size for {value}");
        }

        let mut writer = ByteWriter::new();
        writer.write_varu32(300);
        assert_eq!(writer.finish(), vec![0xAC, 0x02]);
    }

    #[test]
    fn write_str_is_length_prefixed() {
        let mut writer = ByteWriter::new();
        writer.write_str("hi");
        assert_eq!(writer.finish(), vec![2, b'h', b'i']);
    }

    #[test]
    fn vector_sizes() {
        let mut writer = ByteWriter::new();
        writer.write_vec2(Vec2::ONE);
        assert_eq!(writer.len(), 8);
        writer.write_vec3(Vec3::ONE);
        assert_eq!(writer.len(), 20);
        writer.write_vec4(Vec4::ONE);
        assert_eq!(writer.len(), 36);
        writer.write_quat(Quat::IDENTITY);
        assert_eq!(writer.len(), 52);
    }

    #[test]
    fn colors_and_asset_ids() {
        let mut writer = ByteWriter::new();
        writer.write_color32(Color32::new(1, 2, 3, 4));
        writer.write_color(Color::WHITE);
        writer.write_asset_id(AssetId::EMPTY);
        let bytes = writer.finish();
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
        assert_eq!(bytes.len(), 4 + 16 + 16);
        assert!(bytes[20..].iter().all(|b| *b == 0));
    }

    #[test]
    fn finish_into_appends() {
        let mut writer = ByteWriter::new();
        writer.write_u8(0xAB);

        let mut buf = vec![0x00, 0x11];
        writer.finish_into(&mut buf);
        assert_eq!(buf, vec![0x00, 0x11, 0xAB]);
    }

    #[test]
    fn clear_keeps_writer_usable() {
        let mut writer = ByteWriter::with_capacity(16);
        writer.write_u32(7);
        writer.clear();
        assert!(writer.is_empty());
        writer.write_u8(1);
        assert_eq!(writer.as_slice(), &[1]);
    }
}
