//! Deterministic protocol fingerprint.

use blake3::Hasher;

use crate::ComponentKind;

/// Hashes the kind table (codes, field order, types, lerp subsets).
///
/// Two builds agree on the wire layout iff their fingerprints match. Peers
/// do not negotiate; the value is logged so mismatched builds are easy to spot.
#[must_use]
pub fn protocol_hash() -> u64 {
    let mut hasher = Hasher::new();
    write_u32(&mut hasher, ComponentKind::ALL.len() as u32);

    for kind in ComponentKind::ALL {
        hasher.update(kind.code().as_bytes());
        write_u32(&mut hasher, kind.fields().len() as u32);

        for field in kind.fields() {
            write_u8(&mut hasher, field.flag.bits());
            write_u8(&mut hasher, field.ty as u8);
            write_u8(&mut hasher, u8::from(field.lerp));
        }
    }

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}
