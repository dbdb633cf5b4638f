//! Message-level encoding: header plus payload.

use bytestream::ByteWriter;
use schema::ChangeFlags;
use wire::MessageHeader;

use crate::components::ComponentData;
use crate::context::EncodeContext;
use crate::types::EntityId;

/// Appends one component message for `entity` carrying the `flags` fields.
///
/// Nothing is written when `flags` is empty.
pub fn encode_message(
    writer: &mut ByteWriter,
    entity: EntityId,
    data: &ComponentData,
    flags: ChangeFlags,
    ctx: &EncodeContext<'_>,
) {
    let flags = data.kind().mask(flags);
    if flags.is_empty() {
        return;
    }
    MessageHeader::new(entity.raw(), data.kind().code(), flags.bits()).encode(writer);
    data.encode(flags, writer, ctx);
}

/// Appends a tombstone that removes `entity` on the observer.
pub fn encode_tombstone(writer: &mut ByteWriter, entity: EntityId) {
    MessageHeader::tombstone(entity.raw()).encode(writer);
}
