//! Schema-driven frame inspection.
//!
//! Payloads are walked with the field tables from `schema` rather than the
//! codec state structs, so a report shows exactly what went over the wire,
//! including raw asset ids.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use bytestream::ByteReader;
use codec::CodecLimits;
use schema::{ChangeFlags, ComponentKind, FieldType};
use serde::Serialize;
use serde_json::{json, Value};
use wire::{FrameReader, HEADER_SIZE, SYNC_HEADER_SIZE};

/// Decoded view of one sync frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub host_time: f32,
    pub frame_bytes: usize,
    pub messages: Vec<MessageReport>,
    pub kinds: Vec<KindSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub entity: u32,
    pub code: String,
    /// Component kind name, or `destroy` for tombstones.
    pub kind: &'static str,
    pub flags: u8,
    pub payload_bytes: usize,
    pub fields: Vec<FieldReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub name: &'static str,
    pub value: Value,
}

/// Message count and byte share of one kind code within a frame.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KindSummary {
    pub code: String,
    pub messages: usize,
    /// Header plus payload bytes.
    pub bytes: usize,
}

/// Decodes every message in `frame` into a report.
pub fn inspect_frame(frame: &[u8], limits: &CodecLimits) -> Result<FrameReport> {
    let mut reader = FrameReader::new(frame).context("read sync header")?;
    let host_time = reader.header().host_time;
    let mut messages = Vec::new();

    while let Some(header) = reader
        .next_message()
        .with_context(|| format!("read message header #{}", messages.len()))?
    {
        let code = header.code.as_str().to_owned();
        if header.is_tombstone() {
            messages.push(MessageReport {
                entity: header.entity,
                code,
                kind: "destroy",
                flags: header.flags,
                payload_bytes: 0,
                fields: Vec::new(),
            });
            continue;
        }
        let Some(kind) = ComponentKind::from_code(header.code) else {
            bail!(
                "unknown component code {code:?} on entity {}; payload length cannot be recovered",
                header.entity
            );
        };
        let payload = reader.payload();
        let start = payload.position();
        let fields = read_fields(payload, kind, ChangeFlags::from_bits(header.flags), limits)
            .with_context(|| format!("decode {kind} payload for entity {}", header.entity))?;
        messages.push(MessageReport {
            entity: header.entity,
            code,
            kind: kind.name(),
            flags: header.flags,
            payload_bytes: payload.position() - start,
            fields,
        });
    }

    Ok(FrameReport {
        host_time,
        frame_bytes: frame.len(),
        kinds: summarize(&messages),
        messages,
    })
}

fn summarize(messages: &[MessageReport]) -> Vec<KindSummary> {
    let mut by_code: BTreeMap<&str, KindSummary> = BTreeMap::new();
    for message in messages {
        let entry = by_code
            .entry(message.code.as_str())
            .or_insert_with(|| KindSummary {
                code: message.code.clone(),
                messages: 0,
                bytes: 0,
            });
        entry.messages += 1;
        entry.bytes += HEADER_SIZE + message.payload_bytes;
    }
    let mut kinds: Vec<_> = by_code.into_values().collect();
    kinds.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.code.cmp(&b.code)));
    kinds
}

fn read_fields(
    reader: &mut ByteReader<'_>,
    kind: ComponentKind,
    flags: ChangeFlags,
    limits: &CodecLimits,
) -> Result<Vec<FieldReport>> {
    kind.fields()
        .iter()
        .filter(|field| flags.contains(field.flag))
        .map(|field| {
            let value = read_value(reader, field.ty, limits)
                .with_context(|| format!("field {}", field.name))?;
            Ok(FieldReport {
                name: field.name,
                value,
            })
        })
        .collect()
}

fn read_value(reader: &mut ByteReader<'_>, ty: FieldType, limits: &CodecLimits) -> Result<Value> {
    let value = match ty {
        FieldType::Bool => json!(reader.read_bool()?),
        FieldType::U8 => json!(reader.read_u8()?),
        FieldType::U16 => json!(reader.read_u16()?),
        FieldType::I32 => json!(reader.read_i32()?),
        FieldType::F32 => json!(reader.read_f32()?),
        FieldType::Str => json!(reader.read_str(limits.max_string_bytes)?),
        FieldType::EntityRef => json!(reader.read_u32()?),
        FieldType::Vec2 => json!(reader.read_vec2()?.to_array()),
        FieldType::Vec3 => json!(reader.read_vec3()?.to_array()),
        FieldType::Vec4 => json!(reader.read_vec4()?.to_array()),
        FieldType::Quat => json!(reader.read_quat()?.to_array()),
        FieldType::Color => {
            let c = reader.read_color()?;
            json!([c.r, c.g, c.b, c.a])
        }
        FieldType::Color32 => {
            let c = reader.read_color32()?;
            json!([c.r, c.g, c.b, c.a])
        }
        FieldType::Asset => read_asset(reader)?,
        FieldType::AssetList => {
            let count = read_count(reader, limits.max_materials)?;
            let ids = (0..count)
                .map(|_| read_asset(reader))
                .collect::<Result<Vec<_>>>()?;
            Value::Array(ids)
        }
        FieldType::EntityList => {
            let count = read_count(reader, limits.max_bones)?;
            let ids = (0..count)
                .map(|_| reader.read_u32())
                .collect::<Result<Vec<_>, _>>()?;
            json!(ids)
        }
        FieldType::Shadows => {
            let cast_mode = reader.read_u8()?;
            let receive = reader.read_bool()?;
            json!({ "cast_mode": cast_mode, "receive": receive })
        }
    };
    Ok(value)
}

fn read_asset(reader: &mut ByteReader<'_>) -> Result<Value> {
    let id = reader.read_asset_id()?;
    Ok(if id.is_empty() {
        Value::Null
    } else {
        json!(id.to_string())
    })
}

fn read_count(reader: &mut ByteReader<'_>, limit: usize) -> Result<usize> {
    let count = reader.read_varu32()? as usize;
    if count > limit {
        bail!("list of {count} entries exceeds limit {limit}");
    }
    Ok(count)
}

/// Renders a report for terminal output.
pub fn format_pretty(report: &FrameReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "host_time: {:.3}s  frame: {} bytes ({} header)  messages: {}",
        report.host_time,
        report.frame_bytes,
        SYNC_HEADER_SIZE,
        report.messages.len()
    );
    for message in &report.messages {
        let _ = write!(
            out,
            "  #{:<6} {} flags={:#010b} {:>4}B",
            message.entity, message.code, message.flags, message.payload_bytes
        );
        for field in &message.fields {
            let _ = write!(out, " {}={}", field.name, field.value);
        }
        out.push('\n');
    }
    if !report.kinds.is_empty() {
        out.push_str("by kind:\n");
        for summary in &report.kinds {
            let _ = writeln!(
                out,
                "  {}: {} messages, {} bytes",
                summary.code, summary.messages, summary.bytes
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assets::{AssetCache, AssetKind, AssetRef, MemoryAssetSource};
    use codec::{
        encode_message, encode_tombstone, ComponentData, EncodeContext, EntityId,
        MeshRendererState, SkinnedMeshState, TextState, TransformState,
    };
    use glam::Vec3;
    use schema::transform;
    use wire::begin_frame;

    fn cache() -> AssetCache {
        AssetCache::build(
            &MemoryAssetSource::new()
                .with(AssetKind::Mesh, "meshes/body")
                .with(AssetKind::Material, "materials/skin")
                .with(AssetKind::Font, "fonts/mono"),
        )
    }

    #[test]
    fn walker_consumes_codec_output_for_every_kind() {
        let cache = cache();
        let ctx = EncodeContext::new(&cache);
        let mut writer = begin_frame(1.5, 256);
        for (raw, kind) in (1u32..).zip(ComponentKind::ALL) {
            let data = ComponentData::default_for(kind);
            encode_message(&mut writer, EntityId::new(raw), &data, kind.all_flags(), &ctx);
        }
        let frame = writer.finish();

        let report = inspect_frame(&frame, &CodecLimits::default()).unwrap();
        assert_eq!(report.messages.len(), ComponentKind::ALL.len());
        for (message, kind) in report.messages.iter().zip(ComponentKind::ALL) {
            assert_eq!(message.kind, kind.name());
            assert_eq!(message.fields.len(), kind.fields().len());
        }
        let consumed: usize = report.kinds.iter().map(|k| k.bytes).sum();
        assert_eq!(consumed + SYNC_HEADER_SIZE, frame.len());
    }

    #[test]
    fn populated_payloads_report_values() {
        let cache = cache();
        let ctx = EncodeContext::new(&cache);
        let mut writer = begin_frame(0.25, 256);

        let transform_state = TransformState {
            name: "root".into(),
            position: Vec3::new(1.0, 2.0, 3.0),
            ..TransformState::default()
        };
        encode_message(
            &mut writer,
            EntityId::new(1),
            &transform_state.into(),
            transform::NAME | transform::POSITION,
            &ctx,
        );
        let renderer = MeshRendererState {
            materials: vec![Some(AssetRef::new("materials/skin")), None],
            ..MeshRendererState::default()
        };
        encode_message(
            &mut writer,
            EntityId::new(1),
            &renderer.into(),
            ComponentKind::MeshRenderer.all_flags(),
            &ctx,
        );
        let skinned = SkinnedMeshState {
            bones: vec![EntityId::new(1), EntityId::new(2)],
            ..SkinnedMeshState::default()
        };
        encode_message(
            &mut writer,
            EntityId::new(3),
            &skinned.into(),
            ComponentKind::SkinnedMesh.all_flags(),
            &ctx,
        );
        encode_tombstone(&mut writer, EntityId::new(9));
        let frame = writer.finish();

        let report = inspect_frame(&frame, &CodecLimits::default()).unwrap();
        assert!((report.host_time - 0.25).abs() < f32::EPSILON);
        assert_eq!(report.messages.len(), 4);

        let trn = &report.messages[0];
        assert_eq!(trn.code, "TRN");
        assert_eq!(trn.fields[0].name, "name");
        assert_eq!(trn.fields[0].value, json!("root"));
        assert_eq!(trn.fields[1].name, "position");
        assert_eq!(trn.fields[1].value, json!([1.0, 2.0, 3.0]));

        let materials = &report.messages[1].fields[1];
        assert_eq!(materials.name, "materials");
        let expected = cache
            .id_of(AssetKind::Material, &AssetRef::new("materials/skin"))
            .to_string();
        assert_eq!(materials.value, json!([expected, null]));

        let bones = report.messages[2]
            .fields
            .iter()
            .find(|f| f.name == "bones")
            .unwrap();
        assert_eq!(bones.value, json!([1, 2]));

        let tombstone = &report.messages[3];
        assert_eq!(tombstone.kind, "destroy");
        assert_eq!(tombstone.entity, 9);
        assert!(tombstone.fields.is_empty());
    }

    #[test]
    fn summary_orders_kinds_by_bytes() {
        let cache = cache();
        let ctx = EncodeContext::new(&cache);
        let mut writer = begin_frame(0.0, 256);
        let text = TextState {
            text: "a long enough caption".into(),
            ..TextState::default()
        };
        encode_message(
            &mut writer,
            EntityId::new(1),
            &text.into(),
            ComponentKind::Text.all_flags(),
            &ctx,
        );
        encode_tombstone(&mut writer, EntityId::new(2));
        encode_tombstone(&mut writer, EntityId::new(3));
        let report = inspect_frame(&writer.finish(), &CodecLimits::default()).unwrap();

        assert_eq!(report.kinds[0].code, "TXT");
        assert_eq!(
            report.kinds[1],
            KindSummary {
                code: "DST".into(),
                messages: 2,
                bytes: 2 * HEADER_SIZE,
            }
        );
    }

    #[test]
    fn truncated_payload_is_an_error() {
        let cache = cache();
        let ctx = EncodeContext::new(&cache);
        let mut writer = begin_frame(0.0, 64);
        encode_message(
            &mut writer,
            EntityId::new(1),
            &TransformState::default().into(),
            ComponentKind::Transform.all_flags(),
            &ctx,
        );
        let frame = writer.finish();
        let err = inspect_frame(&frame[..frame.len() - 3], &CodecLimits::default()).unwrap_err();
        assert!(format!("{err:#}").contains("transform"));
    }

    #[test]
    fn unknown_code_is_an_error() {
        let mut frame = begin_frame(0.0, 16).finish();
        frame.extend_from_slice(&1u32.to_le_bytes());
        frame.extend_from_slice(b"ZZZ");
        frame.push(1);
        assert!(inspect_frame(&frame, &CodecLimits::default()).is_err());
    }

    #[test]
    fn pretty_output_lists_messages() {
        let mut writer = begin_frame(2.0, 16);
        encode_tombstone(&mut writer, EntityId::new(4));
        let report = inspect_frame(&writer.finish(), &CodecLimits::default()).unwrap();
        let text = format_pretty(&report);
        assert!(text.contains("messages: 1"));
        assert!(text.contains("DST"));
        assert!(text.contains("by kind:"));
    }
}
