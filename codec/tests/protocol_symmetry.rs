mod common;

use bytestream::{ByteReader, ByteWriter};
use codec::{CodecLimits, ComponentData, DecodeContext, EncodeContext};
use proptest::prelude::*;

use common::{asset_cache, component_data, flags_for};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_decode_consumes_exactly_what_encode_wrote(
        data in component_data(),
        raw in any::<u8>(),
    ) {
        let cache = asset_cache();
        let limits = CodecLimits::default();
        let kind = data.kind();
        let flags = flags_for(kind, raw);

        let mut writer = ByteWriter::new();
        data.encode(flags, &mut writer, &EncodeContext::new(&cache));
        let bytes = writer.finish();

        let mut decoded = ComponentData::default_for(kind);
        let mut reader = ByteReader::new(&bytes);
        decoded
            .decode(flags, &mut reader, &DecodeContext::new(&cache, &limits))
            .unwrap();
        prop_assert!(reader.is_empty(), "{} bytes left for {kind} {flags:?}", reader.remaining());

        let mut expected = ComponentData::default_for(kind);
        expected.copy_from(&data, flags);
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn prop_lerp_read_consumes_same_bytes(
        data in component_data(),
        raw in any::<u8>(),
        t in 0.0f32..=1.0,
    ) {
        let cache = asset_cache();
        let limits = CodecLimits::default();
        let kind = data.kind();
        let flags = flags_for(kind, raw);

        let mut writer = ByteWriter::new();
        data.encode(flags, &mut writer, &EncodeContext::new(&cache));
        let bytes = writer.finish();

        let mut decoded = ComponentData::default_for(kind);
        let mut reader = ByteReader::new(&bytes);
        decoded
            .decode_lerp(flags, &mut reader, &DecodeContext::new(&cache, &limits), t)
            .unwrap();
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_truncated_payload_is_an_error(data in component_data(), cut in 1usize..16) {
        let cache = asset_cache();
        let limits = CodecLimits::default();
        let kind = data.kind();
        let flags = kind.all_flags();

        let mut writer = ByteWriter::new();
        data.encode(flags, &mut writer, &EncodeContext::new(&cache));
        let bytes = writer.finish();
        let keep = bytes.len().saturating_sub(cut);

        let mut decoded = ComponentData::default_for(kind);
        let result = decoded.decode(
            flags,
            &mut ByteReader::new(&bytes[..keep]),
            &DecodeContext::new(&cache, &limits),
        );
        prop_assert!(result.is_err());
    }
}
