use proptest::prelude::*;
use wire::{length_prefix, FrameDecoder, Limits};

proptest! {
    #[test]
    fn prop_frames_survive_any_chunking(
        frames in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..200), 1..10),
        chunk in 1usize..64,
    ) {
        let limits = Limits::for_testing();
        let mut stream = Vec::new();
        for frame in &frames {
            stream.extend_from_slice(&length_prefix(frame.len(), &limits).unwrap());
            stream.extend_from_slice(frame);
        }

        let mut decoder = FrameDecoder::new(limits);
        let mut decoded = Vec::new();
        for piece in stream.chunks(chunk) {
            decoder.extend(piece);
            while let Some(frame) = decoder.next_frame().unwrap() {
                decoded.push(frame.to_vec());
            }
        }

        prop_assert_eq!(decoded, frames);
        prop_assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn prop_garbage_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut decoder = FrameDecoder::new(Limits::for_testing());
        decoder.extend(&data);
        while let Ok(Some(frame)) = decoder.next_frame() {
            let _ = wire::FrameReader::new(&frame);
        }
    }
}
