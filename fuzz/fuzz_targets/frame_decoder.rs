#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{FrameDecoder, Limits};

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new(Limits::for_testing());
    let mut idx = 0usize;

    // Feed the input in chunks whose sizes come from the input itself.
    while idx < data.len() {
        let len = (usize::from(data[idx]) % 64).saturating_add(1);
        idx += 1;
        let end = (idx + len).min(data.len());
        decoder.extend(&data[idx..end]);
        idx = end;

        loop {
            match decoder.next_frame() {
                Ok(Some(frame)) => assert!(frame.len() <= Limits::for_testing().max_frame_bytes),
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }
});
