#![no_main]

use bytestream::ByteReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick a bounded sequence of reads over the same input.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_bool();
            }
            1 => {
                let _ = reader.read_u32();
            }
            2 => {
                let _ = reader.read_varu32();
            }
            3 => {
                let limit = usize::from(data[idx.saturating_sub(1)]);
                let _ = reader.read_str(limit);
            }
            4 => {
                let _ = reader.read_quat();
            }
            5 => {
                let _ = reader.read_color32();
            }
            6 => {
                let _ = reader.read_asset_id();
            }
            _ => {
                let len = usize::from(data[idx.saturating_sub(1)] % 32);
                let _ = reader.read_bytes(len);
            }
        }
        assert!(reader.position() <= data.len());
    }
});
