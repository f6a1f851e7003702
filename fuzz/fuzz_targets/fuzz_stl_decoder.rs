#![no_main]

use libfuzzer_sys::fuzz_target;
use threemf::{StlDecoder, StlEncoder, StlFormat};

fuzz_target!(|data: &[u8]| {
    if let Ok(mesh) = StlDecoder::new(data).decode_mesh() {
        let mut out = Vec::new();
        let _ = StlEncoder::new(&mut out, StlFormat::Binary).encode_mesh(&mesh);
    }
});
