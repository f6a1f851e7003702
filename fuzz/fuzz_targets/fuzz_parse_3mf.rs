#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use threemf::{Model, ParserConfig};

fuzz_target!(|data: &[u8]| {
    // ZIP extraction -> OPC resolution -> XML decoding of every part -> validation
    let config = ParserConfig::new().strict(false);
    if let Ok(outcome) = Model::from_reader_with_config(Cursor::new(data), &config) {
        let _ = outcome.model.validate();
    }
});
