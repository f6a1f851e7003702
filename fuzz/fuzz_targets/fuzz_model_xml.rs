#![no_main]

use libfuzzer_sys::fuzz_target;
use threemf::ParserConfig;
use threemf::parser::parse_model_xml_with_config;
use threemf::writer::write_model_xml;

fuzz_target!(|data: &[u8]| {
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    let config = ParserConfig::new().strict(false);
    if let Ok(outcome) = parse_model_xml_with_config(xml, &config) {
        // Whatever decodes must encode and validate without panicking
        let mut out = Vec::new();
        let _ = write_model_xml(&outcome.model, &mut out);
        let _ = outcome.model.validate();
    }
});
