#![no_main]

use libfuzzer_sys::fuzz_target;
use markrun::{ConvertConfig, NoResources, convert_bytes};

fuzz_target!(|data: &[u8]| {
    // The pipeline must never panic or error on arbitrary content;
    // everything content-shaped is a diagnostic.
    let config = ConvertConfig::default();
    let _ = convert_bytes(data, None, &config, &NoResources);
});
