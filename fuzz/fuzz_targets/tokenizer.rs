#![no_main]

use core_types::Diagnostics;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut diags = Diagnostics::new();
        let stream = markup::tokenize(input, &mut diags);
        // Tokenization must terminate and never produce more tokens than
        // input bytes plus the implicit rawtext closes.
        assert!(stream.tokens().len() <= input.len() + 2);
    }
});
