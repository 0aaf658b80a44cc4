#![no_main]

use libfuzzer_sys::fuzz_target;
use markup::{Parser, serialize};

fuzz_target!(|data: &[u8]| {
    let Ok(html) = std::str::from_utf8(data) else {
        return;
    };
    let mut parser = Parser::new();
    let once = serialize(&parser.parse(html));
    let stats = parser.stats();
    let lossy = stats.dropped_end_tags
        + stats.dropped_processing_instructions
        + stats.dropped_attribute_fragments
        > 0;
    if !lossy {
        assert_eq!(once, html, "round trip changed the input");
    }
    let twice = serialize(&parser.parse(&once));
    assert_eq!(twice, once, "second round trip changed the output");
});
