#![no_main]
use libfuzzer_sys::fuzz_target;
use pcapng_stream::CaptureParser;

fuzz_target!(|data: &[u8]| {
    let mut parser = CaptureParser::new();
    let mut src = data;

    while !src.is_empty() {
        match parser.next_event(src) {
            Ok((rem, _)) => src = rem,
            Err(_) => break,
        }
    }
});
