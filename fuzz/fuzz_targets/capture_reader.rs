#![no_main]
use libfuzzer_sys::fuzz_target;
use pcapng_stream::CaptureReader;

fuzz_target!(|data: &[u8]| {
    let mut reader = CaptureReader::new(data);

    while let Some(event) = reader.next_event() {
        if event.is_err() {
            break;
        }
    }
});
