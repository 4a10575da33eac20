use pcapng_stream::{CaptureConfig, CaptureError, Event};

use crate::{bytes, collect, collect_ok};


/// Legacy Pcap, big endian, microsecond fractions, one 1 byte packet.
const S4: &str = "A1B2C3D4 0002 0004 00000000 00000000 0000FFFF 0000FFFF
                  00000000 000003E8 00000001 00000001 61";

/// Same capture as S4, little endian with nanosecond fractions.
const S5: &str = "4D3CB2A1 0200 0400 00000000 00000000 FFFF0000 01000000
                  00000000 40420F00 01000000 01000000 61";


#[test]
fn s4_micro_big_endian() {
    let events = collect_ok(&bytes(S4));

    assert_eq!(events.len(), 2);
    match &events[0] {
        Event::Interface(interface) => {
            assert_eq!(interface.link_type, 0xFFFF);
            assert_eq!(interface.snaplen, 0xFFFF);
            assert_eq!(interface.ticks_per_milli, 1_000);
            assert_eq!(interface.ts_offset, 0);
            assert!(interface.options.is_empty());
        },
        other => panic!("expected an interface, got {other:?}"),
    }
    match &events[1] {
        Event::Packet(packet) => {
            assert_eq!(packet.interface_id, 0);
            assert_eq!(&packet.data[..], b"a");
            assert_eq!(packet.original_len, 1);
            // 1970-01-01T00:00:00.001Z
            assert_eq!(packet.timestamp.unwrap().millis(), 1);
        },
        other => panic!("expected a packet, got {other:?}"),
    }
}

#[test]
fn s5_nano_little_endian() {
    let events = collect_ok(&bytes(S5));

    assert_eq!(events.len(), 2);
    match &events[0] {
        Event::Interface(interface) => {
            assert_eq!(interface.link_type, 1);
            assert_eq!(interface.ticks_per_milli, 1_000_000);
        },
        other => panic!("expected an interface, got {other:?}"),
    }
    match &events[1] {
        Event::Packet(packet) => {
            assert_eq!(&packet.data[..], b"a");
            assert_eq!(packet.timestamp.unwrap().millis(), 1);
        },
        other => panic!("expected a packet, got {other:?}"),
    }
}

#[test]
fn reject_legacy_switch() {
    let (events, fatal) = collect(CaptureConfig { reject_legacy: true, ..Default::default() }, &bytes(S4));

    assert!(events.is_empty());
    let fatal = fatal.expect("a fatal error was expected");
    assert_eq!(fatal.to_string(), "Old PCAP format detected and rejected");
}

#[test]
fn truncated_record_is_fatal() {
    let data = bytes(S4);
    // Cut inside the packet record header
    let (events, fatal) = collect(CaptureConfig::default(), &data[..data.len() - 10]);

    assert_eq!(events.len(), 1, "only the interface should be out");
    let fatal = fatal.expect("a fatal error was expected");
    assert!(matches!(fatal, CaptureError::Truncated(_)));
}

#[test]
fn stream_ends_cleanly_on_a_record_boundary() {
    let data = bytes(S4);
    let events = collect_ok(&data);
    assert_eq!(events.len(), 2);

    // Header alone is a valid, packet-less capture
    let events = collect_ok(&data[..24]);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Event::Interface(_)));
}

#[test]
fn fcs_length_is_surfaced_as_an_option() {
    let mut data = bytes(S4);
    // Link type 0xFFFF with the FCS extension bit and a 2 word FCS
    data[20] = 0x24;
    data[21] = 0x00;

    let events = collect_ok(&data);
    match &events[0] {
        Event::Interface(interface) => {
            assert_eq!(interface.link_type, 0xFFFF);
            assert_eq!(interface.options.len(), 1);
            assert_eq!(interface.options[0].name, Some("if_fcslen"));
            assert_eq!(interface.options[0].value, pcapng_stream::OptionValue::UInt(32));
        },
        other => panic!("expected an interface, got {other:?}"),
    }
}
