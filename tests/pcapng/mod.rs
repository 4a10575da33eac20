use std::borrow::Cow;

use pcapng_stream::{
    BlockError, CaptureConfig, CaptureError, CaptureParser, Direction, Endianness, Event, LinkLayerError, OptionValue,
    Reception, Record,
};

use crate::{bytes, collect, collect_ok};


/// Minimal big endian section: one Section Header block.
pub const S1: &str = "0A0D0D0A 0000001C 1A2B3C4D 0001 0000 FFFFFFFFFFFFFFFF 0000001C";

/// S1 followed by an interface (snaplen 16) and a simple packet.
const S2: &str = "0A0D0D0A 0000001C 1A2B3C4D 0001 0000 FFFFFFFFFFFFFFFF 0000001C
                  00000001 00000014 0001 0000 00000010 00000014
                  00000003 00000014 00000003 01020300 00000014";

/// S2 without the interface block.
const S3: &str = "0A0D0D0A 0000001C 1A2B3C4D 0001 0000 FFFFFFFFFFFFFFFF 0000001C
                  00000003 00000014 00000003 01020300 00000014";

/// S1 followed by a copyable custom block.
const S6: &str = "0A0D0D0A 0000001C 1A2B3C4D 0001 0000 FFFFFFFFFFFFFFFF 0000001C
                  00000BAD 00000014 00007ED9 00000000 00000014";


/// Frames a block the way a capture writer would.
fn block(be: bool, type_: u32, body: &[u8]) -> Vec<u8> {
    let pad_len = (4 - body.len() % 4) % 4;
    let total = (12 + body.len() + pad_len) as u32;

    let word = |v: u32| if be { v.to_be_bytes() } else { v.to_le_bytes() };

    let mut out = vec![];
    out.extend_from_slice(&word(type_));
    out.extend_from_slice(&word(total));
    out.extend_from_slice(body);
    out.resize(out.len() + pad_len, 0);
    out.extend_from_slice(&word(total));
    out
}

/// Body of a Section Header block.
fn shb_body(be: bool) -> Vec<u8> {
    let mut body = vec![];
    if be {
        body.extend_from_slice(&0x1A2B3C4Du32.to_be_bytes());
        body.extend_from_slice(&1u16.to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes());
        body.extend_from_slice(&(-1i64).to_be_bytes());
    }
    else {
        body.extend_from_slice(&0x1A2B3C4Du32.to_le_bytes());
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        body.extend_from_slice(&(-1i64).to_le_bytes());
    }
    body
}

/// Body of an Interface Description block.
fn idb_body(be: bool, snaplen: u32, options: &[u8]) -> Vec<u8> {
    let mut body = vec![];
    let (link, reserved) = (1u16, 0u16);
    if be {
        body.extend_from_slice(&link.to_be_bytes());
        body.extend_from_slice(&reserved.to_be_bytes());
        body.extend_from_slice(&snaplen.to_be_bytes());
    }
    else {
        body.extend_from_slice(&link.to_le_bytes());
        body.extend_from_slice(&reserved.to_le_bytes());
        body.extend_from_slice(&snaplen.to_le_bytes());
    }
    body.extend_from_slice(options);
    body
}

/// Body of an Enhanced Packet block.
fn epb_body(be: bool, interface_id: u32, ts: (u32, u32), data: &[u8], options: &[u8]) -> Vec<u8> {
    let word = |v: u32| if be { v.to_be_bytes() } else { v.to_le_bytes() };

    let mut body = vec![];
    body.extend_from_slice(&word(interface_id));
    body.extend_from_slice(&word(ts.0));
    body.extend_from_slice(&word(ts.1));
    body.extend_from_slice(&word(data.len() as u32));
    body.extend_from_slice(&word(data.len() as u32));
    body.extend_from_slice(data);
    body.resize(body.len() + (4 - data.len() % 4) % 4, 0);
    body.extend_from_slice(options);
    body
}


/* ----- seed scenarios ----- */

#[test]
fn s1_minimal_section() {
    let events = collect_ok(&bytes(S1));

    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::Section(section) => {
            assert_eq!(section.endianness, Endianness::Big);
            assert_eq!(section.major_version, 1);
            assert_eq!(section.minor_version, 0);
            assert_eq!(section.section_length, -1);
            assert!(section.options.is_empty());
        },
        other => panic!("expected a section, got {other:?}"),
    }
}

#[test]
fn s2_simple_packet() {
    let events = collect_ok(&bytes(S2));

    assert_eq!(events.len(), 3);
    match &events[1] {
        Event::Interface(interface) => {
            assert_eq!(interface.link_type, 1);
            assert_eq!(interface.snaplen, 16);
            assert_eq!(interface.ticks_per_milli, 1000);
        },
        other => panic!("expected an interface, got {other:?}"),
    }
    match &events[2] {
        Event::Packet(packet) => {
            assert_eq!(packet.interface_id, 0);
            assert_eq!(packet.original_len, 3);
            assert_eq!(&packet.data[..], &[0x01, 0x02, 0x03]);
            assert!(packet.timestamp.is_none());
            assert!(packet.options.is_empty());
        },
        other => panic!("expected a packet, got {other:?}"),
    }
}

#[test]
fn s3_simple_packet_without_interface() {
    let events = collect_ok(&bytes(S3));

    assert_eq!(events.len(), 2);
    match &events[1] {
        Event::Skipped(e) => {
            assert_eq!(*e, BlockError::NoInterface);
            assert!(e.to_string().contains("No interface for simple packet"));
        },
        other => panic!("expected a skipped block, got {other:?}"),
    }
}

#[test]
fn s6_custom_block() {
    let events = collect_ok(&bytes(S6));

    assert_eq!(events.len(), 2);
    match &events[1] {
        Event::Custom(custom) => {
            assert_eq!(custom.pen, 32473);
            assert_eq!(&custom.data[..], &[0, 0, 0, 0]);
            assert!(custom.copyable);
        },
        other => panic!("expected a custom block, got {other:?}"),
    }
}


/* ----- framing ----- */

#[test]
fn synthetic_stream_round_trip() {
    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &[])));
    data.extend_from_slice(&block(true, 0x00000006, &epb_body(true, 0, (0, 1000), b"payload", &[])));
    data.extend_from_slice(&block(true, 0x42424242, &[1, 2, 3, 4])); // valid but unhandled
    data.extend_from_slice(&block(true, 0x80000001, &[9, 9, 9, 9])); // local use, ignored
    data.extend_from_slice(&block(true, 0x40000BAD, &[0, 0, 0x7E, 0xD9]));

    let events = collect_ok(&data);
    assert_eq!(events.len(), 5);

    assert!(matches!(events[0], Event::Section(_)));
    assert!(matches!(events[1], Event::Interface(_)));
    match &events[2] {
        Event::Packet(packet) => {
            assert_eq!(&packet.data[..], b"payload");
            assert_eq!(packet.timestamp.unwrap().millis(), 1);
        },
        other => panic!("expected a packet, got {other:?}"),
    }
    assert_eq!(events[3], Event::Unknown(0x42424242));
    match &events[4] {
        Event::Custom(custom) => assert!(!custom.copyable),
        other => panic!("expected a custom block, got {other:?}"),
    }
}

#[test]
fn trailing_local_use_block_ends_cleanly() {
    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x80000001, &[1, 2, 3, 4]));

    let events = collect_ok(&data);
    assert_eq!(events.len(), 1, "the local-use block must not surface");
}

#[test]
fn length_mismatch_is_fatal() {
    // Trailing length says 0x1D instead of 0x1C
    let data = bytes("0A0D0D0A 0000001C 1A2B3C4D 0001 0000 FFFFFFFFFFFFFFFF 0000001D");
    let (events, fatal) = collect(CaptureConfig::default(), &data);

    assert!(events.is_empty());
    let fatal = fatal.expect("a fatal error was expected");
    assert!(fatal.to_string().contains("Length mismatch"));
}

#[test]
fn mid_block_truncation_is_fatal() {
    let data = bytes(S1);
    let (events, fatal) = collect(CaptureConfig::default(), &data[..20]);

    assert!(events.is_empty());
    let fatal = fatal.expect("a fatal error was expected");
    assert!(matches!(fatal, CaptureError::Truncated(_)));
    assert!(fatal.to_string().contains("Truncated"));
}

#[test]
fn unknown_byte_order_magic_is_fatal() {
    let data = bytes("0A0D0D0A 0000001C DDDDDDDD 0001 0000 FFFFFFFFFFFFFFFF 0000001C");
    let (_, fatal) = collect(CaptureConfig::default(), &data);

    let fatal = fatal.expect("a fatal error was expected");
    assert!(matches!(fatal, CaptureError::UnknownByteOrder(0xDDDDDDDD)));
    assert!(fatal.to_string().contains("Unable to determine endian"));
}

#[test]
fn reject_pcapng_switch() {
    let (events, fatal) = collect(CaptureConfig { reject_pcapng: true, ..Default::default() }, &bytes(S1));

    assert!(events.is_empty());
    let fatal = fatal.expect("a fatal error was expected");
    assert_eq!(fatal.to_string(), "PCAPng format detected and rejected");
}

#[test]
fn big_and_little_endian_decode_alike() {
    let mut be = block(true, 0x0A0D0D0A, &shb_body(true));
    be.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &[])));
    let mut opts = vec![0, 4, 0, 8]; // epb_dropcount 77
    opts.extend_from_slice(&77u64.to_be_bytes());
    opts.extend_from_slice(&[0, 0, 0, 0]);
    be.extend_from_slice(&block(true, 0x00000006, &epb_body(true, 0, (0, 5000), b"abc", &opts)));

    let mut le = block(false, 0x0A0D0D0A, &shb_body(false));
    le.extend_from_slice(&block(false, 0x00000001, &idb_body(false, 0xFFFF, &[])));
    let mut opts = vec![4, 0, 8, 0]; // epb_dropcount 77
    opts.extend_from_slice(&77u64.to_le_bytes());
    opts.extend_from_slice(&[0, 0, 0, 0]);
    le.extend_from_slice(&block(false, 0x00000006, &epb_body(false, 0, (0, 5000), b"abc", &opts)));

    let be_events = collect_ok(&be);
    let le_events = collect_ok(&le);

    // The sections differ by their endianness field, everything after must
    // be byte-equal
    assert_eq!(be_events[1..], le_events[1..]);
}

#[test]
fn multiple_sections_reset_the_interface_table() {
    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &[])));
    // Second section, little endian this time, no interface
    data.extend_from_slice(&block(false, 0x0A0D0D0A, &shb_body(false)));
    data.extend_from_slice(&block(false, 0x00000006, &epb_body(false, 0, (0, 0), b"x", &[])));

    let events = collect_ok(&data);
    assert_eq!(events.len(), 4);

    match (&events[0], &events[2]) {
        (Event::Section(first), Event::Section(second)) => {
            assert_eq!(first.endianness, Endianness::Big);
            assert_eq!(second.endianness, Endianness::Little);
        },
        other => panic!("expected two sections, got {other:?}"),
    }

    // The interface of the first section is gone
    assert_eq!(events[3], Event::Skipped(BlockError::InvalidInterfaceId(0)));
}

#[test]
fn invalid_interface_id_is_recoverable() {
    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &[])));
    // References interface 1 while only interface 0 exists
    data.extend_from_slice(&block(true, 0x00000006, &epb_body(true, 1, (0, 0), b"bad", &[])));
    data.extend_from_slice(&block(true, 0x00000006, &epb_body(true, 0, (0, 0), b"good", &[])));

    let events = collect_ok(&data);
    assert_eq!(events.len(), 4);

    match &events[2] {
        Event::Skipped(e) => {
            assert_eq!(*e, BlockError::InvalidInterfaceId(1));
            assert!(e.to_string().contains("Invalid interface ID"));
        },
        other => panic!("expected a skipped block, got {other:?}"),
    }
    match &events[3] {
        Event::Packet(packet) => assert_eq!(&packet.data[..], b"good"),
        other => panic!("expected a packet, got {other:?}"),
    }
}


/* ----- options ----- */

#[test]
fn pen_extraction() {
    // opt_custom (2988) with PEN 32473 and value "ab"
    let mut body = shb_body(true);
    body.extend_from_slice(&[0x0B, 0xAC, 0, 8]);
    body.extend_from_slice(&bytes("00007ED9 61620000"));
    body.extend_from_slice(&[0, 0, 0, 0]);

    let events = collect_ok(&block(true, 0x0A0D0D0A, &body));
    match &events[0] {
        Event::Section(section) => {
            let opt = &section.options[0];
            assert_eq!(opt.code, 2988);
            assert_eq!(opt.name, Some("opt_custom"));
            assert_eq!(opt.pen, Some(32473));
            assert_eq!(opt.value, OptionValue::Str(Cow::Borrowed("ab")));
            assert!(!opt.private);
        },
        other => panic!("expected a section, got {other:?}"),
    }
}

#[test]
fn private_options_are_flagged() {
    let mut body = shb_body(true);
    body.extend_from_slice(&[0x80, 0x63, 0, 2, 0xAB, 0xCD, 0, 0]);
    body.extend_from_slice(&[0, 0, 0, 0]);

    let events = collect_ok(&block(true, 0x0A0D0D0A, &body));
    match &events[0] {
        Event::Section(section) => {
            assert_eq!(section.options[0].code, 0x8063);
            assert!(section.options[0].private);
            assert_eq!(section.options[0].value, OptionValue::Bytes(Cow::Borrowed(&[0xAB, 0xCD][..])));
        },
        other => panic!("expected a section, got {other:?}"),
    }
}

#[test]
fn invalid_ipv4mask_option_skips_the_block() {
    // if_IPv4addr must be exactly 8 bytes
    let mut opts = vec![0, 4, 0, 4, 192, 168, 0, 1];
    opts.extend_from_slice(&[0, 0, 0, 0]);

    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &opts)));

    let events = collect_ok(&data);
    match &events[1] {
        Event::Skipped(e) => assert_eq!(e.to_string(), "Invalid ipv4mask option"),
        other => panic!("expected a skipped block, got {other:?}"),
    }
}


/* ----- timestamps ----- */

/// Interface whose clock runs at 10^-5s per tick with a large offset.
fn decimal_clock_options() -> Vec<u8> {
    let mut opts = vec![];
    // if_tsresol 0x05
    opts.extend_from_slice(&[0, 9, 0, 1, 0x05, 0, 0, 0]);
    // if_tsoffset 0x10000000 seconds
    opts.extend_from_slice(&[0, 14, 0, 8]);
    opts.extend_from_slice(&0x10000000u64.to_be_bytes());
    opts.extend_from_slice(&[0, 0, 0, 0]);
    opts
}

#[test]
fn decimal_timestamp_resolution() {
    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &decimal_clock_options())));
    data.extend_from_slice(&block(true, 0x00000006, &epb_body(true, 0, (1, 0), b"x", &[])));

    let events = collect_ok(&data);
    match &events[2] {
        Event::Packet(packet) => assert_eq!(packet.timestamp.unwrap().millis(), 268478405672),
        other => panic!("expected a packet, got {other:?}"),
    }
}

#[test]
fn binary_timestamp_resolution() {
    let mut opts = vec![];
    // if_tsresol 0x8A: 2^10 ticks per second
    opts.extend_from_slice(&[0, 9, 0, 1, 0x8A, 0, 0, 0]);
    opts.extend_from_slice(&[0, 14, 0, 8]);
    opts.extend_from_slice(&0x10000000u64.to_be_bytes());
    opts.extend_from_slice(&[0, 0, 0, 0]);

    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &opts)));
    data.extend_from_slice(&block(true, 0x00000006, &epb_body(true, 0, (1, 0), b"x", &[])));

    let events = collect_ok(&data);
    match &events[2] {
        // 1978-08-23T14:27:03.296Z
        Event::Packet(packet) => assert_eq!(packet.timestamp.unwrap().millis(), 272730423296),
        other => panic!("expected a packet, got {other:?}"),
    }
}

#[test]
fn interface_statistics_use_the_interface_clock() {
    let mut isb = vec![];
    isb.extend_from_slice(&0u32.to_be_bytes());
    isb.extend_from_slice(&0u32.to_be_bytes());
    isb.extend_from_slice(&300_000u32.to_be_bytes());
    // isb_ifdrop
    isb.extend_from_slice(&[0, 5, 0, 8]);
    isb.extend_from_slice(&7u64.to_be_bytes());
    isb.extend_from_slice(&[0, 0, 0, 0]);

    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &[])));
    data.extend_from_slice(&block(true, 0x00000005, &isb));

    let events = collect_ok(&data);
    match &events[2] {
        Event::InterfaceStatistics(stats) => {
            assert_eq!(stats.interface_id, 0);
            assert_eq!(stats.timestamp.millis(), 300);
            assert_eq!(stats.options[0].name, Some("isb_ifdrop"));
            assert_eq!(stats.options[0].value, OptionValue::UInt(7));
        },
        other => panic!("expected interface statistics, got {other:?}"),
    }
}


/* ----- packets ----- */

#[test]
fn packet_flags_are_decoded() {
    let mut opts = vec![0, 2, 0, 4];
    opts.extend_from_slice(&0x00FF0E65u32.to_be_bytes());
    opts.extend_from_slice(&[0, 0, 0, 0]);

    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000001, &idb_body(true, 0xFFFF, &[])));
    data.extend_from_slice(&block(true, 0x00000006, &epb_body(true, 0, (0, 0), b"x", &opts)));

    let events = collect_ok(&data);
    match &events[2] {
        Event::Packet(packet) => {
            let flags = packet.flags.as_ref().expect("flags were expected");
            assert_eq!(flags.direction, Direction::Inbound);
            assert_eq!(flags.reception, Reception::Unicast);
            assert_eq!(flags.fcs_len, 3);
            assert!(flags.no_checksum);
            assert!(flags.checksum_valid);
            assert!(flags.tcp_segmentation_offload);
            assert_eq!(flags.link_layer_errors.len(), 8);
            assert!(flags.link_layer_errors.contains(&LinkLayerError::Crc));
        },
        other => panic!("expected a packet, got {other:?}"),
    }
}


/* ----- other block kinds ----- */

#[test]
fn name_resolution_stream() {
    let mut nrb = vec![];
    // ipv4 record 127.0.0.1 "localhost"
    nrb.extend_from_slice(&[0, 1, 0, 14]);
    nrb.extend_from_slice(&[127, 0, 0, 1]);
    nrb.extend_from_slice(b"localhost\0");
    nrb.extend_from_slice(&[0, 0]); // record padding
    nrb.extend_from_slice(&[0, 0, 0, 0]); // end of records

    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x00000004, &nrb));

    let events = collect_ok(&data);
    match &events[1] {
        Event::NameResolution(names) => {
            assert_eq!(names.records.len(), 1);
            match &names.records[0] {
                Record::Ipv4(rec) => {
                    assert_eq!(rec.addr.to_string(), "127.0.0.1");
                    assert_eq!(rec.names, vec![Cow::Borrowed("localhost")]);
                },
                other => panic!("expected an ipv4 record, got {other:?}"),
            }
        },
        other => panic!("expected a name resolution, got {other:?}"),
    }
}

#[test]
fn decryption_secrets_stream() {
    let mut dsb = vec![];
    dsb.extend_from_slice(&0x544C534Bu32.to_be_bytes());
    dsb.extend_from_slice(&3u32.to_be_bytes());
    dsb.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0]);

    let mut data = block(true, 0x0A0D0D0A, &shb_body(true));
    data.extend_from_slice(&block(true, 0x0000000A, &dsb));

    let events = collect_ok(&data);
    match &events[1] {
        Event::DecryptionSecrets(secrets) => {
            assert_eq!(secrets.secrets_type, 0x544C534B);
            assert_eq!(&secrets.data[..], &[0xAA, 0xBB, 0xCC]);
        },
        other => panic!("expected decryption secrets, got {other:?}"),
    }
}


/* ----- incremental feeding ----- */

#[test]
fn parser_accepts_arbitrarily_fragmented_input() {
    let data = bytes(S2);
    let mut parser = CaptureParser::new();

    let mut events = vec![];
    let mut consumed = 0;
    let mut supplied = 0;

    while events.len() < 3 {
        match parser.next_event(&data[consumed..supplied]) {
            Ok((rem, event)) => {
                consumed = supplied - rem.len();
                if let Some(event) = event {
                    events.push(event.into_owned());
                }
            },
            Err(CaptureError::IncompleteBuffer(needed)) => {
                assert!(needed > 0);
                assert!(supplied < data.len(), "the parser wants bytes past the end of the stream");
                // Feed a single extra byte, the worst possible producer
                supplied += 1;
            },
            Err(e) => panic!("unexpected fatal error: {e}"),
        }
    }

    assert_eq!(consumed, data.len());
    assert!(matches!(events[0], Event::Section(_)));
    assert!(matches!(events[1], Event::Interface(_)));
    assert!(matches!(events[2], Event::Packet(_)));
}
