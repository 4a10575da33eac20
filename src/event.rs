//! Events emitted while decoding a capture stream.

use std::borrow::Cow;

use derive_into_owned::IntoOwned;

use crate::common::Timestamp;
use crate::errors::BlockError;
use crate::pcapng::blocks::custom::CustomBlock;
use crate::pcapng::blocks::decryption_secrets::DecryptionSecrets;
use crate::pcapng::blocks::interface_statistics::InterfaceStatistics;
use crate::pcapng::blocks::name_resolution::NameResolution;
use crate::pcapng::blocks::opt_common::BlockOption;
use crate::pcapng::blocks::section_header::Section;


/// A decoded record of the capture stream.
///
/// Events are emitted in byte order: a [`Event::Section`] first (PcapNg), or
/// a synthetic [`Event::Interface`] (legacy Pcap), then one event per record.
/// The end of the stream is the end of the iteration; there is no
/// terminating event.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub enum Event<'a> {
    /// A new section starts; the interface table has been reset.
    Section(Section<'a>),
    /// A capture interface was described, appended to the section's interface table.
    Interface(Interface<'a>),
    /// A captured packet, from an Enhanced Packet block, a Simple Packet
    /// block or a legacy Pcap record.
    Packet(Packet<'a>),
    /// Address to name correlations.
    NameResolution(NameResolution<'a>),
    /// Capture statistics for one interface.
    InterfaceStatistics(InterfaceStatistics<'a>),
    /// Opaque keying material.
    DecryptionSecrets(DecryptionSecrets<'a>),
    /// A vendor specific block.
    Custom(CustomBlock<'a>),
    /// A block of a known-valid but unhandled type; its body was consumed.
    Unknown(u32),
    /// A block whose body could not be decoded; framing is intact and
    /// decoding continues at the next block.
    Skipped(BlockError),
}


/// A capture interface.
///
/// Interfaces are appended to their section's table in order of appearance
/// and are referenced by packets through that index.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Interface<'a> {
    /// Link layer type of the interface, from the tcpdump.org registry.
    pub link_type: u16,

    /// Upper bound on how many octets of each packet are stored.
    pub snaplen: u32,

    /// Name of the device, from the if_name option.
    pub name: Option<Cow<'a, str>>,

    /// Offset in milliseconds added to every timestamp of this interface.
    pub ts_offset: i64,

    /// Number of clock ticks per millisecond, 1000 by default (microsecond clock).
    pub ticks_per_milli: u64,

    /// Options
    pub options: Vec<BlockOption<'a>>,
}


/// A captured packet.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Packet<'a> {
    /// Index of the interface this packet comes from, in the current section's table.
    pub interface_id: u32,

    /// Instant of the capture. Absent for Simple Packet blocks.
    pub timestamp: Option<Timestamp>,

    /// Link layer information decoded from the epb_flags option.
    pub flags: Option<PacketFlags>,

    /// Length of the packet as it traveled on the wire, before any
    /// snaplen cut.
    pub original_len: u32,

    /// The captured data, at most snaplen bytes of it.
    pub data: Cow<'a, [u8]>,

    /// Options
    pub options: Vec<BlockOption<'a>>,
}


/// Link layer information carried by the 32-bit epb_flags word.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PacketFlags {
    /// Direction of travel of the packet.
    pub direction: Direction,
    /// How the packet was addressed.
    pub reception: Reception,
    /// Length of the Frame Check Sequence of this packet, in octets.
    pub fcs_len: u8,
    /// The checksum of the packet was not computed by the sender.
    pub no_checksum: bool,
    /// The checksum of the packet was verified valid.
    pub checksum_valid: bool,
    /// The packet is subject to TCP segmentation offload.
    pub tcp_segmentation_offload: bool,
    /// Link layer errors observed on reception, lowest bit first.
    pub link_layer_errors: Vec<LinkLayerError>,
}

impl PacketFlags {
    /// Decodes a raw epb_flags word.
    pub fn from_bits(bits: u32) -> Self {
        let direction = match bits & 0b11 {
            0 => Direction::NotAvailable,
            1 => Direction::Inbound,
            2 => Direction::Outbound,
            _ => Direction::Invalid,
        };

        let reception = match (bits >> 2) & 0b111 {
            0 => Reception::NotSpecified,
            1 => Reception::Unicast,
            2 => Reception::Multicast,
            3 => Reception::Broadcast,
            4 => Reception::Promiscuous,
            _ => Reception::Invalid,
        };

        let link_layer_errors = LINK_LAYER_ERRORS
            .iter()
            .enumerate()
            .filter(|(i, _)| bits & (1 << (16 + i)) != 0)
            .map(|(_, e)| *e)
            .collect();

        PacketFlags {
            direction,
            reception,
            fcs_len: ((bits >> 5) & 0xF) as u8,
            no_checksum: bits & (1 << 9) != 0,
            checksum_valid: bits & (1 << 10) != 0,
            tcp_segmentation_offload: bits & (1 << 11) != 0,
            link_layer_errors,
        }
    }
}

/// Direction of travel of a packet, relative to the capturing host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Information not available
    NotAvailable,
    /// Received by the capturing host
    Inbound,
    /// Sent by the capturing host
    Outbound,
    /// Reserved bit pattern
    Invalid,
}

/// Addressing of a packet, as seen by the capturing interface.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Reception {
    /// Information not available
    NotSpecified,
    /// Sent to a single host
    Unicast,
    /// Sent to a group of hosts
    Multicast,
    /// Sent to every host of the segment
    Broadcast,
    /// Seen only because the interface is in promiscuous mode
    Promiscuous,
    /// Reserved bit pattern
    Invalid,
}

/// Link layer errors reported by an interface for one packet.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(missing_docs)]
pub enum LinkLayerError {
    Symbol,
    Preamble,
    StartFrameDelimiter,
    UnalignedFrame,
    WrongInterFrameGap,
    PacketTooShort,
    PacketTooLong,
    Crc,
}

/// Error flags of the epb_flags word, bit 16 first.
const LINK_LAYER_ERRORS: [LinkLayerError; 8] = [
    LinkLayerError::Symbol,
    LinkLayerError::Preamble,
    LinkLayerError::StartFrameDelimiter,
    LinkLayerError::UnalignedFrame,
    LinkLayerError::WrongInterFrameGap,
    LinkLayerError::PacketTooShort,
    LinkLayerError::PacketTooLong,
    LinkLayerError::Crc,
];
