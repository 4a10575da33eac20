//! Global header of a legacy Pcap stream.

use byteorder_slice::result::ReadSlice;
use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};

use crate::common::Endianness;
use crate::errors::CaptureError;
use crate::event::Interface;
use crate::pcapng::blocks::opt_common::{BlockOption, OptionValue};


/// The link type bit announcing that an FCS length is present
const LT_FCS_DATALINK_EXT: u32 = 0x0400_0000;
/// Option code of if_fcslen
const IF_FCSLEN: u16 = 13;

/// Legacy Pcap global header.
///
/// The magic number carries both the endianness of the stream and the
/// resolution of the packet timestamps.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PcapHeader {
    /// Endianness of the stream
    pub endianness: Endianness,

    /// Major version number, current value is 2
    pub version_major: u16,

    /// Minor version number, current value is 4
    pub version_minor: u16,

    /// Capture cut-off per packet, usually 65535
    pub snaplen: u32,

    /// Link type of the unique interface, FCS bits included
    pub link_type: u32,

    /// Clock ticks per millisecond of the timestamp fraction field:
    /// 1_000 for microsecond captures, 1_000_000 for nanosecond ones
    pub ticks_per_milli: u64,
}

impl PcapHeader {
    /// Parses a [`PcapHeader`] from a slice.
    pub fn from_slice(slice: &[u8]) -> Result<(&[u8], Self), CaptureError> {
        if slice.len() < 24 {
            return Err(CaptureError::IncompleteBuffer(24 - slice.len()));
        }

        let mut peek = slice;
        let magic = peek.read_u32::<BigEndian>().unwrap();
        match magic {
            0xA1B2C3D4 => parse_inner::<BigEndian>(slice, Endianness::Big, 1_000),
            0xA1B23C4D => parse_inner::<BigEndian>(slice, Endianness::Big, 1_000_000),
            0xD4C3B2A1 => parse_inner::<LittleEndian>(slice, Endianness::Little, 1_000),
            0x4D3CB2A1 => parse_inner::<LittleEndian>(slice, Endianness::Little, 1_000_000),
            _ => Err(CaptureError::InvalidFormat(magic)),
        }
    }

    /// Synthesizes the single [`Interface`] record of a legacy stream.
    ///
    /// The high bits of the link type field can carry the FCS length of the
    /// interface; when present it is surfaced as an if_fcslen option the way
    /// a PcapNg capture would report it.
    pub fn interface(&self) -> Interface<'static> {
        let mut options = vec![];

        if self.link_type & LT_FCS_DATALINK_EXT != 0 {
            let fcs_bits = (self.link_type >> 28) as u64 * 16;
            options.push(BlockOption {
                code: IF_FCSLEN,
                name: Some("if_fcslen"),
                value: OptionValue::UInt(fcs_bits),
                pen: None,
                private: false,
            });
        }

        Interface {
            link_type: (self.link_type & 0xFFFF) as u16,
            snaplen: self.snaplen,
            name: None,
            ts_offset: 0,
            ticks_per_milli: self.ticks_per_milli,
            options,
        }
    }
}

fn parse_inner<B: ByteOrder>(
    mut slice: &[u8],
    endianness: Endianness,
    ticks_per_milli: u64,
) -> Result<(&[u8], PcapHeader), CaptureError> {
    slice.read_u32::<B>().unwrap(); // magic, already matched

    let version_major = slice.read_u16::<B>().unwrap();
    let version_minor = slice.read_u16::<B>().unwrap();
    slice.read_i32::<B>().unwrap(); // ts_correction, reserved
    slice.read_u32::<B>().unwrap(); // ts_accuracy, reserved
    let snaplen = slice.read_u32::<B>().unwrap();
    let link_type = slice.read_u32::<B>().unwrap();

    let header = PcapHeader {
        endianness,
        version_major,
        version_minor,
        snaplen,
        link_type,
        ticks_per_milli,
    };

    Ok((slice, header))
}
