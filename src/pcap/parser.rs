use std::borrow::Cow;

use byteorder_slice::result::ReadSlice;
use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};

use crate::common::{Endianness, Timestamp};
use crate::errors::CaptureError;
use crate::event::Packet;
use crate::pcap::{PcapHeader, MAXIMUM_SNAPLEN};

/// Parser for a legacy Pcap stream.
///
/// The parser is fed slices and never owns the input: [`next_packet`]
/// returns the remainder of the slice along with each packet. Match on
/// [`CaptureError::IncompleteBuffer`] to know when the parser needs more
/// data. Legacy Pcap has no per-record recovery: every error is fatal.
///
/// [`next_packet`]: PcapParser::next_packet
///
/// # Examples
///
/// ```rust,no_run
/// use pcapng_stream::pcap::PcapParser;
///
/// let data = std::fs::read("capture.pcap").unwrap();
///
/// let (rem, parser) = PcapParser::new(&data).unwrap();
/// let mut src = rem;
///
/// while !src.is_empty() {
///     let (rem, packet) = parser.next_packet(src).unwrap();
///     println!("{packet:?}");
///     src = rem;
/// }
/// ```
#[derive(Debug)]
pub struct PcapParser {
    header: PcapHeader,
}

impl PcapParser {
    /// Creates a new [`PcapParser`].
    /// Returns the remainder and the parser.
    pub fn new(slice: &[u8]) -> Result<(&[u8], PcapParser), CaptureError> {
        let (slice, header) = PcapHeader::from_slice(slice)?;

        let parser = PcapParser { header };

        Ok((slice, parser))
    }

    /// Returns the remainder and the next packet.
    pub fn next_packet<'a>(&self, slice: &'a [u8]) -> Result<(&'a [u8], Packet<'a>), CaptureError> {
        match self.header.endianness {
            Endianness::Big => self.next_packet_inner::<BigEndian>(slice),
            Endianness::Little => self.next_packet_inner::<LittleEndian>(slice),
        }
    }

    fn next_packet_inner<'a, B: ByteOrder>(&self, mut slice: &'a [u8]) -> Result<(&'a [u8], Packet<'a>), CaptureError> {
        if slice.len() < 16 {
            return Err(CaptureError::IncompleteBuffer(16 - slice.len()));
        }

        let ts_sec = slice.read_u32::<B>().unwrap();
        let ts_frac = slice.read_u32::<B>().unwrap();
        let captured_len = slice.read_u32::<B>().unwrap();
        let original_len = slice.read_u32::<B>().unwrap();

        if captured_len > MAXIMUM_SNAPLEN {
            return Err(CaptureError::InvalidField("packet record longer than the maximum snapshot length"));
        }

        if slice.len() < captured_len as usize {
            return Err(CaptureError::IncompleteBuffer(captured_len as usize - slice.len()));
        }

        // Whole seconds land in the upper field, the fraction counts
        // interface clock ticks
        let millis = ts_sec as i64 * 1000 + (ts_frac as u64 / self.header.ticks_per_milli) as i64;

        let packet = Packet {
            interface_id: 0,
            timestamp: Some(Timestamp::from_millis(millis)),
            flags: None,
            original_len,
            data: Cow::Borrowed(&slice[..captured_len as usize]),
            options: vec![],
        };

        Ok((&slice[captured_len as usize..], packet))
    }

    /// Returns the global header of the stream.
    pub fn header(&self) -> &PcapHeader {
        &self.header
    }
}
