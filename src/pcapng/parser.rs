use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};
use tracing::{debug, trace, warn};

use crate::common::Endianness;
use crate::errors::{BlockError, CaptureError};
use crate::event::Event;
use crate::pcapng::blocks::block_common::{
    RawBlock, CUSTOM_BLOCK_COPIABLE, CUSTOM_BLOCK_NON_COPIABLE, DECRYPTION_SECRETS_BLOCK, ENHANCED_PACKET_BLOCK,
    INTERFACE_DESCRIPTION_BLOCK, INTERFACE_STATISTIC_BLOCK, NAME_RESOLUTION_BLOCK, SECTION_HEADER_BLOCK,
    SIMPLE_PACKET_BLOCK,
};
use crate::pcapng::blocks::{
    custom, decryption_secrets, enhanced_packet, interface_description, interface_statistics, name_resolution,
    section_header, simple_packet,
};
use crate::pcapng::state::PcapNgState;

/// Parser for a PcapNg stream.
///
/// The parser is fed slices and never owns the input: [`next_event`] returns
/// the remainder of the slice along with each decoded [`Event`]. Match on
/// [`CaptureError::IncompleteBuffer`] to know when the parser needs more
/// data, and call again with the same position once it arrived.
///
/// A block whose body cannot be decoded yields [`Event::Skipped`] and the
/// returned remainder points past it, so decoding continues at the next
/// block. Errors are only returned for faults of the stream superstructure,
/// and those are fatal.
///
/// [`next_event`]: PcapNgParser::next_event
///
/// # Examples
///
/// ```rust,no_run
/// use pcapng_stream::pcapng::PcapNgParser;
/// use pcapng_stream::CaptureError;
///
/// let data = std::fs::read("capture.pcapng").unwrap();
/// let mut src = &data[..];
///
/// let mut parser = PcapNgParser::new();
///
/// loop {
///     match parser.next_event(src) {
///         Ok((rem, event)) => {
///             if let Some(event) = event {
///                 // Do something
///             }
///
///             // Continue from the remainder
///             src = rem;
///         },
///         Err(CaptureError::IncompleteBuffer(needed)) => {
///             // Fetch more bytes before retrying
///             break;
///         },
///         Err(_) => {
///             // The stream cannot be decoded any further
///             break;
///         },
///     }
/// }
/// ```
#[derive(Debug, Default)]
pub struct PcapNgParser {
    state: PcapNgState,
}

impl PcapNgParser {
    /// Creates a new [`PcapNgParser`].
    ///
    /// The first block of the stream must be a Section Header; its
    /// byte-order magic decides the initial endianness.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the remainder and the next event of the stream.
    ///
    /// `None` means a whole block was consumed without producing an event
    /// (a local-use block): call again with the remainder.
    pub fn next_event<'a>(&mut self, src: &'a [u8]) -> Result<(&'a [u8], Option<Event<'a>>), CaptureError> {
        match self.state.endianness {
            Endianness::Big => self.next_event_inner::<BigEndian>(src),
            Endianness::Little => self.next_event_inner::<LittleEndian>(src),
        }
    }

    fn next_event_inner<'a, B: ByteOrder>(
        &mut self,
        src: &'a [u8],
    ) -> Result<(&'a [u8], Option<Event<'a>>), CaptureError> {
        let (rem, raw) = RawBlock::from_slice::<B>(src)?;
        trace!(block_type = raw.type_, block_len = raw.initial_len, "framed a block");

        // Negative block types are for local use and not ours to interpret
        if (raw.type_ as i32) < 0 {
            debug!(block_type = raw.type_, "ignoring local-use block");
            return Ok((rem, None));
        }

        let event = match self.process_body::<B>(raw.type_, raw.body) {
            Ok(event) => event,
            Err(e) => {
                warn!(block_type = raw.type_, error = %e, "skipping undecodable block");
                Event::Skipped(e)
            },
        };

        Ok((rem, Some(event)))
    }

    /// Decodes one framed block body into its event, updating the section
    /// state for Section Header and Interface Description blocks.
    fn process_body<'a, B: ByteOrder>(&mut self, type_: u32, body: &'a [u8]) -> Result<Event<'a>, BlockError> {
        match type_ {
            SECTION_HEADER_BLOCK => {
                let section = section_header::parse(&self.state, body)?;
                self.state.start_section(&section);
                Ok(Event::Section(section))
            },
            INTERFACE_DESCRIPTION_BLOCK => {
                let interface = interface_description::parse::<B>(&self.state, body)?;
                self.state.add_interface(&interface);
                Ok(Event::Interface(interface))
            },
            SIMPLE_PACKET_BLOCK => Ok(Event::Packet(simple_packet::parse::<B>(&self.state, body)?)),
            NAME_RESOLUTION_BLOCK => Ok(Event::NameResolution(name_resolution::parse::<B>(&self.state, body)?)),
            INTERFACE_STATISTIC_BLOCK => {
                Ok(Event::InterfaceStatistics(interface_statistics::parse::<B>(&self.state, body)?))
            },
            ENHANCED_PACKET_BLOCK => Ok(Event::Packet(enhanced_packet::parse::<B>(&self.state, body)?)),
            DECRYPTION_SECRETS_BLOCK => Ok(Event::DecryptionSecrets(decryption_secrets::parse::<B>(&self.state, body)?)),
            CUSTOM_BLOCK_COPIABLE => Ok(Event::Custom(custom::parse::<B>(body, true)?)),
            CUSTOM_BLOCK_NON_COPIABLE => Ok(Event::Custom(custom::parse::<B>(body, false)?)),
            type_ => {
                debug!(block_type = type_, "unhandled block type");
                Ok(Event::Unknown(type_))
            },
        }
    }

    /// Returns the endianness of the current section.
    pub fn endianness(&self) -> Endianness {
        self.state.endianness
    }
}
