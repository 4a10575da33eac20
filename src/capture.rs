//! Format agnostic decoding: detection, event routing and the stream reader.

use std::io::Read;

use byteorder_slice::result::ReadSlice;
use byteorder_slice::BigEndian;
use tracing::trace;

use crate::errors::CaptureError;
use crate::event::Event;
use crate::pcap::PcapParser;
use crate::pcapng::PcapNgParser;
use crate::read_buffer::ReadBuffer;


/// Decoder switches.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CaptureConfig {
    /// Treat a legacy Pcap stream as a fatal error.
    pub reject_legacy: bool,
    /// Treat a PcapNg stream as a fatal error.
    pub reject_pcapng: bool,
}

/// The capture format found by the magic number sniff.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CaptureFormat {
    /// Legacy Pcap
    Legacy,
    /// PcapNg
    PcapNg,
}

#[derive(Debug)]
enum FormatParser {
    Legacy(PcapParser),
    PcapNg(PcapNgParser),
}

/// Parser for a capture stream of either format.
///
/// The format is sniffed from the first 4 bytes: a PcapNg Section Header
/// magic enters the PcapNg block loop, one of the four legacy Pcap magics
/// synthesizes an [`Event::Interface`] and enters the packet record loop.
///
/// The parser is fed slices and never owns the input; match on
/// [`CaptureError::IncompleteBuffer`] to know when it needs more data, and
/// call again at the same position once it arrived. Use
/// [`CaptureReader`] instead when the source implements [`Read`].
///
/// # Examples
///
/// ```rust,no_run
/// use pcapng_stream::{CaptureError, CaptureParser};
///
/// let data = std::fs::read("capture.pcapng").unwrap();
/// let mut src = &data[..];
///
/// let mut parser = CaptureParser::new();
///
/// while !src.is_empty() {
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
pub struct CaptureParser {
    config: CaptureConfig,
    inner: Option<FormatParser>,
}

impl CaptureParser {
    /// Creates a new [`CaptureParser`] accepting both formats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`CaptureParser`] with the given switches.
    pub fn with_config(config: CaptureConfig) -> Self {
        CaptureParser { config, inner: None }
    }

    /// Returns the remainder and the next event of the stream.
    ///
    /// `None` means a whole record was consumed without producing an event
    /// (a PcapNg local-use block): call again with the remainder.
    pub fn next_event<'a>(&mut self, src: &'a [u8]) -> Result<(&'a [u8], Option<Event<'a>>), CaptureError> {
        match &mut self.inner {
            Some(FormatParser::Legacy(parser)) => {
                let (rem, packet) = parser.next_packet(src)?;
                Ok((rem, Some(Event::Packet(packet))))
            },
            Some(FormatParser::PcapNg(parser)) => parser.next_event(src),
            None => self.detect(src),
        }
    }

    /// Sniffs the format from the first 4 bytes and decodes the first event.
    fn detect<'a>(&mut self, src: &'a [u8]) -> Result<(&'a [u8], Option<Event<'a>>), CaptureError> {
        if src.len() < 4 {
            return Err(CaptureError::IncompleteBuffer(4 - src.len()));
        }

        let mut peek = src;
        let magic = peek.read_u32::<BigEndian>().unwrap();
        match magic {
            0x0A0D0D0A => {
                if self.config.reject_pcapng {
                    return Err(CaptureError::PcapNgRejected);
                }
                trace!("capture starts with a PcapNg section header");

                self.inner = Some(FormatParser::PcapNg(PcapNgParser::new()));
                self.next_event(src)
            },

            0xA1B2C3D4 | 0xA1B23C4D | 0xD4C3B2A1 | 0x4D3CB2A1 => {
                if self.config.reject_legacy {
                    return Err(CaptureError::LegacyRejected);
                }
                trace!("capture starts with a legacy Pcap header");

                let (rem, parser) = PcapParser::new(src)?;
                let interface = parser.header().interface();
                self.inner = Some(FormatParser::Legacy(parser));

                Ok((rem, Some(Event::Interface(interface))))
            },

            magic => Err(CaptureError::InvalidFormat(magic)),
        }
    }

    /// Returns the detected format, if the sniff already happened.
    pub fn format(&self) -> Option<CaptureFormat> {
        match self.inner {
            Some(FormatParser::Legacy(_)) => Some(CaptureFormat::Legacy),
            Some(FormatParser::PcapNg(_)) => Some(CaptureFormat::PcapNg),
            None => None,
        }
    }
}


/// Reads capture events from a [`Read`] source of either format.
///
/// Events own their data: nothing borrows from the internal buffer once an
/// event is out. A recoverable per-block fault is returned as
/// [`Event::Skipped`] and iteration continues; an `Err` item is fatal and
/// ends the iteration.
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
///
/// use pcapng_stream::CaptureReader;
///
/// let file_in = File::open("test.pcapng").expect("Error opening file");
/// let mut reader = CaptureReader::new(file_in);
///
/// while let Some(event) = reader.next_event() {
///     // Check if there is no error
///     let event = event.unwrap();
///
///     // Do something
/// }
/// ```
pub struct CaptureReader<R: Read> {
    parser: CaptureParser,
    reader: ReadBuffer<R>,
    done: bool,
}

impl<R: Read> CaptureReader<R> {
    /// Creates a new [`CaptureReader`] from a reader, accepting both formats.
    pub fn new(reader: R) -> CaptureReader<R> {
        Self::with_config(CaptureConfig::default(), reader)
    }

    /// Creates a new [`CaptureReader`] with the given switches.
    pub fn with_config(config: CaptureConfig, reader: R) -> CaptureReader<R> {
        CaptureReader {
            parser: CaptureParser::with_config(config),
            reader: ReadBuffer::new(reader),
            done: false,
        }
    }

    /// Returns the next [`Event`], or `None` once the stream is over.
    ///
    /// The stream is over after it ended on a record boundary, or right
    /// after a fatal error was returned.
    pub fn next_event(&mut self) -> Option<Result<Event<'static>, CaptureError>> {
        while !self.done {
            match self.reader.has_data_left() {
                Ok(true) => {},
                Ok(false) => {
                    self.done = true;
                    return None;
                },
                Err(e) => {
                    self.done = true;
                    return Some(Err(CaptureError::ReadFailed(e)));
                },
            }

            let parser = &mut self.parser;
            let result = self.reader.parse_with(|src| {
                let (rem, event) = parser.next_event(src)?;
                Ok((src.len() - rem.len(), event.map(Event::into_owned)))
            });

            match result {
                // A local-use block was consumed without an event
                Ok(None) => continue,
                Ok(Some(event)) => return Some(Ok(event)),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                },
            }
        }

        None
    }

    /// Returns the detected format, if the first event was decoded.
    pub fn format(&self) -> Option<CaptureFormat> {
        self.parser.format()
    }

    /// Consumes the [`CaptureReader`], returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Gets a reference to the wrapped reader.
    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = Result<Event<'static>, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}
