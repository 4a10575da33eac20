#![allow(clippy::unreadable_literal)]

//! A streaming event decoder for Pcap and PcapNg captures.
//!
//! Bytes can come from any source: hand slices to [`CaptureParser`] as they
//! arrive, or wrap a [`Read`](std::io::Read) source in a [`CaptureReader`].
//! The format is detected from the first 4 bytes, and one [`Event`] is
//! emitted per decoded record as soon as it is complete.
//!
//! Within a PcapNg section, a malformed block does not stop the stream: it
//! surfaces as [`Event::Skipped`] and decoding resumes at the next block.
//! Faults of the framing itself (truncation, length mismatches, unknown
//! magic numbers) are fatal.
//!
//! ```rust,no_run
//! use std::fs::File;
//!
//! use pcapng_stream::{CaptureReader, Event};
//!
//! let file_in = File::open("test.pcapng").expect("Error opening file");
//! let mut reader = CaptureReader::new(file_in);
//!
//! while let Some(event) = reader.next_event() {
//!     match event.unwrap() {
//!         Event::Packet(packet) => println!("{} bytes captured", packet.data.len()),
//!         event => println!("{event:?}"),
//!     }
//! }
//! ```

pub use capture::{CaptureConfig, CaptureFormat, CaptureParser, CaptureReader};
pub use common::{Endianness, Timestamp};
pub use errors::{BlockError, CaptureError};
pub use event::{Direction, Event, Interface, LinkLayerError, Packet, PacketFlags, Reception};
pub use pcapng::{BlockOption, CustomBlock, DecryptionSecrets, InterfaceStatistics, NameResolution, OptionValue, Record, Section};

pub(crate) mod capture;
pub(crate) mod common;
pub(crate) mod errors;
pub(crate) mod event;
pub(crate) mod read_buffer;

pub mod pcap;
pub mod pcapng;
