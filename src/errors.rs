//! Error types of the crate.

use thiserror::Error;

/* ----- enum CaptureError ----- */

/// Errors that can occur while decoding a capture stream.
///
/// Every variant except [`CaptureError::IncompleteBuffer`] is fatal: the
/// stream cannot be decoded past the point where it was raised.
/// Per-block faults that do not poison the stream framing are reported as
/// [`BlockError`] inside [`Event::Skipped`](crate::Event::Skipped) instead.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The buffer is too small to decode the next record.
    /// # Fields
    /// - 0: number of additional bytes needed
    #[error("Need at least {0} more bytes")]
    IncompleteBuffer(usize),
    /// The stream ended in the middle of a record.
    /// # Fields
    /// - 0: number of additional bytes that were expected
    #[error("Truncated stream: {0} more bytes expected")]
    Truncated(usize),
    /// The first bytes of the stream match none of the known capture magic numbers.
    #[error("Invalid file format: unknown magic number {0:#010X}")]
    InvalidFormat(u32),
    /// The byte-order magic of a Section Header block is unknown.
    #[error("Unable to determine endianness: unknown byte-order magic {0:#010X}")]
    UnknownByteOrder(u32),
    /// The leading and trailing length fields of a block disagree.
    #[error("Length mismatch: block declares {header}B but its trailer says {trailer}B")]
    LengthMismatch {
        /// Length announced before the block body
        header: u32,
        /// Length repeated after the block body
        trailer: u32,
    },
    /// A PcapNg stream was found while [`reject_pcapng`](crate::CaptureConfig::reject_pcapng) is set.
    #[error("PCAPng format detected and rejected")]
    PcapNgRejected,
    /// A legacy Pcap stream was found while [`reject_legacy`](crate::CaptureConfig::reject_legacy) is set.
    #[error("Old PCAP format detected and rejected")]
    LegacyRejected,
    /// A field of the capture is invalid.
    #[error("Invalid field: {0}")]
    InvalidField(&'static str),
    /// An I/O error occurred while reading the stream.
    #[error("I/O error while reading the stream")]
    ReadFailed(#[source] std::io::Error),
}


/* ----- enum BlockError ----- */

/// Errors confined to the body of a single PcapNg block.
///
/// The framing of the stream is still intact when one of these is raised,
/// so the faulty block is skipped and decoding resumes at the next block.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum BlockError {
    /// A Simple Packet block was found before any Interface Description block.
    #[error("No interface for simple packet")]
    NoInterface,
    /// A block references an interface that is not in the current section.
    #[error("Invalid interface ID: {0}")]
    InvalidInterfaceId(u32),
    /// An option value does not match the layout its code requires.
    #[error("Invalid {0} option")]
    InvalidOption(&'static str),
    /// A name resolution record is too short for its type.
    #[error("Invalid {0} record")]
    InvalidRecord(&'static str),
    /// A field of the block is invalid.
    #[error("Invalid field: {0}")]
    InvalidField(&'static str),
    /// A text field is not valid UTF-8.
    #[error("Invalid UTF-8 string")]
    Utf8(#[from] std::str::Utf8Error),
}
