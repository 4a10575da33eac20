//! Block framing.

use byteorder_slice::result::ReadSlice;
use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::CaptureError;


/// Block type of the Section Header
pub const SECTION_HEADER_BLOCK: u32 = 0x0A0D0D0A;
/// Block type of the Interface Description
pub const INTERFACE_DESCRIPTION_BLOCK: u32 = 0x00000001;
/// Block type of the Simple Packet
pub const SIMPLE_PACKET_BLOCK: u32 = 0x00000003;
/// Block type of the Name Resolution
pub const NAME_RESOLUTION_BLOCK: u32 = 0x00000004;
/// Block type of the Interface Statistics
pub const INTERFACE_STATISTIC_BLOCK: u32 = 0x00000005;
/// Block type of the Enhanced Packet
pub const ENHANCED_PACKET_BLOCK: u32 = 0x00000006;
/// Block type of the Decryption Secrets
pub const DECRYPTION_SECRETS_BLOCK: u32 = 0x0000000A;
/// Block type of Custom blocks that may be copied into derived captures
pub const CUSTOM_BLOCK_COPIABLE: u32 = 0x00000BAD;
/// Block type of Custom blocks that must not be copied
pub const CUSTOM_BLOCK_NON_COPIABLE: u32 = 0x40000BAD;

/// Byte-order magic of a big endian section
pub(crate) const BYTE_ORDER_MAGIC_BIG: u32 = 0x1A2B3C4D;
/// Byte-order magic of a little endian section
pub(crate) const BYTE_ORDER_MAGIC_LITTLE: u32 = 0x4D3C2B1A;


//   0               1               2               3
//   0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                          Block Type                           |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                      Block Total Length                       |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  /                          Block Body                           /
//  /          /* variable length, aligned to 32 bits */            /
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |                      Block Total Length                       |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// A framed but not yet decoded PcapNg block.
#[derive(Clone, Debug)]
pub(crate) struct RawBlock<'a> {
    /// Type of the block
    pub type_: u32,
    /// Length announced ahead of the body
    pub initial_len: u32,
    /// Body of the block, padding included
    pub body: &'a [u8],
}

impl<'a> RawBlock<'a> {
    /// Frames the next block of a slice.
    ///
    /// The body is bounded to exactly `initial_len - 12` bytes, so a faulty
    /// body decode can never consume past its own block. Errors raised here
    /// concern the superstructure of the stream and are all fatal.
    pub fn from_slice<B: ByteOrder>(mut slice: &'a [u8]) -> Result<(&'a [u8], Self), CaptureError> {
        // 12 bytes is the smallest legal block, and enough to hold the
        // byte-order magic of a section header
        if slice.len() < 12 {
            return Err(CaptureError::IncompleteBuffer(12 - slice.len()));
        }

        let type_ = slice.read_u32::<B>().unwrap();

        if type_ != SECTION_HEADER_BLOCK {
            let initial_len = slice.read_u32::<B>().unwrap();
            return frame_body::<B>(slice, type_, initial_len);
        }

        // A section header may flip the endianness, so its length field can
        // only be trusted once the byte-order magic right behind it is
        // known; the type itself reads the same either way
        let raw_len = slice.read_u32::<BigEndian>().unwrap();
        let mut body = slice;
        match body.read_u32::<BigEndian>().unwrap() {
            BYTE_ORDER_MAGIC_BIG => frame_body::<BigEndian>(slice, type_, raw_len),
            BYTE_ORDER_MAGIC_LITTLE => frame_body::<LittleEndian>(slice, type_, raw_len.swap_bytes()),
            magic => Err(CaptureError::UnknownByteOrder(magic)),
        }
    }
}

/// Bounds the body and checks the redundant trailing length.
fn frame_body<B: ByteOrder>(slice: &[u8], type_: u32, initial_len: u32) -> Result<(&[u8], RawBlock<'_>), CaptureError> {
    if initial_len % 4 != 0 {
        return Err(CaptureError::InvalidField("declared block length is not 32-bit aligned"));
    }

    if initial_len < 12 {
        return Err(CaptureError::InvalidField("declared block length cannot hold the framing fields"));
    }

    // Body plus the trailing length, the leading 8 bytes are already consumed
    let rem_len = initial_len as usize - 8;
    if slice.len() < rem_len {
        return Err(CaptureError::IncompleteBuffer(rem_len - slice.len()));
    }

    let body_len = initial_len as usize - 12;
    let body = &slice[..body_len];

    let mut rem = &slice[body_len..];
    let trailer_len = rem.read_u32::<B>().unwrap();

    if initial_len != trailer_len {
        return Err(CaptureError::LengthMismatch { header: initial_len, trailer: trailer_len });
    }

    let block = RawBlock { type_, initial_len, body };

    Ok((rem, block))
}
