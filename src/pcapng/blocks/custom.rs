//! Custom Block.

use std::borrow::Cow;

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use derive_into_owned::IntoOwned;

use crate::errors::BlockError;


/// A vendor specific block.
///
/// The payload is opaque; the Private Enterprise Number says who can
/// interpret it.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct CustomBlock<'a> {
    /// IANA enterprise number of whoever defined the payload format.
    pub pen: u32,

    /// Payload of the block.
    pub data: Cow<'a, [u8]>,

    /// True when the block may be copied into derived captures
    /// (block type 0x00000BAD rather than 0x40000BAD).
    pub copyable: bool,
}

/// Decodes the body of a Custom block.
pub(crate) fn parse<B: ByteOrder>(mut slice: &[u8], copyable: bool) -> Result<CustomBlock<'_>, BlockError> {
    if slice.len() < 4 {
        return Err(BlockError::InvalidField("custom block body shorter than its enterprise number"));
    }

    let pen = slice.read_u32::<B>().unwrap();

    Ok(CustomBlock { pen, data: Cow::Borrowed(slice), copyable })
}
