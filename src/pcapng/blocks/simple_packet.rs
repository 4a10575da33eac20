//! Simple Packet Block (SPB).

use std::borrow::Cow;

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;

use crate::errors::BlockError;
use crate::event::Packet;
use crate::pcapng::state::PcapNgState;


/// Decodes the body of a Simple Packet block.
///
/// The block itself does not say how many bytes were captured: it is the
/// lower of the original packet length and the snap length of the first
/// interface, which must therefore already exist.
pub(crate) fn parse<'a, B: ByteOrder>(state: &PcapNgState, mut slice: &'a [u8]) -> Result<Packet<'a>, BlockError> {
    let interface = state.interfaces.first().ok_or(BlockError::NoInterface)?;

    if slice.len() < 4 {
        return Err(BlockError::InvalidField("simple packet body shorter than its length field"));
    }

    let original_len = slice.read_u32::<B>().unwrap();

    let captured_len = original_len.min(interface.snaplen) as usize;
    if slice.len() < captured_len {
        return Err(BlockError::InvalidField("simple packet data runs past the end of the block"));
    }

    Ok(Packet {
        interface_id: 0,
        timestamp: None,
        flags: None,
        original_len,
        data: Cow::Borrowed(&slice[..captured_len]),
        options: vec![],
    })
}
