//! Enhanced Packet Block (EPB).

use std::borrow::Cow;

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;

use super::block_common::ENHANCED_PACKET_BLOCK;
use super::opt_common::{opts_from_slice, OptionValue};
use crate::errors::BlockError;
use crate::event::{Packet, PacketFlags};
use crate::pcapng::state::PcapNgState;


/// Option code of epb_flags
const EPB_FLAGS: u16 = 2;

/// Decodes the body of an Enhanced Packet block.
pub(crate) fn parse<'a, B: ByteOrder>(state: &PcapNgState, mut slice: &'a [u8]) -> Result<Packet<'a>, BlockError> {
    if slice.len() < 20 {
        return Err(BlockError::InvalidField("enhanced packet body shorter than its fixed fields"));
    }

    let interface_id = slice.read_u32::<B>().unwrap();
    let timestamp_high = slice.read_u32::<B>().unwrap();
    let timestamp_low = slice.read_u32::<B>().unwrap();
    let captured_len = slice.read_u32::<B>().unwrap() as usize;
    let original_len = slice.read_u32::<B>().unwrap();

    // Also validates the interface id
    let timestamp = state.resolve_timestamp(interface_id, timestamp_high, timestamp_low)?;

    let pad_len = (4 - (captured_len % 4)) % 4;
    if slice.len() < captured_len + pad_len {
        return Err(BlockError::InvalidField("enhanced packet data runs past the end of the block"));
    }

    let data = &slice[..captured_len];
    slice = &slice[captured_len + pad_len..];

    let (_, options) = opts_from_slice::<B>(state, ENHANCED_PACKET_BLOCK, Some(interface_id), slice)?;

    let flags = options.iter().find(|opt| opt.code == EPB_FLAGS).and_then(|opt| match &opt.value {
        OptionValue::Bytes(raw) if raw.len() == 4 => {
            let mut raw: &[u8] = raw;
            Some(PacketFlags::from_bits(raw.read_u32::<B>().unwrap()))
        },
        _ => None,
    });

    Ok(Packet {
        interface_id,
        timestamp: Some(timestamp),
        flags,
        original_len,
        data: Cow::Borrowed(data),
        options,
    })
}
