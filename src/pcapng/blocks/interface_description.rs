//! Interface Description Block (IDB).

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use tracing::warn;

use super::block_common::INTERFACE_DESCRIPTION_BLOCK;
use super::opt_common::{opts_from_slice, OptionValue};
use crate::errors::BlockError;
use crate::event::Interface;
use crate::pcapng::state::PcapNgState;


/// Option code of if_name
const IF_NAME: u16 = 2;
/// Option code of if_tsresol
const IF_TSRESOL: u16 = 9;
/// Option code of if_tsoffset
const IF_TSOFFSET: u16 = 14;

/// Decodes the body of an Interface Description block.
///
/// The clock options of the interface are folded into the [`Interface`]
/// record: if_tsoffset becomes milliseconds, if_tsresol becomes a tick rate.
pub(crate) fn parse<'a, B: ByteOrder>(state: &PcapNgState, mut slice: &'a [u8]) -> Result<Interface<'a>, BlockError> {
    if slice.len() < 8 {
        return Err(BlockError::InvalidField("interface description body shorter than its fixed fields"));
    }

    let link_type = slice.read_u16::<B>().unwrap();

    let reserved = slice.read_u16::<B>().unwrap();
    if reserved != 0 {
        warn!(reserved, "non-zero reserved field in an interface description");
    }

    let snaplen = slice.read_u32::<B>().unwrap();
    let (_, options) = opts_from_slice::<B>(state, INTERFACE_DESCRIPTION_BLOCK, None, slice)?;

    let name = options.iter().find(|opt| opt.code == IF_NAME).and_then(|opt| match &opt.value {
        OptionValue::Str(name) => Some(name.clone()),
        _ => None,
    });

    // Seconds on the wire, milliseconds in the event
    let ts_offset = options
        .iter()
        .find(|opt| opt.code == IF_TSOFFSET)
        .and_then(|opt| match opt.value {
            OptionValue::UInt(seconds) => Some(seconds as i64 * 1000),
            _ => None,
        })
        .unwrap_or(0);

    let ticks_per_milli = options
        .iter()
        .find(|opt| opt.code == IF_TSRESOL)
        .and_then(|opt| match &opt.value {
            OptionValue::Bytes(raw) => raw.first().copied(),
            _ => None,
        })
        .map(ticks_per_milli)
        .unwrap_or(1000);

    Ok(Interface { link_type, snaplen, name, ts_offset, ticks_per_milli, options })
}

/// Converts a raw if_tsresol byte into a number of clock ticks per millisecond.
///
/// The most significant bit selects a binary power, otherwise the value is a
/// negative decimal power of seconds. Resolutions coarser than a millisecond
/// cannot be represented by an integer tick rate and degrade to 1 tick/ms.
fn ticks_per_milli(raw: u8) -> u64 {
    let ticks = if raw & 0x80 != 0 {
        1_u64.checked_shl((raw & 0x7F) as u32).map(|t| t / 1000)
    }
    else {
        (raw as u32).checked_sub(3).and_then(|exp| 10_u64.checked_pow(exp))
    };

    match ticks {
        Some(ticks) if ticks > 0 => ticks,
        _ => {
            warn!(if_tsresol = raw, "unusable timestamp resolution, decoding with millisecond ticks");
            1
        },
    }
}
