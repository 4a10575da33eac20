//! Interface Statistics Block (ISB).

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use derive_into_owned::IntoOwned;

use super::block_common::INTERFACE_STATISTIC_BLOCK;
use super::opt_common::{opts_from_slice, BlockOption};
use crate::common::Timestamp;
use crate::errors::BlockError;
use crate::pcapng::state::PcapNgState;


/// Capture statistics for a given interface.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct InterfaceStatistics<'a> {
    /// Interface these statistics refer to, an index in the current
    /// section's interface table.
    pub interface_id: u32,

    /// Instant these statistics refer to.
    pub timestamp: Timestamp,

    /// Options
    pub options: Vec<BlockOption<'a>>,
}

/// Decodes the body of an Interface Statistics block.
pub(crate) fn parse<'a, B: ByteOrder>(state: &PcapNgState, mut slice: &'a [u8]) -> Result<InterfaceStatistics<'a>, BlockError> {
    if slice.len() < 12 {
        return Err(BlockError::InvalidField("interface statistics body shorter than its fixed fields"));
    }

    let interface_id = slice.read_u32::<B>().unwrap();
    let timestamp_high = slice.read_u32::<B>().unwrap();
    let timestamp_low = slice.read_u32::<B>().unwrap();

    // Also validates the interface id
    let timestamp = state.resolve_timestamp(interface_id, timestamp_high, timestamp_low)?;

    // isb_starttime and isb_endtime need the interface clock as well
    let (_, options) = opts_from_slice::<B>(state, INTERFACE_STATISTIC_BLOCK, Some(interface_id), slice)?;

    Ok(InterfaceStatistics { interface_id, timestamp, options })
}
