//! Section Header Block.

use byteorder_slice::result::ReadSlice;
use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};
use derive_into_owned::IntoOwned;

use super::block_common::{BYTE_ORDER_MAGIC_BIG, BYTE_ORDER_MAGIC_LITTLE, SECTION_HEADER_BLOCK};
use super::opt_common::{opts_from_slice, BlockOption};
use crate::common::Endianness;
use crate::errors::BlockError;
use crate::pcapng::state::PcapNgState;


/// Section Header block: opens a section and sets its global parameters.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Section<'a> {
    /// Byte order of every integer in the section.
    pub endianness: Endianness,

    /// Major format version, 1 for every published revision.
    pub major_version: u16,

    /// Minor format version, currently 0.
    pub minor_version: u16,

    /// How many bytes the rest of the section occupies, -1 when the
    /// writer did not know it in advance. A strictly sequential decoder
    /// has no use for it.
    pub section_length: i64,

    /// Options
    pub options: Vec<BlockOption<'a>>,
}

/// Decodes the body of a Section Header block.
///
/// The byte-order magic leading the body decides the endianness of
/// everything that follows, up to the next Section Header.
pub(crate) fn parse<'a>(state: &PcapNgState, mut slice: &'a [u8]) -> Result<Section<'a>, BlockError> {
    if slice.len() < 16 {
        return Err(BlockError::InvalidField("section header body shorter than its fixed fields"));
    }

    let magic = slice.read_u32::<BigEndian>().unwrap();
    let endianness = match magic {
        BYTE_ORDER_MAGIC_BIG => Endianness::Big,
        BYTE_ORDER_MAGIC_LITTLE => Endianness::Little,
        _ => return Err(BlockError::InvalidField("section header with an unrecognized byte-order magic")),
    };

    let (major_version, minor_version, section_length, options) = match endianness {
        Endianness::Big => read_fields::<BigEndian>(state, slice)?,
        Endianness::Little => read_fields::<LittleEndian>(state, slice)?,
    };

    return Ok(Section { endianness, major_version, minor_version, section_length, options });

    #[allow(clippy::type_complexity)]
    fn read_fields<'a, B: ByteOrder>(
        state: &PcapNgState,
        mut slice: &'a [u8],
    ) -> Result<(u16, u16, i64, Vec<BlockOption<'a>>), BlockError> {
        let major_version = slice.read_u16::<B>().unwrap();
        let minor_version = slice.read_u16::<B>().unwrap();
        let section_length = slice.read_i64::<B>().unwrap();
        let (_, options) = opts_from_slice::<B>(state, SECTION_HEADER_BLOCK, None, slice)?;

        Ok((major_version, minor_version, section_length, options))
    }
}
