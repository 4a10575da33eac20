//! Decryption Secrets Block (DSB).

use std::borrow::Cow;

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use derive_into_owned::IntoOwned;

use super::block_common::DECRYPTION_SECRETS_BLOCK;
use super::opt_common::{opts_from_slice, BlockOption};
use crate::errors::BlockError;
use crate::pcapng::state::PcapNgState;


/// Keying material carried alongside the capture.
///
/// The secrets payload is passed through opaque; interpreting it is left to
/// the consumer.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct DecryptionSecrets<'a> {
    /// Format of the secrets, from the standardized secrets type registry.
    pub secrets_type: u32,

    /// The secrets themselves.
    pub data: Cow<'a, [u8]>,

    /// Options
    pub options: Vec<BlockOption<'a>>,
}

/// Decodes the body of a Decryption Secrets block.
pub(crate) fn parse<'a, B: ByteOrder>(state: &PcapNgState, mut slice: &'a [u8]) -> Result<DecryptionSecrets<'a>, BlockError> {
    if slice.len() < 8 {
        return Err(BlockError::InvalidField("decryption secrets body shorter than its fixed fields"));
    }

    let secrets_type = slice.read_u32::<B>().unwrap();
    let secrets_len = slice.read_u32::<B>().unwrap() as usize;

    let pad_len = (4 - (secrets_len % 4)) % 4;
    if slice.len() < secrets_len + pad_len {
        return Err(BlockError::InvalidField("decryption secrets data runs past the end of the block"));
    }

    let data = &slice[..secrets_len];
    slice = &slice[secrets_len + pad_len..];

    let (_, options) = opts_from_slice::<B>(state, DECRYPTION_SECRETS_BLOCK, None, slice)?;

    Ok(DecryptionSecrets { secrets_type, data: Cow::Borrowed(data), options })
}
