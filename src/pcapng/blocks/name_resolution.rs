//! Name Resolution Block (NRB).

use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use derive_into_owned::IntoOwned;
use tracing::trace;

use super::block_common::NAME_RESOLUTION_BLOCK;
use super::opt_common::{fmt_eui, opts_from_slice, BlockOption};
use crate::errors::BlockError;
use crate::pcapng::state::PcapNgState;


/// The Name Resolution block correlates addresses found in the captured
/// packets with their canonical names.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct NameResolution<'a> {
    /// Records
    pub records: Vec<Record<'a>>,
    /// Options
    pub options: Vec<BlockOption<'a>>,
}

/// Name resolution record types.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub enum Record<'a> {
    /// IPv4 record
    Ipv4(Ipv4Record<'a>),
    /// IPv6 record
    Ipv6(Ipv6Record<'a>),
    /// EUI-48 record
    Eui48(Eui48Record<'a>),
    /// EUI-64 record
    Eui64(Eui64Record<'a>),
}

/// Names of an IPv4 address.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Ipv4Record<'a> {
    /// IPv4 address
    pub addr: Ipv4Addr,
    /// Names of the address
    pub names: Vec<Cow<'a, str>>,
}

/// Names of an IPv6 address.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Ipv6Record<'a> {
    /// IPv6 address
    pub addr: Ipv6Addr,
    /// Names of the address
    pub names: Vec<Cow<'a, str>>,
}

/// Names of an EUI-48 address.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Eui48Record<'a> {
    /// EUI-48 address
    pub addr: [u8; 6],
    /// Names of the address
    pub names: Vec<Cow<'a, str>>,
}

/// Names of an EUI-64 address.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Eui64Record<'a> {
    /// EUI-64 address
    pub addr: [u8; 8],
    /// Names of the address
    pub names: Vec<Cow<'a, str>>,
}

impl Eui48Record<'_> {
    /// The address as colon separated hex bytes.
    pub fn addr_string(&self) -> String {
        fmt_eui(&self.addr)
    }
}

impl Eui64Record<'_> {
    /// The address as colon separated hex bytes.
    pub fn addr_string(&self) -> String {
        fmt_eui(&self.addr)
    }
}

/// Decodes the body of a Name Resolution block.
pub(crate) fn parse<'a, B: ByteOrder>(state: &PcapNgState, mut slice: &'a [u8]) -> Result<NameResolution<'a>, BlockError> {
    let mut records = Vec::new();

    loop {
        if slice.len() < 4 {
            return Err(BlockError::InvalidField("name record header runs past the end of the block"));
        }

        let type_ = slice.read_u16::<B>().unwrap();
        let length = slice.read_u16::<B>().unwrap() as usize;

        if type_ == 0 {
            break;
        }

        let pad_len = (4 - (length % 4)) % 4;
        if slice.len() < length + pad_len {
            return Err(BlockError::InvalidField("name record value runs past the end of the block"));
        }

        let value = &slice[..length];
        match type_ {
            1 => {
                if length < 6 {
                    return Err(BlockError::InvalidRecord("nrb_record_ipv4"));
                }
                let addr = Ipv4Addr::new(value[0], value[1], value[2], value[3]);
                let names = split_names(&value[4..])?;
                records.push(Record::Ipv4(Ipv4Record { addr, names }));
            },

            2 => {
                if length < 18 {
                    return Err(BlockError::InvalidRecord("nrb_record_ipv6"));
                }
                let mut octets = [0_u8; 16];
                octets.copy_from_slice(&value[..16]);
                let names = split_names(&value[16..])?;
                records.push(Record::Ipv6(Ipv6Record { addr: Ipv6Addr::from(octets), names }));
            },

            3 => {
                if length < 8 {
                    return Err(BlockError::InvalidRecord("nrb_record_eui48"));
                }
                let mut addr = [0_u8; 6];
                addr.copy_from_slice(&value[..6]);
                let names = split_names(&value[6..])?;
                records.push(Record::Eui48(Eui48Record { addr, names }));
            },

            4 => {
                if length < 10 {
                    return Err(BlockError::InvalidRecord("nrb_record_eui64"));
                }
                let mut addr = [0_u8; 8];
                addr.copy_from_slice(&value[..8]);
                let names = split_names(&value[8..])?;
                records.push(Record::Eui64(Eui64Record { addr, names }));
            },

            type_ => trace!(record_type = type_, "skipping unknown name resolution record"),
        }

        slice = &slice[length + pad_len..];
    }

    let (_, options) = opts_from_slice::<B>(state, NAME_RESOLUTION_BLOCK, None, slice)?;

    Ok(NameResolution { records, options })
}

/// Splits a run of NUL terminated names; the empty token left behind the
/// final NUL is dropped.
fn split_names(raw: &[u8]) -> Result<Vec<Cow<'_, str>>, BlockError> {
    let mut names = Vec::new();

    for name in raw.split(|&b| b == 0) {
        names.push(Cow::Borrowed(std::str::from_utf8(name)?));
    }

    if names.last().is_some_and(|name| name.is_empty()) {
        names.pop();
    }

    Ok(names)
}
