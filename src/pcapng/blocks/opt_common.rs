//! Generic block option decoding.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::net::{Ipv4Addr, Ipv6Addr};

use byteorder_slice::result::ReadSlice;
use byteorder_slice::ByteOrder;
use derive_into_owned::IntoOwned;
use once_cell::sync::Lazy;

use super::block_common::{
    ENHANCED_PACKET_BLOCK, INTERFACE_DESCRIPTION_BLOCK, INTERFACE_STATISTIC_BLOCK, NAME_RESOLUTION_BLOCK,
    SECTION_HEADER_BLOCK,
};
use crate::common::Timestamp;
use crate::errors::BlockError;
use crate::pcapng::state::PcapNgState;


/// A decoded block option.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlockOption<'a> {
    /// Option code, as read from the stream.
    pub code: u16,
    /// Name of the option, when the code is known for the enclosing block type.
    pub name: Option<&'static str>,
    /// Decoded value.
    pub value: OptionValue<'a>,
    /// Private Enterprise Number, for custom options.
    pub pen: Option<u32>,
    /// True for option codes with the most significant bit set.
    pub private: bool,
}

impl BlockOption<'_> {
    /// Detaches the option from the buffer it was decoded from.
    pub fn into_owned(self) -> BlockOption<'static> {
        BlockOption {
            code: self.code,
            name: self.name,
            value: self.value.into_owned(),
            pen: self.pen,
            private: self.private,
        }
    }
}

/// Value of a block option, shaped by the option dictionary.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub enum OptionValue<'a> {
    /// Text, including pretty-printed addresses.
    Str(Cow<'a, str>),
    /// 8, 32 or 64-bit unsigned integer.
    UInt(u64),
    /// An absolute instant, resolved against the referenced interface.
    Timestamp(Timestamp),
    /// Raw bytes, for unknown codes and octet-string options.
    Bytes(Cow<'a, [u8]>),
}


/* ----- option dictionary ----- */

/// Wire layout of an option value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OptionKind {
    Str,
    Ipv4,
    Ipv6,
    Ipv4Mask,
    Ipv6Prefix,
    Eui,
    U8,
    U32,
    U64,
    Timestamp,
    Bytes,
}

/// Dictionary entry for one `(block type, option code)` pair.
#[derive(Copy, Clone, Debug)]
pub(crate) struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    /// The first 4 bytes of the value are a Private Enterprise Number.
    pub pen: bool,
}

const fn spec(name: &'static str, kind: OptionKind) -> OptionSpec {
    OptionSpec { name, kind, pen: false }
}

/// Options valid in any block type.
static COMMON_OPTIONS: Lazy<HashMap<u16, OptionSpec>> = Lazy::new(|| {
    HashMap::from([
        (1, spec("opt_comment", OptionKind::Str)),
        (2988, OptionSpec { name: "opt_custom", kind: OptionKind::Str, pen: true }),
        (2989, OptionSpec { name: "opt_custom", kind: OptionKind::Bytes, pen: true }),
        (19372, OptionSpec { name: "opt_custom", kind: OptionKind::Str, pen: true }),
        (19373, OptionSpec { name: "opt_custom", kind: OptionKind::Bytes, pen: true }),
    ])
});

/// Per block type option tables, mirroring the PcapNg draft.
static BLOCK_OPTIONS: Lazy<HashMap<u32, HashMap<u16, OptionSpec>>> = Lazy::new(|| {
    HashMap::from([
        (
            SECTION_HEADER_BLOCK,
            HashMap::from([
                (2, spec("shb_hardware", OptionKind::Str)),
                (3, spec("shb_os", OptionKind::Str)),
                (4, spec("shb_userappl", OptionKind::Str)),
            ]),
        ),
        (
            INTERFACE_DESCRIPTION_BLOCK,
            HashMap::from([
                (2, spec("if_name", OptionKind::Str)),
                (3, spec("if_description", OptionKind::Str)),
                (4, spec("if_IPv4addr", OptionKind::Ipv4Mask)),
                (5, spec("if_IPv6addr", OptionKind::Ipv6Prefix)),
                (6, spec("if_MACaddr", OptionKind::Eui)),
                (7, spec("if_EUIaddr", OptionKind::Eui)),
                (8, spec("if_speed", OptionKind::U64)),
                (9, spec("if_tsresol", OptionKind::Bytes)),
                (10, spec("if_tzone", OptionKind::U32)),
                (11, spec("if_filter", OptionKind::Bytes)),
                (12, spec("if_os", OptionKind::Str)),
                (13, spec("if_fcslen", OptionKind::U8)),
                (14, spec("if_tsoffset", OptionKind::U64)),
                (15, spec("if_hardware", OptionKind::Str)),
                (16, spec("if_txspeed", OptionKind::U64)),
                (17, spec("if_rxspeed", OptionKind::U64)),
            ]),
        ),
        (
            ENHANCED_PACKET_BLOCK,
            HashMap::from([
                (2, spec("epb_flags", OptionKind::Bytes)),
                (3, spec("epb_hash", OptionKind::Bytes)),
                (4, spec("epb_dropcount", OptionKind::U64)),
                (5, spec("epb_packetid", OptionKind::U64)),
                (6, spec("epb_queue", OptionKind::U32)),
                (7, spec("epb_verdict", OptionKind::Bytes)),
            ]),
        ),
        (
            INTERFACE_STATISTIC_BLOCK,
            HashMap::from([
                (2, spec("isb_starttime", OptionKind::Timestamp)),
                (3, spec("isb_endtime", OptionKind::Timestamp)),
                (4, spec("isb_ifrecv", OptionKind::U64)),
                (5, spec("isb_ifdrop", OptionKind::U64)),
                (6, spec("isb_filteraccept", OptionKind::U64)),
                (7, spec("isb_osdrop", OptionKind::U64)),
                (8, spec("isb_usrdeliv", OptionKind::U64)),
            ]),
        ),
        (
            NAME_RESOLUTION_BLOCK,
            HashMap::from([
                (2, spec("ns_dnsname", OptionKind::Str)),
                (3, spec("ns_dnsIP4addr", OptionKind::Ipv4)),
                (4, spec("ns_dnsIP6addr", OptionKind::Ipv6)),
            ]),
        ),
    ])
});

fn lookup(block_type: u32, code: u16) -> Option<&'static OptionSpec> {
    BLOCK_OPTIONS
        .get(&block_type)
        .and_then(|opts| opts.get(&code))
        .or_else(|| COMMON_OPTIONS.get(&code))
}


/* ----- decoding ----- */

/// Walks the option list of a block body until its end-of-options sentinel
/// or the end of the body.
pub(crate) fn opts_from_slice<'a, B: ByteOrder>(
    state: &PcapNgState,
    block_type: u32,
    interface_id: Option<u32>,
    mut slice: &'a [u8],
) -> Result<(&'a [u8], Vec<BlockOption<'a>>), BlockError> {
    // An exhausted body simply carries no options
    let mut options = vec![];

    while !slice.is_empty() {
        if slice.len() < 4 {
            return Err(BlockError::InvalidField("option header runs past the end of the block"));
        }

        let code = slice.read_u16::<B>().unwrap();
        let length = slice.read_u16::<B>().unwrap() as usize;
        let pad_len = (4 - (length % 4)) % 4;

        if code == 0 {
            return Ok((slice, options));
        }

        if slice.len() < length + pad_len {
            return Err(BlockError::InvalidField("option value runs past the end of the block"));
        }

        let value = &slice[..length];
        let opt = decode_option::<B>(state, block_type, interface_id, code, value)?;

        slice = &slice[length + pad_len..];
        options.push(opt);
    }

    Ok((slice, options))
}

fn decode_option<'a, B: ByteOrder>(
    state: &PcapNgState,
    block_type: u32,
    interface_id: Option<u32>,
    code: u16,
    mut value: &'a [u8],
) -> Result<BlockOption<'a>, BlockError> {
    let private = code & 0x8000 != 0;

    let (name, kind, has_pen) = match lookup(block_type, code) {
        Some(spec) => (Some(spec.name), spec.kind, spec.pen),
        None => (None, OptionKind::Bytes, false),
    };

    let pen = if has_pen {
        if value.len() < 4 {
            return Err(BlockError::InvalidOption("opt_custom"));
        }
        Some(value.read_u32::<B>().unwrap())
    }
    else {
        None
    };

    let value = match kind {
        OptionKind::Str => OptionValue::Str(clean_str(value)?),

        OptionKind::Ipv4 => {
            if value.len() != 4 {
                return Err(BlockError::InvalidOption("ipv4"));
            }
            let addr = Ipv4Addr::new(value[0], value[1], value[2], value[3]);
            OptionValue::Str(Cow::Owned(addr.to_string()))
        },

        OptionKind::Ipv6 => {
            if value.len() != 16 {
                return Err(BlockError::InvalidOption("ipv6"));
            }
            OptionValue::Str(Cow::Owned(ipv6_from_slice(value).to_string()))
        },

        OptionKind::Ipv4Mask => {
            if value.len() != 8 {
                return Err(BlockError::InvalidOption("ipv4mask"));
            }
            let addr = Ipv4Addr::new(value[0], value[1], value[2], value[3]);
            let mask = Ipv4Addr::new(value[4], value[5], value[6], value[7]);
            OptionValue::Str(Cow::Owned(format!("{addr}/{mask}")))
        },

        OptionKind::Ipv6Prefix => {
            if value.len() != 17 {
                return Err(BlockError::InvalidOption("ipv6prefix"));
            }
            let addr = ipv6_from_slice(&value[..16]);
            OptionValue::Str(Cow::Owned(format!("{addr}/{}", value[16])))
        },

        OptionKind::Eui => OptionValue::Str(Cow::Owned(fmt_eui(value))),

        OptionKind::U8 => {
            if value.len() != 1 {
                return Err(BlockError::InvalidOption("u8"));
            }
            OptionValue::UInt(value[0] as u64)
        },

        OptionKind::U32 => {
            if value.len() != 4 {
                return Err(BlockError::InvalidOption("u32"));
            }
            OptionValue::UInt(value.read_u32::<B>().unwrap() as u64)
        },

        OptionKind::U64 => {
            if value.len() != 8 {
                return Err(BlockError::InvalidOption("u64"));
            }
            OptionValue::UInt(value.read_u64::<B>().unwrap())
        },

        OptionKind::Timestamp => {
            if value.len() != 8 {
                return Err(BlockError::InvalidOption("timestamp"));
            }
            let high = value.read_u32::<B>().unwrap();
            let low = value.read_u32::<B>().unwrap();
            let interface_id = interface_id.ok_or(BlockError::InvalidField("timestamp option without an owning interface"))?;
            OptionValue::Timestamp(state.resolve_timestamp(interface_id, high, low)?)
        },

        OptionKind::Bytes => OptionValue::Bytes(Cow::Borrowed(value)),
    };

    Ok(BlockOption { code, name, value, pen, private })
}

/// Decodes a text option: NULs are dropped and surrounding whitespace trimmed.
fn clean_str(bytes: &[u8]) -> Result<Cow<'_, str>, BlockError> {
    let text = std::str::from_utf8(bytes)?;

    if text.contains('\0') {
        Ok(Cow::Owned(text.replace('\0', "").trim().to_string()))
    }
    else {
        Ok(Cow::Borrowed(text.trim()))
    }
}

/// Formats an EUI-48/EUI-64 address as colon separated hex bytes.
pub(crate) fn fmt_eui(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(':');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn ipv6_from_slice(slice: &[u8]) -> Ipv6Addr {
    let mut octets = [0_u8; 16];
    octets.copy_from_slice(slice);
    Ipv6Addr::from(octets)
}
