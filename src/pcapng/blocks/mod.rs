//! Contains the PcapNg block decoders.

pub mod custom;
pub mod decryption_secrets;
pub mod interface_statistics;
pub mod name_resolution;
pub mod opt_common;
pub mod section_header;

pub(crate) mod block_common;
pub(crate) mod enhanced_packet;
pub(crate) mod interface_description;
pub(crate) mod simple_packet;

pub use block_common::*;
pub use custom::CustomBlock;
pub use decryption_secrets::DecryptionSecrets;
pub use interface_statistics::InterfaceStatistics;
pub use name_resolution::{Eui48Record, Eui64Record, Ipv4Record, Ipv6Record, NameResolution, Record};
pub use opt_common::{BlockOption, OptionValue};
pub use section_header::Section;
