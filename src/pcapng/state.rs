use crate::common::{Endianness, Timestamp};
use crate::errors::BlockError;
use crate::event::Interface;
use crate::pcapng::blocks::section_header::Section;

/// State that must be maintained while decoding a PcapNg stream.
///
/// The encoding of blocks depends on information seen earlier in the stream:
/// the [`Endianness`] of the current section and the clock parameters of each
/// interface. A Section Header block replaces the whole state; Interface
/// Description blocks append to the interface table.
#[derive(Debug, Default)]
pub(crate) struct PcapNgState {
    /// Endianness of the current section
    pub endianness: Endianness,
    /// Clock parameters of the interfaces of the current section
    pub interfaces: Vec<InterfaceState>,
}

/// Per interface data needed to decode later blocks.
#[derive(Copy, Clone, Debug)]
pub(crate) struct InterfaceState {
    pub snaplen: u32,
    pub ts_offset: i64,
    pub ticks_per_milli: u64,
}

impl PcapNgState {
    /// Starts a new section: endianness is replaced and the interface table reset.
    pub fn start_section(&mut self, section: &Section) {
        self.endianness = section.endianness;
        self.interfaces.clear();
    }

    /// Appends an interface to the current section's table.
    pub fn add_interface(&mut self, interface: &Interface) {
        self.interfaces.push(InterfaceState {
            snaplen: interface.snaplen,
            ts_offset: interface.ts_offset,
            // Guarded at decode time, a zero would divide by zero below
            ticks_per_milli: interface.ticks_per_milli.max(1),
        });
    }

    /// Returns the clock parameters of an interface of the current section.
    pub fn interface(&self, interface_id: u32) -> Result<&InterfaceState, BlockError> {
        self.interfaces
            .get(interface_id as usize)
            .ok_or(BlockError::InvalidInterfaceId(interface_id))
    }

    /// Builds the absolute instant of a split 64-bit tick count, using the
    /// clock of the referenced interface.
    pub fn resolve_timestamp(&self, interface_id: u32, high: u32, low: u32) -> Result<Timestamp, BlockError> {
        let interface = self.interface(interface_id)?;

        let stamp = ((high as u64) << 32) | low as u64;
        let millis = interface.ts_offset + (stamp / interface.ticks_per_milli) as i64;

        Ok(Timestamp::from_millis(millis))
    }
}
