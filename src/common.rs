//! Types shared by the legacy Pcap and the PcapNg decoders.

use std::time::{Duration, SystemTime, UNIX_EPOCH};


/// Endianness of a section of the capture.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Endianness {
    /// Big endian
    #[default]
    Big,
    /// Little endian
    Little,
}

impl Endianness {
    /// True if the endianness is big
    pub fn is_big(self) -> bool {
        matches!(self, Endianness::Big)
    }

    /// True if the endianness is little
    pub fn is_little(self) -> bool {
        matches!(self, Endianness::Little)
    }
}


/// An absolute instant, counted in milliseconds since the Unix epoch.
///
/// Capture clocks can tick below the millisecond; the sub-millisecond part
/// is dropped when the instant is assembled.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a new [`Timestamp`] from a number of milliseconds since the Unix epoch.
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Returns the number of milliseconds since the Unix epoch.
    pub const fn millis(self) -> i64 {
        self.0
    }

    /// Converts the instant into a [`SystemTime`].
    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_millis(self.0 as u64)
        }
        else {
            UNIX_EPOCH - Duration::from_millis(self.0.unsigned_abs())
        }
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}
