//! Formatting option bitmask.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Fields a destination excludes from its output.
    ///
    /// Each flag removes one segment; an empty mask ([`Options::ALL`])
    /// includes everything.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Options: u32 {
        /// Exclude the host name.
        const NOHOST = 0x0000_0100;
        /// Exclude time stamps (implies `NOMSEC`).
        const NOTIME = 0x0000_0200;
        /// Exclude the `[level]` tag.
        const NOLEVEL = 0x0000_0400;
        /// Exclude the process name.
        const NONAME = 0x0000_0800;
        /// Exclude milliseconds from time stamps.
        const NOMSEC = 0x0000_1000;
        /// Exclude the process id.
        const NOPID = 0x0000_2000;
        /// Exclude the thread id/name.
        const NOTID = 0x0000_4000;
        /// Don't write header lines to log files.
        const NOHDR = 0x0001_0000;
    }
}

impl Options {
    /// Include all fields.
    pub const ALL: Self = Self::empty();
    /// Message text only (every field flag except `NOHDR`).
    pub const MSGONLY: Self = Self::from_bits_retain(0x0000_7f00);
    /// Sentinel: use the destination's default options.
    pub const DEFAULT: Self = Self::from_bits_retain(0x0010_0000);

    /// True if no bits outside the known flags are set.
    pub fn is_valid(self) -> bool {
        Self::from_bits(self.bits()).is_some()
    }

    /// Replace the `DEFAULT` sentinel with `default`.
    pub fn or_default(self, default: Options) -> Options {
        if self == Self::DEFAULT {
            default
        } else {
            self
        }
    }

    pub(crate) fn wants_time(self) -> bool {
        !self.contains(Self::NOTIME)
    }

    pub(crate) fn wants_msec(self) -> bool {
        self.wants_time() && !self.contains(Self::NOMSEC)
    }

    pub(crate) fn wants_host(self) -> bool {
        !self.contains(Self::NOHOST)
    }

    pub(crate) fn wants_level(self) -> bool {
        !self.contains(Self::NOLEVEL)
    }

    pub(crate) fn wants_name(self) -> bool {
        !self.contains(Self::NONAME)
    }

    pub(crate) fn wants_pid(self) -> bool {
        !self.contains(Self::NOPID)
    }

    pub(crate) fn wants_tid(self) -> bool {
        !self.contains(Self::NOTID)
    }

    pub(crate) fn wants_header(self) -> bool {
        !self.contains(Self::NOHDR)
    }
}
