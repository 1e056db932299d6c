//! Severity levels and level bitmasks.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Severity a message is tagged with, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum Level {
    /// Nuclear war, Armageddon, etc.
    Emerg = 0x0001,
    /// Action required ASAP.
    Alert = 0x0002,
    /// Critical errors.
    Crit = 0x0004,
    /// Errors.
    Error = 0x0008,
    /// Warnings that could likely be ignored.
    Warn = 0x0010,
    /// Normal but significant.
    Notice = 0x0020,
    /// Informational messages.
    Info = 0x0040,
    /// Debugging/diagnostic output.
    Debug = 0x0080,
}

/// Level to display name, sorted by bit value for binary search.
const LEVEL_NAMES: [(Level, &str); 8] = [
    (Level::Emerg, "emergency"),
    (Level::Alert, "alert"),
    (Level::Crit, "critical"),
    (Level::Error, "error"),
    (Level::Warn, "warning"),
    (Level::Notice, "notice"),
    (Level::Info, "info"),
    (Level::Debug, "debug"),
];

impl Level {
    /// Every level, in bit order.
    pub const ALL: [Level; 8] = [
        Level::Emerg,
        Level::Alert,
        Level::Crit,
        Level::Error,
        Level::Warn,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// The single-bit mask for this level.
    pub const fn bit(self) -> Levels {
        Levels::from_bits_retain(self as u16)
    }

    /// Human-readable name used in the `[level]` tag.
    pub fn as_str(self) -> &'static str {
        LEVEL_NAMES
            .binary_search_by_key(&(self as u16), |(level, _)| *level as u16)
            .map_or("unknown", |idx| LEVEL_NAMES[idx].1)
    }

    /// Interpret a raw value that must name exactly one level.
    pub fn from_bits(bits: u16) -> Option<Level> {
        LEVEL_NAMES
            .binary_search_by_key(&bits, |(level, _)| *level as u16)
            .ok()
            .map(|idx| LEVEL_NAMES[idx].0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "emerg" | "emergency" => Ok(Level::Emerg),
            "alert" => Ok(Level::Alert),
            "crit" | "critical" => Ok(Level::Crit),
            "error" | "err" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warn),
            "notice" => Ok(Level::Notice),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

bitflags! {
    /// Set of levels a destination accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Levels: u16 {
        const EMERG = 0x0001;
        const ALERT = 0x0002;
        const CRIT = 0x0004;
        const ERROR = 0x0008;
        const WARN = 0x0010;
        const NOTICE = 0x0020;
        const INFO = 0x0040;
        const DEBUG = 0x0080;
    }
}

impl Levels {
    /// No output.
    pub const NONE: Self = Self::empty();
    /// Every level.
    pub const ALL: Self = Self::all();
    /// Sentinel: use the destination's default levels.
    pub const DEFAULT: Self = Self::from_bits_retain(0x0100);

    /// True if no bits outside the known levels are set.
    pub fn is_valid(self) -> bool {
        Self::from_bits(self.bits()).is_some()
    }

    /// Replace the `DEFAULT` sentinel with `default`.
    pub fn or_default(self, default: Levels) -> Levels {
        if self == Self::DEFAULT {
            default
        } else {
            self
        }
    }

    /// True if messages of `level` pass this mask.
    pub fn accepts(self, level: Level) -> bool {
        self.contains(level.bit())
    }
}

impl From<Level> for Levels {
    fn from(level: Level) -> Self {
        level.bit()
    }
}
