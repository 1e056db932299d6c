//! Core types for logfan

pub mod level;
pub mod options;
pub mod style;

use std::fmt;

pub use level::{Level, Levels};
pub use options::Options;
pub use style::{Attribute, Color, TextStyle};

/// Identifier of a managed log file.
///
/// Identifiers are handed out from a process-wide counter and are never
/// reused, so a copy held after `remove_file` can only ever miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
    /// The null identifier; never assigned to a file.
    pub const NULL: FileId = FileId(0);

    /// Wrap a raw identifier value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw identifier value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_null() {
        assert!(FileId::NULL.is_null());
        assert!(!FileId::from_raw(3).is_null());
        assert_eq!(FileId::from_raw(3).to_string(), "3");
    }
}
