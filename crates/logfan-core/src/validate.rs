//! Validation primitives shared by every component.
//!
//! All checks run before any lock is taken or any I/O happens, so a failed
//! validation never leaves partial state behind.

use crate::error::{LogError, Result};
use crate::types::{Color, FileId, Levels, Options, TextStyle};

/// Reject level masks carrying bits outside the known levels.
pub fn validate_levels(levels: Levels) -> Result<Levels> {
    if levels.is_valid() {
        Ok(levels)
    } else {
        Err(LogError::InvalidLevels(levels.bits()))
    }
}

/// Reject option masks carrying unknown bits.
pub fn validate_options(opts: Options) -> Result<Options> {
    if opts.is_valid() {
        Ok(opts)
    } else {
        Err(LogError::InvalidOptions(opts.bits()))
    }
}

/// Reject styles whose foreground and background are the same color.
pub fn validate_style(style: TextStyle) -> Result<TextStyle> {
    if style.fg == style.bg && style.fg != Color::Default {
        return Err(LogError::InvalidStyle(format!(
            "foreground and background are both {:?}",
            style.fg
        )));
    }
    Ok(style)
}

/// Reject empty strings, strings with NUL bytes, and strings over `max` bytes.
pub fn validate_str(value: &str, max: usize, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(LogError::InvalidString(format!("{what} is empty")));
    }
    if value.contains('\0') {
        return Err(LogError::InvalidString(format!("{what} contains a NUL byte")));
    }
    if value.len() > max {
        return Err(LogError::InvalidString(format!(
            "{what} is {} bytes; limit is {max}",
            value.len()
        )));
    }
    Ok(())
}

pub fn validate_file_id(id: FileId) -> Result<FileId> {
    if id.is_null() {
        Err(LogError::NullPointer)
    } else {
        Ok(id)
    }
}

/// Shorten `value` to at most `max` bytes without splitting a character.
///
/// Returns true if anything was removed.
pub fn truncate_at_boundary(value: &mut String, max: usize) -> bool {
    if value.len() <= max {
        return false;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
    true
}

/// Copy at most `max` bytes of `src` into `dst`, reusing `dst`'s allocation.
pub fn copy_truncated(dst: &mut String, src: &str, max: usize) {
    dst.clear();
    let mut end = src.len().min(max);
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    dst.push_str(&src[..end]);
}
