//! Per-level text style table for console destinations.
//!
//! Compiled-in defaults live in a table sorted by level bit; runtime
//! overrides sit in a mutex-guarded array where `None` means "not
//! overridden". `reset` drops every override.

use std::fmt::Write as _;

use parking_lot::Mutex;

use crate::error::Result;
use crate::types::{Attribute, Color, Level, TextStyle};
use crate::validate::validate_style;

/// SGR sequence restoring the terminal's default style.
pub const END_STYLE: &str = "\x1b[0m";

/// Default style for each level, sorted by bit value for binary search.
const DEFAULT_STYLES: [(Level, TextStyle); 8] = [
    (
        Level::Emerg,
        TextStyle::fg(Color::LightYellow).on(Color::Red).bright(),
    ),
    (
        Level::Alert,
        TextStyle::fg(Color::Black).on(Color::LightYellow).bright(),
    ),
    (Level::Crit, TextStyle::fg(Color::Red).bright()),
    (Level::Error, TextStyle::fg(Color::Red)),
    (Level::Warn, TextStyle::fg(Color::Yellow)),
    (Level::Notice, TextStyle::fg(Color::Cyan)),
    (Level::Info, TextStyle::fg(Color::White)),
    (Level::Debug, TextStyle::fg(Color::DarkGray)),
];

/// Compiled-in style for `level`.
pub fn default_style(level: Level) -> TextStyle {
    DEFAULT_STYLES
        .binary_search_by_key(&(level as u16), |(l, _)| *l as u16)
        .map_or(TextStyle::default(), |idx| DEFAULT_STYLES[idx].1)
}

fn slot(level: Level) -> usize {
    (level as u16).trailing_zeros() as usize
}

/// Mutex-guarded per-level overrides.
#[derive(Debug)]
pub struct StyleTable {
    overrides: Mutex<[Option<TextStyle>; 8]>,
}

impl StyleTable {
    pub const fn new() -> Self {
        Self {
            overrides: Mutex::new([None; 8]),
        }
    }

    /// Override the style for `level`.
    pub fn set(&self, level: Level, style: TextStyle) -> Result<()> {
        let style = validate_style(style)?;
        self.overrides.lock()[slot(level)] = Some(style);
        Ok(())
    }

    /// Effective style for `level`: the override if present, else the default.
    pub fn get(&self, level: Level) -> TextStyle {
        let overridden = self.overrides.lock()[slot(level)];
        overridden.unwrap_or_else(|| default_style(level))
    }

    /// Restore compiled-in defaults for every level.
    pub fn reset(&self) {
        *self.overrides.lock() = [None; 8];
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the SGR escape selecting `style` into `out` (replacing its contents).
pub fn render_style_escape(style: TextStyle, out: &mut String) {
    out.clear();
    let attr = match style.attr {
        Attribute::Normal => 0,
        Attribute::Bright => 1,
        Attribute::Dim => 2,
    };
    let _ = write!(
        out,
        "\x1b[{};{};{}m",
        attr,
        style.fg.ansi_fg(),
        style.bg.ansi_bg()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;

    #[test]
    fn test_defaults_cover_every_level() {
        for level in Level::ALL {
            let style = default_style(level);
            assert!(validate_style(style).is_ok(), "{level} default is illegal");
        }
        assert_eq!(default_style(Level::Error), TextStyle::fg(Color::Red));
    }

    #[test]
    fn test_override_and_reset() {
        let table = StyleTable::new();
        let custom = TextStyle::fg(Color::Yellow).on(Color::DarkGray);

        table.set(Level::Debug, custom).unwrap();
        assert_eq!(table.get(Level::Debug), custom);
        assert_eq!(table.get(Level::Info), default_style(Level::Info));

        table.reset();
        assert_eq!(table.get(Level::Debug), default_style(Level::Debug));
    }

    #[test]
    fn test_illegal_style_leaves_table_untouched() {
        let table = StyleTable::new();
        let bad = TextStyle::fg(Color::Black).on(Color::Black);
        assert!(matches!(
            table.set(Level::Alert, bad),
            Err(LogError::InvalidStyle(_))
        ));
        assert_eq!(table.get(Level::Alert), default_style(Level::Alert));
    }

    #[test]
    fn test_render_escape() {
        let mut out = String::from("stale");
        render_style_escape(TextStyle::fg(Color::Red).bright(), &mut out);
        assert_eq!(out, "\x1b[1;31;49m");

        render_style_escape(TextStyle::fg(Color::Black).on(Color::LightCyan).dim(), &mut out);
        assert_eq!(out, "\x1b[2;30;106m");
    }
}
