//! Console text styles.

/// Intensity attribute applied to the foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Attribute {
    #[default]
    Normal,
    Bright,
    Dim,
}

/// 16-color palette plus the terminal's default color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    LightGray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    White,
}

impl Color {
    /// Every color, default first.
    pub const ALL: [Color; 17] = [
        Color::Default,
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::LightGray,
        Color::DarkGray,
        Color::LightRed,
        Color::LightGreen,
        Color::LightYellow,
        Color::LightBlue,
        Color::LightMagenta,
        Color::LightCyan,
        Color::White,
    ];

    /// SGR parameter selecting this color as foreground.
    pub fn ansi_fg(self) -> u8 {
        match self {
            Color::Black => 30,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
            Color::LightGray => 37,
            Color::Default => 39,
            Color::DarkGray => 90,
            Color::LightRed => 91,
            Color::LightGreen => 92,
            Color::LightYellow => 93,
            Color::LightBlue => 94,
            Color::LightMagenta => 95,
            Color::LightCyan => 96,
            Color::White => 97,
        }
    }

    /// SGR parameter selecting this color as background.
    pub fn ansi_bg(self) -> u8 {
        self.ansi_fg() + 10
    }
}

/// Style applied to console output for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextStyle {
    pub attr: Attribute,
    pub fg: Color,
    pub bg: Color,
}

impl TextStyle {
    pub const fn new(attr: Attribute, fg: Color, bg: Color) -> Self {
        Self { attr, fg, bg }
    }

    /// Foreground color on the default background.
    pub const fn fg(fg: Color) -> Self {
        Self::new(Attribute::Normal, fg, Color::Default)
    }

    /// Same style, intensified.
    pub const fn bright(self) -> Self {
        Self::new(Attribute::Bright, self.fg, self.bg)
    }

    /// Same style, dimmed.
    pub const fn dim(self) -> Self {
        Self::new(Attribute::Dim, self.fg, self.bg)
    }

    /// Same style with a background color.
    pub const fn on(self, bg: Color) -> Self {
        Self::new(self.attr, self.fg, bg)
    }
}
