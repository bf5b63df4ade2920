//! Terminal colors.

use serde::{Deserialize, Serialize};

/// Color of a cell's foreground or background.
///
/// This names a color rather than holding a rendered value: `Default` defers to
/// whatever the terminal's configured color is, and `Indexed` defers to
/// the terminal's palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// The terminal's default foreground/background.
    #[default]
    Default,
    /// Palette index (0-15 ANSI, 16-255 extended).
    Indexed(u8),
    /// 24-bit true color.
    Rgb {
        /// Red component
        r: u8,
        /// Green component
        g: u8,
        /// Blue component
        b: u8,
    },
}

impl Color {
    /// ANSI black
    pub const BLACK: Self = Self::Indexed(0);
    /// ANSI red
    pub const RED: Self = Self::Indexed(1);
    /// ANSI green
    pub const GREEN: Self = Self::Indexed(2);
    /// ANSI yellow
    pub const YELLOW: Self = Self::Indexed(3);
    /// ANSI blue
    pub const BLUE: Self = Self::Indexed(4);
    /// ANSI magenta
    pub const MAGENTA: Self = Self::Indexed(5);
    /// ANSI cyan
    pub const CYAN: Self = Self::Indexed(6);
    /// ANSI white
    pub const WHITE: Self = Self::Indexed(7);

    /// Create a true-color value.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    /// Check if this is the terminal default.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Parse a hex color string (e.g., "#ff0000" or "ff0000").
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return Err(ColorParseError::InvalidLength);
        }

        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or(ColorParseError::InvalidHex)
        };

        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Convert to hex string. Only true colors have one.
    #[must_use]
    pub fn to_hex(&self) -> Option<String> {
        match self {
            Self::Rgb { r, g, b } => Some(format!("#{r:02x}{g:02x}{b:02x}")),
            Self::Default | Self::Indexed(_) => None,
        }
    }
}

/// Error type for color parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Invalid hex characters
    InvalidHex,
    /// Invalid string length
    InvalidLength,
}

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHex => write!(f, "invalid hex characters"),
            Self::InvalidLength => write!(f, "invalid hex string length (expected 6)"),
        }
    }
}

impl std::error::Error for ColorParseError {}
