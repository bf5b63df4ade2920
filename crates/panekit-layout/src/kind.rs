//! Layout strategies a screen manager can apply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a screen manager places its screens within the terminal area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutKind {
    /// The selected (focused) screen fills the area; all others are hidden.
    #[default]
    Single,
    /// Equal-sized `rows` x `cols` cells, filled in insertion order.
    Grid {
        /// Number of rows
        rows: u16,
        /// Number of columns
        cols: u16,
        /// Blank rows between grid rows
        #[serde(default)]
        row_spacing: u16,
        /// Blank columns between grid columns
        #[serde(default)]
        col_spacing: u16,
    },
    /// Two regions side by side (left | right).
    SplitHorizontal {
        /// Fraction of the width given to the left region, in (0, 1)
        ratio: f32,
        /// Blank columns between the regions
        #[serde(default)]
        spacing: u16,
    },
    /// Two regions stacked (top / bottom).
    SplitVertical {
        /// Fraction of the height given to the top region, in (0, 1)
        ratio: f32,
        /// Blank rows between the regions
        #[serde(default)]
        spacing: u16,
    },
    /// No automatic placement; viewports are assigned explicitly.
    Floating,
    /// Every screen fills the area; only the active tab is shown.
    Tabbed,
}

impl LayoutKind {
    /// Grid without spacing.
    #[must_use]
    pub const fn grid(rows: u16, cols: u16) -> Self {
        Self::Grid {
            rows,
            cols,
            row_spacing: 0,
            col_spacing: 0,
        }
    }

    /// Grid with spacing between cells.
    #[must_use]
    pub const fn grid_spaced(rows: u16, cols: u16, row_spacing: u16, col_spacing: u16) -> Self {
        Self::Grid {
            rows,
            cols,
            row_spacing,
            col_spacing,
        }
    }

    /// Left | right split.
    #[must_use]
    pub const fn split_horizontal(ratio: f32, spacing: u16) -> Self {
        Self::SplitHorizontal { ratio, spacing }
    }

    /// Top / bottom split.
    #[must_use]
    pub const fn split_vertical(ratio: f32, spacing: u16) -> Self {
        Self::SplitVertical { ratio, spacing }
    }

    /// Maximum number of screens this layout shows at once, if bounded.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Self::Single | Self::Tabbed => Some(1),
            Self::Grid { rows, cols, .. } => Some(usize::from(*rows) * usize::from(*cols)),
            Self::SplitHorizontal { .. } | Self::SplitVertical { .. } => Some(2),
            Self::Floating => None,
        }
    }

    /// Check the layout parameters.
    ///
    /// # Errors
    ///
    /// Returns an error for a grid with zero rows or columns, or a split
    /// ratio outside the open interval (0, 1).
    pub fn validate(&self) -> Result<(), LayoutError> {
        match *self {
            Self::Grid { rows, cols, .. } if rows == 0 || cols == 0 => {
                Err(LayoutError::ZeroTracks { rows, cols })
            }
            Self::SplitHorizontal { ratio, .. } | Self::SplitVertical { ratio, .. }
                if !(ratio > 0.0 && ratio < 1.0) =>
            {
                Err(LayoutError::RatioOutOfRange(ratio))
            }
            _ => Ok(()),
        }
    }
}

/// Errors from layout validation.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Grid declared with zero rows or columns.
    ZeroTracks { rows: u16, cols: u16 },
    /// Split ratio not strictly between 0 and 1 (NaN included).
    RatioOutOfRange(f32),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTracks { rows, cols } => {
                write!(f, "grid needs at least one row and column, got {rows}x{cols}")
            }
            Self::RatioOutOfRange(ratio) => {
                write!(f, "split ratio {ratio} must be strictly between 0 and 1")
            }
        }
    }
}

impl std::error::Error for LayoutError {}
