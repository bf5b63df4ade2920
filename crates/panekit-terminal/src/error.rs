//! Error types for panekit-terminal.

use panekit_layout::LayoutError;
use thiserror::Error;

/// Errors surfaced by screens and the screen manager.
///
/// None of these are retried internally; the caller decides.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// The cell grids could not be allocated.
    #[error("failed to allocate {width}x{height} cell grid")]
    AllocationFailure { width: u16, height: u16 },

    /// Resize to a zero width or height.
    #[error("invalid dimensions {width}x{height}: width and height must be non-zero")]
    InvalidDimensions { width: u16, height: u16 },

    /// Another resize of the same screen is in flight.
    #[error("resize already in progress")]
    ResizeInProgress,

    /// A screen with this key is already registered.
    #[error("duplicate screen id: {0}")]
    DuplicateId(String),

    /// The screen is not registered (or no longer exists).
    #[error("screen not found")]
    ScreenNotFound,

    /// A modal screen holds the focus lock.
    #[error("focus is locked by a modal screen")]
    FocusLocked,

    /// Direct resize of a screen whose size is driven by a manager.
    #[error("screen is managed; resize it through its manager")]
    ManagedScreen,

    /// The screen is already registered with a manager.
    #[error("screen is already registered with a manager")]
    AlreadyManaged,

    /// Layout parameters rejected.
    #[error("invalid layout: {0}")]
    InvalidLayout(#[from] LayoutError),

    /// Terminal size query failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("invalid config: {0}")]
    Config(String),
}

/// Result alias for screen operations.
pub type Result<T> = std::result::Result<T, ScreenError>;
