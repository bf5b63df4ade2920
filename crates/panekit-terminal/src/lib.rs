#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::doc_markdown)]
//! Double-buffered terminal screens and multi-screen coordination.
//!
//! - [`Screen`]: front/back cell grids, row-major [`diff`](Screen::diff),
//!   O(1) [`swap`](Screen::swap) and a guarded, content-preserving resize
//! - [`ViewportContext`]: clipped drawing in local coordinates
//! - [`ScreenStore`]: caller-owned screens addressed by [`ScreenId`]
//! - [`ScreenManager`]: layout, z-order, hit testing, focus and modal lock
//!
//! # Example
//!
//! ```
//! use panekit_terminal::{
//!     Cell, LayoutKind, ResizeMode, Screen, ScreenManager, ScreenStore,
//! };
//!
//! let mut store = ScreenStore::new();
//! let left = store.insert(Screen::new(1, 1).unwrap());
//! let right = store.insert(Screen::new(1, 1).unwrap());
//!
//! let mut manager = ScreenManager::new();
//! manager.set_layout(LayoutKind::split_horizontal(0.5, 0)).unwrap();
//! manager.add_screen(&mut store, left, Some("left")).unwrap();
//! manager.add_screen(&mut store, right, Some("right")).unwrap();
//! manager.handle_resize(&mut store, 80, 24, ResizeMode::PreserveContent).unwrap();
//!
//! let screen = store.get_mut(right).unwrap();
//! assert_eq!(screen.size(), (40, 24));
//! screen.viewport_context().put_str(0, 0, "hi", Cell::EMPTY);
//! assert_eq!(screen.diff().len(), 2);
//! screen.swap();
//! assert!(screen.diff().is_empty());
//! ```

mod config;
mod error;
mod focus;
mod manager;
mod resize;
mod screen;
mod store;
mod viewport;

pub use config::ManagerConfig;
pub use error::{Result, ScreenError};
pub use focus::{FocusEvent, FocusEventKind, SubscriptionId};
pub use manager::ScreenManager;
pub use resize::{ResizeGuard, ResizeHandle, ResizeMode};
pub use screen::{DiffCell, Screen};
pub use store::{ScreenId, ScreenStore};
pub use viewport::ViewportContext;

// Re-export the value and layout types used in this crate's API.
pub use panekit_core::{Attributes, Cell, Color, ColorParseError, Rect};
pub use panekit_layout::{LayoutError, LayoutKind, Placement};
