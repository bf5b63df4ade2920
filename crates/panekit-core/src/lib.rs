//! Core value types for panekit.
//!
//! This crate provides the pure, copyable building blocks shared by the
//! layout and terminal crates:
//! - Drawable units: [`Cell`] with [`Color`] and [`Attributes`]
//! - Geometry: [`Rect`] in terminal cell coordinates

mod cell;
mod color;
mod geometry;

pub use cell::{Attributes, Cell};
pub use color::{Color, ColorParseError};
pub use geometry::Rect;
