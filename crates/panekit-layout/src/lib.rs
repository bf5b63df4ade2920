#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
//! Layout strategies for panekit screen managers.
//!
//! A layout is pure math: given the terminal area, the number of managed
//! screens and (for single/tabbed) which one is selected, it yields one
//! [`Placement`] per screen in insertion order:
//!
//! - **Single** / **Tabbed**: every screen sized to the full area, one shown
//! - **Grid**: `rows x cols` equal cells, trailing row/column absorb remainders
//! - **Split**: two regions by ratio, extra screens hidden
//! - **Floating**: nothing decided; viewports are assigned by hand

mod kind;
mod placement;

pub use kind::{LayoutError, LayoutKind};
pub use placement::{compute_placements, compute_tracks, Placement};
