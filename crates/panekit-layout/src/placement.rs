//! Placement computation: area + entry count -> one placement per entry.

use crate::kind::LayoutKind;
use panekit_core::Rect;

/// Where a single screen goes under a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Visible and sized to the rect.
    Shown(Rect),
    /// Sized to the rect but not visible (inactive tab, unfocused single).
    Background(Rect),
    /// Zero-size viewport, not visible, not resized.
    Hidden,
    /// No automatic placement; keep the explicitly assigned viewport.
    Free,
}

impl Placement {
    /// Viewport assigned by this placement, if the layout decides one.
    #[must_use]
    pub const fn viewport(&self) -> Option<Rect> {
        match self {
            Self::Shown(rect) | Self::Background(rect) => Some(*rect),
            Self::Hidden => Some(Rect::ZERO),
            Self::Free => None,
        }
    }

    /// Whether the screen is visible, if the layout decides it.
    #[must_use]
    pub const fn visible(&self) -> Option<bool> {
        match self {
            Self::Shown(_) => Some(true),
            Self::Background(_) | Self::Hidden => Some(false),
            Self::Free => None,
        }
    }

    /// Whether the screen's buffers should be resized to the viewport.
    #[must_use]
    pub const fn needs_resize(&self) -> bool {
        match self {
            Self::Shown(rect) | Self::Background(rect) => !rect.is_empty(),
            Self::Hidden | Self::Free => false,
        }
    }
}

/// Compute placements for `count` entries in insertion order.
///
/// `selected` is the focused index for [`LayoutKind::Single`] and the
/// active index for [`LayoutKind::Tabbed`]; it is ignored otherwise.
/// With no selection those layouts show the first entry.
#[must_use]
pub fn compute_placements(
    kind: &LayoutKind,
    area: Rect,
    count: usize,
    selected: Option<usize>,
) -> Vec<Placement> {
    match *kind {
        LayoutKind::Single | LayoutKind::Tabbed => {
            let shown = selected.filter(|&i| i < count).unwrap_or(0);
            (0..count)
                .map(|i| {
                    if i == shown {
                        Placement::Shown(area)
                    } else {
                        Placement::Background(area)
                    }
                })
                .collect()
        }
        LayoutKind::Grid {
            rows,
            cols,
            row_spacing,
            col_spacing,
        } => grid_placements(area, count, rows, cols, row_spacing, col_spacing),
        LayoutKind::SplitHorizontal { ratio, spacing } => {
            let (first, second) = split_extent(area.width, ratio, spacing);
            let left = Rect::new(area.x, area.y, first, area.height);
            let right = Rect::new(
                area.x.saturating_add(area.width - second),
                area.y,
                second,
                area.height,
            );
            pair_placements(count, left, right)
        }
        LayoutKind::SplitVertical { ratio, spacing } => {
            let (first, second) = split_extent(area.height, ratio, spacing);
            let top = Rect::new(area.x, area.y, area.width, first);
            let bottom = Rect::new(
                area.x,
                area.y.saturating_add(area.height - second),
                area.width,
                second,
            );
            pair_placements(count, top, bottom)
        }
        LayoutKind::Floating => vec![Placement::Free; count],
    }
}

/// Divide `extent` into `count` tracks separated by `gap`.
///
/// Returns `(offset, size)` per track. Integer division; the trailing
/// track absorbs the remainder.
#[must_use]
pub fn compute_tracks(extent: u16, count: u16, gap: u16) -> Vec<(u16, u16)> {
    if count == 0 {
        return Vec::new();
    }

    let total_gap = u32::from(gap) * u32::from(count - 1);
    let usable = u32::from(extent).saturating_sub(total_gap);
    let base = usable / u32::from(count);
    let remainder = usable % u32::from(count);

    (0..u32::from(count))
        .map(|i| {
            let offset = i * (base + u32::from(gap));
            let size = if i + 1 == u32::from(count) {
                base + remainder
            } else {
                base
            };
            (offset.min(u32::from(u16::MAX)) as u16, size as u16)
        })
        .collect()
}

fn grid_placements(
    area: Rect,
    count: usize,
    rows: u16,
    cols: u16,
    row_spacing: u16,
    col_spacing: u16,
) -> Vec<Placement> {
    let col_tracks = compute_tracks(area.width, cols, col_spacing);
    let row_tracks = compute_tracks(area.height, rows, row_spacing);
    let capacity = col_tracks.len() * row_tracks.len();

    (0..count)
        .map(|i| {
            if i >= capacity {
                return Placement::Hidden;
            }
            let (y, height) = row_tracks[i / col_tracks.len()];
            let (x, width) = col_tracks[i % col_tracks.len()];
            Placement::Shown(Rect::new(
                area.x.saturating_add(x),
                area.y.saturating_add(y),
                width,
                height,
            ))
        })
        .collect()
}

fn split_extent(extent: u16, ratio: f32, spacing: u16) -> (u16, u16) {
    let usable = extent.saturating_sub(spacing);
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.5
    };
    let first = ((f32::from(usable) * ratio).floor() as u16).min(usable);
    (first, usable - first)
}

fn pair_placements(count: usize, first: Rect, second: Rect) -> Vec<Placement> {
    (0..count)
        .map(|i| match i {
            0 => Placement::Shown(first),
            1 => Placement::Shown(second),
            _ => Placement::Hidden,
        })
        .collect()
}
