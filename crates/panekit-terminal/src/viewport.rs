//! Region-constrained drawing over a [`Screen`].
//!
//! A [`ViewportContext`] translates local coordinates to screen coordinates
//! and silently clips anything outside its bounds. It does not own cells.

use crate::screen::Screen;
use panekit_core::{Cell, Rect};

/// A coordinate-translating view over part of a screen's back grid.
#[derive(Debug)]
pub struct ViewportContext<'a> {
    screen: &'a mut Screen,
    /// Bounds in screen coordinates.
    bounds: Rect,
}

impl<'a> ViewportContext<'a> {
    /// Create a context over `bounds` (screen coordinates).
    pub fn new(screen: &'a mut Screen, bounds: Rect) -> Self {
        Self { screen, bounds }
    }

    /// Bounds in screen coordinates.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Local size as `(width, height)`.
    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.bounds.width, self.bounds.height)
    }

    fn translate(&self, x: u16, y: u16) -> Option<(u16, u16)> {
        (x < self.bounds.width && y < self.bounds.height)
            .then(|| {
                (
                    self.bounds.x.saturating_add(x),
                    self.bounds.y.saturating_add(y),
                )
            })
    }

    /// Write a cell at local coordinates. Clipped outside the bounds.
    pub fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some((sx, sy)) = self.translate(x, y) {
            self.screen.set(sx, sy, cell);
        }
    }

    /// Read a back-grid cell at local coordinates.
    #[must_use]
    pub fn get_cell(&self, x: u16, y: u16) -> Option<&Cell> {
        let (sx, sy) = self.translate(x, y)?;
        self.screen.get(sx, sy)
    }

    /// Nested context over `rect` (local coordinates), clipped to these bounds.
    pub fn sub(&mut self, rect: Rect) -> ViewportContext<'_> {
        let absolute = rect.with_origin(
            self.bounds.x.saturating_add(rect.x),
            self.bounds.y.saturating_add(rect.y),
        );
        let bounds = self.bounds.intersection(&absolute).unwrap_or(Rect::ZERO);
        ViewportContext {
            screen: &mut *self.screen,
            bounds,
        }
    }

    /// Fill `rect` (local coordinates) with `cell`.
    pub fn fill_rect(&mut self, rect: Rect, cell: Cell) {
        let local = Rect::from_size(self.bounds.width, self.bounds.height);
        let Some(clipped) = local.intersection(&rect) else {
            return;
        };
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.set_cell(x, y, cell);
            }
        }
    }

    /// Fill the whole viewport with [`Cell::EMPTY`].
    pub fn clear(&mut self) {
        let (width, height) = self.size();
        self.fill_rect(Rect::from_size(width, height), Cell::EMPTY);
    }

    /// Horizontal run of `len` cells starting at `(x, y)`.
    pub fn hline(&mut self, x: u16, y: u16, len: u16, cell: Cell) {
        self.fill_rect(Rect::new(x, y, len, 1), cell);
    }

    /// Vertical run of `len` cells starting at `(x, y)`.
    pub fn vline(&mut self, x: u16, y: u16, len: u16, cell: Cell) {
        self.fill_rect(Rect::new(x, y, 1, len), cell);
    }

    /// Write `text` one char per cell, styled like `style`.
    ///
    /// Stops at the right edge. Returns the number of cells written.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Cell) -> usize {
        if y >= self.bounds.height {
            return 0;
        }
        let mut written = 0;
        for (cx, ch) in (x..self.bounds.width).zip(text.chars()) {
            self.set_cell(cx, y, Cell { ch, ..style });
            written += 1;
        }
        written
    }
}
