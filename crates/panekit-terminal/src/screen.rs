//! Double-buffered cell grid with diffing and a guarded resize.
//!
//! Drawing goes to the back grid. [`Screen::diff`] reports what changed
//! against the front grid (the last presented frame) and [`Screen::swap`]
//! promotes the back grid in O(1).
//!
//! After a swap or resize the back grid is stale: it reads through to the
//! front grid and is refreshed from it on the first write, so drawing the
//! next frame starts from what is on screen and an untouched back grid
//! diffs empty.
//!
//! Invariant: `front.len() == back.len() == width * height` at all times.

use crate::error::{Result, ScreenError};
use crate::resize::{ResizeHandle, ResizeMode};
use crate::viewport::ViewportContext;
use log::trace;
use panekit_core::{Cell, Rect};

/// A changed cell reported by [`Screen::diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffCell {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
    /// New contents (from the back grid).
    pub cell: Cell,
}

/// A drawable surface with front and back grids.
#[derive(Debug)]
pub struct Screen {
    width: u16,
    height: u16,
    front: Vec<Cell>,
    back: Vec<Cell>,
    /// Back grid holds an old frame; logically equal to `front`.
    back_stale: bool,
    resize: ResizeHandle,
    needs_redraw: bool,
    /// Position and size assigned by a manager.
    viewport: Option<Rect>,
    managed: bool,
}

fn allocate_grid(width: u16, height: u16) -> Result<Vec<Cell>> {
    let len = usize::from(width) * usize::from(height);
    let mut grid = Vec::new();
    grid.try_reserve_exact(len)
        .map_err(|_| ScreenError::AllocationFailure { width, height })?;
    grid.resize(len, Cell::EMPTY);
    Ok(grid)
}

/// Copy the overlapping top-left region row by row.
fn copy_overlap(src: &[Cell], src_width: u16, dst: &mut [Cell], dst_width: u16, rows: u16) {
    let cols = usize::from(src_width.min(dst_width));
    for row in 0..usize::from(rows) {
        let src_start = row * usize::from(src_width);
        let dst_start = row * usize::from(dst_width);
        dst[dst_start..dst_start + cols].copy_from_slice(&src[src_start..src_start + cols]);
    }
}

impl Screen {
    /// Create a screen with both grids filled with [`Cell::EMPTY`].
    ///
    /// # Errors
    ///
    /// Returns `AllocationFailure` if the grids cannot be allocated.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let front = allocate_grid(width, height)?;
        let back = allocate_grid(width, height)?;
        Ok(Self {
            width,
            height,
            front,
            back,
            back_stale: false,
            resize: ResizeHandle::new(),
            needs_redraw: false,
            viewport: None,
            managed: false,
        })
    }

    /// Create a screen sized to the current terminal.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the terminal size cannot be queried.
    pub fn from_terminal() -> Result<Self> {
        let (width, height) = crossterm::terminal::size()?;
        Self::new(width, height)
    }

    /// Get the grid size as `(width, height)`.
    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Grid width.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    fn sync_back(&mut self) {
        if self.back_stale {
            self.back.copy_from_slice(&self.front);
            self.back_stale = false;
        }
    }

    /// Get a back-grid cell. `None` when out of range.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.back()[idx])
    }

    /// Get a front-grid (presented) cell. `None` when out of range.
    #[must_use]
    pub fn get_front(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.front[idx])
    }

    /// Write a back-grid cell. Out-of-range writes are ignored.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(idx) = self.index(x, y) {
            self.sync_back();
            self.back[idx] = cell;
        }
    }

    /// Reset every back-grid cell to empty.
    pub fn clear(&mut self) {
        self.back.fill(Cell::EMPTY);
        self.back_stale = false;
    }

    /// Presented grid, row-major.
    #[must_use]
    pub fn front(&self) -> &[Cell] {
        &self.front
    }

    /// Grid being drawn, row-major.
    #[must_use]
    pub fn back(&self) -> &[Cell] {
        if self.back_stale {
            &self.front
        } else {
            &self.back
        }
    }

    /// Every cell where back differs from front, in row-major order.
    ///
    /// Call before [`swap`](Self::swap).
    #[must_use]
    pub fn diff(&self) -> Vec<DiffCell> {
        if self.back_stale {
            return Vec::new();
        }
        let width = usize::from(self.width);
        self.front
            .iter()
            .zip(&self.back)
            .enumerate()
            .filter(|(_, (front, back))| front != back)
            .map(|(idx, (_, back))| DiffCell {
                x: (idx % width) as u16,
                y: (idx / width) as u16,
                cell: *back,
            })
            .collect()
    }

    /// Cells a renderer must emit this frame.
    ///
    /// The whole back grid when a full redraw is pending, otherwise
    /// [`diff`](Self::diff).
    #[must_use]
    pub fn frame_changes(&self) -> Vec<DiffCell> {
        if !self.needs_redraw {
            return self.diff();
        }
        let width = usize::from(self.width);
        self.back()
            .iter()
            .enumerate()
            .map(|(idx, cell)| DiffCell {
                x: (idx % width) as u16,
                y: (idx / width) as u16,
                cell: *cell,
            })
            .collect()
    }

    /// Promote the back grid to front. Constant time, no copy.
    ///
    /// Presenting a frame satisfies any pending full redraw.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
        self.back_stale = true;
        self.needs_redraw = false;
    }

    /// Resize both grids.
    ///
    /// Same size is a no-op. On failure the screen is left exactly as it
    /// was. Content is taken from the grid being drawn, so cells written
    /// since the last swap survive. The new front grid is populated per
    /// `mode`; the new back grid is allocated empty and, as after a swap,
    /// reads through to the new front until the next write.
    ///
    /// # Errors
    ///
    /// - `ManagedScreen` if a manager drives this screen's size
    /// - `ResizeInProgress` if another resize holds the guard
    /// - `InvalidDimensions` if `width` or `height` is zero
    /// - `AllocationFailure` if the new grids cannot be allocated
    pub fn resize(&mut self, width: u16, height: u16, mode: ResizeMode) -> Result<()> {
        if self.managed {
            return Err(ScreenError::ManagedScreen);
        }
        self.apply_resize(width, height, mode)
    }

    pub(crate) fn apply_resize(&mut self, width: u16, height: u16, mode: ResizeMode) -> Result<()> {
        let _guard = self
            .resize
            .try_begin()
            .ok_or(ScreenError::ResizeInProgress)?;

        if width == 0 || height == 0 {
            return Err(ScreenError::InvalidDimensions { width, height });
        }
        if width == self.width && height == self.height {
            return Ok(());
        }

        let mut front = allocate_grid(width, height)?;
        let back = allocate_grid(width, height)?;
        if mode.preserves_content() {
            copy_overlap(
                self.back(),
                self.width,
                &mut front,
                width,
                self.height.min(height),
            );
        }

        trace!(
            "resize {}x{} -> {}x{} ({:?})",
            self.width,
            self.height,
            width,
            height,
            mode
        );
        self.front = front;
        self.back = back;
        self.back_stale = true;
        self.width = width;
        self.height = height;
        self.needs_redraw = true;
        Ok(())
    }

    /// Whether a resize currently holds the guard.
    #[must_use]
    pub fn is_resizing(&self) -> bool {
        self.resize.is_active()
    }

    /// Force the resize-in-progress flag.
    pub fn set_resizing(&self, resizing: bool) {
        self.resize.set_active(resizing);
    }

    /// Handle on this screen's resize guard for use from other threads.
    #[must_use]
    pub fn resize_handle(&self) -> ResizeHandle {
        self.resize.clone()
    }

    /// Request that the next frame re-emits every cell.
    pub fn mark_for_full_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Whether a full redraw is pending.
    #[must_use]
    pub const fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Viewport assigned by a manager, if any.
    #[must_use]
    pub const fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    /// Whether a manager currently owns this screen's size.
    #[must_use]
    pub const fn is_managed(&self) -> bool {
        self.managed
    }

    /// Viewport dimensions if assigned, else the grid dimensions.
    #[must_use]
    pub fn effective_size(&self) -> (u16, u16) {
        self.viewport
            .map_or((self.width, self.height), |v| (v.width, v.height))
    }

    /// Drawing context over the whole effective area.
    pub fn viewport_context(&mut self) -> ViewportContext<'_> {
        let (width, height) = self.effective_size();
        ViewportContext::new(self, Rect::from_size(width, height))
    }

    /// Drawing context over `rect` (screen-local), clipped to the effective area.
    pub fn viewport_context_in(&mut self, rect: Rect) -> ViewportContext<'_> {
        let (width, height) = self.effective_size();
        let bounds = Rect::from_size(width, height)
            .intersection(&rect)
            .unwrap_or(Rect::ZERO);
        ViewportContext::new(self, bounds)
    }

    pub(crate) fn attach(&mut self) {
        self.managed = true;
    }

    pub(crate) fn detach(&mut self) {
        self.managed = false;
        self.viewport = None;
    }

    pub(crate) fn set_viewport(&mut self, viewport: Option<Rect>) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panekit_core::{Attributes, Color};
    use proptest::prelude::*;

    fn letter(n: u16) -> Cell {
        Cell::new(char::from(b'A' + (n % 26) as u8))
    }

    // =========================================================================
    // Grid Tests
    // =========================================================================

    #[test]
    fn test_new_is_empty() {
        let screen = Screen::new(8, 4).unwrap();
        assert_eq!(screen.size(), (8, 4));
        assert_eq!(screen.front().len(), 32);
        assert_eq!(screen.back().len(), 32);
        assert!(screen.back().iter().all(Cell::is_empty));
        assert!(!screen.needs_redraw());
        assert!(!screen.is_resizing());
    }

    #[test]
    fn test_zero_size_screen() {
        let screen = Screen::new(0, 0).unwrap();
        assert!(screen.front().is_empty());
        assert!(screen.get(0, 0).is_none());
        assert!(screen.diff().is_empty());
    }

    #[test]
    fn test_set_get() {
        let mut screen = Screen::new(5, 5).unwrap();
        let cell = Cell::new('x').with_fg(Color::RED).with_attrs(Attributes::BOLD);
        screen.set(2, 3, cell);
        assert_eq!(screen.get(2, 3), Some(&cell));
        assert_eq!(screen.get_front(2, 3), Some(&Cell::EMPTY));
    }

    #[test]
    fn test_out_of_range_set_is_noop() {
        let mut screen = Screen::new(3, 3).unwrap();
        screen.set(3, 0, Cell::new('x'));
        screen.set(0, 3, Cell::new('x'));
        screen.set(u16::MAX, u16::MAX, Cell::new('x'));
        assert!(screen.back().iter().all(Cell::is_empty));
        assert!(screen.get(3, 0).is_none());
        assert!(screen.get(0, 3).is_none());
    }

    #[test]
    fn test_clear() {
        let mut screen = Screen::new(4, 2).unwrap();
        screen.set(1, 1, Cell::new('q'));
        screen.clear();
        assert!(screen.back().iter().all(Cell::is_empty));
    }

    // =========================================================================
    // Diff / Swap Tests
    // =========================================================================

    #[test]
    fn test_diff_row_major() {
        let mut screen = Screen::new(4, 3).unwrap();
        screen.set(3, 2, Cell::new('c'));
        screen.set(0, 1, Cell::new('b'));
        screen.set(2, 0, Cell::new('a'));

        let diff = screen.diff();
        let coords: Vec<(u16, u16)> = diff.iter().map(|d| (d.x, d.y)).collect();
        assert_eq!(coords, vec![(2, 0), (0, 1), (3, 2)]);
        assert_eq!(diff[0].cell.ch, 'a');
    }

    #[test]
    fn test_diff_ignores_identical_write() {
        let mut screen = Screen::new(2, 2).unwrap();
        screen.set(0, 0, Cell::EMPTY);
        assert!(screen.diff().is_empty());
    }

    #[test]
    fn test_diff_empty_after_swap() {
        let mut screen = Screen::new(4, 4).unwrap();
        screen.set(1, 1, Cell::new('z'));
        screen.swap();
        assert_eq!(screen.get_front(1, 1).map(|c| c.ch), Some('z'));
        assert!(screen.diff().is_empty());

        // Next frame draws on top of what is presented.
        assert_eq!(screen.get(1, 1).map(|c| c.ch), Some('z'));
        screen.set(2, 2, Cell::new('y'));
        let diff = screen.diff();
        assert_eq!(diff.len(), 1);
        assert_eq!((diff[0].x, diff[0].y), (2, 2));
        assert_eq!(screen.get(1, 1).map(|c| c.ch), Some('z'));
    }

    #[test]
    fn test_clear_after_swap() {
        let mut screen = Screen::new(2, 1).unwrap();
        screen.set(0, 0, Cell::new('a'));
        screen.swap();
        screen.clear();
        let diff = screen.diff();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].cell, Cell::EMPTY);
    }

    #[test]
    fn test_swap_involution() {
        let mut screen = Screen::new(3, 3).unwrap();
        let front = screen.front.as_ptr();
        let back = screen.back.as_ptr();

        screen.swap();
        assert_eq!(screen.front.as_ptr(), back);
        assert_eq!(screen.back.as_ptr(), front);

        screen.swap();
        assert_eq!(screen.front.as_ptr(), front);
        assert_eq!(screen.back.as_ptr(), back);
    }

    #[test]
    fn test_frame_changes_full_redraw() {
        let mut screen = Screen::new(3, 2).unwrap();
        screen.set(0, 0, Cell::new('a'));
        assert_eq!(screen.frame_changes().len(), 1);

        screen.mark_for_full_redraw();
        assert!(screen.needs_redraw());
        assert_eq!(screen.frame_changes().len(), 6);

        screen.swap();
        assert!(!screen.needs_redraw());
    }

    // =========================================================================
    // Resize Tests
    // =========================================================================

    #[test]
    fn test_resize_same_size_noop() {
        let mut screen = Screen::new(10, 5).unwrap();
        screen.set(1, 1, Cell::new('k'));
        let front = screen.front.as_ptr();
        let back = screen.back.as_ptr();

        screen.resize(10, 5, ResizeMode::ClearContent).unwrap();
        assert_eq!(screen.front.as_ptr(), front);
        assert_eq!(screen.back.as_ptr(), back);
        assert!(!screen.needs_redraw());
        assert_eq!(screen.get(1, 1).map(|c| c.ch), Some('k'));
    }

    #[test]
    fn test_resize_invalid_dimensions() {
        let mut screen = Screen::new(10, 5).unwrap();
        let err = screen.resize(0, 5, ResizeMode::PreserveContent);
        assert!(matches!(
            err,
            Err(ScreenError::InvalidDimensions {
                width: 0,
                height: 5
            })
        ));
        assert!(screen.resize(5, 0, ResizeMode::PreserveContent).is_err());
        assert_eq!(screen.size(), (10, 5));
        assert!(!screen.is_resizing());
    }

    #[test]
    fn test_resize_in_progress() {
        let mut screen = Screen::new(10, 10).unwrap();
        screen.set_resizing(true);
        assert!(screen.is_resizing());
        assert!(matches!(
            screen.resize(20, 20, ResizeMode::PreserveContent),
            Err(ScreenError::ResizeInProgress)
        ));
        assert_eq!(screen.size(), (10, 10));

        screen.set_resizing(false);
        screen.resize(20, 20, ResizeMode::PreserveContent).unwrap();
        assert_eq!(screen.size(), (20, 20));
        assert!(!screen.is_resizing());
    }

    #[test]
    fn test_resize_blocked_by_remote_handle() {
        let mut screen = Screen::new(4, 4).unwrap();
        let handle = screen.resize_handle();
        let guard = handle.try_begin();
        assert!(screen.resize(8, 8, ResizeMode::ClearContent).is_err());
        drop(guard);
        assert!(screen.resize(8, 8, ResizeMode::ClearContent).is_ok());
    }

    #[test]
    fn test_resize_preserve_grow_and_shrink() {
        let mut screen = Screen::new(10, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                screen.set(x, y, letter(x + y));
            }
        }
        screen.swap();

        screen.resize(20, 20, ResizeMode::PreserveContent).unwrap();
        assert!(screen.needs_redraw());
        for y in 0..20 {
            for x in 0..20 {
                let expected = if x < 10 && y < 10 {
                    letter(x + y)
                } else {
                    Cell::EMPTY
                };
                assert_eq!(screen.get_front(x, y), Some(&expected), "at ({x}, {y})");
            }
        }
        assert_eq!(screen.back(), screen.front());
        assert!(screen.diff().is_empty());

        screen.resize(10, 10, ResizeMode::PreserveContent).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(screen.get_front(x, y), Some(&letter(x + y)));
            }
        }
    }

    #[test]
    fn test_resize_preserves_undrawn_frame() {
        let mut screen = Screen::new(10, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                screen.set(x, y, letter(x + y));
            }
        }

        screen.resize(20, 20, ResizeMode::PreserveContent).unwrap();
        for y in 0..20 {
            for x in 0..20 {
                let expected = if x < 10 && y < 10 {
                    letter(x + y)
                } else {
                    Cell::EMPTY
                };
                assert_eq!(screen.get_front(x, y), Some(&expected), "at ({x}, {y})");
                assert_eq!(screen.get(x, y), Some(&expected), "at ({x}, {y})");
            }
        }

        screen.resize(10, 10, ResizeMode::PreserveContent).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(screen.get(x, y), Some(&letter(x + y)));
            }
        }
    }

    #[test]
    fn test_resize_shrink_without_swap() {
        let mut screen = Screen::new(10, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                let ch = if x < 5 && y < 5 { 'K' } else { 'L' };
                screen.set(x, y, Cell::new(ch));
            }
        }
        screen.resize(5, 5, ResizeMode::PreserveContent).unwrap();
        assert!(screen.front().iter().all(|c| c.ch == 'K'));
        assert!(screen.back().iter().all(|c| c.ch == 'K'));
    }

    #[test]
    fn test_draw_after_resize_starts_from_preserved() {
        let mut screen = Screen::new(4, 1).unwrap();
        screen.set(0, 0, Cell::new('a'));
        screen.resize(6, 1, ResizeMode::PreserveContent).unwrap();
        screen.set(5, 0, Cell::new('z'));
        let diff = screen.diff();
        assert_eq!(diff.len(), 1);
        assert_eq!((diff[0].x, diff[0].cell.ch), (5, 'z'));
        assert_eq!(screen.get(0, 0).map(|c| c.ch), Some('a'));
    }

    #[test]
    fn test_resize_shrink_keeps_top_left() {
        let mut screen = Screen::new(10, 10).unwrap();
        for y in 0..10 {
            for x in 0..10 {
                let ch = if x < 5 && y < 5 { 'K' } else { 'L' };
                screen.set(x, y, Cell::new(ch));
            }
        }
        screen.swap();
        screen.resize(5, 5, ResizeMode::PreserveContent).unwrap();
        assert_eq!(screen.front().len(), 25);
        assert!(screen.front().iter().all(|c| c.ch == 'K'));
    }

    #[test]
    fn test_resize_non_square_overlap() {
        let mut screen = Screen::new(6, 2).unwrap();
        for x in 0..6 {
            screen.set(x, 1, Cell::new('r'));
        }
        screen.swap();
        screen.resize(3, 4, ResizeMode::PreserveContent).unwrap();
        assert_eq!(screen.get_front(2, 1).map(|c| c.ch), Some('r'));
        assert_eq!(screen.get_front(0, 0), Some(&Cell::EMPTY));
        assert_eq!(screen.get_front(0, 2), Some(&Cell::EMPTY));
    }

    #[test]
    fn test_resize_clear_and_scale() {
        for mode in [ResizeMode::ClearContent, ResizeMode::ScaleContent] {
            let mut screen = Screen::new(4, 4).unwrap();
            screen.set(0, 0, Cell::new('x'));
            screen.swap();
            screen.resize(8, 8, mode).unwrap();
            assert!(screen.front().iter().all(Cell::is_empty));
            assert!(screen.back().iter().all(Cell::is_empty));
        }
    }

    #[test]
    fn test_managed_screen_rejects_direct_resize() {
        let mut screen = Screen::new(4, 4).unwrap();
        screen.attach();
        assert!(matches!(
            screen.resize(8, 8, ResizeMode::ClearContent),
            Err(ScreenError::ManagedScreen)
        ));
        screen.detach();
        assert!(screen.resize(8, 8, ResizeMode::ClearContent).is_ok());
    }

    #[test]
    fn test_effective_size() {
        let mut screen = Screen::new(10, 10).unwrap();
        assert_eq!(screen.effective_size(), (10, 10));
        screen.set_viewport(Some(Rect::new(5, 5, 4, 3)));
        assert_eq!(screen.effective_size(), (4, 3));
    }

    proptest! {
        #[test]
        fn prop_out_of_range_ignored(w in 1u16..20, h in 1u16..20, dx in 0u16..50, dy in 0u16..50) {
            let mut screen = Screen::new(w, h).unwrap();
            screen.set(w + dx, dy, Cell::new('#'));
            screen.set(dx, h + dy, Cell::new('#'));
            prop_assert!(screen.get(w + dx, dy).is_none());
            prop_assert!(screen.get(dx, h + dy).is_none());
            prop_assert!(screen.back().iter().all(Cell::is_empty));
        }

        #[test]
        fn prop_diff_matches_changed_indices(
            w in 1u16..16, h in 1u16..16,
            writes in proptest::collection::vec((0u16..20, 0u16..20, 0u16..3), 0..40)
        ) {
            let mut screen = Screen::new(w, h).unwrap();
            for (x, y, n) in &writes {
                let cell = if *n == 0 { Cell::EMPTY } else { letter(*n) };
                screen.set(*x, *y, cell);
            }
            let expected: Vec<usize> = (0..screen.back().len())
                .filter(|&i| screen.back()[i] != screen.front()[i])
                .collect();
            let actual: Vec<usize> = screen
                .diff()
                .iter()
                .map(|d| usize::from(d.y) * usize::from(w) + usize::from(d.x))
                .collect();
            prop_assert_eq!(actual, expected);

            screen.swap();
            prop_assert!(screen.diff().is_empty());
        }

        #[test]
        fn prop_resize_keeps_grid_invariant(
            w in 1u16..40, h in 1u16..40, nw in 0u16..40, nh in 0u16..40, keep in any::<bool>()
        ) {
            let mut screen = Screen::new(w, h).unwrap();
            let mode = if keep { ResizeMode::PreserveContent } else { ResizeMode::ClearContent };
            let _ = screen.resize(nw, nh, mode);
            let (cw, ch) = screen.size();
            let len = usize::from(cw) * usize::from(ch);
            prop_assert_eq!(screen.front().len(), len);
            prop_assert_eq!(screen.back().len(), len);
            prop_assert!(!screen.is_resizing());
        }
    }
}
