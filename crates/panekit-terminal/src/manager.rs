//! Multi-screen coordination: layout, z-order, hit testing and focus.
//!
//! The manager never owns screens. Entries refer to screens in a
//! caller-owned [`ScreenStore`] by [`ScreenId`]; operations that touch
//! screen buffers take the store explicitly. An id whose screen has been
//! removed from the store is skipped with a warning.
//!
//! Focus rules:
//! - the first registered screen is focused automatically
//! - a modal screen pins focus until `set_modal_screen(None)`
//! - every change emits `Lost(old)` then `Gained(new)`, in that order

use crate::config::ManagerConfig;
use crate::error::{Result, ScreenError};
use crate::focus::{FocusEvent, FocusSubscribers, SubscriptionId};
use crate::resize::ResizeMode;
use crate::screen::Screen;
use crate::store::{ScreenId, ScreenStore};
use log::{debug, warn};
use panekit_core::Rect;
use panekit_layout::{compute_placements, LayoutKind, Placement};

#[derive(Debug, Clone)]
struct Entry {
    id: ScreenId,
    key: Option<String>,
    z_index: i32,
    visible: bool,
    viewport: Option<Rect>,
}

/// Coordinates screens sharing one terminal.
#[derive(Debug, Default)]
pub struct ScreenManager {
    config: ManagerConfig,
    /// Insertion order.
    entries: Vec<Entry>,
    focused: Option<ScreenId>,
    active: Option<ScreenId>,
    modal: Option<ScreenId>,
    /// Area of the last `handle_resize`.
    area: Option<Rect>,
    subscribers: FocusSubscribers,
}

impl ScreenManager {
    /// Create a manager with the default config (single layout).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with an explicit config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLayout` or `Config` if the config does not validate.
    pub fn with_config(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    fn position(&self, id: ScreenId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn entry(&self, id: ScreenId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn entry_mut(&mut self, id: ScreenId) -> Result<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ScreenError::ScreenNotFound)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a screen, optionally under a unique key.
    ///
    /// The first screen registered with an empty manager receives focus.
    /// Placement is applied on the next [`handle_resize`](Self::handle_resize)
    /// or [`relayout`](Self::relayout).
    ///
    /// # Errors
    ///
    /// - `DuplicateId` if `key` is already registered
    /// - `ScreenNotFound` if `id` is not in `store`
    /// - `AlreadyManaged` if the screen belongs to a manager already
    pub fn add_screen(
        &mut self,
        store: &mut ScreenStore,
        id: ScreenId,
        key: Option<&str>,
    ) -> Result<()> {
        if let Some(key) = key {
            if self.find_by_key(key).is_some() {
                return Err(ScreenError::DuplicateId(key.to_string()));
            }
        }
        let screen = store.get_mut(id).ok_or(ScreenError::ScreenNotFound)?;
        if screen.is_managed() {
            return Err(ScreenError::AlreadyManaged);
        }
        screen.attach();

        self.entries.push(Entry {
            id,
            key: key.map(str::to_string),
            z_index: 0,
            visible: true,
            viewport: None,
        });
        debug!("registered {id} (key {key:?}), {} screens", self.entries.len());

        if self.active.is_none() {
            self.active = Some(id);
        }
        if self.focused.is_none() {
            self.set_focus(Some(id));
        } else {
            self.sync_selection_visibility();
        }
        Ok(())
    }

    /// Deregister a screen. The screen stays in `store`, unmanaged.
    ///
    /// If it was focused, focus moves to the entry that took its place in
    /// insertion order, else the previous one, else none. A modal lock
    /// held by the screen is released.
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if `id` is not registered.
    pub fn remove_screen(&mut self, store: &mut ScreenStore, id: ScreenId) -> Result<()> {
        let pos = self.position(id).ok_or(ScreenError::ScreenNotFound)?;
        self.entries.remove(pos);
        if let Some(screen) = store.get_mut(id) {
            screen.detach();
        }
        debug!("deregistered {id}, {} screens", self.entries.len());

        let neighbor = self
            .entries
            .get(pos)
            .or_else(|| pos.checked_sub(1).and_then(|p| self.entries.get(p)))
            .map(|e| e.id);

        if self.modal == Some(id) {
            self.modal = None;
        }
        if self.active == Some(id) {
            self.active = neighbor;
        }
        if self.focused == Some(id) {
            self.set_focus(neighbor);
        } else {
            self.sync_selection_visibility();
        }
        Ok(())
    }

    /// Deregister a screen and take it out of `store`.
    ///
    /// Best effort: deregistration problems are logged, never returned,
    /// so teardown always completes.
    pub fn release_screen(&mut self, store: &mut ScreenStore, id: ScreenId) -> Option<Screen> {
        if self.contains(id) {
            if let Err(err) = self.remove_screen(store, id) {
                warn!("release of {id}: deregistration failed: {err}");
            }
        }
        store.remove(id)
    }

    /// Deregister every screen. Screens stay in `store`.
    pub fn detach_all(&mut self, store: &mut ScreenStore) {
        for entry in self.entries.drain(..) {
            match store.get_mut(entry.id) {
                Some(screen) => screen.detach(),
                None => warn!("detach: {} no longer in store", entry.id),
            }
        }
        self.modal = None;
        self.active = None;
        self.set_focus(None);
        debug!("detached all screens");
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Change the layout strategy. Viewports and sizes change on the next
    /// resize or relayout; visibility is reset now (every screen shown,
    /// or only the selected one for single and tabbed layouts).
    ///
    /// # Errors
    ///
    /// Returns `InvalidLayout` if the layout parameters are invalid; the
    /// current layout is kept.
    pub fn set_layout(&mut self, layout: LayoutKind) -> Result<()> {
        layout.validate()?;
        debug!("layout {:?} -> {:?}", self.config.layout, layout);
        self.config.layout = layout;
        for entry in &mut self.entries {
            entry.visible = true;
        }
        self.sync_selection_visibility();
        Ok(())
    }

    /// Current layout strategy.
    #[must_use]
    pub const fn layout(&self) -> &LayoutKind {
        &self.config.layout
    }

    /// Area passed to the last successful [`handle_resize`](Self::handle_resize).
    #[must_use]
    pub const fn area(&self) -> Option<Rect> {
        self.area
    }

    /// Recompute every viewport for a `width` x `height` terminal and
    /// resize the screens accordingly.
    ///
    /// Every entry is attempted even if one fails; the first failure is
    /// returned. An entry whose screen fails to resize keeps its previous
    /// viewport and visibility. Hidden entries get a zero-size viewport and
    /// keep their buffers. Floating entries keep their explicit viewport.
    ///
    /// Under single and tabbed layouts every entry, including the ones in
    /// the background, is sized to the full area, so switching the
    /// selected entry needs no relayout.
    ///
    /// # Errors
    ///
    /// - `InvalidDimensions` if `width` or `height` is zero (nothing changes)
    /// - the first per-screen resize error
    pub fn handle_resize(
        &mut self,
        store: &mut ScreenStore,
        width: u16,
        height: u16,
        mode: ResizeMode,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ScreenError::InvalidDimensions { width, height });
        }
        let area = Rect::from_size(width, height);
        self.area = Some(area);
        self.apply_layout(store, area, mode)
    }

    /// Re-apply the layout to the last area with the configured resize mode.
    ///
    /// Does nothing before the first [`handle_resize`](Self::handle_resize).
    pub fn relayout(&mut self, store: &mut ScreenStore) -> Result<()> {
        match self.area {
            Some(area) => self.apply_layout(store, area, self.config.resize_mode),
            None => Ok(()),
        }
    }

    fn selected_index(&self) -> Option<usize> {
        let selected = match self.config.layout {
            LayoutKind::Single => self.focused,
            LayoutKind::Tabbed => self.active,
            _ => None,
        }?;
        self.position(selected)
    }

    fn apply_layout(&mut self, store: &mut ScreenStore, area: Rect, mode: ResizeMode) -> Result<()> {
        let placements = compute_placements(
            &self.config.layout,
            area,
            self.entries.len(),
            self.selected_index(),
        );

        let mut first_err = None;
        for (entry, placement) in self.entries.iter_mut().zip(placements) {
            let viewport = placement.viewport().or(entry.viewport);
            let visible = placement.visible().unwrap_or(entry.visible);

            let Some(screen) = store.get_mut(entry.id) else {
                warn!("layout: skipping {}, no longer in store", entry.id);
                continue;
            };

            let target = match placement {
                Placement::Free => viewport.filter(|r| !r.is_empty()),
                _ if placement.needs_resize() => viewport,
                _ => None,
            };
            if let Some(rect) = target {
                if let Err(err) = screen.apply_resize(rect.width, rect.height, mode) {
                    warn!("layout: resize of {} to {}x{} failed: {err}", entry.id, rect.width, rect.height);
                    first_err.get_or_insert(err);
                    continue;
                }
            }

            // Placement is committed only once the buffers match it.
            entry.viewport = viewport;
            entry.visible = visible;
            screen.set_viewport(viewport);
        }

        debug!(
            "applied {:?} to {}x{} ({} screens)",
            self.config.layout,
            area.width,
            area.height,
            self.entries.len()
        );
        first_err.map_or(Ok(()), Err)
    }

    /// Single and tabbed layouts show exactly the selected entry.
    fn sync_selection_visibility(&mut self) {
        let selected = match self.config.layout {
            LayoutKind::Single => self.focused,
            LayoutKind::Tabbed => self.active,
            _ => return,
        };
        for entry in &mut self.entries {
            entry.visible = Some(entry.id) == selected;
        }
    }

    /// Assign a viewport explicitly and resize the screen to it using the
    /// configured resize mode. An empty rect assigns without resizing.
    ///
    /// # Errors
    ///
    /// - `ScreenNotFound` if `id` is not registered or no longer in `store`
    /// - any error from the underlying resize
    pub fn set_screen_viewport(
        &mut self,
        store: &mut ScreenStore,
        id: ScreenId,
        rect: Rect,
    ) -> Result<()> {
        let mode = self.config.resize_mode;
        let entry = self.entry_mut(id)?;
        let screen = store.get_mut(id).ok_or(ScreenError::ScreenNotFound)?;
        if !rect.is_empty() {
            screen.apply_resize(rect.width, rect.height, mode)?;
        }
        screen.set_viewport(Some(rect));
        entry.viewport = Some(rect);
        Ok(())
    }

    /// Viewport assigned to a screen, if any.
    #[must_use]
    pub fn screen_viewport(&self, id: ScreenId) -> Option<Rect> {
        self.entry(id).and_then(|e| e.viewport)
    }

    /// Show or hide a screen until the next layout pass decides otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if `id` is not registered.
    pub fn set_screen_visible(&mut self, id: ScreenId, visible: bool) -> Result<()> {
        self.entry_mut(id)?.visible = visible;
        Ok(())
    }

    /// Whether a registered screen is visible. `false` if not registered.
    #[must_use]
    pub fn is_screen_visible(&self, id: ScreenId) -> bool {
        self.entry(id).is_some_and(|e| e.visible)
    }

    /// Select the active tab. Independent of focus; buffers are untouched.
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if `id` is not registered.
    pub fn set_active_screen(&mut self, id: ScreenId) -> Result<()> {
        if !self.contains(id) {
            return Err(ScreenError::ScreenNotFound);
        }
        self.active = Some(id);
        self.sync_selection_visibility();
        Ok(())
    }

    /// Active tab.
    #[must_use]
    pub const fn active_screen(&self) -> Option<ScreenId> {
        self.active
    }

    // =========================================================================
    // Z-order
    // =========================================================================

    /// Z-index of a registered screen.
    #[must_use]
    pub fn z_index(&self, id: ScreenId) -> Option<i32> {
        self.entry(id).map(|e| e.z_index)
    }

    /// Entry positions sorted bottom to top; ties keep insertion order.
    fn stacking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| self.entries[i].z_index);
        order
    }

    /// Screens bottom to top: ascending z-index, insertion order on ties.
    #[must_use]
    pub fn render_order(&self) -> Vec<ScreenId> {
        self.stacking()
            .into_iter()
            .map(|i| self.entries[i].id)
            .collect()
    }

    /// Recompress z-indices to `0..len`, keeping the stacking order.
    pub fn normalize_z_indices(&mut self) {
        for (rank, pos) in self.stacking().into_iter().enumerate() {
            self.entries[pos].z_index = rank as i32;
        }
    }

    /// Raise a screen above all others (`max + 1`).
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if `id` is not registered.
    pub fn bring_to_front(&mut self, id: ScreenId) -> Result<()> {
        let pos = self.position(id).ok_or(ScreenError::ScreenNotFound)?;
        let max = self.entries.iter().map(|e| e.z_index).max().unwrap_or(0);
        let max = if max >= self.config.z_normalize_threshold || max == i32::MAX {
            self.normalize_z_indices();
            self.entries.len() as i32 - 1
        } else {
            max
        };
        self.entries[pos].z_index = max + 1;
        Ok(())
    }

    /// Lower a screen below all others (`min - 1`).
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if `id` is not registered.
    pub fn send_to_back(&mut self, id: ScreenId) -> Result<()> {
        let pos = self.position(id).ok_or(ScreenError::ScreenNotFound)?;
        let min = self.entries.iter().map(|e| e.z_index).min().unwrap_or(0);
        let min = if min <= -self.config.z_normalize_threshold || min == i32::MIN {
            self.normalize_z_indices();
            0
        } else {
            min
        };
        self.entries[pos].z_index = min - 1;
        Ok(())
    }

    /// Swap with the next screen up. `Ok(false)` if already on top.
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if `id` is not registered.
    pub fn move_up(&mut self, id: ScreenId) -> Result<bool> {
        self.swap_with_neighbor(id, true)
    }

    /// Swap with the next screen down. `Ok(false)` if already at the bottom.
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if `id` is not registered.
    pub fn move_down(&mut self, id: ScreenId) -> Result<bool> {
        self.swap_with_neighbor(id, false)
    }

    fn swap_with_neighbor(&mut self, id: ScreenId, up: bool) -> Result<bool> {
        let pos = self.position(id).ok_or(ScreenError::ScreenNotFound)?;
        let order = self.stacking();
        let Some(rank) = order.iter().position(|&p| p == pos) else {
            return Ok(false);
        };
        let neighbor_rank = if up {
            rank + 1
        } else if let Some(r) = rank.checked_sub(1) {
            r
        } else {
            return Ok(false);
        };
        let Some(&other) = order.get(neighbor_rank) else {
            return Ok(false);
        };

        // Equal indices cannot be swapped into a different order.
        if self.entries[pos].z_index == self.entries[other].z_index {
            self.normalize_z_indices();
        }
        let z = self.entries[pos].z_index;
        self.entries[pos].z_index = self.entries[other].z_index;
        self.entries[other].z_index = z;
        Ok(true)
    }

    /// Topmost visible screen whose effective viewport contains `(x, y)`.
    ///
    /// The effective viewport is the assigned one, or the screen's full
    /// size at the origin when none is assigned.
    #[must_use]
    pub fn screen_at_point(&self, store: &ScreenStore, x: u16, y: u16) -> Option<ScreenId> {
        self.stacking()
            .into_iter()
            .rev()
            .map(|i| &self.entries[i])
            .filter(|e| e.visible)
            .find(|e| {
                e.viewport
                    .or_else(|| {
                        store
                            .get(e.id)
                            .map(|s| Rect::from_size(s.width(), s.height()))
                    })
                    .is_some_and(|rect| rect.contains(x, y))
            })
            .map(|e| e.id)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Screen registered under `key`.
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<ScreenId> {
        self.entries
            .iter()
            .find(|e| e.key.as_deref() == Some(key))
            .map(|e| e.id)
    }

    /// Key a screen was registered under.
    #[must_use]
    pub fn key_of(&self, id: ScreenId) -> Option<&str> {
        self.entry(id).and_then(|e| e.key.as_deref())
    }

    /// Registered screens in insertion order.
    pub fn screens(&self) -> impl Iterator<Item = ScreenId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Number of registered screens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no screens are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ScreenId) -> bool {
        self.position(id).is_some()
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Focused screen. `Some` whenever the manager is non-empty.
    #[must_use]
    pub const fn focused_screen(&self) -> Option<ScreenId> {
        self.focused
    }

    fn set_focus(&mut self, target: Option<ScreenId>) {
        if self.focused == target {
            return;
        }
        let previous = std::mem::replace(&mut self.focused, target);
        if let Some(previous) = previous {
            self.subscribers.emit(&FocusEvent::lost(previous));
        }
        if let Some(target) = target {
            self.subscribers.emit(&FocusEvent::gained(target));
        }
        self.sync_selection_visibility();
    }

    /// Focus a screen.
    ///
    /// # Errors
    ///
    /// - `ScreenNotFound` if `id` is not registered
    /// - `FocusLocked` if a different screen is modal
    pub fn focus_screen(&mut self, id: ScreenId) -> Result<()> {
        if !self.contains(id) {
            return Err(ScreenError::ScreenNotFound);
        }
        if self.modal.is_some_and(|modal| modal != id) {
            return Err(ScreenError::FocusLocked);
        }
        self.set_focus(Some(id));
        Ok(())
    }

    fn cycle_focus(&mut self, forward: bool) -> bool {
        if self.modal.is_some() || self.entries.is_empty() {
            return false;
        }
        let len = self.entries.len();
        let next = match self.focused.and_then(|id| self.position(id)) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.set_focus(Some(self.entries[next].id));
        true
    }

    /// Focus the next screen in insertion order, wrapping around.
    ///
    /// Returns `false` and does nothing while focus is locked or the
    /// manager is empty.
    pub fn focus_next(&mut self) -> bool {
        self.cycle_focus(true)
    }

    /// Focus the previous screen in insertion order, wrapping around.
    ///
    /// Returns `false` and does nothing while focus is locked or the
    /// manager is empty.
    pub fn focus_previous(&mut self) -> bool {
        self.cycle_focus(false)
    }

    /// Set or clear the modal screen.
    ///
    /// `Some` locks focus to the screen and focuses it. `None` releases
    /// the lock and leaves focus where it is.
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if `id` is not registered.
    pub fn set_modal_screen(&mut self, id: Option<ScreenId>) -> Result<()> {
        match id {
            Some(id) => {
                if !self.contains(id) {
                    return Err(ScreenError::ScreenNotFound);
                }
                self.modal = Some(id);
                self.set_focus(Some(id));
                debug!("{id} is modal");
            }
            None => {
                self.modal = None;
                debug!("modal lock released");
            }
        }
        Ok(())
    }

    /// Screen holding the focus lock.
    #[must_use]
    pub const fn modal_screen(&self) -> Option<ScreenId> {
        self.modal
    }

    /// Whether a modal screen holds the focus lock.
    #[must_use]
    pub const fn is_focus_locked(&self) -> bool {
        self.modal.is_some()
    }

    /// Register a focus callback. Callbacks run synchronously in
    /// subscription order.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&FocusEvent) + 'static,
    {
        self.subscribers.subscribe(Box::new(callback))
    }

    /// Remove a focus callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
