//! Caller-owned slot table of screens.
//!
//! Managers hold [`ScreenId`]s, never references. An id carries the
//! generation of its slot, so once a screen is removed every outstanding
//! id for it resolves to `None` instead of dangling or aliasing a newer
//! screen that reuses the slot.

use crate::screen::Screen;
use log::warn;
use std::fmt;

/// Stable handle to a screen in a [`ScreenStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId {
    index: u32,
    generation: u32,
}

impl ScreenId {
    /// Slot index (reused after removal).
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at the time of insertion.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    screen: Option<Screen>,
}

/// Owns screens and hands out [`ScreenId`]s.
#[derive(Debug, Default)]
pub struct ScreenStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl ScreenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a screen.
    pub fn insert(&mut self, screen: Screen) -> ScreenId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.screen = Some(screen);
            return ScreenId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            screen: Some(screen),
        });
        ScreenId {
            index,
            generation: 0,
        }
    }

    fn slot(&self, id: ScreenId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    /// Get a screen. `None` for removed or foreign ids.
    #[must_use]
    pub fn get(&self, id: ScreenId) -> Option<&Screen> {
        self.slot(id).and_then(|slot| slot.screen.as_ref())
    }

    /// Get a screen mutably.
    pub fn get_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.screen.as_mut())
    }

    /// Check if `id` refers to a live screen.
    #[must_use]
    pub fn contains(&self, id: ScreenId) -> bool {
        self.get(id).is_some()
    }

    /// Remove and return a screen, invalidating `id`.
    ///
    /// Removing a screen that is still registered with a manager is a
    /// usage error; it is logged and the manager will skip the stale id.
    /// Prefer [`ScreenManager::release_screen`](crate::ScreenManager::release_screen).
    pub fn remove(&mut self, id: ScreenId) -> Option<Screen> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let screen = slot.screen.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;

        if screen.is_managed() {
            warn!("{id} removed from store while still registered with a manager");
        }
        Some(screen)
    }

    /// Number of live screens.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the store holds no screens.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over live screens.
    pub fn iter(&self) -> impl Iterator<Item = (ScreenId, &Screen)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.screen.as_ref().map(|screen| {
                (
                    ScreenId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    screen,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(w: u16, h: u16) -> Screen {
        Screen::new(w, h).unwrap()
    }

    #[test]
    fn test_insert_get() {
        let mut store = ScreenStore::new();
        assert!(store.is_empty());
        let a = store.insert(screen(3, 3));
        let b = store.insert(screen(4, 4));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(a).map(Screen::size), Some((3, 3)));
        assert_eq!(store.get(b).map(Screen::size), Some((4, 4)));
    }

    #[test]
    fn test_remove_invalidates_id() {
        let mut store = ScreenStore::new();
        let a = store.insert(screen(3, 3));
        assert!(store.remove(a).is_some());
        assert!(store.get(a).is_none());
        assert!(store.remove(a).is_none());
        assert!(!store.contains(a));
        assert!(store.is_empty());
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut store = ScreenStore::new();
        let a = store.insert(screen(3, 3));
        store.remove(a);
        let b = store.insert(screen(5, 5));
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(store.get(a).is_none());
        assert_eq!(store.get(b).map(Screen::size), Some((5, 5)));
    }

    #[test]
    fn test_get_mut() {
        let mut store = ScreenStore::new();
        let a = store.insert(screen(2, 2));
        if let Some(s) = store.get_mut(a) {
            s.set(1, 1, panekit_core::Cell::new('m'));
        }
        assert_eq!(store.get(a).and_then(|s| s.get(1, 1)).map(|c| c.ch), Some('m'));
    }

    #[test]
    fn test_iter_skips_removed() {
        let mut store = ScreenStore::new();
        let a = store.insert(screen(1, 1));
        let b = store.insert(screen(2, 2));
        let c = store.insert(screen(3, 3));
        store.remove(b);
        let ids: Vec<ScreenId> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_display() {
        let mut store = ScreenStore::new();
        let a = store.insert(screen(1, 1));
        assert_eq!(a.to_string(), "screen#0v0");
    }
}
