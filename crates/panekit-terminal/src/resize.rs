//! Resize modes and the per-screen resize guard.
//!
//! The guard is a shared in-progress flag. [`Screen::resize`] and any
//! asynchronous notifier holding a [`ResizeHandle`] claim the same flag,
//! so a second claimant gets `None` (surfaced as `ResizeInProgress`)
//! instead of blocking.
//!
//! [`Screen::resize`]: crate::Screen::resize

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What happens to on-screen content across a resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Keep the overlapping top-left region at the same coordinates.
    #[default]
    PreserveContent,
    /// Start from an empty grid.
    ClearContent,
    /// Reserved for interpolated scaling; currently identical to `ClearContent`.
    ScaleContent,
}

impl ResizeMode {
    /// Whether old content is carried into the new front grid.
    #[must_use]
    pub const fn preserves_content(self) -> bool {
        matches!(self, Self::PreserveContent)
    }
}

/// Shared handle on a screen's resize-in-progress flag.
///
/// Cheap to clone and `Send + Sync`, so a signal-handling thread can hold
/// one while the event loop owns the screen.
#[derive(Debug, Clone, Default)]
pub struct ResizeHandle {
    in_progress: Arc<AtomicBool>,
}

impl ResizeHandle {
    /// Create an idle handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag. Returns `None` if a resize is already in progress.
    #[must_use]
    pub fn try_begin(&self) -> Option<ResizeGuard> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ResizeGuard {
                in_progress: Arc::clone(&self.in_progress),
            })
    }

    /// Whether a resize is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Force the flag, bypassing the guard.
    pub fn set_active(&self, active: bool) {
        self.in_progress.store(active, Ordering::Release);
    }
}

/// Releases the resize flag on drop.
#[derive(Debug)]
pub struct ResizeGuard {
    in_progress: Arc<AtomicBool>,
}

impl Drop for ResizeGuard {
    fn drop(&mut self) {
        self.in_progress.store(false, Ordering::Release);
    }
}
