//! Focus change notifications.

use crate::store::ScreenId;
use std::fmt;

/// Whether a screen gained or lost focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusEventKind {
    Gained,
    Lost,
}

/// A focus transition delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusEvent {
    pub screen: ScreenId,
    pub kind: FocusEventKind,
}

impl FocusEvent {
    #[must_use]
    pub const fn gained(screen: ScreenId) -> Self {
        Self {
            screen,
            kind: FocusEventKind::Gained,
        }
    }

    #[must_use]
    pub const fn lost(screen: ScreenId) -> Self {
        Self {
            screen,
            kind: FocusEventKind::Lost,
        }
    }
}

/// Handle returned by [`ScreenManager::subscribe`](crate::ScreenManager::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&FocusEvent)>;

/// Focus callbacks, invoked in subscription order.
#[derive(Default)]
pub(crate) struct FocusSubscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl FocusSubscribers {
    pub(crate) fn subscribe(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    pub(crate) fn emit(&mut self, event: &FocusEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}

impl fmt::Debug for FocusSubscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusSubscribers")
            .field("next_id", &self.next_id)
            .field("count", &self.len())
            .finish()
    }
}
