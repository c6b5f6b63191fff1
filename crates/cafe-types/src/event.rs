//! Events the subsystem posts back to the application.

use std::collections::VecDeque;

/// System window-manager messages emitted around keyboard commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SysWmEvent {
    /// Sent right before the committed text.
    SwkbdOkStart,
    /// Sent right after the committed text.
    SwkbdOkFinish,
    /// The user dismissed the keyboard without committing.
    SwkbdCancel,
}

/// An event delivered to the application's event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CafeEvent {
    SysWm(SysWmEvent),
    /// Committed text, UTF-8.
    KeyboardText(String),
    /// Physical key transition.
    Key { pressed: bool, scancode: u32 },
}

/// Destination for posted events. The host's event queue implements this.
pub trait EventSink {
    fn post(&mut self, event: CafeEvent);
}

/// A plain FIFO event queue.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<CafeEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pop the oldest event.
    pub fn poll(&mut self) -> Option<CafeEvent> {
        self.events.pop_front()
    }

    /// Remove and return every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<CafeEvent> {
        self.events.drain(..).collect()
    }
}

impl EventSink for EventQueue {
    fn post(&mut self, event: CafeEvent) {
        self.events.push_back(event);
    }
}
