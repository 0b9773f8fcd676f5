//! Per-panel refresh state
//!
//! The flags live in atomics so the timer task, the event listener and
//! direct callers can share one panel across tokio worker threads.

use std::sync::atomic::{AtomicBool, Ordering};

/// Where the panel is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    /// Visible, nothing in flight
    Idle,
    /// A refresh cycle is running
    Refreshing,
    /// Not visible (or disposed); the timer is stopped
    Suspended,
}

/// Visibility, single-flight and lifetime flags
#[derive(Debug, Default)]
pub(super) struct RefreshState {
    pub visible: AtomicBool,
    pub refreshing: AtomicBool,
    pub disposed: AtomicBool,
}

impl RefreshState {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn current(&self) -> PanelState {
        if self.is_disposed() || !self.is_visible() {
            PanelState::Suspended
        } else if self.refreshing.load(Ordering::Acquire) {
            PanelState::Refreshing
        } else {
            PanelState::Idle
        }
    }

    /// Claim the single-flight slot, or `None` if a cycle is already running
    pub fn try_begin(&self) -> Option<RefreshGuard<'_>> {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard { flag: &self.refreshing })
    }
}

/// Releases the single-flight slot when the cycle ends, however it ends
pub(super) struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
