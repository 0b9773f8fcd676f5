//! Refresh orchestration for one commentary panel
//!
//! Provides [`CommentaryPanel`], which decides when the active file needs a
//! fresh commentary, runs at most one request at a time, and keeps a bounded
//! history so switching back to a file is free.
//!
//! # Module Structure
//!
//! - `state` - Visibility, single-flight and lifetime flags
//! - `cycle` - One refresh cycle: validate, consult history, stream, commit
//! - `background` - Auto-refresh timer and host event listener
//!
//! # Lifecycle
//!
//! ```text
//!            set_visible(true)              refresh / tick / file change
//! Suspended ─────────────────▶ Idle ───────────────────────────────▶ Refreshing
//!     ▲                         ▲ ◀──── notice / cached / done / error ───┘
//!     └──── set_visible(false) ─┘
//! ```
//!
//! Triggers that arrive while a cycle is running are dropped, not queued.

mod background;
mod cycle;
mod state;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ErrorKind, ValidationError};
use crate::history::{HistoryEntry, HistoryStore};
use crate::host::{ConfigProvider, DocumentProvider, RendererSink};
use crate::transport::CompletionTransport;
use crate::types::identifiers::FileIdentity;
use crate::types::options::CommentaryOptions;

pub use state::PanelState;

use background::TimerHandle;
use state::RefreshState;

/// Signals the host feeds into [`CommentaryPanel::attach`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// Panel was shown or hidden
    VisibilityChanged(bool),
    /// The user switched to another file
    ActiveDocumentChanged,
    /// The user asked for a fresh commentary regardless of history
    ForceRefresh,
}

/// What started a refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Panel became visible
    Shown,
    /// Active file changed
    DocumentChanged,
    /// Auto-refresh timer
    Tick,
    /// Direct call to [`CommentaryPanel::refresh`]
    Manual,
    /// [`CommentaryPanel::force_refresh`]; skips the history check
    Forced,
}

/// Which transition a refresh call took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Another cycle was already running; nothing happened
    Skipped,
    /// Panel is not visible; nothing happened
    Suspended,
    /// Panel was disposed; nothing happened
    Disposed,
    /// No document is open
    NoActiveDocument,
    /// Document failed validation
    Rejected(ValidationError),
    /// History still matched; the cached commentary was shown
    CacheHit,
    /// Credential or endpoint missing
    NeedsConfiguration,
    /// A new commentary was streamed and committed
    Generated,
    /// The cycle failed; history is untouched
    Failed(ErrorKind),
}

/// Shared state behind every clone of a panel
pub(crate) struct PanelInner {
    documents: Arc<dyn DocumentProvider>,
    config: Arc<dyn ConfigProvider>,
    renderer: Arc<dyn RendererSink>,
    transport: Arc<dyn CompletionTransport>,
    options: CommentaryOptions,
    history: Mutex<HistoryStore>,
    state: RefreshState,
    timer: Mutex<Option<TimerHandle>>,
    shutdown: CancellationToken,
}

impl Drop for PanelInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// One live commentary panel
///
/// Cheap to clone; clones share state. Starts suspended: call
/// [`set_visible(true)`](Self::set_visible) once the panel is on screen.
#[derive(Clone)]
pub struct CommentaryPanel {
    inner: Arc<PanelInner>,
}

impl std::fmt::Debug for CommentaryPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentaryPanel")
            .field("state", &self.state())
            .field("history_len", &self.history_len())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl CommentaryPanel {
    /// Create a suspended panel
    pub fn new(
        documents: Arc<dyn DocumentProvider>,
        config: Arc<dyn ConfigProvider>,
        renderer: Arc<dyn RendererSink>,
        transport: Arc<dyn CompletionTransport>,
        options: CommentaryOptions,
    ) -> Self {
        let history = HistoryStore::new(options.history_capacity);
        Self {
            inner: Arc::new(PanelInner {
                documents,
                config,
                renderer,
                transport,
                options,
                history: Mutex::new(history),
                state: RefreshState::default(),
                timer: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> PanelState {
        self.inner.state.current()
    }

    /// Whether [`dispose`](Self::dispose) has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.state.is_disposed()
    }

    /// Options this panel runs with
    #[must_use]
    pub fn options(&self) -> &CommentaryOptions {
        &self.inner.options
    }

    /// Re-evaluate the active file, regenerating only if history is stale
    ///
    /// Safe to call at any time; returns [`RefreshOutcome::Skipped`] if a
    /// cycle is already running.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.inner.run_cycle(Trigger::Manual).await
    }

    /// Regenerate the active file's commentary even if history matches
    pub async fn force_refresh(&self) -> RefreshOutcome {
        self.inner.run_cycle(Trigger::Forced).await
    }

    /// Tell the panel the active file changed
    pub async fn active_document_changed(&self) -> RefreshOutcome {
        self.inner.run_cycle(Trigger::DocumentChanged).await
    }

    /// Show or hide the panel
    ///
    /// Showing starts the auto-refresh timer and runs a cycle, whose
    /// outcome is returned. Hiding stops the timer; a cycle already in
    /// flight still finishes.
    pub async fn set_visible(&self, visible: bool) -> Option<RefreshOutcome> {
        if !self.apply_visibility(visible) {
            return None;
        }
        Some(self.inner.run_cycle(Trigger::Shown).await)
    }

    /// Feed host events from `events` until the channel closes or the panel is disposed
    ///
    /// Visibility changes take effect as soon as the event is received.
    /// Cycles run on their own tasks, so an event that arrives while a cycle
    /// is running is dropped like any other concurrent trigger. The listener
    /// holds only a weak reference, so it never keeps a dropped panel alive.
    pub fn attach(&self, events: mpsc::UnboundedReceiver<PanelEvent>) -> JoinHandle<()> {
        background::spawn_event_listener(
            Arc::downgrade(&self.inner),
            events,
            self.inner.shutdown.child_token(),
        )
    }

    /// Stop the timer and event listener and ignore any late output
    ///
    /// A cycle still in flight runs to completion, but nothing it produces
    /// reaches the renderer and no new cycle starts.
    pub fn dispose(&self) {
        if self.inner.state.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.state.visible.store(false, Ordering::Release);
        self.stop_timer();
        self.inner.shutdown.cancel();
        log::debug!("Panel disposed");
    }

    /// Number of files with a cached commentary
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.inner.history.lock().len()
    }

    /// Cached commentary for `identity`
    #[must_use]
    pub fn cached_entry(&self, identity: &FileIdentity) -> Option<HistoryEntry> {
        self.inner.history.lock().get(identity).cloned()
    }

    /// Forget every cached commentary
    pub fn clear_history(&self) {
        self.inner.history.lock().clear();
    }

    /// Flip the visibility flag and start or stop the timer, without running a cycle
    ///
    /// Returns whether the panel is now visible.
    fn apply_visibility(&self, visible: bool) -> bool {
        if self.is_disposed() {
            return false;
        }

        let was_visible = self.inner.state.visible.swap(visible, Ordering::AcqRel);
        if visible {
            if !was_visible {
                log::debug!("Panel shown");
            }
            self.start_timer();
        } else {
            if was_visible {
                log::debug!("Panel hidden");
            }
            self.stop_timer();
        }
        visible
    }

    fn start_timer(&self) {
        let mut timer = self.inner.timer.lock();
        if timer.is_some() {
            return;
        }
        *timer = Some(background::spawn_timer(
            Arc::downgrade(&self.inner),
            self.inner.options.auto_refresh_interval,
            self.inner.shutdown.child_token(),
        ));
    }

    fn stop_timer(&self) {
        if let Some(timer) = self.inner.timer.lock().take() {
            timer.stop();
        }
    }
}
