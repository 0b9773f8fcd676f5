//! Background tasks for a commentary panel
//!
//! Both tasks hold a `Weak` reference to the panel and exit as soon as it is
//! gone, disposed, or their cancellation token fires.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{CommentaryPanel, PanelEvent, PanelInner, Trigger};

/// Running auto-refresh timer
pub(super) struct TimerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stop ticking
    ///
    /// A cycle started by the last tick is left to finish so the renderer
    /// still gets its terminal message.
    pub fn stop(self) {
        self.token.cancel();
        drop(self.task);
    }
}

/// Spawn the auto-refresh timer
///
/// The first tick fires one `period` after start. Ticks that come due while
/// a cycle is running are skipped, not bunched up.
pub(super) fn spawn_timer(
    panel: Weak<PanelInner>,
    period: Duration,
    token: CancellationToken,
) -> TimerHandle {
    let task_token = token.clone();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = task_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(inner) = panel.upgrade() else {
                break;
            };
            let outcome = inner.run_cycle(Trigger::Tick).await;
            log::trace!("Tick finished: {outcome:?}");
        }
        log::trace!("Auto-refresh timer stopped");
    });

    TimerHandle { token, task }
}

/// Spawn the listener that turns host events into panel calls
///
/// The loop never awaits a cycle: visibility is applied inline and every
/// cycle is spawned, so triggers that land mid-cycle meet the single-flight
/// guard instead of queueing behind it.
pub(super) fn spawn_event_listener(
    panel: Weak<PanelInner>,
    mut events: mpsc::UnboundedReceiver<PanelEvent>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                () = token.cancelled() => break,
                event = events.recv() => event,
            };
            let Some(event) = event else {
                break;
            };
            let Some(inner) = panel.upgrade() else {
                break;
            };

            match event {
                PanelEvent::VisibilityChanged(visible) => {
                    let handle = CommentaryPanel { inner };
                    if handle.apply_visibility(visible) {
                        spawn_cycle(handle.inner, Trigger::Shown);
                    }
                }
                PanelEvent::ActiveDocumentChanged => spawn_cycle(inner, Trigger::DocumentChanged),
                PanelEvent::ForceRefresh => spawn_cycle(inner, Trigger::Forced),
            }
        }
        log::trace!("Panel event listener stopped");
    })
}

fn spawn_cycle(inner: Arc<PanelInner>, trigger: Trigger) {
    tokio::spawn(async move {
        let outcome = inner.run_cycle(trigger).await;
        log::trace!("Event cycle ({trigger:?}) finished: {outcome:?}");
    });
}
