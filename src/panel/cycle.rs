//! One refresh cycle
//!
//! Order within a cycle is fixed: find the active document, validate it
//! (type, then size, then content), consult history, check configuration,
//! and only then touch the network. Each step can end the cycle.

use uuid::Uuid;

use super::{PanelInner, RefreshOutcome, Trigger};
use crate::error::{CommentaryError, Result, ValidationError};
use crate::history::{HistoryEntry, StalenessPolicy};
use crate::host::{NoticeKind, RendererSink};
use crate::transport::CompletionRequest;
use crate::types::messages::user_content;
use crate::types::snapshot::{ActiveDocument, DocumentSnapshot};

impl PanelInner {
    /// Run one cycle unless the panel is hidden, disposed, or already busy
    pub(super) async fn run_cycle(&self, trigger: Trigger) -> RefreshOutcome {
        if self.state.is_disposed() {
            return RefreshOutcome::Disposed;
        }
        if !self.state.is_visible() {
            return RefreshOutcome::Suspended;
        }
        let Some(_guard) = self.state.try_begin() else {
            log::debug!("Refresh ({trigger:?}) dropped: a cycle is already running");
            return RefreshOutcome::Skipped;
        };

        let cycle = Uuid::new_v4();
        log::debug!("[{cycle}] Refresh started ({trigger:?})");
        let outcome = self.cycle(cycle, trigger).await;
        log::debug!("[{cycle}] Refresh finished: {outcome:?}");
        outcome
    }

    async fn cycle(&self, cycle: Uuid, trigger: Trigger) -> RefreshOutcome {
        let Some(document) = self.documents.active_document().await else {
            self.render(|r| r.show_notice(NoticeKind::NoActiveDocument, ""));
            return RefreshOutcome::NoActiveDocument;
        };

        let snapshot = match self.validate(&document).await {
            Ok(snapshot) => snapshot,
            Err(CommentaryError::Validation(rejection)) => {
                let kind = match rejection {
                    ValidationError::UnsupportedType { .. } => NoticeKind::UnsupportedType,
                    ValidationError::TooLarge { .. } => NoticeKind::TooLarge,
                    ValidationError::Empty => NoticeKind::Empty,
                };
                let details = rejection.to_string();
                self.render(|r| r.show_notice(kind, &details));
                return RefreshOutcome::Rejected(rejection);
            }
            Err(e) => {
                log::warn!("[{cycle}] Could not read {}: {e}", document.identity);
                let message = e.user_message();
                self.render(|r| r.on_stream_error(&message));
                return RefreshOutcome::Failed(e.kind());
            }
        };

        let persona_id = self.config.current_persona_id();

        if trigger != Trigger::Forced {
            let policy = StalenessPolicy {
                min_interval: self.options.min_requery_interval,
                min_line_changes: self.options.min_line_changes,
            };
            let cached = {
                let history = self.history.lock();
                match history.staleness(&snapshot, &persona_id, policy) {
                    None => history.get(&snapshot.identity).cloned(),
                    Some(reason) => {
                        log::debug!("[{cycle}] History stale for {}: {reason:?}", snapshot.identity);
                        None
                    }
                }
            };
            if let Some(entry) = cached {
                let header = self
                    .config
                    .persona_prompt(&persona_id)
                    .map(|prompt| prompt.display_header)
                    .unwrap_or_else(|_| persona_id.to_string());
                self.render(|r| r.show_cached(&header, &document.label, &entry.response));
                return RefreshOutcome::CacheHit;
            }
        }

        let credential = self.config.credential().await;
        let endpoint = self.config.endpoint_config().await;
        let (Some(credential), Some(endpoint)) = (credential, endpoint) else {
            self.render(|r| r.show_notice(NoticeKind::NeedsConfiguration, ""));
            return RefreshOutcome::NeedsConfiguration;
        };

        let prompt = match self.config.persona_prompt(&persona_id) {
            Ok(prompt) => prompt,
            Err(e) => {
                log::warn!("[{cycle}] {e}");
                let message = e.user_message();
                self.render(|r| r.on_stream_error(&message));
                return RefreshOutcome::Failed(e.kind());
            }
        };

        self.render(|r| r.show_stream_start(&prompt.display_header, &document.label));

        let request = CompletionRequest {
            endpoint,
            credential,
            system_prompt: prompt.system_prompt,
            user_content: user_content(&document.label, &snapshot.content),
        };
        let mut on_progress = |text: &str| self.render(|r| r.on_progress(text));

        match self.transport.stream(request, &mut on_progress).await {
            Ok(text) => {
                // Committed even when empty so the requery cooldown applies to it
                if text.is_empty() {
                    log::warn!("[{cycle}] Endpoint returned no text for {}", snapshot.identity);
                }
                let entry = HistoryEntry::new(&snapshot, text, persona_id);
                self.history.lock().put(snapshot.identity.clone(), entry);
                log::info!("[{cycle}] Commentary committed for {}", snapshot.identity);
                self.render(|r| r.on_stream_done());
                RefreshOutcome::Generated
            }
            Err(e) => {
                log::warn!("[{cycle}] Generation failed for {}: {e}", snapshot.identity);
                let message = e.user_message();
                self.render(|r| r.on_stream_error(&message));
                RefreshOutcome::Failed(e.kind())
            }
        }
    }

    /// Type, then size, then content; the first failure wins
    async fn validate(&self, document: &ActiveDocument) -> Result<DocumentSnapshot> {
        let extension = document.identity.extension().unwrap_or_default();
        if !self.options.supports_extension(&extension) {
            return Err(ValidationError::UnsupportedType { extension }.into());
        }

        let size = self.documents.stat_size(&document.identity).await?;
        if size > self.options.max_file_size {
            return Err(ValidationError::TooLarge {
                size,
                limit: self.options.max_file_size,
            }
            .into());
        }

        let snapshot = self.documents.read_snapshot(document).await?;
        if snapshot.content.trim().is_empty() {
            return Err(ValidationError::Empty.into());
        }
        Ok(snapshot)
    }

    /// Forward to the renderer unless the panel has been disposed
    fn render(&self, f: impl FnOnce(&dyn RendererSink)) {
        if !self.state.is_disposed() {
            f(self.renderer.as_ref());
        }
    }
}
