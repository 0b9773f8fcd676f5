//! Tests for the refresh orchestrator
//!
//! The panel runs against in-memory collaborators so every transition can be
//! observed: which notices were shown, how often the endpoint was called, and
//! what ended up in history.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use kodegen_code_commentary::transport::ProgressCallback;
use kodegen_code_commentary::{
    ActiveDocument, CommentaryError, CommentaryOptions, CommentaryPanel, CompletionClient,
    CompletionRequest, CompletionTransport, Credential, DocumentProvider, DocumentSnapshot,
    EndpointConfig, EnvConfigProvider, ErrorKind, FileIdentity, FsDocumentProvider, NoticeKind,
    PanelEvent, PanelState, PersonaId, RefreshOutcome, RendererSink, Result, ValidationError,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::sync::{Notify, mpsc};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeDocuments {
    active: Mutex<Option<(ActiveDocument, String)>>,
    reported_size: Mutex<Option<u64>>,
    stats: AtomicUsize,
    reads: AtomicUsize,
}

impl FakeDocuments {
    fn open(&self, path: &str, content: &str) {
        *self.active.lock() = Some((ActiveDocument::new(path), content.to_string()));
    }

    fn edit(&self, content: &str) {
        if let Some((_, current)) = self.active.lock().as_mut() {
            *current = content.to_string();
        }
    }
}

impl DocumentProvider for FakeDocuments {
    fn active_document(&self) -> BoxFuture<'_, Option<ActiveDocument>> {
        let document = self.active.lock().as_ref().map(|(doc, _)| doc.clone());
        Box::pin(async move { document })
    }

    fn stat_size<'a>(&'a self, _identity: &'a FileIdentity) -> BoxFuture<'a, Result<u64>> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        let size = self.reported_size.lock().unwrap_or_else(|| {
            self.active
                .lock()
                .as_ref()
                .map_or(0, |(_, content)| content.len() as u64)
        });
        Box::pin(async move { Ok(size) })
    }

    fn read_snapshot<'a>(
        &'a self,
        document: &'a ActiveDocument,
    ) -> BoxFuture<'a, Result<DocumentSnapshot>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let content = self
            .active
            .lock()
            .as_ref()
            .map(|(_, content)| content.clone())
            .unwrap_or_default();
        let snapshot = DocumentSnapshot::new(document.identity.clone(), content);
        Box::pin(async move { Ok(snapshot) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rendered {
    Notice(NoticeKind),
    Start { header: String, label: String },
    Progress(String),
    Done,
    Error(String),
}

#[derive(Default)]
struct RecordingRenderer {
    events: Mutex<Vec<Rendered>>,
}

impl RecordingRenderer {
    fn take(&self) -> Vec<Rendered> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl RendererSink for RecordingRenderer {
    fn show_notice(&self, kind: NoticeKind, _details: &str) {
        self.events.lock().push(Rendered::Notice(kind));
    }

    fn show_stream_start(&self, header: &str, file_label: &str) {
        self.events.lock().push(Rendered::Start {
            header: header.to_string(),
            label: file_label.to_string(),
        });
    }

    fn on_progress(&self, text: &str) {
        self.events.lock().push(Rendered::Progress(text.to_string()));
    }

    fn on_stream_done(&self) {
        self.events.lock().push(Rendered::Done);
    }

    fn on_stream_error(&self, message: &str) {
        self.events.lock().push(Rendered::Error(message.to_string()));
    }
}

/// Replies with fixed fragments, optionally waiting on a gate first
#[derive(Default)]
struct ScriptedTransport {
    fragments: Mutex<Vec<&'static str>>,
    failure: Mutex<Option<fn() -> CommentaryError>>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedTransport {
    fn replying(fragments: &[&'static str]) -> Self {
        Self {
            fragments: Mutex::new(fragments.to_vec()),
            ..Self::default()
        }
    }

    fn gated(fragments: &[&'static str], gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::replying(fragments)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionTransport for ScriptedTransport {
    fn stream<'a>(
        &'a self,
        request: CompletionRequest,
        on_progress: ProgressCallback<'a>,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().push(request);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if let Some(failure) = *self.failure.lock() {
                return Err(failure());
            }

            let fragments = self.fragments.lock().clone();
            let mut text = String::new();
            for fragment in fragments {
                text.push_str(fragment);
                on_progress(&text);
            }
            Ok(text)
        })
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    panel: CommentaryPanel,
    documents: Arc<FakeDocuments>,
    config: Arc<EnvConfigProvider>,
    renderer: Arc<RecordingRenderer>,
    transport: Arc<ScriptedTransport>,
}

fn options() -> CommentaryOptions {
    // Long tick so only explicit calls drive cycles
    CommentaryOptions::builder()
        .auto_refresh_interval(Duration::from_secs(3600))
        .build()
}

fn configured() -> EnvConfigProvider {
    EnvConfigProvider::new(
        Some(Credential::new("sk-test")),
        Some(EndpointConfig::default()),
        PersonaId::default(),
    )
}

/// Panel already made visible, with history and renderer log empty
async fn harness(transport: ScriptedTransport) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let documents = Arc::new(FakeDocuments::default());
    let config = Arc::new(configured());
    let renderer = Arc::new(RecordingRenderer::default());
    let transport = Arc::new(transport);
    let panel = CommentaryPanel::new(
        documents.clone(),
        config.clone(),
        renderer.clone(),
        transport.clone(),
        options(),
    );

    // Nothing open yet, so showing the panel only yields a notice
    assert_eq!(
        panel.set_visible(true).await,
        Some(RefreshOutcome::NoActiveDocument)
    );
    assert_eq!(renderer.take(), vec![Rendered::Notice(NoticeKind::NoActiveDocument)]);

    Harness {
        panel,
        documents,
        config,
        renderer,
        transport,
    }
}

async fn wait_for_calls(transport: &ScriptedTransport, calls: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while transport.calls() < calls {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("transport was never called");
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_new_panel_is_suspended() {
    let panel = CommentaryPanel::new(
        Arc::new(FakeDocuments::default()),
        Arc::new(configured()),
        Arc::new(RecordingRenderer::default()),
        Arc::new(ScriptedTransport::default()),
        options(),
    );

    assert_eq!(panel.state(), PanelState::Suspended);
    assert_eq!(panel.refresh().await, RefreshOutcome::Suspended);
}

#[tokio::test]
async fn test_first_refresh_streams_and_commits() {
    let h = harness(ScriptedTransport::replying(&["Nice ", "loop."])).await;
    h.documents.open("/src/main.rs", "fn main() {}\n");

    assert_eq!(h.panel.refresh().await, RefreshOutcome::Generated);
    assert_eq!(h.panel.state(), PanelState::Idle);

    assert_eq!(
        h.renderer.take(),
        vec![
            Rendered::Start {
                header: "锐评".to_string(),
                label: "main.rs".to_string(),
            },
            Rendered::Progress("Nice ".to_string()),
            Rendered::Progress("Nice loop.".to_string()),
            Rendered::Done,
        ]
    );

    let entry = h
        .panel
        .cached_entry(&FileIdentity::new("/src/main.rs"))
        .expect("entry committed");
    assert_eq!(entry.response, "Nice loop.");
    assert_eq!(entry.content, "fn main() {}\n");
    assert_eq!(entry.persona_id, PersonaId::new("cn-roaster"));

    let requests = h.transport.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].user_content, "main.rs\n\nfn main() {}\n");
    assert_eq!(requests[0].credential.expose(), "sk-test");
}

#[tokio::test]
async fn test_unchanged_file_is_served_from_history() {
    let h = harness(ScriptedTransport::replying(&["cached roast"])).await;
    h.documents.open("/src/lib.rs", "pub fn f() {}\n");

    assert_eq!(h.panel.refresh().await, RefreshOutcome::Generated);
    h.renderer.take();

    assert_eq!(h.panel.refresh().await, RefreshOutcome::CacheHit);
    assert_eq!(h.transport.calls(), 1);
    assert_eq!(
        h.renderer.take(),
        vec![
            Rendered::Start {
                header: "锐评".to_string(),
                label: "lib.rs".to_string(),
            },
            Rendered::Progress("cached roast".to_string()),
            Rendered::Done,
        ]
    );
}

#[tokio::test]
async fn test_small_edit_within_cooldown_stays_cached() {
    let h = harness(ScriptedTransport::replying(&["ok"])).await;
    h.documents.open("/a.rs", "a\nb\nc\n");
    h.panel.refresh().await;

    h.documents.edit("a\nB\nc\n");
    assert_eq!(h.panel.refresh().await, RefreshOutcome::CacheHit);
    assert_eq!(h.transport.calls(), 1);
}

#[tokio::test]
async fn test_large_edit_regenerates() {
    let h = harness(ScriptedTransport::replying(&["ok"])).await;
    h.documents.open("/a.rs", "a\nb\nc\n");
    h.panel.refresh().await;

    let rewrite: String = (0..20).map(|i| format!("line {i}\n")).collect();
    h.documents.edit(&rewrite);
    assert_eq!(h.panel.refresh().await, RefreshOutcome::Generated);
    assert_eq!(h.transport.calls(), 2);
}

#[tokio::test]
async fn test_persona_switch_regenerates_with_new_prompt() {
    let h = harness(ScriptedTransport::replying(&["ok"])).await;
    h.documents.open("/a.rs", "x\n");
    h.panel.refresh().await;

    h.config.set_persona(PersonaId::new("en-praiser")).unwrap();
    h.renderer.take();
    assert_eq!(h.panel.refresh().await, RefreshOutcome::Generated);

    assert_eq!(h.transport.calls(), 2);
    assert!(matches!(
        h.renderer.take().first(),
        Some(Rendered::Start { header, .. }) if header == "Hype"
    ));
    let requests = h.transport.requests.lock();
    assert!(requests[1].system_prompt.contains("hype-man"));
}

#[tokio::test]
async fn test_force_refresh_ignores_history() {
    let h = harness(ScriptedTransport::replying(&["ok"])).await;
    h.documents.open("/a.rs", "x\n");
    h.panel.refresh().await;

    assert_eq!(h.panel.force_refresh().await, RefreshOutcome::Generated);
    assert_eq!(h.transport.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_refresh_is_dropped() {
    let gate = Arc::new(Notify::new());
    let h = harness(ScriptedTransport::gated(&["slow"], gate.clone())).await;
    h.documents.open("/a.rs", "x\n");

    let first = tokio::spawn({
        let panel = h.panel.clone();
        async move { panel.refresh().await }
    });
    wait_for_calls(&h.transport, 1).await;

    assert_eq!(h.panel.state(), PanelState::Refreshing);
    assert_eq!(h.panel.refresh().await, RefreshOutcome::Skipped);
    assert_eq!(h.panel.active_document_changed().await, RefreshOutcome::Skipped);

    gate.notify_one();
    assert_eq!(first.await.unwrap(), RefreshOutcome::Generated);
    assert_eq!(h.transport.calls(), 1);
    assert_eq!(h.panel.state(), PanelState::Idle);
}

#[tokio::test]
async fn test_unsupported_type_checked_before_size_and_content() {
    let h = harness(ScriptedTransport::replying(&["never"])).await;
    h.documents.open("/bin/tool.exe", "");
    *h.documents.reported_size.lock() = Some(10 * 1024 * 1024);

    assert_eq!(
        h.panel.refresh().await,
        RefreshOutcome::Rejected(ValidationError::UnsupportedType {
            extension: ".exe".to_string(),
        })
    );
    assert_eq!(h.renderer.take(), vec![Rendered::Notice(NoticeKind::UnsupportedType)]);
    assert_eq!(h.documents.stats.load(Ordering::SeqCst), 0);
    assert_eq!(h.documents.reads.load(Ordering::SeqCst), 0);
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn test_extensionless_file_is_unsupported() {
    let h = harness(ScriptedTransport::replying(&["never"])).await;
    h.documents.open("/repo/Makefile", "all:\n");

    assert!(matches!(
        h.panel.refresh().await,
        RefreshOutcome::Rejected(ValidationError::UnsupportedType { .. })
    ));
}

#[tokio::test]
async fn test_too_large_checked_before_content() {
    let h = harness(ScriptedTransport::replying(&["never"])).await;
    h.documents.open("/big.rs", "");
    *h.documents.reported_size.lock() = Some(200 * 1024);

    assert_eq!(
        h.panel.refresh().await,
        RefreshOutcome::Rejected(ValidationError::TooLarge {
            size: 200 * 1024,
            limit: 100 * 1024,
        })
    );
    assert_eq!(h.renderer.take(), vec![Rendered::Notice(NoticeKind::TooLarge)]);
    assert_eq!(h.documents.reads.load(Ordering::SeqCst), 0);
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn test_whitespace_only_file_is_empty() {
    let h = harness(ScriptedTransport::replying(&["never"])).await;
    h.documents.open("/blank.py", "  \n\t\n");

    assert_eq!(
        h.panel.refresh().await,
        RefreshOutcome::Rejected(ValidationError::Empty)
    );
    assert_eq!(h.renderer.take(), vec![Rendered::Notice(NoticeKind::Empty)]);
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn test_missing_credential_needs_configuration() {
    let h = harness(ScriptedTransport::replying(&["never"])).await;
    h.config.set_credential(None);
    h.documents.open("/a.rs", "x\n");

    assert_eq!(h.panel.refresh().await, RefreshOutcome::NeedsConfiguration);
    assert_eq!(
        h.renderer.take(),
        vec![Rendered::Notice(NoticeKind::NeedsConfiguration)]
    );
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn test_failure_leaves_history_untouched_and_retries() {
    let h = harness(ScriptedTransport::replying(&["second try"])).await;
    *h.transport.failure.lock() = Some(|| CommentaryError::Auth);
    h.documents.open("/a.rs", "x\n");

    assert_eq!(h.panel.refresh().await, RefreshOutcome::Failed(ErrorKind::Auth));
    assert_eq!(h.panel.history_len(), 0);
    let rendered = h.renderer.take();
    assert!(matches!(rendered.first(), Some(Rendered::Start { .. })));
    assert_eq!(
        rendered.last(),
        Some(&Rendered::Error(
            "Invalid API key. Please check your API key.".to_string()
        ))
    );

    *h.transport.failure.lock() = None;
    assert_eq!(h.panel.refresh().await, RefreshOutcome::Generated);
    assert_eq!(h.transport.calls(), 2);
    assert_eq!(h.panel.history_len(), 1);
}

#[tokio::test]
async fn test_empty_response_is_committed_and_cached() {
    let h = harness(ScriptedTransport::replying(&[])).await;
    h.documents.open("/a.rs", "x\n");

    assert_eq!(h.panel.refresh().await, RefreshOutcome::Generated);
    assert_eq!(h.panel.history_len(), 1);
    assert_eq!(
        h.panel
            .cached_entry(&FileIdentity::new("/a.rs"))
            .map(|entry| entry.response),
        Some(String::new())
    );

    // Unchanged file inside the cooldown: no second request
    assert_eq!(h.panel.refresh().await, RefreshOutcome::CacheHit);
    assert_eq!(h.transport.calls(), 1);
}

#[tokio::test]
async fn test_unknown_persona_fails_with_lone_error() {
    let h = harness(ScriptedTransport::replying(&["never"])).await;
    h.config.with_catalog(|catalog| {
        let mut pirate = catalog.get(&PersonaId::new("en-roaster")).unwrap().clone();
        pirate.id = PersonaId::new("pirate");
        catalog.create_custom(pirate).unwrap();
    });
    h.config.set_persona(PersonaId::new("pirate")).unwrap();
    h.config
        .with_catalog(|catalog| catalog.delete_custom(&PersonaId::new("pirate")))
        .unwrap();
    h.documents.open("/a.rs", "x\n");

    assert_eq!(h.panel.refresh().await, RefreshOutcome::Failed(ErrorKind::Internal));
    assert_eq!(
        h.renderer.take(),
        vec![Rendered::Error("Persona \"pirate\" not found".to_string())]
    );
    assert_eq!(h.transport.calls(), 0);
    assert_eq!(h.panel.history_len(), 0);
}

#[tokio::test]
async fn test_unreadable_file_fails_with_lone_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let renderer = Arc::new(RecordingRenderer::default());
    let transport = Arc::new(ScriptedTransport::replying(&["never"]));
    let panel = CommentaryPanel::new(
        Arc::new(FsDocumentProvider::new(dir.path().join("missing.rs"))),
        Arc::new(configured()),
        renderer.clone(),
        transport.clone(),
        options(),
    );

    assert_eq!(
        panel.set_visible(true).await,
        Some(RefreshOutcome::Failed(ErrorKind::Internal))
    );
    let rendered = renderer.take();
    assert_eq!(rendered.len(), 1);
    assert!(matches!(&rendered[0], Rendered::Error(message) if message.starts_with("IO error")));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_hidden_panel_ignores_refresh() {
    let h = harness(ScriptedTransport::replying(&["ok"])).await;
    h.documents.open("/a.rs", "x\n");

    assert_eq!(h.panel.set_visible(false).await, None);
    assert_eq!(h.panel.state(), PanelState::Suspended);
    assert_eq!(h.panel.refresh().await, RefreshOutcome::Suspended);
    assert_eq!(h.transport.calls(), 0);

    assert_eq!(
        h.panel.set_visible(true).await,
        Some(RefreshOutcome::Generated)
    );
}

#[tokio::test]
async fn test_dispose_drops_late_output() {
    let gate = Arc::new(Notify::new());
    let h = harness(ScriptedTransport::gated(&["too", " late"], gate.clone())).await;
    h.documents.open("/a.rs", "x\n");

    let in_flight = tokio::spawn({
        let panel = h.panel.clone();
        async move { panel.refresh().await }
    });
    wait_for_calls(&h.transport, 1).await;
    assert!(matches!(h.renderer.take().as_slice(), [Rendered::Start { .. }]));

    h.panel.dispose();
    gate.notify_one();
    in_flight.await.unwrap();

    assert!(h.renderer.take().is_empty());
    assert!(h.panel.is_disposed());
    assert_eq!(h.panel.refresh().await, RefreshOutcome::Disposed);
    assert_eq!(h.panel.set_visible(true).await, None);
    assert_eq!(h.transport.calls(), 1);
}

#[tokio::test]
async fn test_attached_events_drive_cycles() {
    let h = harness(ScriptedTransport::replying(&["ok"])).await;
    let (tx, rx) = mpsc::unbounded_channel();
    let listener = h.panel.attach(rx);

    h.documents.open("/a.rs", "x\n");
    tx.send(PanelEvent::ActiveDocumentChanged).unwrap();
    wait_for_calls(&h.transport, 1).await;

    tx.send(PanelEvent::ForceRefresh).unwrap();
    wait_for_calls(&h.transport, 2).await;

    h.panel.dispose();
    tokio::time::timeout(Duration::from_secs(5), listener)
        .await
        .expect("listener stops after dispose")
        .unwrap();
}

/// Let every ready task on the current-thread runtime run
async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition never held");
}

#[tokio::test]
async fn test_attached_event_during_cycle_is_dropped() {
    let gate = Arc::new(Notify::new());
    let h = harness(ScriptedTransport::gated(&["slow"], gate.clone())).await;
    let (tx, rx) = mpsc::unbounded_channel();
    let _listener = h.panel.attach(rx);

    h.documents.open("/a.rs", "x\n");
    tx.send(PanelEvent::ForceRefresh).unwrap();
    wait_for_calls(&h.transport, 1).await;

    tx.send(PanelEvent::ForceRefresh).unwrap();
    tx.send(PanelEvent::ActiveDocumentChanged).unwrap();
    settle().await;
    assert_eq!(h.panel.state(), PanelState::Refreshing);

    gate.notify_one();
    wait_until(|| h.panel.history_len() == 1).await;
    settle().await;

    assert_eq!(h.transport.calls(), 1);
    assert_eq!(h.panel.state(), PanelState::Idle);
}

#[tokio::test]
async fn test_attached_hide_during_stream_suspends_immediately() {
    let gate = Arc::new(Notify::new());
    let h = harness(ScriptedTransport::gated(&["slow"], gate.clone())).await;
    let (tx, rx) = mpsc::unbounded_channel();
    let _listener = h.panel.attach(rx);

    h.documents.open("/a.rs", "x\n");
    tx.send(PanelEvent::ForceRefresh).unwrap();
    wait_for_calls(&h.transport, 1).await;

    // Stream still held open by the gate
    tx.send(PanelEvent::VisibilityChanged(false)).unwrap();
    wait_until(|| h.panel.state() == PanelState::Suspended).await;
    assert_eq!(h.panel.refresh().await, RefreshOutcome::Suspended);

    // The in-flight cycle still finishes and commits
    gate.notify_one();
    wait_until(|| h.panel.history_len() == 1).await;
    settle().await;
    assert_eq!(h.transport.calls(), 1);
    assert_eq!(h.panel.state(), PanelState::Suspended);

    tx.send(PanelEvent::VisibilityChanged(true)).unwrap();
    wait_until(|| h.panel.state() == PanelState::Idle).await;
    settle().await;
    assert_eq!(h.transport.calls(), 1, "unchanged file is served from history");
}

#[tokio::test]
async fn test_history_evicts_past_capacity() {
    let documents = Arc::new(FakeDocuments::default());
    let panel = CommentaryPanel::new(
        documents.clone(),
        Arc::new(configured()),
        Arc::new(RecordingRenderer::default()),
        Arc::new(ScriptedTransport::replying(&["ok"])),
        CommentaryOptions::builder()
            .auto_refresh_interval(Duration::from_secs(3600))
            .history_capacity(2)
            .build(),
    );
    panel.set_visible(true).await;

    for name in ["/a.rs", "/b.rs", "/c.rs"] {
        documents.open(name, "x\n");
        assert_eq!(panel.active_document_changed().await, RefreshOutcome::Generated);
    }

    assert_eq!(panel.history_len(), 2);
    assert!(panel.cached_entry(&FileIdentity::new("/a.rs")).is_none());
    assert!(panel.cached_entry(&FileIdentity::new("/c.rs")).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_timer_ticks_while_visible() {
    let h = harness(ScriptedTransport::replying(&["tick"])).await;
    h.documents.open("/a.rs", "x\n");

    tokio::time::sleep(Duration::from_secs(3601)).await;
    wait_for_calls(&h.transport, 1).await;

    h.panel.set_visible(false).await;
    tokio::time::sleep(Duration::from_secs(7200)).await;
    tokio::task::yield_now().await;
    assert_eq!(h.transport.calls(), 1);
}

#[tokio::test]
async fn test_end_to_end_with_file_and_http() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Looks fine.\"}}]}\n\ndata: [DONE]\n\n",
            "text/event-stream",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.rs");
    std::fs::write(&file, "fn main() {}\n").unwrap();

    let renderer = Arc::new(RecordingRenderer::default());
    let panel = CommentaryPanel::new(
        Arc::new(FsDocumentProvider::new(&file)),
        Arc::new(EnvConfigProvider::new(
            Some(Credential::new("sk-test")),
            Some(EndpointConfig::new(format!("{}/v1", server.uri()), "m")),
            PersonaId::new("en-roaster"),
        )),
        renderer.clone(),
        Arc::new(CompletionClient::new()),
        options(),
    );

    assert_eq!(panel.set_visible(true).await, Some(RefreshOutcome::Generated));
    assert_eq!(panel.refresh().await, RefreshOutcome::CacheHit);
    let first_cycle: Vec<_> = renderer.take().into_iter().take(3).collect();
    assert_eq!(
        first_cycle,
        vec![
            Rendered::Start {
                header: "Roast".to_string(),
                label: "main.rs".to_string(),
            },
            Rendered::Progress("Looks fine.".to_string()),
            Rendered::Done,
        ]
    );
}
