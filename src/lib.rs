//! # Code Commentary Panel
//!
//! Live AI commentary on whatever file you are looking at. The panel watches
//! the active document, decides whether it changed enough to deserve a new
//! comment, streams one from any OpenAI-compatible chat-completion endpoint,
//! and remembers the result per file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use kodegen_code_commentary::{
//!     CommentaryOptions, CommentaryPanel, CompletionClient, EnvConfigProvider,
//!     FsDocumentProvider, TerminalRenderer,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let panel = CommentaryPanel::new(
//!         Arc::new(FsDocumentProvider::new("src/main.rs")),
//!         Arc::new(EnvConfigProvider::from_env()?),
//!         Arc::new(TerminalRenderer::new()),
//!         Arc::new(CompletionClient::new()),
//!         CommentaryOptions::default(),
//!     );
//!
//!     // Showing the panel starts the auto-refresh timer and runs one cycle
//!     let outcome = panel.set_visible(true).await;
//!     log::info!("First cycle: {outcome:?}");
//!
//!     panel.dispose();
//!     Ok(())
//! }
//! ```
//!
//! ## When Does It Ask Again?
//!
//! A cached commentary is reused unless one of these holds:
//!
//! 1. nothing is cached for the file,
//! 2. the persona changed,
//! 3. more than `min_line_changes` lines differ,
//! 4. any line differs and `min_requery_interval` has passed.
//!
//! See [`history::HistoryStore::staleness`].
//!
//! ## Streaming
//!
//! Responses are read as server-sent events. Multi-byte characters split
//! across network chunks are reassembled, partial lines are carried over,
//! and frames that fail to parse are skipped rather than failing the whole
//! response. Progress callbacks always receive the **full text so far**, so
//! renderers can redraw from scratch on every update. See
//! [`transport::sse::StreamAccumulator`].
//!
//! ## Architecture
//!
//! - [`panel`]: Refresh orchestrator, single-flight guard, timer
//! - [`history`]: Bounded FIFO cache of past commentaries
//! - [`diff`]: Line-level change counting
//! - [`transport`]: Chat-completion client and SSE decoding
//! - [`host`]: Collaborator traits plus terminal/filesystem/env implementations
//! - [`types`]: Identifiers, snapshots, personas, options, wire types
//! - [`error`]: Error types and classification
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, CommentaryError>`](Result).
//! [`CommentaryError::kind`] flattens errors into an [`ErrorKind`] so a
//! connectivity failure can be told apart from a bad key or a rate limit:
//!
//! ```no_run
//! # use kodegen_code_commentary::{CompletionClient, Credential, EndpointConfig, ErrorKind};
//! # async fn example() {
//! let client = CompletionClient::new();
//! let endpoint = EndpointConfig::default();
//! match client.test_connection(&endpoint, &Credential::new("sk-...")).await {
//!     Ok(message) => log::info!("{message}"),
//!     Err(e) if e.kind() == ErrorKind::Auth => log::error!("Bad key: {e}"),
//!     Err(e) => log::error!("{}", e.user_message()),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diff;
pub mod error;
pub mod history;
pub mod host;
pub mod panel;
pub mod transport;
pub mod types;

// Re-export commonly used types for external API
pub use diff::count_changed_lines;
pub use error::{CommentaryError, ErrorKind, Result, ValidationError};
pub use history::{HistoryEntry, HistoryStore, StaleReason, StalenessPolicy};
pub use host::{
    ConfigProvider, DocumentProvider, EnvConfigProvider, FsDocumentProvider, NoticeKind,
    PersonaCatalog, RendererSink, TerminalRenderer,
};
pub use panel::{CommentaryPanel, PanelEvent, PanelState, RefreshOutcome, Trigger};
pub use transport::{
    CompletionClient, CompletionRequest, CompletionTransport, Credential, EndpointConfig,
    normalize_endpoint,
};
pub use types::{
    ActiveDocument, CommentaryOptions, CommentaryOptionsBuilder, DocumentSnapshot, FileIdentity,
    Persona, PersonaId, PersonaPrompt,
};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
