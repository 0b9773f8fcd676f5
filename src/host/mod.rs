//! Interfaces to the host editor
//!
//! The panel never touches the editor, the secret store or the screen
//! directly. It goes through three collaborators:
//!
//! - [`DocumentProvider`] - which file is active, how big it is, what it says
//! - [`ConfigProvider`] - credential, endpoint and persona selection
//! - [`RendererSink`] - where notices and streamed text go
//!
//! Ready-made implementations for a terminal host live in [`fs`], [`env`]
//! and [`terminal`].

pub mod env;
pub mod fs;
pub mod personas;
pub mod terminal;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::transport::{Credential, EndpointConfig};
use crate::types::identifiers::{FileIdentity, PersonaId};
use crate::types::persona::PersonaPrompt;
use crate::types::snapshot::{ActiveDocument, DocumentSnapshot};

pub use env::EnvConfigProvider;
pub use fs::FsDocumentProvider;
pub use personas::PersonaCatalog;
pub use terminal::TerminalRenderer;

/// Source of the active document
///
/// Split into a cheap handle lookup, a size probe and a content read so the
/// panel can reject files by type and size before reading them.
pub trait DocumentProvider: Send + Sync {
    /// Document currently shown, if any
    fn active_document(&self) -> BoxFuture<'_, Option<ActiveDocument>>;

    /// Size in bytes, from metadata
    fn stat_size<'a>(&'a self, identity: &'a FileIdentity) -> BoxFuture<'a, Result<u64>>;

    /// Read the document's current content
    fn read_snapshot<'a>(
        &'a self,
        document: &'a ActiveDocument,
    ) -> BoxFuture<'a, Result<DocumentSnapshot>>;
}

/// Source of credential, endpoint and persona
pub trait ConfigProvider: Send + Sync {
    /// Stored bearer credential
    fn credential(&self) -> BoxFuture<'_, Option<Credential>>;

    /// Configured endpoint and model
    fn endpoint_config(&self) -> BoxFuture<'_, Option<EndpointConfig>>;

    /// Persona currently selected
    fn current_persona_id(&self) -> PersonaId;

    /// Prompt and header for `id`
    ///
    /// # Errors
    /// Returns `PersonaNotFound` for an unknown id.
    fn persona_prompt(&self, id: &PersonaId) -> Result<PersonaPrompt>;
}

/// Kinds of non-streaming notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Extension is not allow-listed
    UnsupportedType,
    /// File is over the size limit
    TooLarge,
    /// File has no content
    Empty,
    /// Credential or endpoint is missing
    NeedsConfiguration,
    /// No document is open
    NoActiveDocument,
}

/// Where the panel's output goes
///
/// For one refresh cycle, calls arrive in order: one `show_stream_start`,
/// any number of `on_progress` (each with the full text so far), then exactly
/// one of `on_stream_done` or `on_stream_error`.
///
/// A cycle that fails before any request is made (the document cannot be
/// read, or the selected persona no longer exists) sends a lone
/// `on_stream_error` with no `show_stream_start` before it.
pub trait RendererSink: Send + Sync {
    /// Show a notice instead of commentary
    fn show_notice(&self, kind: NoticeKind, details: &str);

    /// A new commentary is about to stream
    fn show_stream_start(&self, header: &str, file_label: &str);

    /// Full text accumulated so far
    fn on_progress(&self, text: &str);

    /// The stream finished normally
    fn on_stream_done(&self);

    /// The stream failed, or the cycle failed before it could start
    fn on_stream_error(&self, message: &str);

    /// Show a commentary that came from history
    ///
    /// Defaults to replaying it as a one-step stream.
    fn show_cached(&self, header: &str, file_label: &str, response: &str) {
        self.show_stream_start(header, file_label);
        self.on_progress(response);
        self.on_stream_done();
    }
}
