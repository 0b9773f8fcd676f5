//! Plain terminal renderer

use std::io::Write;

use parking_lot::Mutex;

use super::{NoticeKind, RendererSink};

/// Writes commentary to stdout as it streams
///
/// Progress arrives as the full text so far; only the part not yet printed
/// is written.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    printed: Mutex<String>,
}

impl TerminalRenderer {
    /// Create a renderer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            log::warn!("Failed to write to terminal: {e}");
        }
    }
}

fn notice_text(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::UnsupportedType => "Unsupported file type",
        NoticeKind::TooLarge => "File too large",
        NoticeKind::Empty => "File is empty",
        NoticeKind::NeedsConfiguration => {
            "API configuration required: set COMMENTARY_API_KEY (and optionally COMMENTARY_BASE_URL, COMMENTARY_MODEL)"
        }
        NoticeKind::NoActiveDocument => "No file open",
    }
}

impl RendererSink for TerminalRenderer {
    fn show_notice(&self, kind: NoticeKind, details: &str) {
        self.printed.lock().clear();
        if details.is_empty() {
            self.write(&format!("[{}]\n", notice_text(kind)));
        } else {
            self.write(&format!("[{}] {details}\n", notice_text(kind)));
        }
    }

    fn show_stream_start(&self, header: &str, file_label: &str) {
        self.printed.lock().clear();
        self.write(&format!("\n== {header}: {file_label} ==\n"));
    }

    fn on_progress(&self, text: &str) {
        let mut printed = self.printed.lock();
        let fresh = match text.strip_prefix(printed.as_str()) {
            Some(suffix) => suffix.to_string(),
            None => format!("\n{text}"),
        };
        printed.clear();
        printed.push_str(text);
        drop(printed);
        self.write(&fresh);
    }

    fn on_stream_done(&self) {
        self.printed.lock().clear();
        self.write("\n");
    }

    fn on_stream_error(&self, message: &str) {
        self.printed.lock().clear();
        self.write(&format!("\n[error] {message}\n"));
    }
}
