//! Commentary panel options and configuration
//!
//! This module contains the policy knobs of the refresh orchestrator,
//! including a builder pattern for easy configuration.

use std::time::Duration;

use crate::error::{CommentaryError, Result};

// ============================================================================
// Defaults
// ============================================================================

/// Default maximum file size (100 KiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024;

/// Default cooldown before small edits trigger a re-query (60 seconds)
pub const DEFAULT_MIN_REQUERY_INTERVAL: Duration = Duration::from_secs(60);

/// Default changed-line count above which the cache is invalidated immediately
pub const DEFAULT_MIN_LINE_CHANGES: usize = 10;

/// Default auto-refresh tick (5 seconds)
pub const DEFAULT_AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of files remembered by the history store
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default idle window between streamed chunks (60 seconds)
pub const DEFAULT_STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Extensions the panel comments on by default
pub const DEFAULT_SUPPORTED_EXTENSIONS: &[&str] = &[
    ".js", ".ts", ".jsx", ".tsx", ".vue", ".svelte", ".py", ".rb", ".go", ".rs", ".java", ".kt",
    ".swift", ".c", ".cpp", ".h", ".hpp", ".cs", ".php", ".scala", ".clj", ".hs", ".ml", ".ex",
    ".exs", ".lua", ".r", ".m", ".sh", ".bash", ".zsh", ".css", ".scss", ".sass", ".less",
    ".html", ".json", ".yaml", ".yml", ".toml", ".ini", ".cfg", ".conf",
];

// ============================================================================
// Commentary Options
// ============================================================================

/// Policy options for one commentary panel
#[derive(Debug, Clone)]
pub struct CommentaryOptions {
    /// Allow-listed extensions, lowercase with leading dot
    pub supported_extensions: Vec<String>,
    /// Largest file (bytes) that will be sent
    pub max_file_size: u64,
    /// Cooldown before a small edit makes a cached result stale
    pub min_requery_interval: Duration,
    /// Changed-line count above which a cached result is stale immediately
    pub min_line_changes: usize,
    /// Period of the auto-refresh timer
    pub auto_refresh_interval: Duration,
    /// Maximum number of files kept in history
    pub history_capacity: usize,
    /// Maximum silence between streamed chunks; `None` waits forever
    pub stream_idle_timeout: Option<Duration>,
}

impl Default for CommentaryOptions {
    fn default() -> Self {
        Self {
            supported_extensions: DEFAULT_SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            min_requery_interval: DEFAULT_MIN_REQUERY_INTERVAL,
            min_line_changes: DEFAULT_MIN_LINE_CHANGES,
            auto_refresh_interval: DEFAULT_AUTO_REFRESH_INTERVAL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            stream_idle_timeout: Some(DEFAULT_STREAM_IDLE_TIMEOUT),
        }
    }
}

impl CommentaryOptions {
    /// Create a new builder for `CommentaryOptions`
    #[must_use]
    pub fn builder() -> CommentaryOptionsBuilder {
        CommentaryOptionsBuilder::default()
    }

    /// Whether `extension` (with leading dot, any case) is allow-listed
    #[must_use]
    pub fn supports_extension(&self, extension: &str) -> bool {
        self.supported_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

// ============================================================================
// Builder for CommentaryOptions
// ============================================================================

/// Builder for `CommentaryOptions`
#[derive(Debug, Default)]
pub struct CommentaryOptionsBuilder {
    options: CommentaryOptions,
}

impl CommentaryOptionsBuilder {
    /// Replace the extension allow-list
    ///
    /// Entries are normalized to lowercase with a leading dot.
    #[must_use]
    pub fn supported_extensions(mut self, extensions: Vec<impl Into<String>>) -> Self {
        self.options.supported_extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.into().to_ascii_lowercase();
                if ext.starts_with('.') { ext } else { format!(".{ext}") }
            })
            .collect();
        self
    }

    /// Set the maximum file size in bytes
    #[must_use]
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.options.max_file_size = bytes;
        self
    }

    /// Set the small-edit cooldown
    #[must_use]
    pub const fn min_requery_interval(mut self, interval: Duration) -> Self {
        self.options.min_requery_interval = interval;
        self
    }

    /// Set the large-edit threshold
    #[must_use]
    pub const fn min_line_changes(mut self, lines: usize) -> Self {
        self.options.min_line_changes = lines;
        self
    }

    /// Set the auto-refresh tick
    #[must_use]
    pub const fn auto_refresh_interval(mut self, interval: Duration) -> Self {
        self.options.auto_refresh_interval = interval;
        self
    }

    /// Set the history capacity
    #[must_use]
    pub const fn history_capacity(mut self, capacity: usize) -> Self {
        self.options.history_capacity = capacity;
        self
    }

    /// Set or disable the idle timeout between streamed chunks
    #[must_use]
    pub const fn stream_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.options.stream_idle_timeout = timeout;
        self
    }

    /// Build the options without validation
    #[must_use]
    pub fn build(self) -> CommentaryOptions {
        self.options
    }

    /// Build the options, rejecting values the orchestrator cannot run with
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a zero history capacity or a zero
    /// auto-refresh interval.
    pub fn try_build(self) -> Result<CommentaryOptions> {
        if self.options.history_capacity == 0 {
            return Err(CommentaryError::invalid_config(
                "history_capacity must be at least 1",
            ));
        }
        if self.options.auto_refresh_interval.is_zero() {
            return Err(CommentaryError::invalid_config(
                "auto_refresh_interval must be non-zero",
            ));
        }
        Ok(self.options)
    }
}
