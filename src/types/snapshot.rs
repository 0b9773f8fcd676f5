//! Document snapshot types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::FileIdentity;

/// The document currently shown in the host editor, before its content is read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDocument {
    /// Stable identity of the file
    pub identity: FileIdentity,
    /// Short name shown in headers (usually the file name)
    pub label: String,
}

impl ActiveDocument {
    /// Create an active document, deriving the label from the identity's last segment
    pub fn new(identity: impl Into<FileIdentity>) -> Self {
        let identity = identity.into();
        let label = identity
            .as_str()
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(identity.as_str())
            .to_string();
        Self { identity, label }
    }

    /// Override the display label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Immutable capture of a document's identity and content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Stable identity of the file
    pub identity: FileIdentity,
    /// Full text at capture time
    pub content: String,
    /// When the capture was taken
    pub captured_at: DateTime<Utc>,
}

impl DocumentSnapshot {
    /// Capture a snapshot now
    pub fn new(identity: impl Into<FileIdentity>, content: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            content: content.into(),
            captured_at: Utc::now(),
        }
    }

    /// Capture a snapshot with an explicit timestamp
    pub fn captured_at(
        identity: impl Into<FileIdentity>,
        content: impl Into<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity: identity.into(),
            content: content.into(),
            captured_at,
        }
    }
}
