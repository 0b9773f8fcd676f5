//! Newtype wrappers for type safety
//!
//! This module contains newtype wrappers that keep file identities and
//! persona ids from being mixed up with each other or with plain strings.

use serde::{Deserialize, Serialize};

// ============================================================================
// Newtype Wrappers for Type Safety
// ============================================================================

/// Stable key for "the same file" (canonical path or URI)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileIdentity(String);

impl FileIdentity {
    /// Create a new file identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identity as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased extension including the leading dot, if any
    ///
    /// Only the last path segment is considered, so dots in directory names
    /// are ignored. Dotfiles without a further extension have none.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        let name = self.0.rsplit(['/', '\\']).next().unwrap_or(&self.0);
        let dot = name.rfind('.')?;
        if dot == 0 {
            return None;
        }
        Some(name[dot..].to_ascii_lowercase())
    }
}

impl std::fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileIdentity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FileIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Persona ("role") id newtype
///
/// Compared by identity only; the prompt text behind it is resolved through
/// the config provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(String);

impl PersonaId {
    /// Create a new persona id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the persona id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PersonaId {
    fn default() -> Self {
        Self(super::persona::DEFAULT_PERSONA.to_string())
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PersonaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
