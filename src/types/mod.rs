//! Type definitions for the code commentary panel
//!
//! This module contains the type definitions shared across the crate,
//! organized into logical submodules:
//!
//! - [`identifiers`] - Type-safe ID wrappers (`FileIdentity`, `PersonaId`)
//! - [`snapshot`] - Active document handles and immutable content snapshots
//! - [`messages`] - Chat-completion request and response wire types
//! - [`persona`] - Persona definitions and the built-in set
//! - [`options`] - Policy options for the refresh orchestrator

pub mod identifiers;
pub mod messages;
pub mod options;
pub mod persona;
pub mod snapshot;

// Re-export commonly used types
pub use identifiers::{FileIdentity, PersonaId};
pub use messages::{ChatCompletionRequest, ChatMessage, ChatRole};
pub use options::{CommentaryOptions, CommentaryOptionsBuilder};
pub use persona::{DEFAULT_PERSONA, Persona, PersonaPrompt};
pub use snapshot::{ActiveDocument, DocumentSnapshot};
