//! In-memory persona catalog
//!
//! Built-in personas are always present and cannot be changed. Custom
//! personas can be added, edited and removed at runtime; storing them
//! across restarts is up to the host.

use crate::error::{CommentaryError, Result};
use crate::types::identifiers::PersonaId;
use crate::types::persona::{Persona, built_in_personas, is_built_in};

/// Field updates for [`PersonaCatalog::update_custom`]
#[derive(Debug, Clone, Default)]
pub struct PersonaUpdate {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New header
    pub header: Option<String>,
    /// New system prompt
    pub system_prompt: Option<String>,
}

/// Built-in plus custom personas
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    built_in: Vec<Persona>,
    custom: Vec<Persona>,
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaCatalog {
    /// Catalog with only the built-in personas
    #[must_use]
    pub fn new() -> Self {
        Self {
            built_in: built_in_personas(),
            custom: Vec::new(),
        }
    }

    /// Look up a persona, built-ins first
    ///
    /// # Errors
    /// Returns `PersonaNotFound` for an unknown id.
    pub fn get(&self, id: &PersonaId) -> Result<&Persona> {
        self.built_in
            .iter()
            .chain(self.custom.iter())
            .find(|p| &p.id == id)
            .ok_or_else(|| CommentaryError::persona_not_found(id.as_str()))
    }

    /// Whether `id` is known
    #[must_use]
    pub fn is_valid(&self, id: &PersonaId) -> bool {
        self.get(id).is_ok()
    }

    /// All personas, built-ins first
    #[must_use]
    pub fn all(&self) -> Vec<Persona> {
        self.built_in.iter().chain(self.custom.iter()).cloned().collect()
    }

    /// Custom personas only
    #[must_use]
    pub fn custom(&self) -> &[Persona] {
        &self.custom
    }

    /// Register a custom persona
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the id has characters other than ASCII
    /// letters, digits, `-` and `_`, collides with an existing persona, or
    /// any text field is empty.
    pub fn create_custom(&mut self, mut persona: Persona) -> Result<()> {
        let id = persona.id.as_str();
        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CommentaryError::invalid_config(
                "Invalid persona id. Only letters, numbers, hyphens, and underscores are allowed.",
            ));
        }
        if is_built_in(id) {
            return Err(CommentaryError::invalid_config(format!(
                "Persona id \"{id}\" conflicts with a built-in persona."
            )));
        }
        if self.custom.iter().any(|p| p.id == persona.id) {
            return Err(CommentaryError::invalid_config(format!(
                "Persona id \"{id}\" already exists."
            )));
        }
        if [&persona.name, &persona.description, &persona.header, &persona.system_prompt]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(CommentaryError::invalid_config(
                "All fields (name, description, header, system prompt) are required.",
            ));
        }

        persona.is_custom = true;
        self.custom.push(persona);
        Ok(())
    }

    /// Apply `update` to a custom persona
    ///
    /// # Errors
    /// Returns `PersonaNotFound` if no custom persona has this id.
    pub fn update_custom(&mut self, id: &PersonaId, update: PersonaUpdate) -> Result<()> {
        let persona = self
            .custom
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| CommentaryError::persona_not_found(id.as_str()))?;

        if let Some(name) = update.name {
            persona.name = name;
        }
        if let Some(description) = update.description {
            persona.description = description;
        }
        if let Some(header) = update.header {
            persona.header = header;
        }
        if let Some(system_prompt) = update.system_prompt {
            persona.system_prompt = system_prompt;
        }
        Ok(())
    }

    /// Remove a custom persona
    ///
    /// # Errors
    /// Returns `PersonaNotFound` if no custom persona has this id.
    pub fn delete_custom(&mut self, id: &PersonaId) -> Result<Persona> {
        let index = self
            .custom
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CommentaryError::persona_not_found(id.as_str()))?;
        Ok(self.custom.remove(index))
    }
}
