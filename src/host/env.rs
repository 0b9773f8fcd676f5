//! Environment-backed configuration provider

use futures::future::BoxFuture;
use parking_lot::RwLock;

use super::ConfigProvider;
use super::personas::PersonaCatalog;
use crate::error::Result;
use crate::transport::{Credential, DEFAULT_BASE_URL, DEFAULT_MODEL, EndpointConfig};
use crate::types::identifiers::PersonaId;
use crate::types::persona::PersonaPrompt;

/// Variable holding the bearer credential
pub const ENV_API_KEY: &str = "COMMENTARY_API_KEY";

/// Variable holding the endpoint base URL
pub const ENV_BASE_URL: &str = "COMMENTARY_BASE_URL";

/// Variable holding the model name
pub const ENV_MODEL: &str = "COMMENTARY_MODEL";

/// Variable selecting the persona
pub const ENV_PERSONA: &str = "COMMENTARY_PERSONA";

/// Config provider holding values read once from the environment
///
/// Credential, endpoint and persona can be changed afterwards; the next
/// refresh cycle picks the change up.
#[derive(Debug)]
pub struct EnvConfigProvider {
    credential: RwLock<Option<Credential>>,
    endpoint: RwLock<Option<EndpointConfig>>,
    persona: RwLock<PersonaId>,
    catalog: RwLock<PersonaCatalog>,
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new(None, Some(EndpointConfig::default()), PersonaId::default())
    }
}

impl EnvConfigProvider {
    /// Create a provider from explicit values
    #[must_use]
    pub fn new(
        credential: Option<Credential>,
        endpoint: Option<EndpointConfig>,
        persona: PersonaId,
    ) -> Self {
        Self {
            credential: RwLock::new(credential),
            endpoint: RwLock::new(endpoint),
            persona: RwLock::new(persona),
            catalog: RwLock::new(PersonaCatalog::new()),
        }
    }

    /// Read `COMMENTARY_*` variables
    ///
    /// Base URL and model fall back to the defaults; a blank or missing key
    /// leaves the credential unset.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the endpoint variables fail validation.
    pub fn from_env() -> Result<Self> {
        let credential = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Credential::new(key.trim()));
        let base_url = std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var(ENV_MODEL).unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let endpoint = EndpointConfig::validated(&base_url, &model)?;
        let persona = std::env::var(ENV_PERSONA)
            .map(PersonaId::from)
            .unwrap_or_default();

        log::debug!(
            "Loaded config from environment: endpoint {}, model {}, persona {}, credential {}",
            endpoint.base_url,
            endpoint.model,
            persona,
            if credential.is_some() { "set" } else { "unset" }
        );
        Ok(Self::new(credential, Some(endpoint), persona))
    }

    /// Replace the credential
    pub fn set_credential(&self, credential: Option<Credential>) {
        *self.credential.write() = credential;
    }

    /// Replace the endpoint
    pub fn set_endpoint(&self, endpoint: Option<EndpointConfig>) {
        *self.endpoint.write() = endpoint;
    }

    /// Select a persona
    ///
    /// # Errors
    /// Returns `PersonaNotFound` if the catalog does not know `id`.
    pub fn set_persona(&self, id: PersonaId) -> Result<()> {
        self.catalog.read().get(&id)?;
        *self.persona.write() = id;
        Ok(())
    }

    /// Mutate the persona catalog
    pub fn with_catalog<T>(&self, f: impl FnOnce(&mut PersonaCatalog) -> T) -> T {
        f(&mut self.catalog.write())
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn credential(&self) -> BoxFuture<'_, Option<Credential>> {
        let credential = self.credential.read().clone();
        Box::pin(async move { credential })
    }

    fn endpoint_config(&self) -> BoxFuture<'_, Option<EndpointConfig>> {
        let endpoint = self.endpoint.read().clone();
        Box::pin(async move { endpoint })
    }

    fn current_persona_id(&self) -> PersonaId {
        self.persona.read().clone()
    }

    fn persona_prompt(&self, id: &PersonaId) -> Result<PersonaPrompt> {
        self.catalog.read().get(id).map(|persona| persona.prompt())
    }
}
