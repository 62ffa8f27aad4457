//! Auth-method registry, filled once at startup and shared read-only afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::provider::AuthMethod;
use crate::oauth_core::config::ConfigError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("an auth method with id {0:?} is already registered")]
    DuplicateId(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not build http client: {0}")]
    HttpClient(String),
}

/// All configured auth methods, keyed by id.
///
/// Built mutably by the composition root, then wrapped in an `Arc` and
/// handed to request handlers, which only read it.
#[derive(Default)]
pub struct AuthMethodRegistry {
    methods: BTreeMap<String, Arc<dyn AuthMethod>>,
}

impl AuthMethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, method: impl AuthMethod) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(method))
    }

    pub fn register_arc(&mut self, method: Arc<dyn AuthMethod>) -> Result<(), RegistryError> {
        let id = method.id().to_string();
        if self.methods.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        tracing::debug!(id = %id, name = %method.name(), "auth method registered");
        self.methods.insert(id, method);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn AuthMethod>> {
        self.methods.get(id)
    }

    /// Methods in id order, for rendering the login page.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn AuthMethod>> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl std::fmt::Debug for AuthMethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.methods.keys()).finish()
    }
}
