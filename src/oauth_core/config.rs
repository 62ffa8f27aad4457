//! Plugin configuration for one login provider instance.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Startup-time configuration errors. Wrong credentials are not one of
/// them: those only show up on the first login attempt.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("login provider configuration has no `id`")]
    MissingId,
    #[error("login provider id {0:?} is not a single path segment")]
    InvalidId(String),
    #[error("malformed login provider configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Configuration recognized by every provider's `init`.
///
/// Unknown keys are ignored so the host can keep its own bookkeeping
/// (such as the plugin module name) in the same table.
#[derive(Clone, Deserialize)]
pub struct LoginConfig {
    /// Provider instance id, used in the callback path and as registry key.
    pub id: String,
    /// Display label. `None` falls back to the provider's default.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Permit plain http transport, for local testing only.
    #[serde(default)]
    pub debug: bool,
}

impl std::fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("debug", &self.debug)
            .finish()
    }
}

impl LoginConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            client_id: String::new(),
            client_secret: String::new(),
            debug: false,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn credentials(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Parses and validates a plugin configuration table.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value.get("id") {
            None | Some(Value::Null) => return Err(ConfigError::MissingId),
            Some(_) => {}
        }
        let config: LoginConfig = serde_json::from_value(value.clone())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::MissingId);
        }
        let bad = |c: char| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control();
        if self.id.chars().any(bad) || self.id == "." || self.id == ".." {
            return Err(ConfigError::InvalidId(self.id.clone()));
        }
        Ok(())
    }

    /// Configured name, or the provider default.
    pub fn display_name(&self, default: &str) -> String {
        self.name.clone().unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply() {
        let config = LoginConfig::from_value(&json!({"id": "li", "plugin_module": "x"})).unwrap();
        assert_eq!(config.id, "li");
        assert_eq!(config.display_name("LinkedIn Login"), "LinkedIn Login");
        assert_eq!(config.client_id, "");
        assert_eq!(config.client_secret, "");
        assert!(!config.debug);
    }

    #[test]
    fn id_is_required_and_checked() {
        assert!(matches!(LoginConfig::from_value(&json!({"name": "x"})), Err(ConfigError::MissingId)));
        assert!(matches!(LoginConfig::from_value(&json!({"id": ""})), Err(ConfigError::MissingId)));
        assert!(matches!(LoginConfig::from_value(&json!({"id": "a/b"})), Err(ConfigError::InvalidId(_))));
        assert!(matches!(LoginConfig::from_value(&json!({"id": 3})), Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn secret_not_in_debug_output() {
        let config = LoginConfig::new("li").credentials("cid", "hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
