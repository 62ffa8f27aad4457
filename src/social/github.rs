//! GitHub login.

use serde_json::Value;

use super::provider::{IdentityProvider, OAuth2AuthMethod, string_field};
use super::registry::{AuthMethodRegistry, RegistryError};
use crate::oauth_core::config::LoginConfig;
use crate::oauth_core::http_client::OAuthHttpClient;
use crate::oauth_core::types::{Identity, OAuthError, TokenAuthMethod};

pub const AUTHORIZATION_URL: &str = "https://github.com/login/oauth/authorize";
pub const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const PROFILE_URL: &str = "https://api.github.com/user";

const ICON: &str = r#"<i class="fa fa-github-square" style="font-size:50px; color:#24292e;"></i>"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct GitHub;

impl IdentityProvider for GitHub {
    fn default_name(&self) -> &'static str {
        "GitHub Login"
    }

    fn authorize_url(&self) -> &str {
        AUTHORIZATION_URL
    }

    fn token_url(&self) -> &str {
        TOKEN_URL
    }

    fn profile_url(&self) -> &str {
        PROFILE_URL
    }

    fn scopes(&self) -> &[&'static str] {
        &["user:email"]
    }

    fn token_auth(&self) -> TokenAuthMethod {
        TokenAuthMethod::Basic
    }

    fn icon_markup(&self) -> &'static str {
        ICON
    }

    /// `name` is optional on GitHub; the login handle stands in for it.
    /// A private e-mail comes back as `null`, which fails the login.
    fn parse_profile(&self, profile: &Value) -> Result<Identity, OAuthError> {
        let id = string_field(profile, "id")?;
        let name = match profile.get("name").and_then(|v| v.as_str()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => string_field(profile, "login")?,
        };
        let email = profile
            .get("email")
            .and_then(|v| v.as_str())
            .ok_or_else(|| OAuthError::InvalidResponse("profile has no public `email`".to_string()))?;
        Ok(Identity::new(id, name, email))
    }
}

pub type GitHubAuthMethod<C> = OAuth2AuthMethod<GitHub, C>;

/// Registers one GitHub login instance built from `conf`, over the default HTTP client.
#[cfg(feature = "reqwest")]
pub fn init(registry: &mut AuthMethodRegistry, conf: &Value) -> Result<(), RegistryError> {
    let client = crate::oauth_core::http_client::ReqwestHttpClient::new()
        .map_err(|e| RegistryError::HttpClient(e.to_string()))?;
    init_with_client(registry, conf, client)
}

pub fn init_with_client<C: OAuthHttpClient>(
    registry: &mut AuthMethodRegistry,
    conf: &Value,
    http_client: C,
) -> Result<(), RegistryError> {
    let config = LoginConfig::from_value(conf)?;
    registry.register(GitHubAuthMethod::new(&config, GitHub, http_client)?)
}
