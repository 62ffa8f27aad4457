//! LinkedIn login.

use serde_json::Value;

use super::provider::{IdentityProvider, OAuth2AuthMethod, string_field};
use super::registry::{AuthMethodRegistry, RegistryError};
use crate::oauth_core::config::LoginConfig;
use crate::oauth_core::http_client::OAuthHttpClient;
use crate::oauth_core::types::{Identity, OAuthError, TokenPlacement};

pub const AUTHORIZATION_URL: &str =
    "https://www.linkedin.com/uas/oauth2/authorization?scope=r_basicprofile,r_emailaddress";
pub const TOKEN_URL: &str = "https://www.linkedin.com/uas/oauth2/accessToken";
pub const PROFILE_URL: &str =
    "https://api.linkedin.com/v1/people/~:(id,first-name,last-name,email-address)?format=json";

const ICON: &str = r#"<i class="fa fa-linkedin-square" style="font-size:50px; color:#008CC9;"></i>"#;

/// LinkedIn v1 people API.
///
/// LinkedIn does not send `token_type` and expects the access token as the
/// `oauth2_access_token` query parameter instead of a header.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedIn;

impl IdentityProvider for LinkedIn {
    fn default_name(&self) -> &'static str {
        "LinkedIn Login"
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

    fn token_placement(&self) -> TokenPlacement {
        TokenPlacement::QueryParam("oauth2_access_token")
    }

    fn icon_markup(&self) -> &'static str {
        ICON
    }

    fn parse_profile(&self, profile: &Value) -> Result<Identity, OAuthError> {
        let id = string_field(profile, "id")?;
        let first = text_field(profile, "firstName")?;
        let last = text_field(profile, "lastName")?;
        let email = text_field(profile, "emailAddress")?;
        Ok(Identity::new(id, format!("{first} {last}"), email))
    }
}

fn text_field<'a>(profile: &'a Value, key: &str) -> Result<&'a str, OAuthError> {
    profile
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| OAuthError::InvalidResponse(format!("profile has no `{key}`")))
}

pub type LinkedInAuthMethod<C> = OAuth2AuthMethod<LinkedIn, C>;

/// Registers one LinkedIn login instance built from `conf`, over the default HTTP client.
#[cfg(feature = "reqwest")]
pub fn init(registry: &mut AuthMethodRegistry, conf: &Value) -> Result<(), RegistryError> {
    let client = crate::oauth_core::http_client::ReqwestHttpClient::new()
        .map_err(|e| RegistryError::HttpClient(e.to_string()))?;
    init_with_client(registry, conf, client)
}

/// Registers one LinkedIn login instance built from `conf`.
pub fn init_with_client<C: OAuthHttpClient>(
    registry: &mut AuthMethodRegistry,
    conf: &Value,
    http_client: C,
) -> Result<(), RegistryError> {
    let config = LoginConfig::from_value(conf)?;
    let method = LinkedInAuthMethod::new(&config, LinkedIn, http_client)?;
    registry.register(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth_core::http_client::{HttpResponse, InMemoryHttpClient};
    use crate::oauth_core::session::{MemorySession, RequestContext};
    use crate::social::provider::AuthMethod;
    use serde_json::json;

    fn method(client: InMemoryHttpClient) -> LinkedInAuthMethod<InMemoryHttpClient> {
        let config = LoginConfig::new("linkedin").credentials("cid", "csecret");
        LinkedInAuthMethod::new(&config, LinkedIn, client).unwrap()
    }

    fn state_of(url: &str) -> String {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[test]
    fn profile_mapping() {
        let profile = json!({"id": 42, "firstName": "Ada", "lastName": "Lovelace", "emailAddress": "ada@example.com"});
        let identity = LinkedIn.parse_profile(&profile).unwrap();
        assert_eq!(identity, Identity::new("42", "Ada Lovelace", "ada@example.com"));
        assert!(LinkedIn.parse_profile(&json!({"firstName": "Ada"})).is_err());
        assert!(LinkedIn.parse_profile(&json!({"id": "1", "firstName": "A", "lastName": "B"})).is_err());
    }

    #[tokio::test]
    async fn failure_keeps_cause() {
        let client = InMemoryHttpClient::new();
        client.insert_response(TOKEN_URL, HttpResponse::json(200, &json!({"access_token": "AT"})));
        client.insert_failure(PROFILE_URL, "connection reset");
        let li = method(client);

        let mut ctx = RequestContext::new("https://app.local", "/auth/linkedin/login", MemorySession::new());
        let link = li.auth_link(&mut ctx).unwrap();
        let state = state_of(&link);
        let mut ctx = ctx.with_path(format!("/auth/linkedin/callback?code=C&state={state}"));
        let failure = li.callback(&mut ctx).await.unwrap_err();
        assert!(matches!(failure.cause(), OAuthError::HttpError(_)));
        assert_eq!(failure.to_string(), "authentication failed");
    }

    #[tokio::test]
    async fn missing_state_is_distinguished_internally() {
        let li = method(InMemoryHttpClient::new());
        let mut ctx = RequestContext::new("https://app.local", "/auth/linkedin/callback?code=C&state=S", MemorySession::new());
        let failure = li.callback(&mut ctx).await.unwrap_err();
        assert!(matches!(failure.cause(), OAuthError::MissingState));
    }
}
