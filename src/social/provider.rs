use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::oauth_core::config::{ConfigError, LoginConfig};
use crate::oauth_core::http_client::OAuthHttpClient;
use crate::oauth_core::oauth_client::{OAuthClient, generate_state};
use crate::oauth_core::session::{LoginContext, OAUTH_STATE_KEY};
use crate::oauth_core::types::{Identity, OAuthError, TokenAuthMethod, TokenPlacement};

/// Path the provider redirects the user to, relative to the application home.
pub fn callback_path(id: &str) -> String {
    format!("/auth/{id}/callback")
}

/// Path that starts a login with the given provider instance.
pub fn login_path(id: &str) -> String {
    format!("/auth/{id}/login")
}

/// Uniform "authentication failed" signal returned by `AuthMethod::callback`.
///
/// The underlying cause is logged when the failure is produced and is not
/// available to callers.
pub struct LoginFailure {
    cause: OAuthError,
}

impl LoginFailure {
    pub(crate) fn new(cause: OAuthError) -> Self {
        Self { cause }
    }

    #[cfg(test)]
    pub(crate) fn cause(&self) -> &OAuthError {
        &self.cause
    }
}

impl std::fmt::Debug for LoginFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LoginFailure")
    }
}

impl std::fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("authentication failed")
    }
}

impl std::error::Error for LoginFailure {}

/// One configured identity-provider instance, as the platform sees it.
///
/// Immutable once constructed; all per-attempt state lives in the session.
#[async_trait]
pub trait AuthMethod: Send + Sync + 'static {
    /// Instance id, unique in the registry.
    fn id(&self) -> &str;

    /// Label shown on the login page.
    fn name(&self) -> &str;

    /// HTML snippet for the login button.
    fn icon_markup(&self) -> &str;

    fn callback_path(&self) -> String {
        callback_path(self.id())
    }

    /// Builds the provider consent URL and stores a fresh anti-CSRF state
    /// in the session.
    ///
    /// The session holds a single state slot: calling this again before the
    /// callback invalidates the earlier link.
    fn auth_link(&self, ctx: &mut dyn LoginContext) -> Result<String, LoginFailure>;

    /// Completes the login from the provider's redirect.
    ///
    /// Consumes the stored state whatever the outcome.
    async fn callback(&self, ctx: &mut dyn LoginContext) -> Result<Identity, LoginFailure>;
}

/// Provider-specific part of an OAuth2 login: endpoints and profile mapping.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Label used when the configuration sets no `name`.
    fn default_name(&self) -> &'static str;

    /// May carry fixed query parameters such as the scope set.
    fn authorize_url(&self) -> &str;

    fn token_url(&self) -> &str;

    /// Profile endpoint including its field selector.
    fn profile_url(&self) -> &str;

    /// Scopes appended as a `scope` parameter. Empty adds none.
    fn scopes(&self) -> &[&'static str] {
        &[]
    }

    fn token_auth(&self) -> TokenAuthMethod {
        TokenAuthMethod::Post
    }

    fn token_placement(&self) -> TokenPlacement {
        TokenPlacement::BearerHeader
    }

    fn icon_markup(&self) -> &'static str;

    /// Maps the profile endpoint's JSON onto the canonical identity.
    fn parse_profile(&self, profile: &Value) -> Result<Identity, OAuthError>;
}

/// `AuthMethod` for any authorization-code provider.
pub struct OAuth2AuthMethod<P, C> {
    id: String,
    name: String,
    client_id: String,
    client_secret: String,
    allow_insecure_transport: bool,
    provider: P,
    http_client: C,
}

impl<P: IdentityProvider, C: OAuthHttpClient> OAuth2AuthMethod<P, C> {
    pub fn new(config: &LoginConfig, provider: P, http_client: C) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: config.id.clone(),
            name: config.display_name(provider.default_name()),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            allow_insecure_transport: config.debug,
            provider,
            http_client,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn oauth_client(&self, home: &str) -> OAuthClient {
        OAuthClient::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.provider.authorize_url(),
            self.provider.token_url(),
            format!("{}{}", home.trim_end_matches('/'), callback_path(&self.id)),
        )
        .with_token_auth(self.provider.token_auth())
        .with_insecure_transport(self.allow_insecure_transport)
    }

    async fn complete(&self, ctx: &mut dyn LoginContext) -> Result<Identity, OAuthError> {
        let client = self.oauth_client(ctx.home());
        let expected = ctx.session().remove(OAUTH_STATE_KEY).ok_or(OAuthError::MissingState)?;
        let code = client.parse_authorization_response(&ctx.full_url(), &expected)?;
        let token = client.exchange_code(&self.http_client, &code).await?;
        let profile = client
            .fetch_json(
                &self.http_client,
                &token,
                self.provider.profile_url(),
                self.provider.token_placement(),
            )
            .await?;
        self.provider.parse_profile(&profile)
    }
}

impl<P, C> std::fmt::Debug for OAuth2AuthMethod<P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2AuthMethod")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("allow_insecure_transport", &self.allow_insecure_transport)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<P: IdentityProvider, C: OAuthHttpClient> AuthMethod for OAuth2AuthMethod<P, C> {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn icon_markup(&self) -> &str {
        self.provider.icon_markup()
    }

    fn auth_link(&self, ctx: &mut dyn LoginContext) -> Result<String, LoginFailure> {
        let client = self.oauth_client(ctx.home());
        let state = generate_state();
        let url = client.authorization_url(self.provider.scopes(), &state).map_err(|cause| {
            warn!(provider = %self.id, error = %cause, "could not build authorization link");
            LoginFailure::new(cause)
        })?;
        ctx.session().insert(OAUTH_STATE_KEY.to_string(), state);
        debug!(provider = %self.id, "authorization link issued");
        Ok(url)
    }

    async fn callback(&self, ctx: &mut dyn LoginContext) -> Result<Identity, LoginFailure> {
        match self.complete(ctx).await {
            Ok(identity) => {
                info!(provider = %self.id, external_id = %identity.external_id, "external login succeeded");
                Ok(identity)
            }
            Err(cause) => {
                warn!(provider = %self.id, error = %cause, "external login failed");
                Err(LoginFailure::new(cause))
            }
        }
    }
}

/// Reads a string or number field as a string.
pub(crate) fn string_field(profile: &Value, key: &str) -> Result<String, OAuthError> {
    match profile.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(OAuthError::InvalidResponse(format!("profile has no usable `{key}`"))),
    }
}
