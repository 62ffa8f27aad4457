//! OAuth2 login primitives: Token, Identity and errors.

use thiserror::Error;

/// How the client authenticates itself at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenAuthMethod {
    /// `client_id` and `client_secret` in the form body.
    #[default]
    Post,
    /// HTTP Basic `Authorization` header.
    Basic,
}

/// Where the access token goes on a protected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPlacement {
    /// `Authorization: Bearer <token>`.
    #[default]
    BearerHeader,
    /// A query parameter with the given name, e.g. LinkedIn's `oauth2_access_token`.
    QueryParam(&'static str),
}

/// Access token obtained from a provider's token endpoint.
#[derive(Clone)]
pub struct Token {
    /// Access token string.
    pub access_token: String,
    /// Token type, `Bearer` when the provider omits it.
    pub token_type: String,
    /// Lifetime in seconds, if the provider reported one.
    pub expires_in: Option<u64>,
    /// Optional granted scopes.
    pub scope: Option<String>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Normalized identity handed to the platform's user manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-side user id, always a string.
    pub external_id: String,
    /// Human readable name.
    pub display_name: String,
    /// Primary e-mail address.
    pub email: String,
}

impl Identity {
    pub fn new(
        external_id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// The `(id, name, email)` triple.
    pub fn into_tuple(self) -> (String, String, String) {
        (self.external_id, self.display_name, self.email)
    }
}

/// Everything that can go wrong during one login attempt.
///
/// These never cross the `AuthMethod` boundary; callers only ever see
/// `LoginFailure`. They exist so the cause can be logged.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// A non-https URL was used while insecure transport is disallowed.
    #[error("insecure transport: {0} is not https")]
    InsecureTransport(String),
    /// No anti-CSRF state in the session.
    #[error("no oauth state stored in session")]
    MissingState,
    /// The `state` returned by the provider does not match the session.
    #[error("oauth state mismatch")]
    CsrfMismatch,
    /// The provider redirected back with `error=...`.
    #[error("provider denied access: {0}")]
    AccessDenied(String),
    /// The callback carried no `code`.
    #[error("authorization response carries no code")]
    MissingCode,
    /// A URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Transport level failure.
    #[error("http error: {0}")]
    HttpError(String),
    /// The token endpoint refused the grant.
    #[error("token endpoint returned status {status}")]
    InvalidGrant { status: u16 },
    /// The profile endpoint refused the token.
    #[error("profile endpoint returned status {status}")]
    ProfileRejected { status: u16 },
    /// Malformed JSON or missing fields.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<url::ParseError> for OAuthError {
    fn from(err: url::ParseError) -> Self {
        OAuthError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for OAuthError {
    fn from(err: serde_json::Error) -> Self {
        OAuthError::InvalidResponse(err.to_string())
    }
}
