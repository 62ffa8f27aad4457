use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::instrument;
use url::Url;
use url::form_urlencoded;
use uuid::Uuid;

use super::http_client::{HttpRequest, OAuthHttpClient};
use super::types::{OAuthError, Token, TokenAuthMethod, TokenPlacement};

const USER_AGENT: &str = concat!("starberry_login/", env!("CARGO_PKG_VERSION"));

/// Returns true for `https://` URLs.
pub fn is_secure_transport(url: &str) -> bool {
    url.get(..8).is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
}

/// Generate a fresh anti-CSRF state value.
pub fn generate_state() -> String {
    Uuid::new_v4().simple().to_string()
}

/// OAuth2 authorization-code client bound to one provider application and one redirect URI.
#[derive(Clone)]
pub struct OAuthClient {
    /// Client identifier.
    pub client_id: String,
    client_secret: String,
    /// OAuth2 authorization endpoint URL. May already carry query parameters.
    pub authorize_url: String,
    /// OAuth2 token endpoint URL.
    pub token_url: String,
    /// Callback URL registered with the provider.
    pub redirect_uri: String,
    /// Client authentication at the token endpoint.
    pub token_auth: TokenAuthMethod,
    /// Accept plain http for callback, redirect and endpoint URLs.
    pub allow_insecure_transport: bool,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("token_auth", &self.token_auth)
            .field("allow_insecure_transport", &self.allow_insecure_transport)
            .finish()
    }
}

impl OAuthClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        OAuthClient {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: authorize_url.into(),
            token_url: token_url.into(),
            redirect_uri: redirect_uri.into(),
            token_auth: TokenAuthMethod::default(),
            allow_insecure_transport: false,
        }
    }

    pub fn with_token_auth(mut self, method: TokenAuthMethod) -> Self {
        self.token_auth = method;
        self
    }

    pub fn with_insecure_transport(mut self, allow: bool) -> Self {
        self.allow_insecure_transport = allow;
        self
    }

    fn require_secure(&self, url: &str) -> Result<(), OAuthError> {
        if self.allow_insecure_transport || is_secure_transport(url) {
            Ok(())
        } else {
            Err(OAuthError::InsecureTransport(url.to_string()))
        }
    }

    /// Constructs the authorization URL for `state`.
    ///
    /// Empty `scopes` adds no `scope` parameter, for providers whose
    /// authorization URL already fixes the scope set.
    pub fn authorization_url(&self, scopes: &[&str], state: &str) -> Result<String, OAuthError> {
        self.require_secure(&self.authorize_url)?;
        let mut url = Url::parse(&self.authorize_url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.redirect_uri);
            if !scopes.is_empty() {
                query.append_pair("scope", &scopes.join(" "));
            }
            query.append_pair("state", state);
        }
        Ok(url.into())
    }

    /// Checks the provider's redirect back to us and returns the authorization code.
    ///
    /// `response_url` is the full callback URL including its query string.
    pub fn parse_authorization_response(
        &self,
        response_url: &str,
        expected_state: &str,
    ) -> Result<String, OAuthError> {
        self.require_secure(response_url)?;
        let url = Url::parse(response_url)?;
        let mut state = None;
        let mut code = None;
        let mut error = None;
        let mut error_description = None;
        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                "state" => state = Some(v.into_owned()),
                "code" => code = Some(v.into_owned()),
                "error" => error = Some(v.into_owned()),
                "error_description" => error_description = Some(v.into_owned()),
                _ => {}
            }
        }
        if state.as_deref() != Some(expected_state) {
            return Err(OAuthError::CsrfMismatch);
        }
        if let Some(error) = error {
            let reason = match error_description {
                Some(desc) => format!("{error}: {desc}"),
                None => error,
            };
            return Err(OAuthError::AccessDenied(reason));
        }
        code.filter(|c| !c.is_empty()).ok_or(OAuthError::MissingCode)
    }

    fn token_request(&self, code: &str) -> HttpRequest {
        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", "authorization_code")
            .append_pair("code", code)
            .append_pair("redirect_uri", &self.redirect_uri);
        let request = match self.token_auth {
            TokenAuthMethod::Post => {
                form.append_pair("client_id", &self.client_id)
                    .append_pair("client_secret", &self.client_secret);
                HttpRequest::post(&self.token_url, form.finish().into_bytes())
            }
            TokenAuthMethod::Basic => {
                let credentials = format!("{}:{}", self.client_id, self.client_secret);
                let auth = format!("Basic {}", STANDARD.encode(credentials.as_bytes()));
                HttpRequest::post(&self.token_url, form.finish().into_bytes()).header("Authorization", auth)
            }
        };
        request
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
    }

    /// Exchanges an authorization code for an access token.
    #[instrument(skip(self, http_client, code), fields(token_url = %self.token_url), level = "debug")]
    pub async fn exchange_code<C: OAuthHttpClient>(
        &self,
        http_client: &C,
        code: &str,
    ) -> Result<Token, OAuthError> {
        self.require_secure(&self.token_url)?;
        let request = self.token_request(code);
        let response = http_client
            .execute(request)
            .await
            .map_err(|e| OAuthError::HttpError(e.to_string()))?;
        if !response.is_success() {
            return Err(OAuthError::InvalidGrant { status: response.status });
        }
        let v: Value = serde_json::from_slice(&response.body)?;
        parse_token(&v)
    }

    /// Issues one authenticated GET and returns the JSON body.
    #[instrument(skip(self, http_client, token), level = "debug")]
    pub async fn fetch_json<C: OAuthHttpClient>(
        &self,
        http_client: &C,
        token: &Token,
        url: &str,
        placement: TokenPlacement,
    ) -> Result<Value, OAuthError> {
        self.require_secure(url)?;
        let mut request = match placement {
            TokenPlacement::BearerHeader => HttpRequest::get(url)
                .header("Authorization", format!("Bearer {}", token.access_token)),
            TokenPlacement::QueryParam(name) => {
                let mut target = Url::parse(url)?;
                target.query_pairs_mut().append_pair(name, &token.access_token);
                HttpRequest::get(String::from(target))
            }
        };
        request = request
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT);

        let response = http_client
            .execute(request)
            .await
            .map_err(|e| OAuthError::HttpError(e.to_string()))?;
        if !response.is_success() {
            return Err(OAuthError::ProfileRejected { status: response.status });
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// Reads a token endpoint JSON body. A missing `token_type` means bearer.
fn parse_token(v: &Value) -> Result<Token, OAuthError> {
    if let Some(error) = v.get("error").and_then(|e| e.as_str()) {
        return Err(OAuthError::InvalidResponse(format!("token endpoint error: {error}")));
    }
    let access_token = v
        .get("access_token")
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| OAuthError::InvalidResponse("missing access_token".to_string()))?
        .to_string();
    let token_type = v
        .get("token_type")
        .and_then(|t| t.as_str())
        .unwrap_or("Bearer")
        .to_string();
    let expires_in = v.get("expires_in").and_then(|t| match t {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    });
    let scope = v.get("scope").and_then(|t| t.as_str()).map(|s| s.to_string());
    Ok(Token { access_token, token_type, expires_in, scope })
}
