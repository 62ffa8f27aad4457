//! Third-party OAuth2 login for Starberry applications.
//!
//! A provider instance is configured once at startup, registered into an
//! [`AuthMethodRegistry`], and then driven by two requests: the login
//! redirect and the provider's callback, which yields an [`Identity`].

pub mod oauth_core;
pub mod social;

pub use oauth_core::config::{ConfigError, LoginConfig};
pub use oauth_core::http_client::{HttpClientError, HttpMethod, HttpRequest, HttpResponse, InMemoryHttpClient, OAuthHttpClient, RedirectPolicy};
#[cfg(feature = "reqwest")]
pub use oauth_core::http_client::ReqwestHttpClient;
pub use oauth_core::oauth_client::OAuthClient;
pub use oauth_core::session::{LoginContext, MemorySession, OAUTH_STATE_KEY, RequestContext, SessionStore};
pub use oauth_core::types::{Identity, OAuthError, Token};
pub use social::provider::{AuthMethod, IdentityProvider, LoginFailure, OAuth2AuthMethod, callback_path, login_path};
pub use social::registry::{AuthMethodRegistry, RegistryError};
pub use social::router::{LoginResponse, LoginRouter};
