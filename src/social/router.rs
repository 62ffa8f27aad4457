//! Dispatch of `/auth/<id>/login` and `/auth/<id>/callback` onto the registry.

use std::sync::Arc;

use super::registry::AuthMethodRegistry;
use crate::oauth_core::session::LoginContext;
use crate::oauth_core::types::Identity;

/// What the host should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResponse {
    /// Send the browser to the provider.
    Redirect(String),
    /// Hand the identity to the user manager and open a session.
    Authenticated { provider: String, identity: Identity },
    /// Login failed; the user stays anonymous.
    Failed,
    /// Not a login route, or an unknown provider id.
    NotFound,
}

impl LoginResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            LoginResponse::Redirect(_) => 302,
            LoginResponse::Authenticated { .. } => 200,
            LoginResponse::Failed => 403,
            LoginResponse::NotFound => 404,
        }
    }

    /// `Location` header value for redirects.
    pub fn location(&self) -> Option<&str> {
        match self {
            LoginResponse::Redirect(url) => Some(url),
            _ => None,
        }
    }
}

enum Action {
    Login,
    Callback,
}

#[derive(Clone)]
pub struct LoginRouter {
    registry: Arc<AuthMethodRegistry>,
}

impl LoginRouter {
    pub fn new(registry: Arc<AuthMethodRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &AuthMethodRegistry {
        &self.registry
    }

    fn route(path: &str) -> Option<(&str, Action)> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut segments = path.strip_prefix("/auth/")?.split('/');
        let id = segments.next().filter(|id| !id.is_empty())?;
        let action = match segments.next()? {
            "login" => Action::Login,
            "callback" => Action::Callback,
            _ => return None,
        };
        match segments.next() {
            None | Some("") => Some((id, action)),
            Some(_) => None,
        }
    }

    pub async fn handle(&self, ctx: &mut dyn LoginContext) -> LoginResponse {
        let full_path = ctx.full_path().to_string();
        let Some((id, action)) = Self::route(&full_path) else {
            return LoginResponse::NotFound;
        };
        let Some(method) = self.registry.get(id) else {
            return LoginResponse::NotFound;
        };
        match action {
            Action::Login => match method.auth_link(ctx) {
                Ok(url) => LoginResponse::Redirect(url),
                Err(_) => LoginResponse::Failed,
            },
            Action::Callback => match method.callback(ctx).await {
                Ok(identity) => LoginResponse::Authenticated { provider: id.to_string(), identity },
                Err(_) => LoginResponse::Failed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes() {
        assert!(matches!(LoginRouter::route("/auth/li/login"), Some(("li", Action::Login))));
        assert!(matches!(LoginRouter::route("/auth/li/callback?code=1&state=2"), Some(("li", Action::Callback))));
        assert!(matches!(LoginRouter::route("/auth/li/callback/"), Some(("li", Action::Callback))));
        assert!(LoginRouter::route("/auth//login").is_none());
        assert!(LoginRouter::route("/auth/li/logout").is_none());
        assert!(LoginRouter::route("/auth/li/login/extra").is_none());
        assert!(LoginRouter::route("/courses").is_none());
    }
}
