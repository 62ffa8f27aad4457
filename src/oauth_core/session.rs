//! Request and session context the login adapters run against.
//!
//! The host framework owns the real session; it only has to expose a
//! string key/value view of it through `SessionStore`.

use std::collections::HashMap;

/// Session key holding the anti-CSRF state of the pending login attempt.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

/// Session-scoped key/value store.
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn insert(&mut self, key: String, value: String);

    fn remove(&mut self, key: &str) -> Option<String>;
}

/// What a login adapter needs to know about the current request.
pub trait LoginContext: Send {
    /// Scheme, host and mount prefix of the application, without trailing slash.
    fn home(&self) -> &str;

    /// Path and query string of the current request, exactly as received.
    fn full_path(&self) -> &str;

    fn session(&mut self) -> &mut dyn SessionStore;

    /// `home()` + `full_path()`.
    fn full_url(&self) -> String {
        format!("{}{}", self.home(), self.full_path())
    }
}

/// Plain map session that remembers whether it was written to.
#[derive(Debug, Clone, Default)]
pub struct MemorySession(HashMap<String, String>, bool);

impl MemorySession {
    pub fn new() -> Self {
        MemorySession(HashMap::new(), false)
    }

    pub fn from_hash(map: HashMap<String, String>) -> Self {
        MemorySession(map, false)
    }

    pub fn is_modified(&self) -> bool {
        self.1
    }

    pub fn into_inner(self) -> (HashMap<String, String>, bool) {
        (self.0, self.1)
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn insert(&mut self, key: String, value: String) {
        self.0.insert(key, value);
        self.1 = true;
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let removed = self.0.remove(key);
        if removed.is_some() {
            self.1 = true;
        }
        removed
    }
}

/// Owned request context, for hosts that copy request data out of their own type.
#[derive(Debug, Clone)]
pub struct RequestContext<S: SessionStore = MemorySession> {
    home: String,
    full_path: String,
    session: S,
}

impl<S: SessionStore> RequestContext<S> {
    pub fn new(home: impl Into<String>, full_path: impl Into<String>, session: S) -> Self {
        let home = home.into().trim_end_matches('/').to_string();
        Self { home, full_path: full_path.into(), session }
    }

    /// Same session, next request.
    pub fn with_path(mut self, full_path: impl Into<String>) -> Self {
        self.full_path = full_path.into();
        self
    }

    pub fn session_ref(&self) -> &S {
        &self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }
}

impl<S: SessionStore> LoginContext for RequestContext<S> {
    fn home(&self) -> &str {
        &self.home
    }

    fn full_path(&self) -> &str {
        &self.full_path
    }

    fn session(&mut self) -> &mut dyn SessionStore {
        &mut self.session
    }
}
