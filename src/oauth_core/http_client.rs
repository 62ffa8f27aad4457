use std::error::Error;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;

/// HTTP methods used by the login flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
}

/// HTTP redirect policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectPolicy {
    /// Do not follow redirections.
    #[default]
    None,
    /// Follow up to `u32` redirections.
    Limit(u32),
}

/// HTTP request for executing a call.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method (GET, POST).
    pub method: HttpMethod,
    /// Target URL.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Optional request body.
    pub body: Option<Vec<u8>>,
    /// Optional timeout duration. `None` keeps the client's default.
    pub timeout: Option<Duration>,
    /// Redirect policy to use for this request.
    pub redirect_policy: RedirectPolicy,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
            redirect_policy: RedirectPolicy::None,
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
            timeout: None,
            redirect_policy: RedirectPolicy::None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn redirect_policy(mut self, policy: RedirectPolicy) -> Self {
        self.redirect_policy = policy;
        self
    }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP response from executing a call.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with the given status and a JSON body.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error type for HTTP client operations.
pub type HttpClientError = Box<dyn Error + Send + Sync>;

/// Generic HTTP client interface for OAuth flows.
pub trait OAuthHttpClient: Send + Sync + Clone + 'static {
    /// Execute an HTTP request asynchronously.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError>> + Send + 'static>>;
}

/// In-memory HTTP client stub for testing.
///
/// A request is answered by the registered entry whose URL is the longest
/// prefix of the request URL, so query parameters added by the flow (such
/// as an access token) do not need to be known up front.
#[derive(Clone, Default)]
pub struct InMemoryHttpClient {
    responses: Arc<DashMap<String, Result<HttpResponse, String>>>,
    default_response: Option<HttpResponse>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl InMemoryHttpClient {
    /// Creates a new in-memory HTTP client with no default response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory HTTP client with a default response on miss.
    pub fn with_default(response: HttpResponse) -> Self {
        Self { default_response: Some(response), ..Self::default() }
    }

    /// Register a mock response for a URL prefix.
    pub fn insert_response(&self, url: impl Into<String>, response: HttpResponse) {
        self.responses.insert(url.into(), Ok(response));
    }

    /// Make every request to a URL prefix fail at the transport level.
    pub fn insert_failure(&self, url: impl Into<String>, message: impl Into<String>) {
        self.responses.insert(url.into(), Err(message.into()));
    }

    /// Requests executed so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        match self.requests.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lookup(&self, url: &str) -> Option<Result<HttpResponse, String>> {
        self.responses
            .iter()
            .filter(|entry| url.starts_with(entry.key().as_str()))
            .max_by_key(|entry| entry.key().len())
            .map(|entry| entry.value().clone())
    }
}

impl OAuthHttpClient for InMemoryHttpClient {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError>> + Send + 'static>> {
        let found = self.lookup(&request.url);
        let default = self.default_response.clone();
        match self.requests.lock() {
            Ok(mut log) => log.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
        Box::pin(async move {
            let result: Result<HttpResponse, HttpClientError> = match found {
                Some(Ok(resp)) => Ok(resp),
                Some(Err(message)) => Err(message.into()),
                None => default.ok_or_else(|| "no mock response for url".into()),
            };
            result
        })
    }
}

/// HTTP client backed by `reqwest`.
///
/// `reqwest` fixes the redirect policy per client, so requests asking for
/// `RedirectPolicy::Limit(n)` go through a client built for that limit and
/// cached for reuse. `RedirectPolicy::None` requests use the base client.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient {
    inner: reqwest::Client,
    limited: Arc<DashMap<u32, reqwest::Client>>,
}

#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
    pub fn new() -> Result<Self, HttpClientError> {
        let inner = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::from_client(inner))
    }

    /// Wrap an already configured `reqwest::Client`, used for requests that
    /// do not follow redirects.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner, limited: Arc::new(DashMap::new()) }
    }

    fn client_for(&self, policy: RedirectPolicy) -> Result<reqwest::Client, HttpClientError> {
        match policy {
            RedirectPolicy::None => Ok(self.inner.clone()),
            RedirectPolicy::Limit(max) => {
                if let Some(client) = self.limited.get(&max) {
                    return Ok(client.clone());
                }
                let client = reqwest::Client::builder()
                    .redirect(reqwest::redirect::Policy::limited(max as usize))
                    .build()?;
                self.limited.insert(max, client.clone());
                Ok(client)
            }
        }
    }
}

#[cfg(feature = "reqwest")]
impl OAuthHttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError>> + Send + 'static>> {
        let client = self.client_for(request.redirect_policy);
        Box::pin(async move {
            let client = client?;
            let method = match request.method {
                HttpMethod::GET => reqwest::Method::GET,
                HttpMethod::POST => reqwest::Method::POST,
            };
            let mut builder = client.request(method, &request.url);
            for (k, v) in &request.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }
            let resp = builder.send().await?;
            let status = resp.status().as_u16();
            let headers = resp
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect();
            let body = resp.bytes().await?.to_vec();
            Ok::<_, HttpClientError>(HttpResponse { status, headers, body })
        })
    }
}
