//! OAuth2 client-side primitives shared by every login provider.

pub mod config;
pub mod http_client;
pub mod oauth_client;
pub mod session;
pub mod types;
