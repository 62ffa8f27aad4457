//! "Login via X": provider adapters, the registry and the login routes.

pub mod provider;
pub mod registry;
pub mod router;

#[cfg(feature = "linkedin")]
pub mod linkedin;

#[cfg(feature = "github")]
pub mod github;
