//! Request authentication for the Switchyard HTTP transport.
//!
//! Provides:
//! - [`AuthMode`] / [`AuthConfig`]: how requests are gated
//! - [`TokenValidator`]: trait for async bearer-token validation
//! - [`StaticTokenValidator`]: presence check or fixed token list
//! - [`JwksTokenValidator`]: JWT validation against a JWKS endpoint
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware that gates requests
//!   and attaches an [`switchyard_core::InvocationContext`]
//! - [`discovery_routes`]: RFC 9728 / RFC 8414 metadata documents
//! - [`AuthError`]: auth-specific errors

mod context;
mod discovery;
mod error;
mod jwks;
mod middleware;
mod static_token;

pub use context::{context_from_parts, identity_from_parts};
pub use discovery::discovery_routes;
pub use error::AuthError;
pub use jwks::{Jwk, JwksTokenValidator};
pub use middleware::{AuthLayer, AuthService};
pub use static_token::StaticTokenValidator;

use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// How the HTTP transport gates requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Every request passes.
    #[default]
    Disabled,
    /// A bearer token must be present (and match, when tokens are configured).
    Token,
    /// A bearer JWT must validate against the configured JWKS.
    OAuth,
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            "token" => Ok(Self::Token),
            "oauth" => Ok(Self::OAuth),
            other => Err(format!("unknown auth mode '{other}'")),
        }
    }
}

/// Configuration for the auth middleware.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Gate mode.
    pub mode: AuthMode,
    /// Accepted static tokens in `token` mode. Empty means any token.
    pub tokens: Vec<String>,
    /// Copy the bearer token into the invocation context.
    pub forward_token: bool,
    /// Public URL of this server, advertised in `WWW-Authenticate`.
    pub resource_url: String,
    /// Expected `iss` claim (`oauth` mode). Empty skips the check.
    pub issuer: String,
    /// JWKS endpoint (`oauth` mode).
    pub jwks_url: String,
    /// Expected `aud` claim (`oauth` mode). Empty skips the check.
    pub audience: String,
}

impl AuthConfig {
    /// Build the validator for the configured mode; `None` when disabled.
    pub fn validator(&self) -> Option<Arc<dyn TokenValidator>> {
        match self.mode {
            AuthMode::Disabled => None,
            AuthMode::Token => Some(Arc::new(StaticTokenValidator::new(self.tokens.clone()))),
            AuthMode::OAuth => Some(Arc::new(JwksTokenValidator::new(
                self.jwks_url.clone(),
                self.issuer.clone(),
                self.audience.clone(),
            ))),
        }
    }

    /// Build the Tower layer for this configuration.
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(self.validator(), self.clone())
    }
}

/// The caller identity established by a validator.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    /// Subject identifier (the JWT `sub` claim), when the token carries one.
    pub subject: Option<String>,
}

/// Trait for validating bearer tokens.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the caller identity.
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Identity, AuthError>> + Send + '_>>;
}
