//! Static bearer-token validation.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use crate::{AuthError, Identity, TokenValidator};

/// Accepts any non-empty token, or only the configured ones.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenValidator {
    tokens: HashSet<String>,
}

impl StaticTokenValidator {
    /// Create a validator. An empty list accepts any non-empty token.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    fn check(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        if !self.tokens.is_empty() && !self.tokens.contains(token) {
            return Err(AuthError::UnknownToken);
        }
        Ok(Identity::default())
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Identity, AuthError>> + Send + '_>> {
        let result = self.check(token);
        Box::pin(async move { result })
    }
}
