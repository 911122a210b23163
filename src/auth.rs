//! Bearer tokens from the external identity provider.
//!
//! The crate never talks to the identity provider itself; a `TokenProvider`
//! hands over whatever token the host application obtained.

use async_trait::async_trait;
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{CatalogError, Result};

/// Source of the bearer token attached to catalog API calls
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// `Ok(None)` means the request goes out unauthenticated
    async fn bearer_token(&self) -> Result<Option<String>>;
}

/// No token at all
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

#[async_trait]
impl TokenProvider for Anonymous {
    async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// A token fixed at construction time
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(CatalogError::Auth("empty bearer token".to_string()));
        }
        Ok(Self { token })
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

/// Reads the token from an environment variable on every call, so a
/// refreshed session is picked up without rebuilding the client.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl TokenProvider for EnvToken {
    async fn bearer_token(&self) -> Result<Option<String>> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(Some(token)),
            Ok(_) | Err(std::env::VarError::NotPresent) => {
                debug!("No token in {}, sending request unauthenticated", self.var);
                Ok(None)
            }
            Err(e) => Err(CatalogError::Auth(format!("{}: {}", self.var, e))),
        }
    }
}

/// Pick a provider from configuration: explicit token, then env var, then anonymous
pub fn provider_from_config(config: &AuthConfig) -> Result<Box<dyn TokenProvider>> {
    if let Some(token) = &config.token {
        return Ok(Box::new(StaticToken::new(token.clone())?));
    }
    if let Some(var) = &config.token_env {
        return Ok(Box::new(EnvToken::new(var.clone())));
    }
    Ok(Box::new(Anonymous))
}

/// `Authorization` header value for a token
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_has_no_token() {
        assert_eq!(Anonymous.bearer_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken::new("abc").unwrap();
        assert_eq!(provider.bearer_token().await.unwrap().as_deref(), Some("abc"));
        assert!(!format!("{:?}", provider).contains("abc"));
    }

    #[test]
    fn test_static_token_rejects_blank() {
        assert!(StaticToken::new("  ").is_err());
    }

    #[tokio::test]
    async fn test_env_token_missing_var_is_anonymous() {
        let provider = EnvToken::new("CATALOG_CLIENT_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert_eq!(provider.bearer_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_provider_from_config_prefers_explicit_token() {
        let config = AuthConfig {
            token: Some("tok".to_string()),
            token_env: Some("IGNORED".to_string()),
        };
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.bearer_token().await.unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn test_env_token_reads_var_on_each_call() {
        let var = "CATALOG_CLIENT_TEST_TOKEN_ROTATING";
        let provider = EnvToken::new(var);

        std::env::set_var(var, "first");
        let first = tokio_test::block_on(provider.bearer_token()).unwrap();
        std::env::set_var(var, "   ");
        let blank = tokio_test::block_on(provider.bearer_token()).unwrap();
        std::env::remove_var(var);

        assert_eq!(first.as_deref(), Some("first"));
        assert_eq!(blank, None);
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(bearer_header("t"), "Bearer t");
    }
}
