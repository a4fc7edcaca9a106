//! Secret loading from the process environment

use crate::error::{CookCompassError, Result};
use std::fmt;

/// Environment variable holding the inference API token
pub const API_TOKEN_ENV: &str = "API_TOKEN";

/// Credentials for the hosted inference API
#[derive(Clone)]
pub struct Secrets {
    api_token: String,
}

impl Secrets {
    /// Read `API_TOKEN` from the environment; absence is fatal
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve secrets through an arbitrary lookup (environment, vault, tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(API_TOKEN_ENV) {
            Some(token) if !token.trim().is_empty() => Ok(Self {
                api_token: token.trim().to_string(),
            }),
            _ => {
                tracing::error!("{} not found in environment. Cannot proceed.", API_TOKEN_ENV);
                Err(CookCompassError::MissingSecret(API_TOKEN_ENV.to_string()))
            }
        }
    }

    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
        }
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("api_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_present() {
        let secrets = Secrets::from_lookup(|name| {
            (name == API_TOKEN_ENV).then(|| " hf_abc ".to_string())
        })
        .unwrap();
        assert_eq!(secrets.api_token(), "hf_abc");
    }

    #[test]
    fn test_token_absent_is_fatal() {
        let err = Secrets::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, CookCompassError::MissingSecret(ref v) if v == API_TOKEN_ENV));
    }

    #[test]
    fn test_blank_token_is_fatal() {
        let err = Secrets::from_lookup(|_| Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, CookCompassError::MissingSecret(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let secrets = Secrets::new("hf_secret");
        let debug = format!("{:?}", secrets);
        assert!(!debug.contains("hf_secret"));
        assert!(debug.contains("redacted"));
    }
}
