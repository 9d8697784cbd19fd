//! Backend credential, read from the process environment only.

use crate::ConfigError;
use std::env;

/// Environment variables consulted, in order.
pub const CREDENTIAL_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Backend access key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from the first non-blank variable in [`CREDENTIAL_VARS`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve the key through an arbitrary lookup (tests, embedding hosts).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        CREDENTIAL_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .map(Self)
            .ok_or_else(|| ConfigError::MissingCredential {
                tried: CREDENTIAL_VARS.iter().map(|s| s.to_string()).collect(),
            })
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_prefers_gemini_key() {
        let key = ApiKey::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "primary"),
            ("API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(key.expose(), "primary");
    }

    #[test]
    fn test_falls_back_when_primary_blank() {
        let key = ApiKey::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "   "),
            ("API_KEY", "fallback"),
        ]))
        .unwrap();
        assert_eq!(key.expose(), "fallback");
    }

    #[test]
    fn test_missing_is_configuration_error() {
        let err = ApiKey::from_lookup(lookup_from(&[])).unwrap_err();
        match err {
            ConfigError::MissingCredential { tried } => {
                assert_eq!(tried, vec!["GEMINI_API_KEY", "API_KEY"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert!(!format!("{:?}", key).contains("super-secret"));
    }
}
