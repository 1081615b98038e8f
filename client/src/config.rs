use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Prefix of every environment variable read by [`ClientConfig::from_env`].
pub const ENV_PREFIX: &str = "CLASSIFY_";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://localhost:5000`. Request paths are appended verbatim.
    #[serde(default = "base_url_default")]
    pub base_url: String,
    /// File holding the persisted session token.
    #[serde(default = "token_path_default")]
    pub token_path: PathBuf,
    /// Whole-request timeout. Unset means requests may wait forever.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn base_url_default() -> String {
    "http://localhost:5000".to_string()
}

fn token_path_default() -> PathBuf {
    PathBuf::from(".classify-session.json")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: base_url_default(),
            token_path: token_path_default(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load from `CLASSIFY_*` environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let config = ClientConfig::from_vars(vars(&[
            ("CLASSIFY_BASE_URL", "http://classify.internal:8080"),
            ("CLASSIFY_TOKEN_PATH", "/tmp/session.json"),
            ("CLASSIFY_REQUEST_TIMEOUT_SECS", "30"),
            ("BASE_URL", "http://ignored"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://classify.internal:8080");
        assert_eq!(config.token_path, PathBuf::from("/tmp/session.json"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn malformed_timeout_is_a_config_error() {
        let result = ClientConfig::from_vars(vars(&[("CLASSIFY_REQUEST_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
