use url::Url;

use crate::error::Error;
use crate::holdings::DEFAULT_BASE_URL;
use crate::oauth::OAuthConfig;

/// Catalog API settings: credentials, endpoints and scopes.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub oauth: OAuthConfig,
    pub base_url: Url,
}

impl CatalogConfig {
    /// Create config with the required credentials and default endpoints.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            oauth: OAuthConfig::new(client_id, client_secret),
            base_url: DEFAULT_BASE_URL.parse().expect("valid default URL"),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `WORLDCAT_CLIENT_ID`: WSKey client ID
    /// - `WORLDCAT_CLIENT_SECRET`: WSKey secret
    ///
    /// # Optional env vars
    /// - `WORLDCAT_TOKEN_URL`: Override the OAuth token endpoint
    /// - `WORLDCAT_BASE_URL`: Override the Search API base URL
    /// - `WORLDCAT_SCOPES`: Space-separated scopes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or URLs are invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required values are missing or URLs are invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{key} is required")))
        };
        let url = |key: &str| -> Result<Option<Url>, Error> {
            lookup(key)
                .map(|value| {
                    value
                        .parse::<Url>()
                        .map_err(|e| Error::Config(format!("{key}: {e}")))
                })
                .transpose()
        };

        let mut config = Self::new(
            required("WORLDCAT_CLIENT_ID")?,
            required("WORLDCAT_CLIENT_SECRET")?,
        );

        if let Some(token_url) = url("WORLDCAT_TOKEN_URL")? {
            config.oauth = config.oauth.with_token_url(token_url);
        }
        if let Some(base_url) = url("WORLDCAT_BASE_URL")? {
            config = config.with_base_url(base_url);
        }
        if let Some(scopes) = lookup("WORLDCAT_SCOPES") {
            config.oauth = config
                .oauth
                .with_scopes(scopes.split_whitespace().map(str::to_owned).collect());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::oauth::DEFAULT_TOKEN_URL;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_required_credentials() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("WORLDCAT_CLIENT_ID", "id"),
            ("WORLDCAT_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.oauth.client_id(), "id");
        assert_eq!(config.oauth.token_url().as_str(), DEFAULT_TOKEN_URL);
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_secret() {
        let err = CatalogConfig::from_lookup(lookup(&[("WORLDCAT_CLIENT_ID", "id")])).unwrap_err();
        assert!(err.to_string().contains("WORLDCAT_CLIENT_SECRET"));
    }

    #[test]
    fn test_blank_id_is_missing() {
        let err = CatalogConfig::from_lookup(lookup(&[
            ("WORLDCAT_CLIENT_ID", " "),
            ("WORLDCAT_CLIENT_SECRET", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("WORLDCAT_CLIENT_ID", "id"),
            ("WORLDCAT_CLIENT_SECRET", "secret"),
            ("WORLDCAT_TOKEN_URL", "http://127.0.0.1:9000/token"),
            ("WORLDCAT_BASE_URL", "http://127.0.0.1:9000/v2"),
            ("WORLDCAT_SCOPES", "wcapi:view_bib  wcapi:view_holdings"),
        ]))
        .unwrap();

        assert_eq!(config.oauth.token_url().as_str(), "http://127.0.0.1:9000/token");
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9000/v2");
        assert_eq!(config.oauth.scopes(), ["wcapi:view_bib", "wcapi:view_holdings"]);
    }

    #[test]
    fn test_invalid_url() {
        let err = CatalogConfig::from_lookup(lookup(&[
            ("WORLDCAT_CLIENT_ID", "id"),
            ("WORLDCAT_CLIENT_SECRET", "secret"),
            ("WORLDCAT_BASE_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("WORLDCAT_BASE_URL"));
    }
}
