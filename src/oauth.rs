use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use url::Url;

use crate::error::Error;

/// Scopes requested on every client-credentials grant.
pub const DEFAULT_SCOPES: [&str; 7] = [
    "wcapi:view_bib",
    "wcapi:view_brief_bib",
    "wcapi:view_retained_holdings",
    "wcapi:view_summary_holdings",
    "wcapi:view_my_holdings",
    "wcapi:view_institution_holdings",
    "wcapi:view_holdings",
];

pub const DEFAULT_TOKEN_URL: &str = "https://oauth.oclc.org/token";

/// A token is treated as expired this long before its stated expiry.
pub const EXPIRY_MARGIN: Duration = Duration::seconds(5);

/// WorldCat client-credentials configuration.
///
/// Required fields are constructor parameters; endpoint and scopes have defaults.
///
/// ```rust,ignore
/// use worldcat_holdings::OAuthConfig;
///
/// let config = OAuthConfig::new("client-id", "client-secret")
///     .with_token_url("https://oauth.example.com/token".parse()?);
/// ```
#[derive(Clone)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) token_url: Url,
    pub(crate) scopes: Vec<String>,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: DEFAULT_TOKEN_URL.parse().expect("valid default URL"),
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Override the OCLC token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the requested scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Client ID sent as the Basic auth username.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Endpoint the token is requested from.
    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Scopes requested with every token.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url.as_str())
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Token response from the OCLC token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_at: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Parses `expires_at`. OCLC sends `2024-05-09 19:47:33Z`; RFC 3339 is accepted too.
pub(crate) fn parse_expires_at(raw: &str) -> Result<OffsetDateTime, Error> {
    let normalized = raw.trim().replacen(' ', "T", 1);
    OffsetDateTime::parse(&normalized, &Rfc3339)
        .map_err(|e| Error::Response(format!("expires_at {raw:?}: {e}")))
}

/// Bearer-token session for the WorldCat APIs.
///
/// Owns one access token and refreshes it lazily. Callers are sequential, so
/// refresh needs no locking; concurrent use would need a mutex around `refresh`.
pub struct TokenSession {
    config: OAuthConfig,
    http: reqwest::Client,
    access_token: Option<String>,
    expires_at: Option<OffsetDateTime>,
}

impl TokenSession {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            access_token: None,
            expires_at: None,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Credentials and endpoint this session authorizes with.
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Expiry of the current token; `None` before the first successful refresh.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }

    /// Whether the held token can still be used at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => expires_at - EXPIRY_MARGIN >= now,
            _ => false,
        }
    }

    /// Attach a valid bearer token to `request`, refreshing first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authorization`] with the endpoint's status and body if
    /// the token request is rejected, or [`Error::Http`] on network failure.
    pub async fn ensure_authorized(
        &mut self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        if !self.is_valid_at(OffsetDateTime::now_utc()) {
            self.refresh().await?;
        }
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| Error::Response("token endpoint returned no access token".into()))?;
        Ok(request.bearer_auth(token))
    }

    async fn refresh(&mut self) -> Result<(), Error> {
        let scope = self.config.scopes.join(" ");
        let params = [("grant_type", "client_credentials"), ("scope", scope.as_str())];

        tracing::debug!(token_url = %self.config.token_url, "Requesting access token");

        let response = self
            .http
            .post(self.config.token_url.clone())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Authorization {
                status: status.as_u16(),
                detail,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Response(format!("token response: {e}")))?;
        let expires_at = parse_expires_at(&token.expires_at)?;

        tracing::debug!(%expires_at, "Access token refreshed");
        self.access_token = Some(token.access_token);
        self.expires_at = Some(expires_at);
        Ok(())
    }
}
