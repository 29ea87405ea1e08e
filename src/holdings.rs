use std::future::Future;

use url::Url;

use crate::error::Error;
use crate::oauth::TokenSession;
use crate::types::{BibHoldings, OclcNumber};

pub const DEFAULT_BASE_URL: &str = "https://americas.discovery.api.oclc.org/worldcat/search/v2";

/// Anything that can answer a holdings lookup for one OCLC number.
///
/// [`HoldingsClient`] is the production implementation; the resolver only
/// depends on this trait.
pub trait HoldingsSource: Send {
    /// Fetch the holdings summary for `oclc_number`.
    ///
    /// Non-2xx responses must surface as [`Error::Api`] carrying the status and
    /// raw body; interpreting the status is the caller's job.
    fn get_holdings(
        &mut self,
        oclc_number: &OclcNumber,
    ) -> impl Future<Output = Result<BibHoldings, Error>> + Send;
}

/// WorldCat Search API client for the `bibs-holdings` endpoint.
pub struct HoldingsClient {
    session: TokenSession,
    base_url: Url,
    http: reqwest::Client,
}

impl HoldingsClient {
    /// Create a client that authorizes through `session`.
    ///
    /// The session and the client share one connection pool.
    #[must_use]
    pub fn new(session: TokenSession, base_url: Url) -> Self {
        let http = reqwest::Client::new();
        Self {
            session: session.with_http_client(http.clone()),
            base_url,
            http,
        }
    }

    /// Token session used to authorize lookups.
    #[must_use]
    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    fn endpoint(&self, name: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    /// Look up holdings for one OCLC number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for non-2xx responses, [`Error::Authorization`]
    /// if a token refresh is rejected, or [`Error::Http`] on network failure.
    pub async fn get_holdings(&mut self, oclc_number: &OclcNumber) -> Result<BibHoldings, Error> {
        let url = self.endpoint("bibs-holdings")?;
        let request = self
            .http
            .get(url)
            .query(&[("oclcNumber", oclc_number.as_str())]);
        let request = self.session.ensure_authorized(request).await?;

        tracing::debug!(oclc_number = %oclc_number, "Querying bibs-holdings");

        let response = ensure_success(request.send().await?, "holdings lookup").await?;
        response
            .json::<BibHoldings>()
            .await
            .map_err(|e| Error::Response(format!("holdings for {oclc_number}: {e}")))
    }
}

impl HoldingsSource for HoldingsClient {
    async fn get_holdings(&mut self, oclc_number: &OclcNumber) -> Result<BibHoldings, Error> {
        HoldingsClient::get_holdings(self, oclc_number).await
    }
}

/// Checks HTTP response status; returns the response on success or an error with details.
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let detail = response.text().await.unwrap_or_default();
    Err(Error::Api {
        operation,
        status,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::OAuthConfig;

    fn client(base: &str) -> HoldingsClient {
        let session = TokenSession::new(OAuthConfig::new("id", "secret"));
        HoldingsClient::new(session, base.parse().unwrap())
    }

    #[test]
    fn test_endpoint_appends_segment() {
        let url = client(DEFAULT_BASE_URL).endpoint("bibs-holdings").unwrap();
        assert_eq!(
            url.as_str(),
            "https://americas.discovery.api.oclc.org/worldcat/search/v2/bibs-holdings"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash() {
        let url = client("http://127.0.0.1:8080/v2/").endpoint("bibs-holdings").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v2/bibs-holdings");
    }
}
