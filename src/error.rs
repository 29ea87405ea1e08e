#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Non-2xx response from a catalog endpoint. `detail` is the raw response body.
    #[error("{operation} failed with HTTP {status}: {detail}")]
    Api {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    /// Non-2xx response from the token endpoint.
    #[error("authorization failed with HTTP {status}: {detail}")]
    Authorization { status: u16, detail: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    Response(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status of a catalog API failure, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body carried by an HTTP failure.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } | Self::Authorization { detail, .. } => Some(detail),
            _ => None,
        }
    }
}
