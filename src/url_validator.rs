//! Validation of outbound download URLs.
//!
//! Citation sources are user-supplied, so before issuing a GET we check
//! that the URL parses, uses http/https, and actually names a host. This
//! catches typos and garbage input up front; it is not an SSRF boundary
//! for a single-user local tool.

use crate::error::AppError;
use url::Url;

#[derive(Debug, Clone)]
pub enum UrlValidationError {
    /// URL is malformed or cannot be parsed.
    InvalidUrl(String),
    /// URL uses a scheme other than http or https.
    UnsupportedScheme(String),
    /// URL has no host component.
    NoHost,
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlValidationError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            UrlValidationError::UnsupportedScheme(scheme) => {
                write!(f, "Unsupported URL scheme: {}", scheme)
            }
            UrlValidationError::NoHost => write!(f, "URL has no host"),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for AppError {
    fn from(err: UrlValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Parse and validate a URL for downloading. arXiv still serves some PDF
/// links over plain http, so both http and https are accepted.
pub fn validate_download_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str).map_err(|e| UrlValidationError::InvalidUrl(e.to_string()))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(UrlValidationError::UnsupportedScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlValidationError::NoHost);
    }

    Ok(url)
}
