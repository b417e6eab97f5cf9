//! Provider error types.

use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Why an adapter could not produce a field.
///
/// None of these escape the fusion engine; they decide whether the provider is
/// put into cooldown and are recorded in the attempt trail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// The request is outside what the provider covers, or it is misconfigured.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Upstream refused the request due to its quota.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network or upstream failure.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// Upstream answered but the body could not be decoded.
    #[error("invalid provider response: {0}")]
    Parse(String),

    /// The adapter exists but has no working integration yet.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

/// Substrings that mark an upstream message as a quota rejection.
const RATE_LIMIT_MARKERS: [&str; 4] = ["429", "rate", "limit", "exceeded"];

impl ProviderError {
    /// Whether this failure should put the provider into cooldown.
    ///
    /// True for [`ProviderError::RateLimited`] and for any error whose message
    /// mentions a quota (`429`, "rate", "limit", "exceeded"), since upstreams
    /// often report quota problems through generic error bodies.
    pub fn is_rate_limited(&self) -> bool {
        if matches!(self, ProviderError::RateLimited(_)) {
            return true;
        }
        let message = self.to_string().to_lowercase();
        RATE_LIMIT_MARKERS.iter().any(|m| message.contains(m))
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Unavailable(_) => "unavailable",
            ProviderError::RateLimited(_) => "rate_limited",
            ProviderError::FetchFailed(_) => "fetch_failed",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Parse(_) => "parse",
            ProviderError::NotImplemented(_) => "not_implemented",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // Query strings are long and say nothing useful about the failure
        let err = err.without_url();
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::FetchFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_classification() {
        assert!(ProviderError::RateLimited("slow down".into()).is_rate_limited());
        assert!(ProviderError::FetchFailed("HTTP 429 Too Many Requests".into()).is_rate_limited());
        assert!(ProviderError::FetchFailed("Daily API request LIMIT EXCEEDED".into()).is_rate_limited());
        assert!(!ProviderError::FetchFailed("HTTP 503 Service Unavailable".into()).is_rate_limited());
        assert!(!ProviderError::Timeout("after 30s".into()).is_rate_limited());
    }

    #[test]
    fn test_stub_errors_are_not_rate_limits() {
        let icon = ProviderError::NotImplemented("ICON GRIB2 decoding is not available".into());
        let era5 = ProviderError::NotImplemented("ERA5 CDS job submission is not available".into());
        assert!(!icon.is_rate_limited());
        assert!(!era5.is_rate_limited());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ProviderError::Parse("x".into()).kind(), "parse");
        assert_eq!(ProviderError::NotImplemented("x".into()).kind(), "not_implemented");
    }
}
