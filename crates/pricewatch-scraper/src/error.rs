use std::fmt;

use thiserror::Error;

/// Construction-time failures: bad adapter rules or HTTP client setup.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid selector \"{selector}\" for site {site}: {reason}")]
    InvalidSelector {
        site: String,
        selector: String,
        reason: String,
    },

    #[error("invalid URL \"{url}\" for site {site}: {reason}")]
    InvalidSiteUrl {
        site: String,
        url: String,
        reason: String,
    },

    #[error("invalid header {name} for site {site}: {reason}")]
    InvalidHeader {
        site: String,
        name: String,
        reason: String,
    },

    #[error("site {0} is registered twice")]
    DuplicateSite(String),
}

/// Terminal classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Forbidden,
    DnsFailure,
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkErrorKind::Timeout => write!(f, "timeout"),
            NetworkErrorKind::Forbidden => write!(f, "forbidden"),
            NetworkErrorKind::DnsFailure => write!(f, "dns failure"),
            NetworkErrorKind::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind} fetching {url}: {message}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    pub url: String,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    pub message: String,
}

impl NetworkError {
    /// `404` and `410` mean the page is gone; retrying cannot help.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        !matches!(self.status, Some(404 | 410))
    }
}

/// Failure to turn a fetched page into an item. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no price found on page")]
    MissingPrice,

    #[error("no product name found on page")]
    MissingName,

    #[error("unsupported site: {0}")]
    UnsupportedSite(String),
}

/// Outcome of an on-demand check or a sweep fetch of a single item.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The shop could not be reached and only synthetic content was returned.
    #[error("{url}: only placeholder data is available")]
    Placeholder { url: String },
}

impl CheckError {
    /// Text suitable for showing to an end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CheckError::Extraction(ExtractionError::UnsupportedSite(host)) => format!(
                "{host} is not a supported shop. Supported sites: alza.cz, smarty.cz, allegro.pl."
            ),
            CheckError::Extraction(_) => {
                "Could not read the product. The page layout may have changed or the item is unavailable."
                    .to_string()
            }
            CheckError::Network(e) => match e.kind {
                NetworkErrorKind::Forbidden => {
                    "The shop refused the request (HTTP 403). It may be blocking automated access; \
                     wait a while before retrying, or enable synthetic fallback for testing."
                        .to_string()
                }
                NetworkErrorKind::Timeout => {
                    "The shop took too long to respond. Please try again in a few moments."
                        .to_string()
                }
                NetworkErrorKind::DnsFailure => {
                    "The shop's address could not be resolved. Check your internet connection."
                        .to_string()
                }
                NetworkErrorKind::Other => match e.status {
                    Some(status) => format!("Unable to load the product page: HTTP {status}."),
                    None => "Unable to reach the shop. Please try again later.".to_string(),
                },
            },
            CheckError::InvalidUrl { url, .. } => format!("\"{url}\" is not a valid URL."),
            CheckError::Placeholder { .. } => {
                "The shop could not be reached; only placeholder data is available.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(kind: NetworkErrorKind, status: Option<u16>) -> NetworkError {
        NetworkError {
            kind,
            url: "https://www.alza.cz/x".to_string(),
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn gone_pages_are_not_retriable() {
        assert!(!network(NetworkErrorKind::Other, Some(404)).is_retriable());
        assert!(!network(NetworkErrorKind::Other, Some(410)).is_retriable());
        assert!(network(NetworkErrorKind::Other, Some(500)).is_retriable());
        assert!(network(NetworkErrorKind::Forbidden, Some(403)).is_retriable());
        assert!(network(NetworkErrorKind::Timeout, None).is_retriable());
    }

    #[test]
    fn extraction_message_mentions_layout() {
        let msg = CheckError::from(ExtractionError::MissingPrice).user_message();
        assert!(msg.contains("layout may have changed"), "{msg}");
    }

    #[test]
    fn forbidden_message_gives_guidance() {
        let msg = CheckError::from(network(NetworkErrorKind::Forbidden, Some(403))).user_message();
        assert!(msg.contains("automated access"), "{msg}");
    }

    #[test]
    fn display_includes_kind_and_url() {
        let rendered = network(NetworkErrorKind::Timeout, None).to_string();
        assert_eq!(rendered, "timeout fetching https://www.alza.cz/x: boom");
    }
}
