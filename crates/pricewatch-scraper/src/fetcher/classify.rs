//! Mapping transport failures and HTTP statuses onto [`NetworkErrorKind`].

use std::error::Error as _;

use reqwest::StatusCode;

use crate::error::{NetworkError, NetworkErrorKind};

const DNS_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
];

pub(crate) fn from_status(url: &str, status: StatusCode) -> NetworkError {
    let kind = if status == StatusCode::FORBIDDEN {
        NetworkErrorKind::Forbidden
    } else if status == StatusCode::REQUEST_TIMEOUT || status == StatusCode::GATEWAY_TIMEOUT {
        NetworkErrorKind::Timeout
    } else {
        NetworkErrorKind::Other
    };

    NetworkError {
        kind,
        url: url.to_owned(),
        status: Some(status.as_u16()),
        message: format!("unexpected HTTP status {status}"),
    }
}

pub(crate) fn from_reqwest(url: &str, err: &reqwest::Error) -> NetworkError {
    let message = error_chain(err);
    let kind = if err.is_timeout() {
        NetworkErrorKind::Timeout
    } else if err.status() == Some(StatusCode::FORBIDDEN) {
        NetworkErrorKind::Forbidden
    } else if is_dns_failure(&message) {
        NetworkErrorKind::DnsFailure
    } else {
        NetworkErrorKind::Other
    };

    NetworkError {
        kind,
        url: url.to_owned(),
        status: err.status().map(|s| s.as_u16()),
        message,
    }
}

/// `err` and all of its sources joined with `": "`.
fn error_chain(err: &reqwest::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

fn is_dns_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    DNS_MARKERS.iter().any(|m| lower.contains(m))
}
