//! Per-site request header sets.

use std::collections::BTreeMap;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};

use crate::adapters::SiteAdapter;
use crate::error::ScraperError;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Everything the fetcher needs to look like a browser visiting one site.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub site: String,
    pub home_url: String,
    pub headers: HeaderMap,
}

impl SiteContext {
    /// Builds the default header set for `adapter`, then applies `overrides`
    /// key by key.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidHeader`] when an override name or value
    /// is not a legal HTTP header.
    pub fn for_adapter(
        adapter: &dyn SiteAdapter,
        overrides: Option<&BTreeMap<String, String>>,
    ) -> Result<Self, ScraperError> {
        let site = adapter.site_id();
        let home_url = adapter.home_url();
        let invalid = |name: &str, reason: String| ScraperError::InvalidHeader {
            site: site.to_owned(),
            name: name.to_owned(),
            reason,
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(adapter.locale().accept_language()),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
        headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
        headers.insert(
            REFERER,
            HeaderValue::from_str(home_url).map_err(|e| invalid("referer", e.to_string()))?,
        );

        for (name, value) in overrides.into_iter().flatten() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid(name, e.to_string()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| invalid(name, e.to_string()))?;
            headers.insert(header_name, header_value);
        }

        Ok(Self {
            site: site.to_owned(),
            home_url: home_url.to_owned(),
            headers,
        })
    }
}
