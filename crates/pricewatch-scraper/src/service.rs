//! On-demand item checks and site searches.

use std::collections::HashMap;
use std::sync::Arc;

use scraper::Html;
use serde::Serialize;

use pricewatch_core::{ExtractedItem, SearchResult, SitesFile};

use crate::adapters::SiteAdapter;
use crate::error::{CheckError, ExtractionError, ScraperError};
use crate::fetcher::{synthetic_search_results, Fetcher, SiteContext};
use crate::registry::Registry;

/// Result of checking one product URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedItem {
    pub site: String,
    pub url: String,
    pub item: ExtractedItem,
    /// `true` when the values come from synthetic fallback content.
    pub synthetic: bool,
}

/// Ties the adapter registry to a [`Fetcher`].
///
/// Checks here never touch history or alerts; the sweep engine owns those.
#[derive(Debug, Clone)]
pub struct PriceScraper {
    registry: Registry,
    fetcher: Fetcher,
    contexts: HashMap<String, SiteContext>,
}

impl PriceScraper {
    /// Builds a request context for every registered site, applying header
    /// overrides from `sites` where present.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidHeader`] for an override that is not a
    /// legal HTTP header.
    pub fn new(
        registry: Registry,
        fetcher: Fetcher,
        sites: Option<&SitesFile>,
    ) -> Result<Self, ScraperError> {
        if let Some(file) = sites {
            for site in file.sites.keys() {
                if registry.get(site).is_none() {
                    tracing::warn!(site, "sites file configures an unknown site; ignoring");
                }
            }
        }

        let mut contexts = HashMap::new();
        for site in registry.site_ids() {
            if let Some(adapter) = registry.get(&site) {
                let overrides = sites.and_then(|f| f.headers_for(&site));
                contexts.insert(site, SiteContext::for_adapter(adapter.as_ref(), overrides)?);
            }
        }

        Ok(Self {
            registry,
            fetcher,
            contexts,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Fetches and extracts the product at `url`, choosing the adapter by host.
    ///
    /// # Errors
    ///
    /// - [`CheckError::InvalidUrl`] for anything but an absolute http(s) URL.
    /// - [`CheckError::Extraction`] for unsupported hosts and unreadable pages.
    /// - [`CheckError::Network`] when every fetch attempt failed.
    pub async fn check_url(&self, url: &str) -> Result<CheckedItem, CheckError> {
        let url = validate_url(url)?;
        let adapter = self.registry.resolve(&url)?;
        self.check_with(adapter, &url).await
    }

    /// Like [`check_url`](Self::check_url) but with the adapter chosen by
    /// site id, as stored on a tracked item.
    ///
    /// # Errors
    ///
    /// Same as [`check_url`](Self::check_url).
    pub async fn check_item(&self, site: &str, url: &str) -> Result<CheckedItem, CheckError> {
        let adapter = self
            .registry
            .get(site)
            .ok_or_else(|| ExtractionError::UnsupportedSite(site.to_owned()))?;
        self.check_with(adapter, url).await
    }

    /// Searches `site` for `query`, returning at most `limit` results.
    ///
    /// When the listing cannot be fetched and synthetic fallback is enabled,
    /// placeholder results are returned instead.
    ///
    /// # Errors
    ///
    /// [`ExtractionError::UnsupportedSite`] for an unknown site id, or the
    /// final [`NetworkError`](crate::NetworkError) when fetching failed.
    pub async fn search(
        &self,
        site: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, CheckError> {
        let adapter = self
            .registry
            .get(site)
            .ok_or_else(|| ExtractionError::UnsupportedSite(site.to_owned()))?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = adapter.search_url(query);
        let context = self.context_for(adapter.as_ref())?;

        let page = match self.fetcher.try_fetch(&url, context).await {
            Ok(page) => page,
            Err(err) if self.fetcher.synthetic_fallback_enabled() => {
                tracing::warn!(
                    site = adapter.site_id(),
                    query,
                    error = %err,
                    "search: fetch failed, serving synthetic results"
                );
                return Ok(synthetic_search_results(adapter.home_url(), query, limit));
            }
            Err(err) => return Err(err.into()),
        };

        let results = parse_search(adapter.as_ref(), &page.body, limit);
        tracing::info!(
            site = adapter.site_id(),
            query,
            results = results.len(),
            "search: completed"
        );
        Ok(results)
    }

    async fn check_with(
        &self,
        adapter: Arc<dyn SiteAdapter>,
        url: &str,
    ) -> Result<CheckedItem, CheckError> {
        let context = self.context_for(adapter.as_ref())?;
        let page = self.fetcher.fetch(url, context).await?;
        let item = extract(adapter.as_ref(), &page.body)?;

        tracing::debug!(
            url,
            site = adapter.site_id(),
            price = item.price,
            is_on_sale = item.is_on_sale,
            synthetic = page.synthetic,
            "check: extracted item"
        );

        Ok(CheckedItem {
            site: adapter.site_id().to_owned(),
            url: url.to_owned(),
            item,
            synthetic: page.synthetic,
        })
    }

    fn context_for(&self, adapter: &dyn SiteAdapter) -> Result<&SiteContext, ExtractionError> {
        self.contexts
            .get(adapter.site_id())
            .ok_or_else(|| ExtractionError::UnsupportedSite(adapter.site_id().to_owned()))
    }
}

fn validate_url(raw: &str) -> Result<String, CheckError> {
    let trimmed = raw.trim();
    let parsed = reqwest::Url::parse(trimmed).map_err(|e| CheckError::InvalidUrl {
        url: trimmed.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CheckError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: format!("unsupported scheme \"{}\"", parsed.scheme()),
        });
    }
    Ok(trimmed.to_owned())
}

// `Html` is not `Send`; parsing stays in synchronous helpers so callers'
// futures remain `Send`.
fn extract(adapter: &dyn SiteAdapter, body: &str) -> Result<ExtractedItem, ExtractionError> {
    let page = Html::parse_document(body);
    adapter.extract_item(&page)
}

fn parse_search(adapter: &dyn SiteAdapter, body: &str, limit: usize) -> Vec<SearchResult> {
    let page = Html::parse_document(body);
    adapter.parse_search(&page, limit)
}
