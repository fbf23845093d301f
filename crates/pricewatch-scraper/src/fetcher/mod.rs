//! Resilient page fetching: browser-like headers, a per-fetcher cookie jar,
//! bounded retries with jittered exponential backoff, and optional synthetic
//! fallback content.

mod backoff;
mod classify;
mod delay;
mod headers;
mod retry;
mod synthetic;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use pricewatch_core::AppConfig;

use crate::error::{NetworkError, ScraperError};

pub use backoff::{BackoffPolicy, JITTER_MAX, JITTER_MIN};
pub use delay::{Delay, RecordingDelay, TokioDelay};
pub use headers::SiteContext;
pub use synthetic::{synthetic_product_page, synthetic_search_results, SYNTHETIC_PRICE};

/// Tuning knobs for [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Total attempts per fetch, including the first.
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
    /// Upper bound of the random pause before the first attempt.
    pub initial_jitter: Duration,
    pub synthetic_fallback: bool,
}

impl FetcherConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            connect_timeout: Duration::from_secs(10),
            user_agent: config.user_agent.clone(),
            max_attempts: config.max_retries,
            backoff: BackoffPolicy::new(Duration::from_millis(config.retry_backoff_base_ms)),
            initial_jitter: Duration::from_millis(config.initial_jitter_ms),
            synthetic_fallback: config.synthetic_fallback_enabled,
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: pricewatch_core::config::DEFAULT_USER_AGENT.to_owned(),
            max_attempts: 3,
            backoff: BackoffPolicy::new(Duration::from_secs(2)),
            initial_jitter: Duration::from_millis(500),
            synthetic_fallback: false,
        }
    }
}

/// Body of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
    /// `true` when the body is placeholder content, not the real page.
    pub synthetic: bool,
}

/// HTTP fetcher with retry, backoff and cookie persistence.
///
/// The cookie jar belongs to this fetcher alone; clones share it.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
    delay: Arc<dyn Delay>,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Fetcher {
    /// Builds a fetcher that sleeps on the Tokio timer.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: FetcherConfig) -> Result<Self, ScraperError> {
        Self::with_delay(config, Arc::new(TokioDelay))
    }

    /// Builds a fetcher that waits through `delay` between attempts.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_delay(config: FetcherConfig, delay: Arc<dyn Delay>) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            config,
            delay,
        })
    }

    #[must_use]
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    #[must_use]
    pub fn synthetic_fallback_enabled(&self) -> bool {
        self.config.synthetic_fallback
    }

    /// Fetches a product page, substituting [`synthetic_product_page`] when
    /// every attempt failed and synthetic fallback is enabled.
    ///
    /// # Errors
    ///
    /// Returns the classified [`NetworkError`] of the final attempt.
    pub async fn fetch(&self, url: &str, site: &SiteContext) -> Result<FetchedPage, NetworkError> {
        match self.try_fetch(url, site).await {
            Ok(page) => Ok(page),
            Err(err) if self.config.synthetic_fallback => {
                tracing::warn!(
                    url,
                    site = %site.site,
                    error = %err,
                    "fetch: all attempts failed, serving synthetic product page"
                );
                Ok(FetchedPage {
                    url: url.to_owned(),
                    body: synthetic_product_page(url),
                    synthetic: true,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Fetches `url` with retries and no fallback.
    ///
    /// # Errors
    ///
    /// Returns the classified [`NetworkError`] of the final attempt.
    pub async fn try_fetch(
        &self,
        url: &str,
        site: &SiteContext,
    ) -> Result<FetchedPage, NetworkError> {
        self.initial_pause().await;

        let body = retry::retry_with_backoff(
            self.config.max_attempts,
            self.config.backoff,
            self.delay.as_ref(),
            |attempt| self.attempt(url, site, attempt),
        )
        .await?;

        Ok(FetchedPage {
            url: url.to_owned(),
            body,
            synthetic: false,
        })
    }

    async fn initial_pause(&self) {
        #[allow(clippy::cast_possible_truncation)]
        let bound_ms = self.config.initial_jitter.as_millis() as u64;
        if bound_ms == 0 {
            return;
        }
        let pause = Duration::from_millis(rand::random_range(0..=bound_ms));
        self.delay.sleep(pause).await;
    }

    async fn attempt(
        &self,
        url: &str,
        site: &SiteContext,
        attempt: u32,
    ) -> Result<String, NetworkError> {
        tracing::debug!(url, site = %site.site, attempt, "fetch: sending request");

        let response = self
            .client
            .get(url)
            .headers(site.headers.clone())
            .send()
            .await
            .map_err(|e| classify::from_reqwest(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify::from_status(url, status));
        }

        response
            .text()
            .await
            .map_err(|e| classify::from_reqwest(url, &e))
    }
}
