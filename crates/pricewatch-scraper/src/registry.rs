use std::sync::Arc;

use crate::adapters::{default_profiles, ProfileAdapter, SiteAdapter};
use crate::error::{ExtractionError, ScraperError};

/// Read-only lookup from URL or site id to a [`SiteAdapter`].
///
/// Built once at startup; lookups never mutate it.
#[derive(Clone, Default)]
pub struct Registry {
    adapters: Vec<Arc<dyn SiteAdapter>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.adapters.iter().map(|a| a.site_id()))
            .finish()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `alza`, `smarty` and `allegro` adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if a built-in profile fails to compile.
    pub fn with_default_sites() -> Result<Self, ScraperError> {
        let mut registry = Self::new();
        for profile in default_profiles() {
            registry.register(Arc::new(ProfileAdapter::new(profile)?))?;
        }
        Ok(registry)
    }

    /// Adds an adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::DuplicateSite`] if the site id is already taken.
    pub fn register(&mut self, adapter: Arc<dyn SiteAdapter>) -> Result<(), ScraperError> {
        if self.get(adapter.site_id()).is_some() {
            return Err(ScraperError::DuplicateSite(adapter.site_id().to_owned()));
        }
        self.adapters.push(adapter);
        Ok(())
    }

    /// Selects the adapter whose host suffix matches the URL's host.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::UnsupportedSite`] for unparseable URLs and
    /// hosts no adapter claims.
    pub fn resolve(&self, url: &str) -> Result<Arc<dyn SiteAdapter>, ExtractionError> {
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .ok_or_else(|| ExtractionError::UnsupportedSite(url.to_owned()))?;

        self.adapters
            .iter()
            .find(|a| a.matches_host(&host))
            .cloned()
            .ok_or(ExtractionError::UnsupportedSite(host))
    }

    #[must_use]
    pub fn get(&self, site_id: &str) -> Option<Arc<dyn SiteAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.site_id().eq_ignore_ascii_case(site_id))
            .cloned()
    }

    /// Registered site ids, in registration order.
    #[must_use]
    pub fn site_ids(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.site_id().to_owned()).collect()
    }
}
