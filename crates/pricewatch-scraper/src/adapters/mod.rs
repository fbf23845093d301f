//! Site adapters: per-shop extraction strategies behind one trait.
//!
//! Built-in shops are described declaratively by a [`SiteProfile`] (ordered
//! CSS rules per field) and compiled into a [`ProfileAdapter`]. Selectors are
//! parsed once, when the adapter is built.

mod alza;
mod allegro;
mod rules;
mod smarty;

use scraper::{ElementRef, Html, Selector};

use pricewatch_core::{ExtractedItem, SearchResult};

use crate::error::{ExtractionError, ScraperError};
use crate::sale::{detect_sale, Locale};

use rules::{compile_rules, compile_selector, first_per_rule, first_price, first_text, CompiledRule};

pub use rules::{text_rules, Extract, FieldRule};

/// Extraction strategy for one shop.
pub trait SiteAdapter: Send + Sync {
    /// Registry key, e.g. `"alza"`.
    fn site_id(&self) -> &str;

    /// Shop home page; used as `Referer` and to resolve relative links.
    fn home_url(&self) -> &str;

    fn locale(&self) -> Locale;

    /// Returns `true` when this adapter handles pages served from `host`.
    fn matches_host(&self, host: &str) -> bool;

    /// Extracts the normalized item from a product page.
    ///
    /// # Errors
    ///
    /// [`ExtractionError::MissingName`] or [`ExtractionError::MissingPrice`]
    /// when no rule for that field produced a usable value.
    fn extract_item(&self, page: &Html) -> Result<ExtractedItem, ExtractionError>;

    /// URL of the shop's search listing for `query`.
    fn search_url(&self, query: &str) -> String;

    /// Parses up to `limit` results from a search listing page.
    fn parse_search(&self, page: &Html, limit: usize) -> Vec<SearchResult>;
}

/// Declarative description of a shop's markup.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub site_id: String,
    pub home_url: String,
    pub locale: Locale,
    /// Hosts equal to this suffix, or ending in `.{suffix}`, belong to the site.
    pub host_suffix: String,
    pub name: Vec<FieldRule>,
    pub price: Vec<FieldRule>,
    pub struck_price: Vec<FieldRule>,
    pub sale_badge: Vec<FieldRule>,
    pub search: SearchProfile,
}

#[derive(Debug, Clone)]
pub struct SearchProfile {
    /// Path of the search page, joined onto the home URL.
    pub path: String,
    /// Query-string parameter that carries the search text.
    pub query_param: String,
    /// Result-box selectors; the first one matching anything is used.
    pub result_box: Vec<&'static str>,
    /// Anchor selectors; the anchor supplies both the name and the link.
    pub name_link: Vec<&'static str>,
    pub price: Vec<FieldRule>,
    pub struck_price: Vec<FieldRule>,
    pub sale_badge: Vec<FieldRule>,
    pub image: Vec<&'static str>,
}

/// Built-in shop profiles.
#[must_use]
pub fn default_profiles() -> Vec<SiteProfile> {
    vec![alza::profile(), smarty::profile(), allegro::profile()]
}

/// A [`SiteAdapter`] compiled from a [`SiteProfile`].
#[derive(Debug)]
pub struct ProfileAdapter {
    site_id: String,
    home_url: reqwest::Url,
    home_url_raw: String,
    locale: Locale,
    host_suffix: String,
    name: Vec<CompiledRule>,
    price: Vec<CompiledRule>,
    struck_price: Vec<CompiledRule>,
    sale_badge: Vec<CompiledRule>,
    search: CompiledSearch,
}

#[derive(Debug)]
struct CompiledSearch {
    url: reqwest::Url,
    query_param: String,
    result_box: Vec<Selector>,
    name_link: Vec<Selector>,
    price: Vec<CompiledRule>,
    struck_price: Vec<CompiledRule>,
    sale_badge: Vec<CompiledRule>,
    image: Vec<Selector>,
}

impl ProfileAdapter {
    /// Compiles every selector in `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] for a selector that does not
    /// parse, or [`ScraperError::InvalidSiteUrl`] when the home URL or search
    /// path is not a valid URL.
    pub fn new(profile: SiteProfile) -> Result<Self, ScraperError> {
        let site = profile.site_id.as_str();
        let invalid_url = |url: &str, e: &dyn std::fmt::Display| ScraperError::InvalidSiteUrl {
            site: site.to_owned(),
            url: url.to_owned(),
            reason: e.to_string(),
        };

        let home_url =
            reqwest::Url::parse(&profile.home_url).map_err(|e| invalid_url(&profile.home_url, &e))?;
        let search_url = home_url
            .join(&profile.search.path)
            .map_err(|e| invalid_url(&profile.search.path, &e))?;

        let selectors = |list: &[&'static str]| -> Result<Vec<Selector>, ScraperError> {
            list.iter().map(|s| compile_selector(site, s)).collect()
        };

        let search = CompiledSearch {
            url: search_url,
            query_param: profile.search.query_param.clone(),
            result_box: selectors(&profile.search.result_box)?,
            name_link: selectors(&profile.search.name_link)?,
            price: compile_rules(site, &profile.search.price)?,
            struck_price: compile_rules(site, &profile.search.struck_price)?,
            sale_badge: compile_rules(site, &profile.search.sale_badge)?,
            image: selectors(&profile.search.image)?,
        };

        Ok(Self {
            name: compile_rules(site, &profile.name)?,
            price: compile_rules(site, &profile.price)?,
            struck_price: compile_rules(site, &profile.struck_price)?,
            sale_badge: compile_rules(site, &profile.sale_badge)?,
            search,
            home_url,
            home_url_raw: profile.home_url,
            locale: profile.locale,
            host_suffix: profile.host_suffix.to_ascii_lowercase(),
            site_id: profile.site_id,
        })
    }

    fn parse_result_box(&self, item: ElementRef<'_>) -> Option<SearchResult> {
        let link = self
            .search
            .name_link
            .iter()
            .find_map(|sel| item.select(sel).find(|a| a.value().attr("href").is_some()))?;
        let name = rules::element_text(link);
        if name.is_empty() {
            return None;
        }
        let href = link.value().attr("href")?;
        let url = self.home_url.join(href.trim()).ok()?.to_string();

        let price = first_price(&self.search.price, item)?;

        let image_url = self
            .search
            .image
            .iter()
            .find_map(|sel| item.select(sel).next())
            .and_then(|img| {
                ["src", "data-src"]
                    .into_iter()
                    .filter_map(|attr| img.value().attr(attr))
                    .map(str::trim)
                    .find(|v| !v.is_empty())
            })
            .and_then(|src| self.home_url.join(src).ok())
            .map(|u| u.to_string());

        let sale = detect_sale(
            first_per_rule(&self.search.struck_price, item),
            first_per_rule(&self.search.sale_badge, item),
            self.locale,
        );

        Some(SearchResult {
            name,
            price,
            url,
            image_url,
            is_on_sale: sale.is_on_sale,
            original_price: sale.original_price,
        })
    }
}

impl SiteAdapter for ProfileAdapter {
    fn site_id(&self) -> &str {
        &self.site_id
    }

    fn home_url(&self) -> &str {
        &self.home_url_raw
    }

    fn locale(&self) -> Locale {
        self.locale
    }

    fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.host_suffix
            || host
                .strip_suffix(self.host_suffix.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    fn extract_item(&self, page: &Html) -> Result<ExtractedItem, ExtractionError> {
        let root = page.root_element();
        let name = first_text(&self.name, root).ok_or(ExtractionError::MissingName)?;
        let price = first_price(&self.price, root).ok_or(ExtractionError::MissingPrice)?;
        let sale = detect_sale(
            first_per_rule(&self.struck_price, root),
            first_per_rule(&self.sale_badge, root),
            self.locale,
        );

        Ok(ExtractedItem {
            name,
            price,
            is_on_sale: sale.is_on_sale,
            original_price: sale.original_price,
        })
    }

    fn search_url(&self, query: &str) -> String {
        let mut url = self.search.url.clone();
        url.query_pairs_mut()
            .append_pair(&self.search.query_param, query.trim());
        url.to_string()
    }

    fn parse_search(&self, page: &Html, limit: usize) -> Vec<SearchResult> {
        let Some(boxes) = self
            .search
            .result_box
            .iter()
            .map(|sel| page.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
        else {
            return Vec::new();
        };

        boxes
            .into_iter()
            .filter_map(|item| self.parse_result_box(item))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
#[path = "../adapters_test.rs"]
mod tests;
