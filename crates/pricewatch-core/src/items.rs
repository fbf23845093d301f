//! Domain types shared by the scraper, the sweep engine and the repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored product page and its current price/alert state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedItem {
    pub id: i64,
    /// Unique product page URL.
    pub source_url: String,
    /// Registry key of the adapter that extracts this page, e.g. `"alza"`.
    pub site: String,
    pub display_name: String,
    pub last_known_price: Option<f64>,
    pub last_check_at: DateTime<Utc>,
    pub is_on_sale: bool,
    pub original_price: Option<f64>,
    pub is_tracked: bool,
    pub alert_threshold: Option<f64>,
    /// One-way latch: set by a sweep when the price first meets the
    /// threshold, reset only by an explicit clear.
    pub alert_triggered: bool,
}

impl TrackedItem {
    /// Applies a fresh extraction to the price/status fields and bumps the
    /// last-check timestamp. The timestamp never moves backwards.
    pub fn record_check(&mut self, item: &ExtractedItem, now: DateTime<Utc>) {
        self.last_known_price = Some(item.price);
        self.is_on_sale = item.is_on_sale;
        self.original_price = item.original_price;
        self.last_check_at = self.last_check_at.max(now);
    }

    /// Returns `true` when a threshold is set and the latch is still open.
    #[must_use]
    pub fn alert_armed(&self) -> bool {
        self.alert_threshold.is_some() && !self.alert_triggered
    }
}

/// One append-only history record for a [`TrackedItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub id: i64,
    pub item_id: i64,
    pub price: f64,
    pub observed_at: DateTime<Utc>,
    pub is_on_sale: bool,
    pub original_price: Option<f64>,
}

/// Payload for appending a [`PriceObservation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewObservation {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
    pub is_on_sale: bool,
    pub original_price: Option<f64>,
}

impl NewObservation {
    #[must_use]
    pub fn from_extracted(item: &ExtractedItem, observed_at: DateTime<Utc>) -> Self {
        Self {
            price: item.price,
            observed_at,
            is_on_sale: item.is_on_sale,
            original_price: item.original_price,
        }
    }
}

/// Payload for registering a new [`TrackedItem`] after its first check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrackedItem {
    pub source_url: String,
    pub site: String,
    pub display_name: String,
    pub price: f64,
    pub is_on_sale: bool,
    pub original_price: Option<f64>,
}

/// Normalized result of extracting a single product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub name: String,
    pub price: f64,
    pub is_on_sale: bool,
    /// Pre-discount price, when a struck-through price was found.
    pub original_price: Option<f64>,
}

/// One entry of a site search listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub price: f64,
    pub url: String,
    pub image_url: Option<String>,
    pub is_on_sale: bool,
    pub original_price: Option<f64>,
}
