use async_trait::async_trait;
use pricewatch_core::{ExtractedItem, TrackedItem};
use pricewatch_scraper::{CheckError, PriceScraper};

/// Fetches and extracts the current state of one tracked item.
#[async_trait]
pub trait ItemChecker: Send + Sync {
    async fn check(&self, item: &TrackedItem) -> Result<ExtractedItem, CheckError>;
}

/// Synthetic fallback content is rejected: placeholder prices must never
/// reach the history or the alert latch.
#[async_trait]
impl ItemChecker for PriceScraper {
    async fn check(&self, item: &TrackedItem) -> Result<ExtractedItem, CheckError> {
        let checked = self.check_item(&item.site, &item.source_url).await?;
        if checked.synthetic {
            return Err(CheckError::Placeholder { url: checked.url });
        }
        Ok(checked.item)
    }
}
