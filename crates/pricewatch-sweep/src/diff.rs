//! Decides whether a fresh check warrants a new history record.

use pricewatch_core::{ExtractedItem, PriceObservation, TrackedItem};

// Extracted prices carry at most two decimals.
const PRICE_TOLERANCE: f64 = 0.001;

/// Returns `true` when `{price, is_on_sale}` differs from the latest
/// observation, or from the item's stored state when it has no history.
///
/// An item with neither history nor a stored price always counts as changed.
#[must_use]
pub fn price_changed(
    latest: Option<&PriceObservation>,
    item: &TrackedItem,
    fresh: &ExtractedItem,
) -> bool {
    let baseline = match latest {
        Some(observation) => Some((observation.price, observation.is_on_sale)),
        None => item.last_known_price.map(|price| (price, item.is_on_sale)),
    };

    match baseline {
        Some((price, is_on_sale)) => {
            (price - fresh.price).abs() > PRICE_TOLERANCE || is_on_sale != fresh.is_on_sale
        }
        None => true,
    }
}
