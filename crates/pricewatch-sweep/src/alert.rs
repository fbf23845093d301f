use pricewatch_core::TrackedItem;

/// Returns `true` when `price` should latch the item's alert: a threshold is
/// set, the latch is still open, and the price is at or below the threshold.
#[must_use]
pub fn should_trigger(item: &TrackedItem, price: f64) -> bool {
    item.alert_armed() && item.alert_threshold.is_some_and(|threshold| price <= threshold)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(threshold: Option<f64>, triggered: bool) -> TrackedItem {
        TrackedItem {
            id: 1,
            source_url: "https://allegro.pl/oferta/1".to_string(),
            site: "allegro".to_string(),
            display_name: "Kabel".to_string(),
            last_known_price: Some(1000.0),
            last_check_at: Utc::now(),
            is_on_sale: false,
            original_price: None,
            is_tracked: true,
            alert_threshold: threshold,
            alert_triggered: triggered,
        }
    }

    #[test]
    fn triggers_at_or_below_threshold() {
        assert!(should_trigger(&item(Some(900.0), false), 850.0));
        assert!(should_trigger(&item(Some(900.0), false), 900.0));
        assert!(!should_trigger(&item(Some(900.0), false), 950.0));
    }

    #[test]
    fn latched_or_unset_never_triggers() {
        assert!(!should_trigger(&item(Some(900.0), true), 100.0));
        assert!(!should_trigger(&item(None, false), 100.0));
    }
}
