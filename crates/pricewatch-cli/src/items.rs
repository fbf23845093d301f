//! Item command handlers: on-demand checks, search, and tracking.

use pricewatch_core::{NewTrackedItem, PersistenceError, TrackedItem, TrackingAdmin};
use pricewatch_scraper::{CheckError, CheckedItem, PriceScraper};

use crate::output::{fmt_price, truncate, Output};

fn user_error(err: &CheckError) -> anyhow::Error {
    tracing::debug!(error = %err, "check failed");
    anyhow::anyhow!("{}", err.user_message())
}

fn sale_label(is_on_sale: bool, original_price: Option<f64>) -> String {
    match (is_on_sale, original_price) {
        (true, Some(original)) => format!("sale (was {original:.2})"),
        (true, None) => "sale".to_string(),
        (false, _) => String::new(),
    }
}

/// Fetch and print one product without storing anything.
///
/// # Errors
///
/// Returns the user-facing message of the check failure.
pub(crate) async fn run_check(scraper: &PriceScraper, url: &str, out: Output) -> anyhow::Result<()> {
    let checked = scraper.check_url(url).await.map_err(|e| user_error(&e))?;
    out.emit(&checked, || print_checked(&checked))
}

fn print_checked(checked: &CheckedItem) {
    println!("{}", checked.item.name);
    println!("  site:  {}", checked.site);
    println!("  price: {:.2}", checked.item.price);
    let sale = sale_label(checked.item.is_on_sale, checked.item.original_price);
    if !sale.is_empty() {
        println!("  {sale}");
    }
    if checked.synthetic {
        println!("  (placeholder data: the shop could not be reached)");
    }
}

/// # Errors
///
/// Returns the user-facing message of the search failure.
pub(crate) async fn run_search(
    scraper: &PriceScraper,
    site: &str,
    query: &str,
    limit: usize,
    out: Output,
) -> anyhow::Result<()> {
    let results = scraper
        .search(site, query, limit)
        .await
        .map_err(|e| user_error(&e))?;

    out.emit(&results, || {
        if results.is_empty() {
            println!("no results for \"{query}\" on {site}");
            return;
        }
        println!("{:>10}  {:<20}  {:<48}URL", "PRICE", "SALE", "NAME");
        for r in &results {
            println!(
                "{:>10.2}  {:<20}  {:<48}{}",
                r.price,
                sale_label(r.is_on_sale, r.original_price),
                truncate(&r.name, 45),
                r.url
            );
        }
    })
}

/// Stores a checked product as a new tracked item with its first observation.
///
/// # Errors
///
/// Fails when the URL is already tracked or the write fails.
pub(crate) async fn track_checked(
    admin: &dyn TrackingAdmin,
    checked: &CheckedItem,
) -> anyhow::Result<TrackedItem> {
    if let Some(existing) = admin.find_by_url(&checked.url).await? {
        anyhow::bail!(
            "{} is already tracked as item {}",
            checked.url,
            existing.id
        );
    }
    if checked.synthetic {
        tracing::warn!(url = %checked.url, "tracking item from placeholder data");
    }

    let new_item = NewTrackedItem {
        source_url: checked.url.clone(),
        site: checked.site.clone(),
        display_name: checked.item.name.clone(),
        price: checked.item.price,
        is_on_sale: checked.item.is_on_sale,
        original_price: checked.item.original_price,
    };
    match admin.create_item(&new_item).await {
        Ok(item) => Ok(item),
        Err(PersistenceError::Duplicate(url)) => anyhow::bail!("{url} is already tracked"),
        Err(e) => Err(e.into()),
    }
}

/// # Errors
///
/// Fails when the check fails, the URL is already tracked, or the write fails.
pub(crate) async fn run_track(
    scraper: &PriceScraper,
    admin: &dyn TrackingAdmin,
    url: &str,
    out: Output,
) -> anyhow::Result<()> {
    let checked = scraper.check_url(url).await.map_err(|e| user_error(&e))?;
    let item = track_checked(admin, &checked).await?;
    out.emit(&item, || {
        println!(
            "tracking item {}: {} at {}",
            item.id,
            item.display_name,
            fmt_price(item.last_known_price)
        );
    })
}

/// # Errors
///
/// Fails when the item does not exist or the write fails.
pub(crate) async fn run_untrack(
    admin: &dyn TrackingAdmin,
    id: i64,
    out: Output,
) -> anyhow::Result<()> {
    admin.set_tracked(id, false).await?;
    out.emit(&serde_json::json!({ "id": id, "is_tracked": false }), || {
        println!("item {id} is no longer tracked");
    })
}

/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_list(admin: &dyn TrackingAdmin, out: Output) -> anyhow::Result<()> {
    let items = admin.list_items().await?;
    out.emit(&items, || {
        if items.is_empty() {
            println!("no items; add one with `pricewatch track <url>`");
            return;
        }
        println!(
            "{:<6}{:<9}{:>11}  {:<20}{:<16}{:<17}NAME",
            "ID", "SITE", "PRICE", "SALE", "ALERT", "LAST CHECK"
        );
        for item in &items {
            println!(
                "{:<6}{:<9}{:>11}  {:<20}{:<16}{:<17}{}",
                item.id,
                item.site,
                fmt_price(item.last_known_price),
                sale_label(item.is_on_sale, item.original_price),
                alert_label(item),
                item.last_check_at.format("%Y-%m-%d %H:%M"),
                truncate(&item.display_name, 40)
            );
        }
    })
}

pub(crate) fn alert_label(item: &TrackedItem) -> String {
    let mut label = match item.alert_threshold {
        Some(threshold) if item.alert_triggered => format!("<= {threshold:.2} !"),
        Some(threshold) => format!("<= {threshold:.2}"),
        None => String::new(),
    };
    if !item.is_tracked {
        label.push_str(" (off)");
    }
    label
}

/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_history(
    admin: &dyn TrackingAdmin,
    id: i64,
    out: Output,
) -> anyhow::Result<()> {
    let observations = admin.list_observations(id).await?;
    out.emit(&observations, || {
        if observations.is_empty() {
            println!("no price history for item {id}");
            return;
        }
        println!("{:<22}{:>11}  SALE", "OBSERVED", "PRICE");
        for o in &observations {
            println!(
                "{:<22}{:>11.2}  {}",
                o.observed_at.format("%Y-%m-%d %H:%M:%S"),
                o.price,
                sale_label(o.is_on_sale, o.original_price)
            );
        }
    })
}
