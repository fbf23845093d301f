//! Deterministic placeholder content served when every fetch attempt failed
//! and synthetic fallback is switched on.

use pricewatch_core::SearchResult;

pub const SYNTHETIC_PRICE: f64 = 12_999.0;

const SYNTHETIC_SEARCH_RESULTS: usize = 5;

/// Product page whose `<h1>` and `.price` element every built-in adapter
/// can extract.
#[must_use]
pub fn synthetic_product_page(url: &str) -> String {
    let slug = last_path_segment(url);
    format!(
        "<!DOCTYPE html><html><head><title>Mock Product - {slug}</title></head>\
         <body><h1>Mock Product - {slug}</h1>\
         <span class=\"price\">{SYNTHETIC_PRICE:.2}</span></body></html>"
    )
}

/// Up to five placeholder results: prices step by 100 from 999.99 and every
/// other result is on sale with an original price 200 higher.
#[must_use]
pub fn synthetic_search_results(home_url: &str, query: &str, limit: usize) -> Vec<SearchResult> {
    let base = home_url.trim_end_matches('/');
    let title = title_case(query.trim());

    (0..SYNTHETIC_SEARCH_RESULTS.min(limit))
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let price = 999.99 + (i as f64) * 100.0;
            let on_sale = i % 2 == 0;
            SearchResult {
                name: format!("{title} - Product {}", i + 1),
                price,
                url: format!("{base}/mock-product-{}", i + 1),
                image_url: Some(format!("{base}/mock-image-{}.jpg", i + 1)),
                is_on_sale: on_sale,
                original_price: on_sale.then_some(price + 200.0),
            }
        })
        .collect()
}

fn last_path_segment(url: &str) -> String {
    let path = reqwest::Url::parse(url).map_or_else(
        |_| url.to_owned(),
        |u| u.path().to_owned(),
    );
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_owned()
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
