use crate::sale::Locale;

use super::{text_rules, FieldRule, SearchProfile, SiteProfile};

pub(super) fn profile() -> SiteProfile {
    SiteProfile {
        site_id: "allegro".to_string(),
        home_url: "https://allegro.pl/".to_string(),
        locale: Locale::Polish,
        host_suffix: "allegro.pl".to_string(),
        name: vec![FieldRule::text("h1")],
        price: vec![
            FieldRule::text("[data-role='price']"),
            FieldRule::text("[class*='price']"),
            FieldRule::text(".price"),
            FieldRule::attr("meta[property='product:price:amount']", "content"),
        ],
        struck_price: text_rules(&[
            "[data-role='old-price']",
            ".price-old",
            "[class*='old-price']",
            "del",
            "s",
        ]),
        sale_badge: text_rules(&[
            "[class*='badge']",
            "[class*='promocja']",
            "[class*='sale']",
            "[class*='discount']",
        ]),
        search: SearchProfile {
            path: "/listing".to_string(),
            query_param: "string".to_string(),
            result_box: vec!["[data-role='offer']", "article", "[class*='offer-item']"],
            name_link: vec!["a[class*='name']", "h2 a", "h3 a"],
            price: text_rules(&["[data-role='price']", "[class*='price']"]),
            struck_price: text_rules(&["[data-role='old-price']", ".price-old", "del"]),
            sale_badge: text_rules(&["[class*='badge']", "[class*='promocja']"]),
            image: vec!["img"],
        },
    }
}
