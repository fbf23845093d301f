use crate::sale::Locale;

use super::{text_rules, FieldRule, SearchProfile, SiteProfile};

pub(super) fn profile() -> SiteProfile {
    SiteProfile {
        site_id: "smarty".to_string(),
        home_url: "https://www.smarty.cz/".to_string(),
        locale: Locale::Czech,
        host_suffix: "smarty.cz".to_string(),
        name: vec![FieldRule::text("h1")],
        price: text_rules(&[
            ".price-final",
            ".price-current",
            ".product-price",
            "[class*='price']",
        ]),
        struck_price: text_rules(&[
            ".price-old",
            ".price-original",
            "[class*='old-price']",
            "[class*='original-price']",
            "del",
            "s",
        ]),
        sale_badge: text_rules(&[
            ".badge-sale",
            ".label-sale",
            "[class*='sale']",
            "[class*='sleva']",
        ]),
        search: SearchProfile {
            path: "/search.html".to_string(),
            query_param: "q".to_string(),
            result_box: vec![".product-item", ".product", "[class*='product-box']"],
            name_link: vec!["a[class*='name']", ".product-name a", "h3 a", "h2 a"],
            price: text_rules(&[".price-final", "[class*='price']"]),
            struck_price: text_rules(&["[class*='old']", "[class*='original']", "del", "s"]),
            sale_badge: text_rules(&["[class*='sale']", "[class*='sleva']"]),
            image: vec!["img"],
        },
    }
}
