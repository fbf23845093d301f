use crate::sale::Locale;

use super::{text_rules, FieldRule, SearchProfile, SiteProfile};

pub(super) fn profile() -> SiteProfile {
    SiteProfile {
        site_id: "alza".to_string(),
        home_url: "https://www.alza.cz/".to_string(),
        locale: Locale::Czech,
        host_suffix: "alza.cz".to_string(),
        name: vec![FieldRule::text("h1")],
        price: text_rules(&[".price-box__price", ".price", "[class*='price']"]),
        struck_price: text_rules(&[
            ".price-box__old-price",
            ".old-price",
            "[class*='old-price']",
            "del",
            "s",
        ]),
        sale_badge: text_rules(&[
            ".badge-sale",
            ".sale-badge",
            "[class*='sale']",
            "[class*='discount']",
            "[class*='akce']",
        ]),
        search: SearchProfile {
            path: "/search.htm".to_string(),
            query_param: "extext".to_string(),
            result_box: vec![".browsingitem", "[class*='browsingitem']"],
            name_link: vec!["a.name", ".name a"],
            price: text_rules(&[".price-box__price", ".price"]),
            struck_price: text_rules(&[".price-box__old-price", ".old-price", "del", "s"]),
            sale_badge: text_rules(&["[class*='sale']", "[class*='akce']"]),
            image: vec!["img"],
        },
    }
}
