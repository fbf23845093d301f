//! Promotional status heuristics.

use crate::price::parse_price;

/// Keywords that mark a badge as a sale indicator, lowercase.
const GENERIC_KEYWORDS: &[&str] = &["sale", "discount"];
const CZECH_KEYWORDS: &[&str] = &["sleva", "akce", "akční"];
const POLISH_KEYWORDS: &[&str] = &["promocja", "obniżka"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Czech,
    Polish,
    Generic,
}

impl Locale {
    /// Sale keywords for this locale, generic ones included.
    #[must_use]
    pub fn sale_keywords(self) -> Vec<&'static str> {
        let local = match self {
            Locale::Czech => CZECH_KEYWORDS,
            Locale::Polish => POLISH_KEYWORDS,
            Locale::Generic => &[],
        };
        GENERIC_KEYWORDS.iter().chain(local).copied().collect()
    }

    /// `Accept-Language` value sent with requests for this locale.
    #[must_use]
    pub fn accept_language(self) -> &'static str {
        match self {
            Locale::Czech => "cs-CZ,cs;q=0.9,en;q=0.8",
            Locale::Polish => "pl-PL,pl;q=0.9,en;q=0.8",
            Locale::Generic => "en-US,en;q=0.9",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleStatus {
    pub is_on_sale: bool,
    pub original_price: Option<f64>,
}

impl SaleStatus {
    pub const NOT_ON_SALE: SaleStatus = SaleStatus {
        is_on_sale: false,
        original_price: None,
    };
}

/// Classifies a page or search result as on sale.
///
/// `struck_texts` are candidate struck-through price texts in rule order; the
/// first one that parses to a positive price wins and becomes the original
/// price. Otherwise any badge text containing a sale keyword marks the item
/// as on sale without an original price.
#[must_use]
pub fn detect_sale<S, B>(struck_texts: S, badge_texts: B, locale: Locale) -> SaleStatus
where
    S: IntoIterator,
    S::Item: AsRef<str>,
    B: IntoIterator,
    B::Item: AsRef<str>,
{
    let struck = struck_texts
        .into_iter()
        .find_map(|t| parse_price(t.as_ref()).filter(|p| p.is_finite() && *p > 0.0));
    if let Some(original) = struck {
        return SaleStatus {
            is_on_sale: true,
            original_price: Some(original),
        };
    }

    let keywords = locale.sale_keywords();
    let badge_hit = badge_texts.into_iter().any(|t| {
        let lower = t.as_ref().to_lowercase();
        keywords.iter().any(|k| lower.contains(k))
    });

    if badge_hit {
        SaleStatus {
            is_on_sale: true,
            original_price: None,
        }
    } else {
        SaleStatus::NOT_ON_SALE
    }
}
