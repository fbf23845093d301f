//! Ordered CSS extraction rules.

use std::fmt;

use scraper::{ElementRef, Selector};

use crate::error::ScraperError;
use crate::price::parse_price;

/// Which part of a matched element a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    Text,
    Attr(&'static str),
}

/// One extraction rule as declared by a site profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub selector: &'static str,
    pub extract: Extract,
}

impl FieldRule {
    #[must_use]
    pub const fn text(selector: &'static str) -> Self {
        Self {
            selector,
            extract: Extract::Text,
        }
    }

    #[must_use]
    pub const fn attr(selector: &'static str, name: &'static str) -> Self {
        Self {
            selector,
            extract: Extract::Attr(name),
        }
    }
}

impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extract {
            Extract::Text => write!(f, "{}", self.selector),
            Extract::Attr(name) => write!(f, "{}@{name}", self.selector),
        }
    }
}

/// Builds rules that read element text.
#[must_use]
pub fn text_rules(selectors: &[&'static str]) -> Vec<FieldRule> {
    selectors.iter().copied().map(FieldRule::text).collect()
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    selector: Selector,
    extract: Extract,
}

pub(crate) fn compile_selector(site: &str, selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
        site: site.to_owned(),
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn compile_rules(
    site: &str,
    rules: &[FieldRule],
) -> Result<Vec<CompiledRule>, ScraperError> {
    rules
        .iter()
        .map(|rule| {
            Ok(CompiledRule {
                selector: compile_selector(site, rule.selector)?,
                extract: rule.extract,
            })
        })
        .collect()
}

impl CompiledRule {
    /// Non-empty values of every element this rule matches under `scope`,
    /// in document order.
    fn values<'a>(&'a self, scope: ElementRef<'a>) -> impl Iterator<Item = String> + 'a {
        scope
            .select(&self.selector)
            .filter_map(move |el| match self.extract {
                Extract::Text => Some(element_text(el)),
                Extract::Attr(name) => el.value().attr(name).map(|v| v.trim().to_owned()),
            })
            .filter(|v| !v.is_empty())
    }
}

/// Collapses the text content of `el` into single-spaced, trimmed form.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty value produced by the rules, tried in order.
pub(crate) fn first_text(rules: &[CompiledRule], scope: ElementRef<'_>) -> Option<String> {
    rules.iter().find_map(|rule| rule.values(scope).next())
}

/// First value that parses to a finite, strictly positive price.
pub(crate) fn first_price(rules: &[CompiledRule], scope: ElementRef<'_>) -> Option<f64> {
    rules.iter().find_map(|rule| {
        rule.values(scope)
            .find_map(|v| parse_price(&v).filter(|p| p.is_finite() && *p > 0.0))
    })
}

/// The first non-empty value of each rule, in rule order.
pub(crate) fn first_per_rule(rules: &[CompiledRule], scope: ElementRef<'_>) -> Vec<String> {
    rules
        .iter()
        .filter_map(|rule| rule.values(scope).next())
        .collect()
}
