use serde::Serialize;

/// Selects between human-readable tables and JSON on stdout.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Output {
    json: bool,
}

impl Output {
    pub(crate) fn new(json: bool) -> Self {
        Self { json }
    }

    /// Prints `value` as pretty JSON, or runs `human` to print a table.
    pub(crate) fn emit<T, F>(self, value: &T, human: F) -> anyhow::Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(),
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human();
        }
        Ok(())
    }
}

pub(crate) fn fmt_price(price: Option<f64>) -> String {
    price.map_or_else(|| "\u{2014}".to_string(), |p| format!("{p:.2}"))
}

/// Truncates to `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
