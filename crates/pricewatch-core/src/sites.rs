use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Per-site request settings read from the optional sites file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SiteOverride {
    /// Header values that replace (or extend) the adapter's built-in set.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SitesFile {
    #[serde(default)]
    pub sites: BTreeMap<String, SiteOverride>,
}

impl SitesFile {
    #[must_use]
    pub fn headers_for(&self, site: &str) -> Option<&BTreeMap<String, String>> {
        self.sites.get(site).map(|s| &s.headers)
    }
}

/// Load and validate per-site overrides from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_site_overrides(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_site_overrides(&content)
}

fn parse_site_overrides(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile = serde_yaml::from_str(content)?;
    validate_sites(&sites_file)?;
    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    for (site, settings) in &sites_file.sites {
        if site.trim().is_empty() {
            return Err(ConfigError::SitesValidation(
                "site identifier must be non-empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (name, value) in &settings.headers {
            if name.trim().is_empty() || name.chars().any(|c| c.is_whitespace() || c == ':') {
                return Err(ConfigError::SitesValidation(format!(
                    "site '{site}' has invalid header name '{name}'"
                )));
            }
            if value.contains(['\r', '\n']) {
                return Err(ConfigError::SitesValidation(format!(
                    "site '{site}' header '{name}' contains a line break"
                )));
            }
            // Header names are case-insensitive on the wire.
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ConfigError::SitesValidation(format!(
                    "site '{site}' repeats header '{name}'"
                )));
            }
        }
    }

    Ok(())
}
