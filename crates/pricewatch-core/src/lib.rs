pub mod app_config;
pub mod config;
pub mod items;
pub mod repository;
pub mod sites;
pub mod sweep;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use items::{
    ExtractedItem, NewObservation, NewTrackedItem, PriceObservation, SearchResult, TrackedItem,
};
pub use repository::{PersistenceError, Repository, TrackingAdmin};
pub use sites::{load_site_overrides, SiteOverride, SitesFile};
pub use sweep::{SweepReport, SweepSink, SweepStatus, SweepSummary};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file at {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[from] serde_yaml::Error),

    #[error("sites file validation failed: {0}")]
    SitesValidation(String),
}
