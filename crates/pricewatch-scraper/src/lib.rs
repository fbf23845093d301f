pub mod adapters;
pub mod error;
pub mod fetcher;
pub mod price;
pub mod registry;
pub mod sale;
pub mod service;

pub use adapters::{FieldRule, ProfileAdapter, SearchProfile, SiteAdapter, SiteProfile};
pub use error::{CheckError, ExtractionError, NetworkError, NetworkErrorKind, ScraperError};
pub use fetcher::{
    BackoffPolicy, Delay, FetchedPage, Fetcher, FetcherConfig, RecordingDelay, SiteContext,
    TokioDelay,
};
pub use price::parse_price;
pub use registry::Registry;
pub use sale::{detect_sale, Locale, SaleStatus};
pub use service::{CheckedItem, PriceScraper};
