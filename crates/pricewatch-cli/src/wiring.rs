//! Builds the long-lived services from [`AppConfig`].

use std::sync::Arc;

use pricewatch_core::{AppConfig, SweepSink};
use pricewatch_db::{PgRepository, PgSweepSink};
use pricewatch_scraper::{Fetcher, FetcherConfig, PriceScraper, Registry};
use pricewatch_sweep::{CompositeSink, Scheduler, SweepEngine, TracingSink};

pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    Ok(pricewatch_db::connect_pool_from_config(config).await?)
}

/// Connects, applies pending migrations, and returns the repository plus the
/// sweep-run sink sharing one pool.
pub(crate) async fn storage(
    config: &AppConfig,
) -> anyhow::Result<(Arc<PgRepository>, Arc<PgSweepSink>)> {
    let pool = connect(config).await?;
    let applied = pricewatch_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "db: migrations applied");
    }
    Ok((
        Arc::new(PgRepository::new(pool.clone())),
        Arc::new(PgSweepSink::new(pool)),
    ))
}

/// Builds the scraper with the built-in sites and any header overrides from
/// `PRICEWATCH_SITES_PATH`.
pub(crate) fn build_scraper(config: &AppConfig) -> anyhow::Result<PriceScraper> {
    let sites = match &config.sites_path {
        Some(path) => Some(pricewatch_core::load_site_overrides(path)?),
        None => None,
    };
    let registry = Registry::with_default_sites()?;
    let fetcher = Fetcher::new(FetcherConfig::from_app_config(config))?;
    Ok(PriceScraper::new(registry, fetcher, sites.as_ref())?)
}

pub(crate) fn build_scheduler(
    config: &AppConfig,
    repo: Arc<PgRepository>,
    runs: Arc<PgSweepSink>,
    scraper: Arc<PriceScraper>,
) -> Scheduler {
    let sinks: Vec<Arc<dyn SweepSink>> = vec![Arc::new(TracingSink), runs];
    let engine = SweepEngine::new(
        repo,
        scraper,
        Arc::new(CompositeSink::new(sinks)),
        config.sweep_concurrency,
    );
    Scheduler::new(engine)
}
