mod alert;
mod items;
mod output;
mod sweep;
mod wiring;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::alert::AlertCommands;
use crate::output::Output;

#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Track shop prices and get alerted when they drop")]
struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sweep tracked items on the configured interval until interrupted
    Run,
    /// Run a single sweep now and print its summary
    Sweep,
    /// Fetch a product page and print the extracted price
    Check {
        /// Product page URL
        url: String,
    },
    /// Search a supported shop
    Search {
        /// Site id (alza, smarty, allegro)
        site: String,
        /// Search phrase
        query: String,
        /// Maximum number of results
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Check a product page and start tracking it
    Track {
        /// Product page URL
        url: String,
    },
    /// Stop sweeping an item; its history is kept
    Untrack { id: i64 },
    /// Manage price alerts
    Alert {
        #[command(subcommand)]
        command: AlertCommands,
    },
    /// List all stored items
    List,
    /// Show the price history of an item
    History { id: i64 },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = pricewatch_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("no command given; run `pricewatch --help` for usage");
        return Ok(());
    };
    let out = Output::new(cli.json);

    match command {
        Commands::Check { url } => {
            let scraper = wiring::build_scraper(&config)?;
            items::run_check(&scraper, &url, out).await
        }
        Commands::Search { site, query, limit } => {
            let scraper = wiring::build_scraper(&config)?;
            items::run_search(&scraper, &site, &query, limit, out).await
        }
        Commands::Db { command } => {
            let pool = wiring::connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    pricewatch_db::ping(&pool).await?;
                    println!("database reachable");
                }
                DbCommands::Migrate => {
                    let applied = pricewatch_db::run_migrations(&pool).await?;
                    println!("applied {applied} migrations");
                }
            }
            Ok(())
        }
        Commands::Run => {
            let (repo, sink) = wiring::storage(&config).await?;
            let scraper = Arc::new(wiring::build_scraper(&config)?);
            let scheduler = wiring::build_scheduler(&config, repo, sink, scraper);
            sweep::run_scheduler(&scheduler, config.check_interval_hours).await
        }
        Commands::Sweep => {
            let (repo, sink) = wiring::storage(&config).await?;
            let scraper = Arc::new(wiring::build_scraper(&config)?);
            let scheduler = wiring::build_scheduler(&config, repo, sink, scraper);
            sweep::run_sweep_once(&scheduler, out).await
        }
        Commands::Track { url } => {
            let (repo, _) = wiring::storage(&config).await?;
            let scraper = wiring::build_scraper(&config)?;
            items::run_track(&scraper, repo.as_ref(), &url, out).await
        }
        Commands::Untrack { id } => {
            let (repo, _) = wiring::storage(&config).await?;
            items::run_untrack(repo.as_ref(), id, out).await
        }
        Commands::Alert { command } => {
            let (repo, _) = wiring::storage(&config).await?;
            alert::run_alert(repo.as_ref(), &command, out).await
        }
        Commands::List => {
            let (repo, _) = wiring::storage(&config).await?;
            items::run_list(repo.as_ref(), out).await
        }
        Commands::History { id } => {
            let (repo, _) = wiring::storage(&config).await?;
            items::run_history(repo.as_ref(), id, out).await
        }
    }
}
