//! kin-server binary.
//!
//! Two modes: `serve` runs the JSON API over an SQLite-backed relation
//! graph, `crawl` runs a one-shot batch crawl and exits. Both read
//! `config.toml` (or the path given with `--config`), overridable with
//! `KIN_*` environment variables.

mod config;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use kin_api::AppState;
use kin_crawl::{CrawlConfig, Crawler};
use kin_store_sqlite::SqliteLedger;
use kin_wikidata::{WikidataClient, WikidataConfig};

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Kin family-relation graph server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API.
  Serve,
  /// Run a one-shot batch crawl and exit.
  Crawl {
    /// Wikidata entity id to crawl from (e.g. Q9682).
    #[arg(long, conflicts_with = "search")]
    entity_id: Option<String>,

    /// Search query; the first hit becomes the seed.
    #[arg(long)]
    search: Option<String>,

    /// Maximum recursion depth.
    #[arg(long)]
    max_depth: Option<u32>,

    /// Delay between API requests, in seconds.
    #[arg(long)]
    delay: Option<f64>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  match cli.command {
    Command::Serve => serve(cfg).await,
    Command::Crawl { entity_id, search, max_depth, delay } => {
      crawl(cfg, entity_id, search, max_depth, delay).await
    }
  }
}

async fn open_backends(
  cfg: &ServerConfig,
) -> anyhow::Result<(SqliteLedger, WikidataClient)> {
  let store_path = expand_tilde(&cfg.store_path);
  let ledger = SqliteLedger::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let client = WikidataClient::new(WikidataConfig {
    user_agent: cfg.user_agent.clone(),
    page_size: cfg.page_size,
    ..WikidataConfig::default()
  })
  .context("failed to build Wikidata client")?;

  Ok((ledger, client))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let (ledger, client) = open_backends(&cfg).await?;

  let mut state = AppState::new(Arc::new(client), Arc::new(ledger));
  state.ingest_pace = Duration::from_millis(cfg.delay_ms);
  state.crawl_config = CrawlConfig {
    max_depth: cfg.max_depth,
    delay:     Duration::from_millis(cfg.delay_ms),
  };

  let app = axum::Router::new()
    .nest("/api", kin_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", cfg.host, cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn crawl(
  cfg: ServerConfig,
  entity_id: Option<String>,
  search: Option<String>,
  max_depth: Option<u32>,
  delay: Option<f64>,
) -> anyhow::Result<()> {
  let (ledger, client) = open_backends(&cfg).await?;

  let crawl_cfg = CrawlConfig {
    max_depth: max_depth.unwrap_or(cfg.max_depth),
    delay:     delay
      .map(Duration::from_secs_f64)
      .unwrap_or(Duration::from_millis(cfg.delay_ms)),
  };
  let crawler = Crawler::new(&client, &ledger, crawl_cfg);

  let summary = match (entity_id, search) {
    (Some(id), None) => crawler.run(&id).await,
    (None, Some(query)) => crawler
      .run_from_search(&query)
      .await
      .context("failed to resolve crawl seed")?,
    _ => anyhow::bail!("provide exactly one of --entity-id or --search"),
  };

  println!("{}", serde_json::to_string_pretty(&summary)?);
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
