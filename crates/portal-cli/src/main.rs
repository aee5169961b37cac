//! `portal`: command-line front end for the institutional portal.
//!
//! Each invocation loads every collection from the SQLite store, runs one
//! command as the person named by `--as`, and writes back whatever changed.
//!
//! # Usage
//!
//! ```text
//! portal --as t1 attendance mark s1 Present
//! portal --as admin leave review --status Pending
//! portal --as t1 attendance export --from 2025-03-01 --to 2025-03-31 --role STUDENT
//! ```

mod cli;
mod config;
mod run;

use anyhow::Context as _;
use clap::Parser;
use portal_core::{Portal, clock::Clock, enrich::Offline};
use portal_genai::GenAiClient;
use portal_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{cli::Cli, config::PortalConfig, run::Enrichment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so command output stays clean on stdout.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = PortalConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let enricher = match cfg.genai {
    Some(genai) => Enrichment::Remote(
      GenAiClient::new(genai).context("failed to build text generation client")?,
    ),
    None => {
      tracing::debug!("no [genai] table configured; enrichment uses fallbacks");
      Enrichment::Offline(Offline)
    }
  };

  let clock = Clock::with_offset_minutes(cfg.utc_offset_minutes);
  let mut portal = Portal::load(store, clock).await;

  run::run(&mut portal, &cli.caller, cli.command, &enricher).await
}
