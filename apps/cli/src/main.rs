use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    config::{parse_base_url, timeout_from_seconds},
    load_transport_config, log_error, request_health_check, ClusterizerStore, ErrorReporting,
    StoreOptions, Transport,
};
use shared::domain::GroupingResult;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Groups phrases through the clusterizer backend and prints the result.
#[derive(Parser, Debug)]
#[command(name = "clusterizer")]
struct Args {
    /// Backend address; overrides clusterizer.toml and environment.
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    timeout_seconds: Option<f64>,
    /// Only log request failures instead of reporting them in the output.
    #[arg(long)]
    log_only: bool,
    /// Check backend health instead of grouping.
    #[arg(long)]
    health: bool,
    /// Phrases to group; read one per line from stdin when omitted.
    phrases: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = load_transport_config();
    if let Some(base_url) = &args.base_url {
        config.base_url = parse_base_url(base_url)?;
    }
    if let Some(seconds) = args.timeout_seconds {
        config.timeout = Some(timeout_from_seconds(seconds).with_context(|| {
            format!("--timeout-seconds must be a positive number of seconds, got {seconds}")
        })?);
    }
    let transport = Transport::new(&config)?;
    info!(base_url = %transport.base_url(), "clusterizer: transport ready");

    if args.health {
        return match request_health_check(&transport).await {
            Ok(status) => {
                println!("{}", status.message);
                Ok(())
            }
            Err(err) => bail!(log_error(&err)),
        };
    }

    let phrases = if args.phrases.is_empty() {
        read_stdin_phrases().await?
    } else {
        args.phrases
    };

    let error_reporting = if args.log_only {
        ErrorReporting::LogOnly
    } else {
        ErrorReporting::Surface
    };
    let store =
        ClusterizerStore::with_options(Arc::new(transport), StoreOptions { error_reporting });
    store.set_phrases(phrases);
    store.request_group_phrases().await;

    let state = store.state();
    if state.last_error.is_none() {
        let result = GroupingResult {
            groups: state.groups.clone(),
            singles: state.singles.clone(),
        };
        info!(
            groups = result.groups.len(),
            singles = result.singles.len(),
            phrases = result.phrase_count(),
            "clusterizer: phrases grouped"
        );
    }
    println!("{}", serde_json::to_string_pretty(&state)?);

    if let Some(message) = state.last_error {
        bail!(message);
    }
    Ok(())
}

async fn read_stdin_phrases() -> Result<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut phrases = Vec::new();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let phrase = line.trim();
        if !phrase.is_empty() {
            phrases.push(phrase.to_string());
        }
    }
    Ok(phrases)
}
