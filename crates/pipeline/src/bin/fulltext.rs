// ABOUTME: Service binary that enriches a stream of JSON records with extracted article text.
// ABOUTME: Reads records from a TCP bus endpoint or stdin and writes enriched records back or to stdout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use fulltext_extractor::{Extractor, SelectorConfig, DEFAULT_USER_AGENT};
use fulltext_pipeline::{JsonLinesSink, JsonLinesSource, Pipeline};
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "fulltext")]
#[command(about = "Enrich news records with the full text of their linked article")]
struct Args {
    /// Selector rules: JSON object mapping bare hostname to rule
    #[arg(short = 'c', long = "config", env = "FULLTEXT_CONFIG", default_value = "config/cfg.json")]
    config: PathBuf,

    /// Message bus endpoint (host:port) carrying JSON lines; stdin/stdout when unset
    #[arg(long = "bus-addr", env = "BUS_ADDR")]
    bus_addr: Option<String>,

    /// Concurrent extraction tasks; more than one relaxes output ordering
    #[arg(short = 'w', long = "workers", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    workers: u16,

    /// Per-page fetch timeout in seconds; waits indefinitely when unset
    #[arg(long = "fetch-timeout", env = "FULLTEXT_FETCH_TIMEOUT")]
    fetch_timeout: Option<u64>,

    /// User-Agent sent to article sites
    #[arg(long = "user-agent", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    // stdout may be the record stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = SelectorConfig::from_path(&args.config)?;

    let mut builder = Extractor::builder()
        .config(config)
        .user_agent(args.user_agent.as_str());
    if let Some(secs) = args.fetch_timeout {
        builder = builder.fetch_timeout(Duration::from_secs(secs));
    }
    let extractor = Arc::new(builder.build()?);

    let pipeline = Pipeline::builder(extractor)
        .workers(usize::from(args.workers))
        .build();

    let stats = match &args.bus_addr {
        Some(addr) => {
            let stream = TcpStream::connect(addr)
                .await
                .with_context(|| format!("failed to connect to message bus at {}", addr))?;
            info!(addr = %addr, "connected to message bus");
            let (reader, writer) = stream.into_split();
            pipeline
                .run(
                    JsonLinesSource::new(BufReader::new(reader)),
                    JsonLinesSink::new(writer),
                )
                .await?
        }
        None => {
            pipeline
                .run(
                    JsonLinesSource::new(BufReader::new(tokio::io::stdin())),
                    JsonLinesSink::new(tokio::io::stdout()),
                )
                .await?
        }
    };

    debug!(?stats, "exiting");
    Ok(())
}
