//! `woodpecker`: watch transparency logs and their witnesses.
//!
//! # Usage
//!
//! ```text
//! woodpecker                               # watch the first configured log
//! woodpecker watch --log "go.sum database tree"
//! woodpecker -c woodpecker.toml watch      # use a config file
//! woodpecker checkpoint                    # print the latest checkpoint once
//! woodpecker leaf 1234 --log <origin>      # print one leaf
//! woodpecker logs                          # list configured logs
//! ```

mod config;
mod report;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use woodpecker_engine::{Controller, ServiceConfig, service};
use woodpecker_fetch::ByteFetcher;
use woodpecker_log::LogRegistry;
use woodpecker_witness::{DistributorClient, WitnessKeys, WitnessQuorumSource};

use config::CliConfig;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "woodpecker",
    version,
    about = "Transparency log and witness watcher"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "WOODPECKER_CONFIG")]
    config: Option<PathBuf>,

    /// Witness cosignatures required (overrides `[witness] threshold`).
    #[arg(long, global = true)]
    threshold: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow a log, printing a summary whenever its view changes (default).
    Watch {
        /// Origin of the log to watch instead of the first configured one.
        #[arg(short, long)]
        log: Option<String>,
    },

    /// Fetch the latest checkpoint once and compare it with the witnesses.
    Checkpoint {
        /// Origin of the log to query.
        #[arg(short, long)]
        log: Option<String>,
    },

    /// Print the contents of one leaf.
    Leaf {
        /// Leaf index.
        index: u64,

        /// Origin of the log to query.
        #[arg(short, long)]
        log: Option<String>,
    },

    /// List configured logs.
    Logs,
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(n) = cli.threshold {
        config.witness.threshold = n;
    }

    setup_tracing(&config.log.level);
    config.validate().context("invalid configuration")?;

    match cli.command.unwrap_or(Commands::Watch { log: None }) {
        Commands::Watch { log } => cmd_watch(&config, log).await,
        Commands::Checkpoint { log } => cmd_checkpoint(&config, log).await,
        Commands::Leaf { index, log } => cmd_leaf(&config, index, log).await,
        Commands::Logs => cmd_logs(&config),
    }
}

fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// -----------------------------------------------------------------------
// Startup
// -----------------------------------------------------------------------

/// Build the registry, witness keys and controller from the configuration.
///
/// Malformed log keys, unsupported locations and malformed witness keys are
/// fatal. An unreachable distributor is not: the controller then runs with
/// no witness keys and never reports a witnessed checkpoint.
async fn build_controller(config: &CliConfig) -> Result<Controller> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("woodpecker/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build http client")?;

    let registry = LogRegistry::from_sources(&config.log_sources(), http.clone())
        .context("invalid log source")?;

    let fetcher = ByteFetcher::with_client(&config.witness.distributor, http)
        .context("invalid witness distributor location")?;
    let distributor = DistributorClient::new(fetcher);
    let witnesses = witness_keys(config, &distributor).await?;

    info!(
        logs = registry.origins().len(),
        witnesses = witnesses.len(),
        threshold = config.witness.threshold,
        distributor = %config.witness.distributor,
        "configuration loaded"
    );
    if witnesses.len() < config.witness.threshold {
        warn!(
            witnesses = witnesses.len(),
            threshold = config.witness.threshold,
            "fewer witness keys than the threshold; no checkpoint can be witnessed"
        );
    }

    let controller = Controller::new(
        Arc::new(registry),
        Arc::new(distributor),
        witnesses,
        config.witness.threshold,
    )?;
    Ok(controller)
}

async fn witness_keys(config: &CliConfig, distributor: &DistributorClient) -> Result<WitnessKeys> {
    if !config.witness.keys.is_empty() {
        return WitnessKeys::parse(&config.witness.keys).context("invalid witness key in config");
    }

    match distributor.witness_keys().await {
        Ok(keys) => WitnessKeys::parse(&keys).context("distributor listed an invalid witness key"),
        Err(e) => {
            warn!(%e, "could not fetch witness keys from distributor");
            Ok(WitnessKeys::default())
        }
    }
}

/// Select `log` if given, otherwise keep the first configured log.
async fn select(controller: &mut Controller, log: Option<&str>) -> Result<()> {
    match log {
        Some(origin) => controller.select_log(origin).await?,
        None => controller.refresh_checkpoint().await,
    }
    Ok(())
}

// -----------------------------------------------------------------------
// woodpecker watch
// -----------------------------------------------------------------------

async fn cmd_watch(config: &CliConfig, log: Option<String>) -> Result<()> {
    let mut controller = build_controller(config).await?;
    let load_on_start = match log.as_deref() {
        Some(origin) => {
            controller.select_log(origin).await?;
            false
        }
        None => true,
    };

    let svc = service::spawn(
        controller,
        ServiceConfig {
            refresh_interval: config.refresh_interval(),
            load_on_start,
        },
    );
    let model = svc.model().clone();
    info!(log = ?model.selected(), "watching; press Ctrl-C to stop");

    let mut stdout = std::io::stdout();
    loop {
        tokio::select! {
            _ = model.dirty().wait() => {
                let line = report::summary(&model.snapshot());
                writeln!(stdout, "{line}").context("failed to write to stdout")?;
            }
            res = tokio::signal::ctrl_c() => {
                res.context("failed to listen for Ctrl-C")?;
                info!("interrupted, shutting down");
                break;
            }
        }
    }

    svc.stop().await;
    Ok(())
}

// -----------------------------------------------------------------------
// woodpecker checkpoint
// -----------------------------------------------------------------------

async fn cmd_checkpoint(config: &CliConfig, log: Option<String>) -> Result<()> {
    let mut controller = build_controller(config).await?;
    select(&mut controller, log.as_deref()).await?;

    let state = controller.model().snapshot();
    let Some(cp) = &state.checkpoint else {
        match &state.error {
            Some(err) => bail!("failed to fetch checkpoint: {err}"),
            None => bail!("no checkpoint available"),
        }
    };
    if let Some(err) = &state.error {
        warn!(%err, "showing last good checkpoint");
    }

    print!(
        "{}",
        report::checkpoint(cp, state.witnessed.as_ref(), state.witness_threshold)
    );
    Ok(())
}

// -----------------------------------------------------------------------
// woodpecker leaf
// -----------------------------------------------------------------------

async fn cmd_leaf(config: &CliConfig, index: u64, log: Option<String>) -> Result<()> {
    let mut controller = build_controller(config).await?;
    select(&mut controller, log.as_deref()).await?;
    controller.get_leaf(index).await?;

    let leaf = controller.model().leaf();
    let mut stdout = std::io::stdout();
    stdout
        .write_all(&leaf.contents)
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")?;
    Ok(())
}

// -----------------------------------------------------------------------
// woodpecker logs
// -----------------------------------------------------------------------

fn cmd_logs(config: &CliConfig) -> Result<()> {
    for source in &config.sources {
        println!("{}\t{:?}\t{}", source.origin, source.kind, source.url);
    }
    Ok(())
}
