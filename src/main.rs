//! Main entry point for scorecast
//!
//! `compute` turns a game table into a persisted posterior table; `serve`
//! loads that table and answers ranking, search and matchup queries over HTTP.

use anyhow::Result;
use clap::{Parser, Subcommand};
use scorecast::config::{validate_config, AppConfig};
use scorecast::metrics::MetricsCollector;
use scorecast::service::{run_compute, AppState};
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{error, info, warn};

/// Scorecast - offense/defense ratings and matchup predictions from game scores
#[derive(Parser)]
#[command(
    name = "scorecast",
    version,
    about = "Infer team offense/defense ratings from game scores and predict matchups",
    long_about = "Scorecast fits per-team offensive and defensive score distributions to a \
                 schedule of played games, ranks teams by net rating, and serves matchup \
                 predictions over HTTP."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        global = true,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        global = true,
        help = "Validate configuration and exit without running"
    )]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Infer ratings from a game table and write the posterior table
    Compute {
        /// Game table (CSV with a header row)
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Posterior table to write (defaults to the configured rankings path)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the top N teams after computing
        #[arg(long, value_name = "N")]
        top: Option<usize>,
    },

    /// Serve rankings and matchup predictions from a posterior table
    Serve {
        /// Posterior table to load
        #[arg(short, long, value_name = "FILE")]
        rankings: Option<PathBuf>,

        /// HTTP port override
        #[arg(long, value_name = "PORT")]
        port: Option<u16>,

        /// HTTP host override
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Directory with index.html and UI assets
        #[arg(long, value_name = "DIR")]
        static_dir: Option<PathBuf>,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    let hyper = &config.inference;
    info!("Scorecast {}", scorecast::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!(
        "   Prior: mu={} tau={} alpha={} beta={}",
        hyper.mu, hyper.tau, hyper.alpha, hyper.beta
    );
    info!("   Iterations: {}", hyper.iterations);
    info!("   Rankings: {}", config.query.rankings_path.display());
    info!("   HTTP: {}", config.http_addr());
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    match &args.command {
        Command::Compute { output, .. } => {
            if let Some(output) = output {
                config.query.rankings_path = output.clone();
            }
        }
        Command::Serve {
            rankings,
            port,
            host,
            static_dir,
        } => {
            if let Some(rankings) = rankings {
                config.query.rankings_path = rankings.clone();
            }
            if let Some(port) = port {
                config.service.http_port = *port;
            }
            if let Some(host) = host {
                config.service.http_host = host.clone();
            }
            if let Some(static_dir) = static_dir {
                config.query.static_dir = Some(static_dir.clone());
            }
        }
    }

    validate_config(&config)?;
    Ok(config)
}

fn compute(config: &AppConfig, input: &Path, top: Option<usize>) -> Result<()> {
    let metrics = MetricsCollector::new()?;
    let outcome = run_compute(config, &metrics, input, &config.query.rankings_path)?;

    info!(
        "Inference finished in {:.3}s over {} iterations",
        outcome.report.duration_seconds, outcome.report.iterations
    );

    if let Some(n) = top {
        for (rank, line) in outcome.top(n).iter().enumerate() {
            println!("{:>3}. {}", rank + 1, line);
        }
    }
    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    let shutdown_timeout = config.shutdown_timeout();

    let mut app_state = AppState::new(config).await?;
    app_state.start().await?;

    info!("Press Ctrl+C to shutdown gracefully...");
    wait_for_shutdown_signal().await;
    info!("Shutdown signal received, beginning graceful shutdown...");

    match tokio::time::timeout(shutdown_timeout, app_state.shutdown()).await {
        Ok(Ok(())) => info!("Graceful shutdown completed successfully"),
        Ok(Err(e)) => error!("Shutdown failed: {}", e),
        Err(_) => warn!("Shutdown timeout exceeded, forcing exit"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        info!("Dry run completed - exiting without running");
        return Ok(());
    }

    let result = match &args.command {
        Command::Compute { input, top, .. } => compute(&config, input, *top),
        Command::Serve { .. } => serve(config).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
