use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tollgate::config::{LoggingSettings, TollgateConfig};
use tollgate::harness::TrafficGenerator;
use tollgate::ratelimit::WindowLimiter;

/// Drive simulated traffic through a fixed-window rate limiter.
#[derive(Debug, Parser)]
#[command(name = "tollgate", version, about)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Window length in seconds
    #[arg(long)]
    window_secs: Option<u64>,

    /// Maximum admissions per identity per window
    #[arg(long)]
    max_per_window: Option<u64>,

    /// Number of requests to send
    #[arg(long)]
    iterations: Option<u64>,

    /// Pause between requests in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Seed for identity selection
    #[arg(long)]
    seed: Option<u64>,

    /// Comma-separated identities to send requests from
    #[arg(long, value_delimiter = ',')]
    identities: Option<Vec<String>>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn apply(self, config: &mut TollgateConfig) {
        if let Some(window_secs) = self.window_secs {
            config.limiter.window_secs = window_secs;
        }
        if let Some(max_per_window) = self.max_per_window {
            config.limiter.max_per_window = max_per_window;
        }
        if let Some(iterations) = self.iterations {
            config.traffic.iterations = iterations;
        }
        if let Some(pause_ms) = self.pause_ms {
            config.traffic.pause_ms = pause_ms;
        }
        if let Some(seed) = self.seed {
            config.traffic.seed = Some(seed);
        }
        if let Some(identities) = self.identities {
            config.traffic.identities = identities;
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone();
    let mut config = match &config_path {
        Some(path) => TollgateConfig::from_file(path)?,
        None => TollgateConfig::default(),
    };
    cli.apply(&mut config);

    init_tracing(&config.logging);

    info!("Starting Tollgate");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config_path {
        info!(path = %path.display(), "Loaded configuration file");
    }

    config.validate()?;
    let limiter_config = config.limiter.to_limiter_config()?;
    info!(
        window = ?limiter_config.window(),
        max_per_window = limiter_config.max_per_window(),
        "Configuration loaded"
    );

    let limiter = Arc::new(WindowLimiter::new(limiter_config));
    info!("Rate limiter initialized");

    let rng = match config.traffic.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let generator = TrafficGenerator::new(Arc::clone(&limiter), &config.traffic, rng)?;
    let report = generator.run(shutdown_signal()).await;

    for (identity, tally) in &report.per_identity {
        info!(
            client = %identity,
            accepted = tally.accepted,
            rejected = tally.rejected,
            "Client summary"
        );
    }

    let snapshot = limiter.snapshot();
    info!(
        elapsed_secs = snapshot.elapsed_secs,
        tracked_identities = snapshot.tracked_identities,
        "Final window state"
    );

    info!("Tollgate stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .init();
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping traffic");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping traffic");
        }
    }
}
