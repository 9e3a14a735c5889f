use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ec2_sd::config::SdConfig;
use ec2_sd::discovery::{get_instances_labels, DiscoveryConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// EC2 service discovery: print scrape target labels for EC2 instances
#[derive(Parser, Debug)]
#[command(name = "ec2-sd", version, about, long_about = None)]
struct Args {
    /// Config file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Region to discover instances in
    #[arg(short, long)]
    region: Option<String>,

    /// API endpoint, overriding the regional default
    #[arg(long)]
    endpoint: Option<String>,

    /// Port appended to each instance address
    #[arg(short, long)]
    port: Option<u16>,

    /// Run a single discovery cycle and exit
    #[arg(long)]
    once: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Install the global subscriber. RUST_LOG, when set, wins over `--log-level`.
/// The returned guard must live until exit so buffered file logs get flushed.
fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let Some(log_path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

/// Merge CLI overrides into the file config (CLI > config > defaults)
fn effective_config(args: &Args) -> Result<SdConfig> {
    let mut config = SdConfig::load(args.config.as_deref())?;
    if let Some(region) = &args.region {
        config.region = Some(region.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Run one discovery cycle and print its targets as a JSON array line
async fn run_cycle(cfg: &DiscoveryConfig) -> Result<()> {
    let targets = get_instances_labels(cfg).await?;
    let line = serde_json::to_string(&targets).context("Failed to encode targets")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref())?;

    let config = effective_config(&args)?;
    tracing::info!(
        "Using region: {}, endpoint: {}, port: {}",
        config.effective_region(),
        config.endpoint_url()?,
        config.port
    );

    let cfg = DiscoveryConfig::from_sd_config(&config)?;

    if args.once {
        return run_cycle(&cfg).await;
    }

    let mut interval = tokio::time::interval(config.refresh_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(err) = run_cycle(&cfg).await {
                    tracing::error!("Discovery cycle failed: {:#}", err);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}
