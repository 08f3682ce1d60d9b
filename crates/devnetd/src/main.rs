//! devnetd daemon entry point.
//!
//! Initializes logging, loads configuration, wires the default collaborators
//! and runs the source polling loop until interrupted.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use devnet_common::{Orch, Publication};
use devnet_types::{LegacyConfig, NetworkStatus, PortConfig};
use devnetd::config::DEFAULT_CONFIG_PATH;
use devnetd::topics::{keys, NETWORK_STATUS_TOPIC};
use devnetd::{
    Collaborators, DaemonConfig, DevNetMgr, DeviceNetworkEngine, DhcpcdLifecycle,
    DirectorySource, LedIndicator, PortStatusProjector, UplinkPortConfigBuilder,
    UsableAddressCounter,
};

/// Device port configuration reconciliation daemon
#[derive(Parser, Debug)]
#[command(name = "devnetd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Manufacturer model whose legacy configuration is accepted
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

/// Initialize tracing/logging. RUST_LOG takes precedence over `level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")
}

fn build_engine(config: &DaemonConfig, publication: Arc<Publication>) -> DeviceNetworkEngine {
    let dhcp = DhcpcdLifecycle::new(&config.dhcp.command, &config.dhcp.config_file)
        .with_dry_run(config.dhcp.dry_run);

    DeviceNetworkEngine::new(
        Collaborators {
            builder: Box::new(UplinkPortConfigBuilder),
            dhcp: Box::new(dhcp),
            projector: Box::new(PortStatusProjector::default()),
            counter: Box::new(UsableAddressCounter),
            indicator: Box::new(LedIndicator::new(&config.indicator.led_config_path)),
            publisher: publication,
        },
        config.sources.manufacturer_model.clone(),
    )
}

async fn run(config: DaemonConfig) -> Result<()> {
    let publication = Arc::new(Publication::default());
    let mut mgr = DevNetMgr::new(build_engine(&config, publication.clone()));

    let mut port_sources: Vec<DirectorySource<PortConfig>> = config
        .sources
        .port_config_dirs
        .iter()
        .map(DirectorySource::new)
        .collect();
    let mut legacy_source: DirectorySource<LegacyConfig> =
        DirectorySource::new(&config.sources.legacy_config_dir);

    for source in &port_sources {
        info!("Watching port configs in {}", source.dir().display());
    }
    info!(
        "Watching legacy configs for {} in {}",
        config.sources.manufacturer_model,
        legacy_source.dir().display()
    );

    let mut interval = tokio::time::interval(config.poll_interval());
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for shutdown signal")?;
                info!("Shutdown requested");
                return Ok(());
            }
        }

        mgr.enqueue_legacy_configs(legacy_source.poll());
        for source in &mut port_sources {
            mgr.enqueue_port_configs(source.poll());
        }

        if !mgr.has_pending_tasks() {
            continue;
        }
        debug!("Pending: {:?}", mgr.dump_pending_tasks());
        mgr.do_task().await;

        if mgr.engine_mut().take_dirty() {
            let status: Option<NetworkStatus> = publication
                .get_as(NETWORK_STATUS_TOPIC, keys::GLOBAL)
                .context("failed to read published network status")?;
            let ports = status.map(|s| s.ports.len()).unwrap_or_default();
            info!(
                "DeviceNetworkStatus updated: {} ports, {} usable addresses",
                ports,
                mgr.engine().state().usable_address_count()
            );
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match DaemonConfig::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("devnetd: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(model) = args.model {
        config.sources.manufacturer_model = model;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    if let Err(e) = init_logging(&config.logging.level) {
        eprintln!("devnetd: {:#}", e);
        return ExitCode::FAILURE;
    }

    info!("--- Starting devnetd ---");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => {
            info!("devnetd exiting normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("devnetd error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
