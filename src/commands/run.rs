use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches};

use crate::api;
use crate::app::ports::{MinerMonitor, SpecsReader};
use crate::app::Service;
use crate::core::config::{RuntimeConfig, DEFAULT_LISTEN_ADDR};
use crate::core::miner::{Supervisor, SupervisorConfig, DEFAULT_PROGRAM};
use crate::core::shutdown::ShutdownToken;
use crate::core::system_info::{Specs, SystemSpecsReader};
use crate::notify::{Manager, StateStore};
use crate::observability;
use crate::ui::messages;

/// Arguments shared by `grid-node run` and the bare `grid-node` invocation.
pub fn args() -> Vec<Arg> {
    vec![
        Arg::new("webhook")
            .long("webhook")
            .value_name("URL")
            .help("Discord webhook URL for status updates"),
        Arg::new("listen")
            .long("listen")
            .value_name("ADDR")
            .default_value(DEFAULT_LISTEN_ADDR)
            .help("Address for the HTTP status API"),
        Arg::new("restart-delay")
            .long("restart-delay")
            .value_name("SECS")
            .value_parser(clap::value_parser!(u64))
            .default_value("5")
            .help("Seconds to wait before relaunching the miner"),
        Arg::new("miner")
            .long("miner")
            .value_name("PROGRAM")
            .default_value(DEFAULT_PROGRAM)
            .help("Miner executable name or path"),
        Arg::new("notify-interval")
            .long("notify-interval")
            .value_name("SECS")
            .value_parser(clap::value_parser!(u64))
            .default_value("10")
            .help("Seconds between webhook status updates"),
        Arg::new("state-file")
            .long("state-file")
            .value_name("PATH")
            .help("Where hashrate and runtime counters are persisted"),
        Arg::new("miner-args")
            .value_name("MINER_ARGS")
            .num_args(1..)
            .last(true)
            .action(ArgAction::Append)
            .help("Arguments passed to the miner after `--`"),
    ]
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let _reporting = observability::init();
    let config = build_config(matches)?;

    let supervisor = Supervisor::new(config.supervisor.clone())
        .context("Cannot start without a miner executable")?;
    messages::info(&format!(
        "Supervising {} (restart delay {}s)",
        supervisor.executable().display(),
        supervisor.config().restart_delay.as_secs()
    ));

    let shutdown = ShutdownToken::new();
    let token = shutdown.clone();
    ctrlc::set_handler(move || {
        log::info!("grid-node signal: shutting down");
        token.cancel();
    })
    .map_err(|e| anyhow::anyhow!("Failed to set signal handler: {}", e))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("grid-worker")
        .build()?;

    runtime.block_on(serve(config, supervisor, shutdown))
}

fn build_config(matches: &ArgMatches) -> Result<RuntimeConfig> {
    let miner_args: Vec<String> = matches
        .get_many::<String>("miner-args")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let delay = matches.get_one::<u64>("restart-delay").copied().unwrap_or(5);
    let program = matches
        .get_one::<String>("miner")
        .map(String::as_str)
        .unwrap_or(DEFAULT_PROGRAM);

    let supervisor =
        SupervisorConfig::new(miner_args, Duration::from_secs(delay)).with_program(program);

    let listen = matches
        .get_one::<String>("listen")
        .map(String::as_str)
        .unwrap_or(DEFAULT_LISTEN_ADDR);

    let interval = matches.get_one::<u64>("notify-interval").copied().unwrap_or(10);

    let mut config = RuntimeConfig::new(listen, supervisor)?
        .with_webhook(matches.get_one::<String>("webhook").cloned())
        .with_notify_interval(Duration::from_secs(interval));
    if let Some(path) = matches.get_one::<String>("state-file") {
        config = config.with_state_file(path);
    }
    Ok(config)
}

async fn serve(config: RuntimeConfig, supervisor: Supervisor, shutdown: ShutdownToken) -> Result<()> {
    let supervisor = Arc::new(supervisor);
    let monitor: Arc<dyn MinerMonitor> = Arc::new(supervisor.handle());
    let specs_reader: Arc<dyn SpecsReader> = Arc::new(SystemSpecsReader);

    let notifier = match &config.webhook_url {
        Some(url) => Some(Arc::new(build_notifier(url, &config, &specs_reader).await?)),
        None => {
            messages::info("No webhook configured, status updates disabled");
            None
        }
    };

    let miner_task = {
        let supervisor = Arc::clone(&supervisor);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { supervisor.run(shutdown).await })
    };

    let notifier_task = notifier.map(|manager| {
        let monitor = Arc::clone(&monitor);
        let specs_reader = Arc::clone(&specs_reader);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { manager.run(monitor, specs_reader, shutdown).await })
    });

    let service = Service::new(Arc::clone(&specs_reader), Some(monitor));
    let api_result = api::run(config.listen_addr, service, shutdown.clone()).await;
    if api_result.is_err() {
        shutdown.cancel();
    }

    if let Err(e) = miner_task.await {
        log::error!("grid-node miner task: {}", e);
    }
    if let Some(task) = notifier_task {
        if let Err(e) = task.await {
            log::error!("grid-node notifier task: {}", e);
        }
    }

    api_result.with_context(|| format!("HTTP API on {} failed", config.listen_addr))?;
    messages::success("grid-node stopped");
    Ok(())
}

async fn build_notifier(
    url: &str,
    config: &RuntimeConfig,
    specs_reader: &Arc<dyn SpecsReader>,
) -> Result<Manager> {
    let reader = Arc::clone(specs_reader);
    let specs = match tokio::task::spawn_blocking(move || reader.read_specs()).await? {
        Ok(specs) => specs,
        Err(e) => {
            log::warn!("grid-node read_specs: {}", e);
            messages::warn("Hardware specs unavailable, status updates will omit them");
            Specs::default()
        }
    };

    let store = StateStore::new(config.state_file.clone());
    messages::info(&format!("Status counters stored in {}", store.path().display()));
    let manager = Manager::new(url, specs, store).context("Invalid webhook configuration")?;
    Ok(manager.with_config(config.notifier.clone()))
}
