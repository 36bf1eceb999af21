use clap::Parser;
use display_wake_bridge::bridge::DisplayBridge;
use display_wake_bridge::config::{self, Config, SharedConfig};
use display_wake_bridge::display::{
    DisplayControl, DisplayWatcher, ScreenSaverControl, UnavailableControl,
};
use display_wake_bridge::error::Result;
use display_wake_bridge::http;
use display_wake_bridge::instance_lock::InstanceLock;
use display_wake_bridge::remote::{NotificationDispatcher, SmartAppNotifier, dispatcher};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "display-wake-bridge")]
#[command(about = "Report display sleep/wake to a SmartApp and expose it over HTTP")]
struct Cli {
    /// Path to app.json (defaults to $XDG_CONFIG_HOME/display-wake-bridge/app.json)
    #[arg(long, env = "DISPLAY_WAKE_BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Address for the HTTP control surface (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Record wake/sleep commands without forcing the display
    #[arg(long)]
    no_display_control: bool,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    // Before any threads exist
    config::load_dotenv();
    init_logger();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting Display Wake Bridge");

    let _lock = InstanceLock::acquire()?;

    let config_path = cli.config.or_else(Config::default_path);
    let mut config = Config::load(config_path.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }

    info!("Configuration loaded:");
    info!("  Bind: {}", config.bind);
    info!(
        "  SmartApp URL: {}",
        config.smartapp.app_url.as_deref().unwrap_or("<not set>")
    );
    info!(
        "  App ID: {}",
        config.smartapp.app_id.as_deref().unwrap_or("<not set>")
    );
    info!(
        "  Access token: {}",
        if config.smartapp.access_token.is_some() { "set" } else { "<not set>" }
    );
    match config.smartapp.sleep_delay() {
        Some(delay) => info!("  Sleep delay: {}s", delay.as_secs()),
        None => info!("  Sleep delay: none (report immediately)"),
    }

    let shared = SharedConfig::new(config.smartapp.clone());
    let control = display_control(cli.no_display_control).await;

    let (queue, outbox) = dispatcher::channel();
    let notifier = Arc::new(SmartAppNotifier::new(shared.clone()));
    let delivery = NotificationDispatcher::new(notifier, outbox, shared.clone()).start();

    let bridge = Arc::new(DisplayBridge::new(shared.clone(), control, queue));
    let shutdown = CancellationToken::new();

    let watcher = DisplayWatcher::new(bridge.clone(), shutdown.clone()).start();
    let reload = spawn_reload_handler(config_path, shared, shutdown.clone())?;
    let mut server = tokio::spawn(http::serve(config.bind.clone(), bridge, shutdown.clone()));

    info!("Display Wake Bridge is running");
    info!("  - Press Ctrl+C to exit, send SIGHUP to reload config");

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Received shutdown signal");
        }
        _ = terminate.recv() => {
            info!("Received SIGTERM");
        }
        result = &mut server => {
            // The server only returns early when it could not start
            shutdown.cancel();
            delivery.abort();
            return match result {
                Ok(result) => result,
                Err(e) => {
                    error!("HTTP server task failed: {}", e);
                    Ok(())
                }
            };
        }
    }

    shutdown.cancel();

    match server.await {
        Ok(Err(e)) => error!("HTTP server error: {}", e),
        Err(e) => error!("HTTP server task failed: {}", e),
        Ok(Ok(())) => {}
    }
    let _ = watcher.await;
    let _ = reload.await;

    // Pending debounce timers are abandoned with the process
    delivery.abort();

    info!("Display Wake Bridge stopped");
    Ok(())
}

async fn display_control(disabled: bool) -> Arc<dyn DisplayControl> {
    if disabled {
        info!("Display control disabled; wake/sleep commands only update state");
        return Arc::new(UnavailableControl::new("disabled with --no-display-control"));
    }

    match ScreenSaverControl::connect().await {
        Ok(control) => Arc::new(control),
        Err(e) => {
            warn!("Display control not available: {}", e);
            Arc::new(UnavailableControl::new(e.to_string()))
        }
    }
}

fn spawn_reload_handler(
    path: Option<PathBuf>,
    shared: SharedConfig,
    shutdown: CancellationToken,
) -> Result<JoinHandle<()>> {
    let mut hangup = signal(SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    info!("Received SIGHUP, reloading configuration");
                    if let Err(e) = shared.reload(path.as_deref()) {
                        warn!("[Config] Reload failed, keeping previous values: {}", e);
                    }
                }
            }
        }
    }))
}
