use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use swingtrack::services::monitor::MonitorService;
use swingtrack::services::replay::{load_bars, load_config};

const LOG_DIR_ENV: &str = "SWINGTRACK_LOG_DIR";

fn main() -> anyhow::Result<()> {
    let _guard = init_tracing();

    let mut args = std::env::args().skip(1);
    let bars_path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .context("usage: swingtrack <bars.json> [config.json]")?;
    let config_path = args.next().map(PathBuf::from);

    let config = load_config(config_path.as_deref())?;
    tracing::info!("Using {:?}", config);

    let bars = load_bars(&bars_path)?;
    let symbols: Vec<String> = bars.keys().cloned().collect();
    let mut monitor = MonitorService::new(symbols, config)?;

    for (symbol, symbol_bars) in &bars {
        for (index, error) in &symbol_bars.rejected {
            tracing::warn!("[{}] Skipping record {}: {}", symbol, index, error);
        }
        monitor.record_rejected(symbol, symbol_bars.rejected.len());
        monitor.replay(symbol, &symbol_bars.candles);
    }

    let snapshot = monitor.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Console output always; a daily rolling file when `SWINGTRACK_LOG_DIR` is
/// set. The guard must live until exit so buffered lines are flushed.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "swingtrack=info".into());
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "swingtrack.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            None
        }
    }
}
