use color_eyre::{
    config::HookBuilder,
    Result,
};
use eyre::Context as _;
use std::panic::PanicHookInfo;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

/// Installs color-eyre for error reports only. Panics become a single error log line: collectors
/// recover from panics in a scrape, and a full crash report for each of them would bury the logs.
pub fn init_errors() -> Result<()> {
    let (_, eyre_hook) = HookBuilder::default().into_hooks();
    eyre_hook.install()?;
    std::panic::set_hook(Box::new(log_panic));
    Ok(())
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let message = panic_message(info);
    match info.location() {
        Some(location) => error!(%location, "Panicked: {message}"),
        None => error!("Panicked: {message}"),
    }
}

fn panic_message<'a>(info: &'a PanicHookInfo<'_>) -> &'a str {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        message
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}

/// Logs to stderr. `RUST_LOG` wins over `--verbose` when set.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .context("Failed to initialize tracing subscriber")
}
