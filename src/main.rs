pub mod config;
pub mod input;
pub mod quadrature;
pub mod sink;
pub mod translate;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Cli;
use crate::input::supervisor::{self, SupervisorSettings};
use crate::sink::GpioSink;
use crate::translate::EventTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let cli = Cli::parse();
    let config = config::resolve(&cli)?;

    info!("Atari ST mouse simulator starting");
    debug!("Resolved configuration: {:?}", config);

    // No output capability means nothing to translate into; fail before the
    // translation loop ever starts.
    let sink = GpioSink::new(&config.pins).wrap_err("GPIO initialization failed")?;

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    let translator = EventTranslator::new(Box::new(sink), config.sensitivity, cancel.clone());
    let settings = SupervisorSettings {
        device_path: config.device_path.clone(),
        ..Default::default()
    };

    supervisor::run(settings, translator, cancel).await;

    info!("Quit");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

/// Turns operator interrupt and termination signals into a cancellation,
/// observed at every suspension point of the pipeline. Shared state is never
/// mutated from signal context.
fn spawn_signal_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                return;
            }
        };
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to install SIGHUP handler: {}", e);
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("Interrupt received, stopping"),
            _ = sigterm.recv() => info!("Termination signal received, stopping"),
            _ = sighup.recv() => info!("Hangup received, stopping"),
        }
        cancel.cancel();
    });
}
