//! Scanmate kiosk daemon.
//!
//! Waits for button presses and scans an authorization barcode followed by a
//! product barcode, giving feedback on the RGB indicator.
//!
//! Exit status is 0 after a SIGINT/SIGTERM shutdown and 1 on configuration,
//! GPIO or scan failures. Scan failures only abandon the transaction when
//! `exit_on_scan_error = false`.

use anyhow::Context;
use clap::Parser;
use scanmate_hardware::console::ConsoleInput;
use scanmate_kiosk::{Board, Kiosk, KioskConfig, ShutdownSignal, board};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

/// Barcode scanning kiosk
#[derive(Parser, Debug)]
#[command(name = "scanmate", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drive button, LEDs and scanner from the console instead of GPIO and camera
    #[arg(long)]
    simulate: bool,

    /// Sysfs GPIO directory, overrides pins.sysfs_root
    #[arg(long, value_name = "DIR")]
    gpio_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG overrides the default level, e.g. RUST_LOG=debug for state transitions
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    info!(
        version = scanmate_kiosk::VERSION,
        button = config.pins.button,
        red = config.pins.red,
        green = config.pins.green,
        blue = config.pins.blue,
        sysfs_root = %config.pins.sysfs_root.display(),
        max_attempts = config.max_attempts,
        simulate = args.simulate,
        "scanmate starting"
    );

    let shutdown = ShutdownSignal::new();
    shutdown.listen();

    let (board, source) = if args.simulate {
        let console = ConsoleInput::stdin();
        (
            Board::console(&config.pins, console.clone()),
            board::console_scanner(console),
        )
    } else {
        let board = Board::sysfs(&config.pins)
            .await
            .context("GPIO setup failed")?;
        (board, board::command_scanner(&config.scanner))
    };

    let mut kiosk = Kiosk::from_config(board.button, board.indicator, source, &config);
    kiosk.run(&shutdown).await.context("kiosk stopped")?;

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<KioskConfig> {
    let mut config = match &args.config {
        Some(path) => KioskConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => KioskConfig::default(),
    };

    if let Some(root) = &args.gpio_root {
        config.pins.sysfs_root = root.clone();
    }

    Ok(config)
}
