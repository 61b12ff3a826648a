//! Command line harness: runs a char load against a virtual board.
//!
//! Usage: `char-unit-cli [CONFIG_FILE] [--start]`
//!
//! Without a configuration file, the service is configured for a board named "virtual". With
//! `--start`, a `{"char_load": "start"}` command is dispatched right away. The service is closed on
//! Ctrl-C (any pulse in flight is cancelled and its pin set back LOW).
//! Log verbosity is controlled by `RUST_LOG`.

use anyhow::{Context, Result};
use char_unit::devices::PulseEvent;
use char_unit::hardware::{Dependencies, VirtualBoard};
use char_unit::service::{CharUnitLoad, Command, Config, CHAR_LOAD, START};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Log filter: `RUST_LOG` when set and valid, `info` otherwise.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    let mut config_file = None;
    let mut start = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--start" => start = true,
            _ if arg.starts_with("--") => warn!("Ignoring unknown option {}", arg),
            _ => config_file = Some(arg),
        }
    }

    let config = match &config_file {
        Some(file) => Config::from_file(file)
            .with_context(|| format!("Could not load configuration from {}", file))?,
        None => Config::new("virtual"),
    };

    let board = VirtualBoard::new(config.board.clone()).with_pins([config.pin.clone()]);
    let dependencies = Dependencies::default().with_board(board);
    let service = CharUnitLoad::new("cli", &dependencies, config)?;
    info!("Service ready: {}", service);

    service.on(PulseEvent::OnHigh, |pin: String| async move {
        info!("Pin {} is HIGH", pin);
    });
    service.on(PulseEvent::OnLow, |pin: String| async move {
        info!("Pin {} is LOW: pulse complete", pin);
    });
    service.on(
        PulseEvent::OnFailed,
        |(pin, err): (String, char_unit::errors::Error)| async move {
            error!("Pulse on pin {} failed: {}", pin, err);
        },
    );

    if start {
        let mut command = Command::new();
        command.insert(CHAR_LOAD.into(), START.into());
        service.do_command(&command)?;
    }

    info!("Press Ctrl-C to exit");
    tokio::signal::ctrl_c().await?;

    service.close()?;
    Ok(())
}
