use terminal_emulator::app::Emulator;
use terminal_emulator::console;
use terminal_emulator::env::try_load_dotenv;
use terminal_emulator::error::EmulatorError;
use terminal_emulator::logger::{initialize as LoggerInitialize, parse_level};

use terminal_core::config::EmulatorConfig;

use std::fs::create_dir_all;
use std::process::ExitCode;

use log::{debug, error, info, warn};
use tokio::signal::ctrl_c;
use tokio::spawn as TokioSpawn;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("terminal-emulator: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), EmulatorError> {
    let env = try_load_dotenv();

    let config_dir = EmulatorConfig::config_dir();
    let mut config = EmulatorConfig::load(&config_dir)?;
    config.apply_overrides(|name| std::env::var(name).ok())?;

    create_dir_all(&config.logging.directory).map_err(|e| {
        EmulatorError::emulator(format!(
            "Failed to create log directory {}: {e}",
            config.logging.directory.display()
        ))
    })?;

    // Initialize logger FIRST
    LoggerInitialize(
        &config.logging.directory,
        parse_level(config.logging.level.as_deref())?,
    )?;

    info!("Terminal emulator starting");
    info!("Config directory: {}", config_dir.display());
    match (&env.path, &env.error) {
        (Some(path), _) => info!("Loaded .env from: {}", path.display()),
        (None, Some(e)) => warn!("Failed to parse .env at {e}"),
        (None, None) => debug!("No .env file found"),
    }

    let emulator = Emulator::start(&config).await?;
    info!(
        "Serving JSONRPC on ws://{}{}",
        emulator.local_addr(),
        config.server.path
    );

    if config.console.enabled {
        TokioSpawn(console::run(
            console::spawn_stdin_reader(),
            emulator.adapter().clone(),
        ));
        info!("Console ready; type 'status' to inspect the terminal");
    }

    ctrl_c()
        .await
        .map_err(|e| EmulatorError::emulator(format!("Failed to listen for Ctrl-C: {e}")))?;

    info!("Shutdown requested");
    emulator.shutdown().await;
    info!("Terminal emulator stopped");

    Ok(())
}
