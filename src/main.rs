use std::process::ExitCode;

use tracing::{error, info};

use eforice::{bootstrap, Config, EforiceError, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(EforiceError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = eforice::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        eforice::logging::init_console_only(&config.logging.level);
    }

    info!("eforice starting");

    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let base_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!("Cannot determine working directory: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = match bootstrap(config, &base_dir).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match WebServer::new(ctx) {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
