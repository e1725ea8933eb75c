//! fieldgen CLI Binary
//!
//! Command-line interface for the fieldgen content generation pipeline.

use clap::Parser;
use fieldgen::cli::{apply_overrides, map_error, Cli, RunContext};
use fieldgen::config::ConfigLoader;
use fieldgen::logging::init_logging;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref())
        .and_then(|config| apply_overrides(config, &cli))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("fieldgen starting");

    let context = match RunContext::new(config, cli.offline) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing generator: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli).await {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}
