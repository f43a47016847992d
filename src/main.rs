use callflow::Args;
use clap::Parser;
use log::{LevelFilter, error, info};
use std::{process, str::FromStr};

fn main() {
    // Parse configuration first
    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'info' instead.",
            args.log_level
        );
        LevelFilter::Info
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting callflow");

    // Run the application
    if let Err(err) = callflow::run(&args) {
        error!(err:err; "Run failed");
        process::exit(1);
    }

    info!("Completed successfully");
}
