//! The `errboard` binary.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eb_dash::Cli;
use eb_dash::config::Config;
use eb_dash::run::{self, Clock, Outcome};

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    // Read before the runtime exists.
    let clock = Clock::local();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(run::execute(&cli.command, &config, clock))?;

    match outcome {
        Outcome::Rendered(body) => {
            println!("{body}");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Unavailable(message) => {
            println!("{message}");
            Ok(ExitCode::FAILURE)
        }
    }
}
