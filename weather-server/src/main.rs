//! Binary crate for the pin-code weather HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Loading configuration and wiring up the core service
//! - Serving the HTTP API

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
