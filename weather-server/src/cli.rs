use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use weather_core::{Config, OpenWeatherClient, Store, WeatherService};

use crate::routes;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Pin-code weather HTTP service")]
pub struct Cli {
    /// Path to the TOML configuration file; defaults to the platform config
    /// directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Socket address to listen on, overriding the config file.
    #[arg(long)]
    pub bind: Option<String>,

    /// SQLite database URL, overriding the config file.
    #[arg(long)]
    pub database_url: Option<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(database_url) = self.database_url {
            config.database_url = database_url;
        }

        let store = Store::connect(&config.database_url)
            .await
            .context("Failed to open the weather database")?;

        let provider = OpenWeatherClient::with_base_urls(
            config.api_key.clone(),
            config.weather_url.clone(),
            config.geocoding_url.clone(),
        );

        let service = WeatherService::new(store, provider, config.country.clone());
        let app = routes::router(Arc::new(service));

        let listener = tokio::net::TcpListener::bind(&config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

        tracing::info!(addr = %config.bind_addr, "weather server listening");

        axum::serve(listener, app)
            .await
            .context("Server terminated unexpectedly")?;

        Ok(())
    }
}
