//! Core library for the pin-code weather service.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather client (geocoding + current weather)
//! - The SQLite store backing the cache
//! - The cache-aside service tying the three together
//! - Shared domain models and the error taxonomy
//!
//! It is used by `weather-server`, but can also be reused by other binaries.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{Result, WeatherError};
pub use model::{Location, WeatherDetail, WeatherRecord};
pub use provider::OpenWeatherClient;
pub use service::WeatherService;
pub use store::Store;
