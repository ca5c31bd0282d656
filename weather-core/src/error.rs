use thiserror::Error;

/// Failures surfaced by the service, resolver and fetcher.
///
/// The first four variants are the domain taxonomy; the rest wrap the
/// transport, decoding and storage seams. None of them is retried or
/// recovered from locally — callers see them unchanged.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The weather endpoint answered with a success status but no body.
    #[error("weather provider returned an empty response")]
    EmptyWeatherResponse,

    /// The weather payload carried an empty `weather` array, so there is
    /// no condition entry to map.
    #[error("weather response contained no weather description")]
    MissingWeatherDescription,

    /// The geocoding call failed or returned no usable body; the pin code
    /// could not be resolved to coordinates.
    #[error("geocoding lookup for pin code '{pin_code}' returned no usable data")]
    InvalidExternalResponse { pin_code: String },

    /// The weather endpoint answered with an error status. Carries the
    /// original status and a truncated copy of the body.
    #[error("weather provider request failed with status {status}: {body}")]
    WeatherFetchFailed { status: u16, body: String },

    /// The provider body did not match the typed response schema (a
    /// required field was absent or of the wrong shape).
    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, WeatherError>;
