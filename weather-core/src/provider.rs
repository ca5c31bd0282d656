use reqwest::Client;
use serde::{Deserialize, Deserializer};

use crate::error::{Result, WeatherError};

pub const OPEN_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0/zip";

/// Client for the two OpenWeather endpoints the service consumes: zip
/// geocoding and current weather.
///
/// Base URLs are injectable so tests can point the client at a mock server.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    weather_url: String,
    geocoding_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_urls(
            api_key,
            OPEN_WEATHER_URL.to_string(),
            GEOCODING_URL.to_string(),
        )
    }

    pub fn with_base_urls(api_key: String, weather_url: String, geocoding_url: String) -> Self {
        Self {
            api_key,
            weather_url,
            geocoding_url,
            http: Client::new(),
        }
    }

    /// Resolve a pin code to coordinates via the zip geocoding endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::InvalidExternalResponse`] when the endpoint
    /// answers with a non-success status, an empty body, or a body without
    /// numeric `lat`/`lon` fields.
    pub async fn geocode_zip(&self, pin_code: &str, country: &str) -> Result<GeoCoordinates> {
        let zip = format!("{pin_code},{country}");

        let res = self
            .http
            .get(&self.geocoding_url)
            .query(&[("zip", zip.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() || body.trim().is_empty() {
            tracing::warn!(%status, pin_code, "geocoding request returned no usable data");
            return Err(WeatherError::InvalidExternalResponse {
                pin_code: pin_code.to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|err| {
            tracing::warn!(pin_code, %err, "geocoding response failed to decode");
            WeatherError::InvalidExternalResponse {
                pin_code: pin_code.to_string(),
            }
        })
    }

    /// Fetch current conditions for the given coordinates (metric units).
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::WeatherFetchFailed`] on an error status,
    /// [`WeatherError::EmptyWeatherResponse`] on a success status with no
    /// body, and [`WeatherError::Decode`] when the body violates the typed
    /// schema.
    pub async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        let res = self
            .http
            .get(&self.weather_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::WeatherFetchFailed {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        if body.trim().is_empty() {
            return Err(WeatherError::EmptyWeatherResponse);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Geocoding response; also the shape of the weather payload's `coord`
/// section. Both `lat` and `lon` are required.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoCoordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Typed current-weather payload.
///
/// Field policy: `coord`, `sys.country` and the first `weather` entry's
/// `description` are required; everything numeric under `main`, `wind`,
/// `clouds`, plus top-level `visibility` and `timezone` and
/// `sys.sunrise`/`sys.sunset`, is lenient — integer or float accepted,
/// absent or null defaulting to zero.
#[derive(Debug, Deserialize)]
pub struct CurrentConditions {
    pub coord: GeoCoordinates,
    pub sys: OwSys,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
    #[serde(default)]
    pub main: OwMain,
    #[serde(default)]
    pub wind: OwWind,
    #[serde(default)]
    pub clouds: OwClouds,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub visibility: f64,
    #[serde(default)]
    pub name: Option<String>,
    /// Offset from UTC in seconds.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub timezone: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwSys {
    pub country: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sunrise: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sunset: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCondition {
    #[serde(default)]
    pub main: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OwMain {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temp: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub feels_like: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub humidity: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pressure: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OwWind {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OwClouds {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub all: f64,
}

/// Accepts integer or float JSON numbers; absent and explicit `null` both
/// become `0.0`, the documented lenient default.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
