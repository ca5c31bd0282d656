use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Resolved coordinates for a pin code.
///
/// Created on first resolution, never deleted; `city_name` is filled in
/// later from the weather payload once it is known.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub pin_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city_name: Option<String>,
}

/// The cached weather result for a (pin code, date) pair.
///
/// Unique per pair and immutable once created. Serializes with its location
/// and detail list nested, matching the public API shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub id: i64,
    pub pin_code: String,
    pub date: NaiveDate,
    pub country: String,
    /// Offset from UTC in seconds.
    pub timezone_offset: i64,
    /// Sunrise as a unix timestamp (seconds).
    pub sunrise_time: i64,
    /// Sunset as a unix timestamp (seconds).
    pub sunset_time: i64,
    pub location: Location,
    pub weather_details: Vec<WeatherDetail>,
}

/// Observed measurements attached to a [`WeatherRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDetail {
    pub id: i64,
    /// Parent record id. Never serialized: the detail is only ever emitted
    /// nested inside its record and the back-reference would form a cycle.
    #[serde(skip_serializing)]
    pub weather_record_id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub pressure: i64,
    pub cloudiness: i64,
    pub wind_speed: f64,
    pub visibility: i64,
}

/// Insert input for a weather record row.
#[derive(Debug, Clone)]
pub struct NewWeatherRecord {
    pub pin_code: String,
    pub date: NaiveDate,
    pub country: String,
    pub timezone_offset: i64,
    pub sunrise_time: i64,
    pub sunset_time: i64,
    pub location_id: i64,
}

/// Insert input for the detail row of a freshly fetched record.
#[derive(Debug, Clone)]
pub struct NewWeatherDetail {
    pub main: String,
    pub description: String,
    pub icon: String,
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub pressure: i64,
    pub cloudiness: i64,
    pub wind_speed: f64,
    pub visibility: i64,
}
