use chrono::NaiveDate;

use crate::error::{Result, WeatherError};
use crate::model::{Location, NewWeatherDetail, NewWeatherRecord, WeatherRecord};
use crate::provider::OpenWeatherClient;
use crate::store::Store;

/// Cache-aside service over the store and the OpenWeather client.
///
/// Every operation checks persisted state first and only goes to the network
/// on a miss; a miss fetches, persists and returns the fresh rows. Failures
/// from either side propagate unchanged — there is no retry or fallback.
#[derive(Debug, Clone)]
pub struct WeatherService {
    store: Store,
    provider: OpenWeatherClient,
    country: String,
}

impl WeatherService {
    pub fn new(store: Store, provider: OpenWeatherClient, country: String) -> Self {
        Self {
            store,
            provider,
            country,
        }
    }

    /// Weather for a (pin code, date) pair: the persisted record if one
    /// exists, otherwise resolve the location, fetch from the provider and
    /// persist the result.
    pub async fn get_weather(&self, pin_code: &str, for_date: NaiveDate) -> Result<WeatherRecord> {
        if let Some(cached) = self
            .store
            .find_weather_by_pin_code_and_date(pin_code, for_date)
            .await?
        {
            tracing::debug!(pin_code, %for_date, "serving persisted weather record");
            return Ok(cached);
        }

        let location = self.resolve_location(pin_code).await?;
        self.fetch_weather(&location, pin_code, for_date).await
    }

    /// Coordinates for a pin code: the persisted location if one exists,
    /// otherwise geocode and persist a new one (city name left unset until
    /// the first weather fetch fills it in).
    pub async fn resolve_location(&self, pin_code: &str) -> Result<Location> {
        if let Some(cached) = self.store.find_location_by_pin_code(pin_code).await? {
            return Ok(cached);
        }

        let coords = self.provider.geocode_zip(pin_code, &self.country).await?;
        let location = self
            .store
            .save_location(pin_code, coords.lat, coords.lon)
            .await?;

        tracing::info!(
            pin_code,
            latitude = location.latitude,
            longitude = location.longitude,
            "resolved new location"
        );

        Ok(location)
    }

    /// Fetch current conditions for the location, map them into a record and
    /// detail, and persist everything (city name included) in one
    /// transaction.
    pub async fn fetch_weather(
        &self,
        location: &Location,
        pin_code: &str,
        for_date: NaiveDate,
    ) -> Result<WeatherRecord> {
        let conditions = self
            .provider
            .current_weather(location.latitude, location.longitude)
            .await?;

        let entry = conditions
            .weather
            .first()
            .ok_or(WeatherError::MissingWeatherDescription)?;

        let record = NewWeatherRecord {
            pin_code: pin_code.to_string(),
            date: for_date,
            country: conditions.sys.country.clone(),
            timezone_offset: conditions.timezone as i64,
            sunrise_time: conditions.sys.sunrise as i64,
            sunset_time: conditions.sys.sunset as i64,
            location_id: location.id,
        };

        let detail = NewWeatherDetail {
            main: entry.main.clone(),
            description: entry.description.clone(),
            icon: entry.icon.clone(),
            temp: conditions.main.temp,
            feels_like: conditions.main.feels_like,
            humidity: conditions.main.humidity as i64,
            pressure: conditions.main.pressure as i64,
            cloudiness: conditions.clouds.all as i64,
            wind_speed: conditions.wind.speed,
            visibility: conditions.visibility as i64,
        };

        match self
            .store
            .insert_weather(&record, &detail, conditions.name.as_deref())
            .await?
        {
            Some(saved) => {
                tracing::info!(pin_code, %for_date, "persisted fresh weather record");
                Ok(saved)
            }
            None => {
                // A concurrent miss for the same pair won the insert race;
                // its record is the one the cache now holds.
                tracing::debug!(pin_code, %for_date, "insert raced, serving winning record");
                self.store
                    .find_weather_by_pin_code_and_date(pin_code, for_date)
                    .await?
                    .ok_or(WeatherError::Database(sqlx::Error::RowNotFound))
            }
        }
    }
}
