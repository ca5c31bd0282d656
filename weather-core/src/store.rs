use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::Result;
use crate::model::{Location, NewWeatherDetail, NewWeatherRecord, WeatherDetail, WeatherRecord};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pin_code TEXT NOT NULL UNIQUE,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        city_name TEXT
    )",
    "CREATE TABLE IF NOT EXISTS weather_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pin_code TEXT NOT NULL,
        date TEXT NOT NULL,
        country TEXT NOT NULL,
        timezone_offset INTEGER NOT NULL,
        sunrise_time INTEGER NOT NULL,
        sunset_time INTEGER NOT NULL,
        location_id INTEGER NOT NULL REFERENCES locations(id),
        UNIQUE(pin_code, date)
    )",
    "CREATE TABLE IF NOT EXISTS weather_details (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        weather_record_id INTEGER NOT NULL
            REFERENCES weather_records(id) ON DELETE CASCADE,
        main TEXT NOT NULL,
        description TEXT NOT NULL,
        icon TEXT NOT NULL,
        temp REAL NOT NULL,
        feels_like REAL NOT NULL,
        humidity INTEGER NOT NULL,
        pressure INTEGER NOT NULL,
        cloudiness INTEGER NOT NULL,
        wind_speed REAL NOT NULL,
        visibility INTEGER NOT NULL
    )",
];

/// SQLite store behind the cache: one table per entity, lookups and saves
/// keyed the way the service queries them.
///
/// Uniqueness of `locations.pin_code` and `weather_records.(pin_code, date)`
/// is enforced by the schema; writers use insert-or-reject so concurrent
/// misses for the same key converge on a single row.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct WeatherRecordRow {
    id: i64,
    pin_code: String,
    date: NaiveDate,
    country: String,
    timezone_offset: i64,
    sunrise_time: i64,
    sunset_time: i64,
    location_id: i64,
}

impl Store {
    /// Open (creating if missing) the database and ensure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        tracing::debug!(database_url, "database schema ready");

        Ok(Self { pool })
    }

    pub async fn find_location_by_pin_code(&self, pin_code: &str) -> Result<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(
            "SELECT id, pin_code, latitude, longitude, city_name
             FROM locations WHERE pin_code = ?",
        )
        .bind(pin_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(location)
    }

    /// Persist a freshly resolved location (city name unset).
    ///
    /// A concurrent insert of the same pin code is absorbed: the insert is
    /// rejected by `UNIQUE(pin_code)` and the already-persisted row is
    /// returned instead.
    pub async fn save_location(
        &self,
        pin_code: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Location> {
        sqlx::query(
            "INSERT INTO locations (pin_code, latitude, longitude) VALUES (?, ?, ?)
             ON CONFLICT(pin_code) DO NOTHING",
        )
        .bind(pin_code)
        .bind(latitude)
        .bind(longitude)
        .execute(&self.pool)
        .await?;

        let location = sqlx::query_as::<_, Location>(
            "SELECT id, pin_code, latitude, longitude, city_name
             FROM locations WHERE pin_code = ?",
        )
        .bind(pin_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(location)
    }

    pub async fn find_weather_by_pin_code_and_date(
        &self,
        pin_code: &str,
        date: NaiveDate,
    ) -> Result<Option<WeatherRecord>> {
        let Some(row) = sqlx::query_as::<_, WeatherRecordRow>(
            "SELECT id, pin_code, date, country, timezone_offset,
                    sunrise_time, sunset_time, location_id
             FROM weather_records WHERE pin_code = ? AND date = ?",
        )
        .bind(pin_code)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let location = sqlx::query_as::<_, Location>(
            "SELECT id, pin_code, latitude, longitude, city_name
             FROM locations WHERE id = ?",
        )
        .bind(row.location_id)
        .fetch_one(&self.pool)
        .await?;

        let weather_details = sqlx::query_as::<_, WeatherDetail>(
            "SELECT id, weather_record_id, main, description, icon, temp, feels_like,
                    humidity, pressure, cloudiness, wind_speed, visibility
             FROM weather_details WHERE weather_record_id = ? ORDER BY id",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(WeatherRecord {
            id: row.id,
            pin_code: row.pin_code,
            date: row.date,
            country: row.country,
            timezone_offset: row.timezone_offset,
            sunrise_time: row.sunrise_time,
            sunset_time: row.sunset_time,
            location,
            weather_details,
        }))
    }

    /// Persist one fetched observation: the location's city name, the record
    /// and its detail, in a single transaction.
    ///
    /// Returns `Ok(None)` when another writer persisted the same
    /// (pin code, date) first — nothing of this call survives in that case
    /// and the caller should serve the winner's record.
    pub async fn insert_weather(
        &self,
        record: &NewWeatherRecord,
        detail: &NewWeatherDetail,
        city_name: Option<&str>,
    ) -> Result<Option<WeatherRecord>> {
        let mut tx = self.pool.begin().await?;

        if let Some(city) = city_name {
            sqlx::query("UPDATE locations SET city_name = ? WHERE id = ?")
                .bind(city)
                .bind(record.location_id)
                .execute(&mut *tx)
                .await?;
        }

        let inserted = sqlx::query(
            "INSERT INTO weather_records
                 (pin_code, date, country, timezone_offset, sunrise_time, sunset_time, location_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(pin_code, date) DO NOTHING",
        )
        .bind(&record.pin_code)
        .bind(record.date)
        .bind(&record.country)
        .bind(record.timezone_offset)
        .bind(record.sunrise_time)
        .bind(record.sunset_time)
        .bind(record.location_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let record_id = inserted.last_insert_rowid();

        let detail_inserted = sqlx::query(
            "INSERT INTO weather_details
                 (weather_record_id, main, description, icon, temp, feels_like,
                  humidity, pressure, cloudiness, wind_speed, visibility)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record_id)
        .bind(&detail.main)
        .bind(&detail.description)
        .bind(&detail.icon)
        .bind(detail.temp)
        .bind(detail.feels_like)
        .bind(detail.humidity)
        .bind(detail.pressure)
        .bind(detail.cloudiness)
        .bind(detail.wind_speed)
        .bind(detail.visibility)
        .execute(&mut *tx)
        .await?;

        let detail_id = detail_inserted.last_insert_rowid();

        let location = sqlx::query_as::<_, Location>(
            "SELECT id, pin_code, latitude, longitude, city_name
             FROM locations WHERE id = ?",
        )
        .bind(record.location_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(WeatherRecord {
            id: record_id,
            pin_code: record.pin_code.clone(),
            date: record.date,
            country: record.country.clone(),
            timezone_offset: record.timezone_offset,
            sunrise_time: record.sunrise_time,
            sunset_time: record.sunset_time,
            location,
            weather_details: vec![WeatherDetail {
                id: detail_id,
                weather_record_id: record_id,
                main: detail.main.clone(),
                description: detail.description.clone(),
                icon: detail.icon.clone(),
                temp: detail.temp,
                feels_like: detail.feels_like,
                humidity: detail.humidity,
                pressure: detail.pressure,
                cloudiness: detail.cloudiness,
                wind_speed: detail.wind_speed,
                visibility: detail.visibility,
            }],
        }))
    }
}
