use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use weather_core::{WeatherError, WeatherRecord, WeatherService};

pub fn router(service: Arc<WeatherService>) -> Router {
    Router::new()
        .route("/api/weather", get(get_weather))
        .route("/health", get(health))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherQuery {
    pin_code: String,
    /// ISO-8601 calendar date, e.g. `2024-01-01`.
    for_date: NaiveDate,
}

async fn get_weather(
    State(service): State<Arc<WeatherService>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherRecord>, ApiError> {
    let record = service.get_weather(&query.pin_code, query.for_date).await?;
    Ok(Json(record))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Wrapper mapping the core error taxonomy onto documented HTTP statuses:
///
/// - `InvalidExternalResponse` → 404 (the pin code cannot be resolved)
/// - `MissingWeatherDescription` → 422
/// - `EmptyWeatherResponse`, `Decode`, `Transport` → 502
/// - `WeatherFetchFailed` → 503
/// - `Database` → 500 (details logged, not leaked)
struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.0 {
            WeatherError::InvalidExternalResponse { .. } => {
                (StatusCode::NOT_FOUND, "pin_code_not_resolved")
            }
            WeatherError::MissingWeatherDescription => {
                (StatusCode::UNPROCESSABLE_ENTITY, "missing_weather_description")
            }
            WeatherError::EmptyWeatherResponse => {
                (StatusCode::BAD_GATEWAY, "empty_weather_response")
            }
            WeatherError::Decode(_) => (StatusCode::BAD_GATEWAY, "invalid_weather_response"),
            WeatherError::Transport(_) => (StatusCode::BAD_GATEWAY, "provider_unreachable"),
            WeatherError::WeatherFetchFailed { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "weather_fetch_failed")
            }
            WeatherError::Database(err) => {
                tracing::error!(error = ?err, "database failure while serving weather");
                let body = ErrorResponse {
                    error: "internal_error",
                    message: "An internal error occurred".to_string(),
                };
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
            }
        };

        let body = ErrorResponse {
            error,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_for(err: WeatherError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn unresolved_pin_code_is_not_found() {
        let err = WeatherError::InvalidExternalResponse {
            pin_code: "000000".to_string(),
        };
        assert_eq!(status_for(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_description_is_unprocessable() {
        assert_eq!(
            status_for(WeatherError::MissingWeatherDescription),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn empty_response_is_bad_gateway() {
        assert_eq!(
            status_for(WeatherError::EmptyWeatherResponse),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn fetch_failure_is_service_unavailable() {
        let err = WeatherError::WeatherFetchFailed {
            status: 500,
            body: "upstream broke".to_string(),
        };
        assert_eq!(status_for(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn decode_failure_is_bad_gateway() {
        let err = WeatherError::Decode(serde_json::from_str::<i32>("not json").unwrap_err());
        assert_eq!(status_for(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn taxonomy_statuses_are_distinct() {
        let statuses = [
            status_for(WeatherError::EmptyWeatherResponse),
            status_for(WeatherError::MissingWeatherDescription),
            status_for(WeatherError::InvalidExternalResponse {
                pin_code: "0".to_string(),
            }),
            status_for(WeatherError::WeatherFetchFailed {
                status: 500,
                body: String::new(),
            }),
        ];

        for (i, a) in statuses.iter().enumerate() {
            for b in &statuses[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn weather_query_parses_iso_date() {
        let query: WeatherQuery =
            serde_json::from_str(r#"{"pinCode": "123456", "forDate": "2024-01-01"}"#)
                .expect("query must deserialize");

        assert_eq!(query.pin_code, "123456");
        assert_eq!(
            query.for_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
        );
    }
}
