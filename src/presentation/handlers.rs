// HTTP request handlers
use crate::application::forecast_service::ForecastOutcome;
use crate::domain::error::ServiceError;
use crate::domain::reading::AqiReading;
use crate::domain::series::{parse_timestamp, ObservedSeries};
use crate::presentation::app_state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_STEPS: usize = 6;
const DEFAULT_ZONE: &str = "Zone 1";

#[derive(Deserialize)]
pub struct TrainRequest {
    pub data: Option<Vec<ReadingDto>>,
}

#[derive(Deserialize)]
pub struct ReadingDto {
    #[serde(rename = "intervalStart")]
    pub interval_start: String,
    pub aqi: f64,
}

#[derive(Deserialize)]
pub struct ForecastRequest {
    pub steps: Option<usize>,
    pub zone: Option<String>,
    pub historical: Option<HistoricalDto>,
}

#[derive(Deserialize)]
pub struct HistoricalDto {
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub aqi: Vec<f64>,
}

#[derive(Serialize)]
pub struct ForecastResponse {
    pub forecast: ForecastBlock,
    pub historical: HistoricalBlock,
}

#[derive(Serialize)]
pub struct ForecastBlock {
    pub timestamps: Vec<String>,
    pub arima: Vec<f64>,
    pub holt_winters: Vec<f64>,
}

#[derive(Serialize)]
pub struct HistoricalBlock {
    pub timestamps: Vec<String>,
    pub aqi: Vec<f64>,
}

impl From<ForecastOutcome> for ForecastResponse {
    fn from(outcome: ForecastOutcome) -> Self {
        Self {
            forecast: ForecastBlock {
                timestamps: outcome
                    .forecast_timestamps
                    .iter()
                    .map(|t| t.to_rfc3339())
                    .collect(),
                arima: outcome.arima,
                holt_winters: outcome.holt_winters,
            },
            historical: HistoricalBlock {
                timestamps: outcome
                    .historical
                    .timestamps()
                    .iter()
                    .map(|t| t.to_rfc3339())
                    .collect(),
                aqi: outcome.historical.values().to_vec(),
            },
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Train both model slots from an inline payload.
pub async fn train(State(state): State<Arc<AppState>>, body: String) -> Response {
    let request: TrainRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "rejected /train body");
            return error_response(StatusCode::BAD_REQUEST, format!("invalid JSON payload: {e}"));
        }
    };

    let Some(data) = request.data else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing 'data' field in request".to_string(),
        );
    };
    if data.len() < 2 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "at least 2 data points are required for training".to_string(),
        );
    }

    let mut readings = Vec::with_capacity(data.len());
    for dto in data {
        match parse_timestamp(&dto.interval_start) {
            Ok(interval_start) => readings.push(AqiReading::new(interval_start, dto.aqi)),
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }

    match state.forecast_service.train(readings).await {
        Ok(()) => Json(serde_json::json!({ "status": "success" })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "training failed");
            // Every /train failure maps to 400, whether it came from
            // validation, fitting, or persistence.
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// Forecast from inline history or the document store window.
pub async fn forecast(State(state): State<Arc<AppState>>, body: String) -> Response {
    let request: ForecastRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "rejected /forecast body");
            return error_response(StatusCode::BAD_REQUEST, format!("invalid JSON payload: {e}"));
        }
    };

    let steps = request.steps.unwrap_or(DEFAULT_STEPS);
    let zone = request.zone.as_deref().unwrap_or(DEFAULT_ZONE);
    tracing::info!(steps, zone, "forecast requested");

    let inline = match request.historical {
        Some(historical) if !historical.timestamps.is_empty() && !historical.aqi.is_empty() => {
            let mut timestamps = Vec::with_capacity(historical.timestamps.len());
            for raw in &historical.timestamps {
                match parse_timestamp(raw) {
                    Ok(t) => timestamps.push(t),
                    Err(e) => return forecast_error_response(e),
                }
            }
            match ObservedSeries::from_parts(timestamps, historical.aqi) {
                Ok(series) => Some(series),
                Err(e) => return forecast_error_response(e),
            }
        }
        _ => None,
    };

    match state.forecast_service.forecast(steps, inline).await {
        Ok(outcome) => Json(ForecastResponse::from(outcome)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "forecast failed");
            forecast_error_response(e)
        }
    }
}

fn forecast_error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
