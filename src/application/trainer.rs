// Model trainer - fixed-configuration wrappers over the forecasting library
use crate::domain::error::ServiceError;
use crate::domain::series::ObservedSeries;
use anofox_forecast::core::TimeSeries;
use anofox_forecast::models::arima::ARIMA;
use anofox_forecast::models::exponential::HoltLinearTrend;
use anofox_forecast::models::{BoxedForecaster, Forecaster};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two model slots. Each maps to one persisted file and one fixed model
/// configuration; slots are independent and may be retrained at different
/// times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    Arima,
    HoltWinters,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Arima, Algorithm::HoltWinters];

    /// Slot name, doubling as the persisted filename stem.
    pub fn slot(self) -> &'static str {
        match self {
            Algorithm::Arima => "arima_model",
            Algorithm::HoltWinters => "hw_model",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Arima => "ARIMA",
            Algorithm::HoltWinters => "Holt-Winters",
        }
    }
}

/// Fit one algorithm on a series. ARIMA uses a fixed (1, 0, 0) order with no
/// automatic selection; the smoothing model is an additive linear trend with
/// no seasonal component and optimized smoothing parameters. Both fits are
/// deterministic.
pub fn fit(algorithm: Algorithm, series: &TimeSeries) -> Result<BoxedForecaster, ServiceError> {
    let mut model: BoxedForecaster = match algorithm {
        Algorithm::Arima => Box::new(ARIMA::new(1, 0, 0)),
        Algorithm::HoltWinters => Box::new(HoltLinearTrend::auto()),
    };
    model
        .fit(series)
        .map_err(|e| ServiceError::Training(format!("{}: {e}", algorithm.label())))?;
    Ok(model)
}

/// Produce exactly `steps` point predictions from a fitted model.
pub fn forecast(
    algorithm: Algorithm,
    model: &BoxedForecaster,
    steps: usize,
) -> Result<Vec<f64>, ServiceError> {
    let prediction = model
        .predict(steps)
        .map_err(|e| ServiceError::Training(format!("{} forecast: {e}", algorithm.label())))?;
    Ok(prediction.primary().to_vec())
}

/// The persisted form of a trained slot. The library's fitted models are not
/// serializable, so the artifact captures the exact training series instead;
/// loading refits, and because fitting is deterministic the reloaded model
/// forecasts identically to the one it was saved from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub algorithm: Algorithm,
    pub trained_at: DateTime<Utc>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

impl ModelArtifact {
    pub fn from_series(algorithm: Algorithm, series: &ObservedSeries) -> Self {
        Self {
            algorithm,
            trained_at: Utc::now(),
            timestamps: series.timestamps().to_vec(),
            values: series.values().to_vec(),
        }
    }

    /// Rehydrate the trained model this artifact was saved from.
    pub fn to_model(&self) -> Result<BoxedForecaster, ServiceError> {
        let series = ObservedSeries::from_parts(self.timestamps.clone(), self.values.clone())?;
        fit(self.algorithm, &series.to_time_series()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn trending_series(n: usize) -> ObservedSeries {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let readings = (0..n)
            .map(|i| {
                crate::domain::reading::AqiReading::new(
                    base + Duration::minutes(10 * i as i64),
                    40.0 + i as f64 * 1.5 + if i % 2 == 0 { 0.8 } else { -0.8 },
                )
            })
            .collect();
        ObservedSeries::from_readings(readings)
    }

    #[test]
    fn both_algorithms_fit_and_forecast_requested_steps() {
        let ts = trending_series(30).to_time_series().unwrap();

        for algorithm in Algorithm::ALL {
            let model = fit(algorithm, &ts).unwrap();
            let values = forecast(algorithm, &model, 6).unwrap();
            assert_eq!(values.len(), 6, "{} horizon", algorithm.label());
            assert!(values.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn fitting_is_deterministic() {
        let ts = trending_series(30).to_time_series().unwrap();

        for algorithm in Algorithm::ALL {
            let first = forecast(algorithm, &fit(algorithm, &ts).unwrap(), 8).unwrap();
            let second = forecast(algorithm, &fit(algorithm, &ts).unwrap(), 8).unwrap();
            assert_eq!(first, second, "{}", algorithm.label());
        }
    }

    #[test]
    fn degenerate_series_is_a_training_error() {
        // ARIMA(1,0,0) needs at least 3 observations.
        let ts = trending_series(2).to_time_series().unwrap();
        assert!(matches!(
            fit(Algorithm::Arima, &ts),
            Err(ServiceError::Training(_))
        ));
    }

    #[test]
    fn artifact_round_trip_forecasts_identically() {
        let series = trending_series(24);
        let ts = series.to_time_series().unwrap();

        for algorithm in Algorithm::ALL {
            let live = fit(algorithm, &ts).unwrap();
            let artifact = ModelArtifact::from_series(algorithm, &series);
            let reloaded = artifact.to_model().unwrap();

            assert_eq!(
                forecast(algorithm, &live, 6).unwrap(),
                forecast(algorithm, &reloaded, 6).unwrap(),
            );
        }
    }

    #[test]
    fn slot_names_are_stable() {
        assert_eq!(Algorithm::Arima.slot(), "arima_model");
        assert_eq!(Algorithm::HoltWinters.slot(), "hw_model");
    }
}
