// Forecast service - model lifecycle and series resolution
use crate::application::reading_repository::ReadingRepository;
use crate::application::trainer::{self, Algorithm, ModelArtifact};
use crate::domain::error::ServiceError;
use crate::domain::reading::AqiReading;
use crate::domain::series::ObservedSeries;
use crate::infrastructure::model_store::{ModelStore, ModelStoreError};
use anofox_forecast::core::TimeSeries;
use anofox_forecast::models::BoxedForecaster;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// When no inline history is supplied, /forecast pulls this many days of
/// readings from the document store.
const HISTORY_WINDOW_DAYS: i64 = 7;

pub struct ForecastOutcome {
    pub forecast_timestamps: Vec<DateTime<Utc>>,
    pub arima: Vec<f64>,
    pub holt_winters: Vec<f64>,
    /// The normalized series the request resolved to, echoed back to the
    /// caller as an audit trail.
    pub historical: ObservedSeries,
}

pub struct ForecastService {
    repository: Arc<dyn ReadingRepository>,
    store: ModelStore,
    /// Guards every save and every load-maybe-retrain-save sequence over the
    /// slot files. The store itself has no locking.
    models_lock: Mutex<()>,
}

impl ForecastService {
    pub fn new(repository: Arc<dyn ReadingRepository>, store: ModelStore) -> Self {
        Self {
            repository,
            store,
            models_lock: Mutex::new(()),
        }
    }

    /// Train both model slots from caller-supplied readings and persist them.
    /// Neither slot is overwritten unless both algorithms fit.
    pub async fn train(&self, readings: Vec<AqiReading>) -> Result<(), ServiceError> {
        if readings.len() < 2 {
            return Err(ServiceError::Validation(
                "at least 2 data points are required for training".to_string(),
            ));
        }

        let series = ObservedSeries::from_readings(readings);
        let time_series = series.to_time_series()?;
        for algorithm in Algorithm::ALL {
            trainer::fit(algorithm, &time_series)?;
        }

        let _guard = self.models_lock.lock().await;
        self.persist_slots(&series)?;
        tracing::info!(observations = series.len(), "both model slots trained and persisted");
        Ok(())
    }

    /// Produce a `steps`-point forecast from each slot. The series comes from
    /// the inline payload when one was supplied, otherwise from the last
    /// seven days of readings in the document store.
    pub async fn forecast(
        &self,
        steps: usize,
        inline: Option<ObservedSeries>,
    ) -> Result<ForecastOutcome, ServiceError> {
        let series = match inline {
            Some(series) => series,
            None => self.query_recent_series().await?,
        };
        let time_series = series.to_time_series()?;

        let (arima_model, hw_model) = self.resolve_models(&series, &time_series).await?;

        let arima = trainer::forecast(Algorithm::Arima, &arima_model, steps)?;
        let holt_winters = trainer::forecast(Algorithm::HoltWinters, &hw_model, steps)?;
        let forecast_timestamps = series.future_timestamps(steps);

        tracing::info!(steps, observations = series.len(), "forecast generated");
        Ok(ForecastOutcome {
            forecast_timestamps,
            arima,
            holt_winters,
            historical: series,
        })
    }

    async fn query_recent_series(&self) -> Result<ObservedSeries, ServiceError> {
        let since = Utc::now() - Duration::days(HISTORY_WINDOW_DAYS);
        tracing::info!(%since, "querying document store for recent readings");
        let readings = self
            .repository
            .readings_since(since)
            .await
            .map_err(|e| ServiceError::Internal(format!("document store query failed: {e}")))?;
        tracing::info!(count = readings.len(), "readings fetched");

        if readings.is_empty() {
            return Err(ServiceError::NotFound(
                "no historical data available in database".to_string(),
            ));
        }
        Ok(ObservedSeries::from_readings(readings))
    }

    /// Load both persisted slots. A missing file for either slot retrains
    /// both from the just-built series and rewrites both files, so the slots
    /// always hold models trained on the same window. Retrain-both on a
    /// single miss is deliberate policy, not an accident of control flow.
    async fn resolve_models(
        &self,
        series: &ObservedSeries,
        time_series: &TimeSeries,
    ) -> Result<(BoxedForecaster, BoxedForecaster), ServiceError> {
        let _guard = self.models_lock.lock().await;

        let arima = self.store.load(Algorithm::Arima.slot());
        let hw = self.store.load(Algorithm::HoltWinters.slot());

        let any_missing = matches!(&arima, Err(ModelStoreError::NotFound(_)))
            || matches!(&hw, Err(ModelStoreError::NotFound(_)));
        if any_missing {
            tracing::warn!("model slot missing, retraining both models");
            let arima_model = trainer::fit(Algorithm::Arima, time_series)?;
            let hw_model = trainer::fit(Algorithm::HoltWinters, time_series)?;
            self.persist_slots(series)?;
            return Ok((arima_model, hw_model));
        }

        let arima = arima.map_err(store_error)?;
        let hw = hw.map_err(store_error)?;
        Ok((arima.to_model()?, hw.to_model()?))
    }

    /// Overwrite both slot files from the given series. Callers hold the
    /// model lock.
    fn persist_slots(&self, series: &ObservedSeries) -> Result<(), ServiceError> {
        for algorithm in Algorithm::ALL {
            let artifact = ModelArtifact::from_series(algorithm, series);
            self.store
                .save(algorithm.slot(), &artifact)
                .map_err(store_error)?;
        }
        Ok(())
    }
}

fn store_error(err: ModelStoreError) -> ServiceError {
    match err {
        ModelStoreError::Corrupt { slot, reason } => ServiceError::CorruptModel { slot, reason },
        other => ServiceError::Internal(other.to_string()),
    }
}
