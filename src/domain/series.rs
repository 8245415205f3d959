// Series builder - turns readings or raw pairs into a time-ordered series
use crate::domain::error::ServiceError;
use crate::domain::reading::AqiReading;
use anofox_forecast::core::TimeSeries;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Forecasts are emitted on a fixed 10-minute cadence regardless of the
/// (possibly irregular) input cadence.
pub const FORECAST_STEP_MINUTES: i64 = 10;

/// A time-ordered, equal-length series of AQI observations. Built fresh per
/// request, never persisted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl ObservedSeries {
    /// Build from readings. Lengths are equal by construction; pairs are
    /// sorted by interval start.
    pub fn from_readings(readings: Vec<AqiReading>) -> Self {
        let mut pairs: Vec<(DateTime<Utc>, f64)> = readings
            .into_iter()
            .map(|r| (r.interval_start, r.aqi))
            .collect();
        pairs.sort_by_key(|p| p.0);
        let (timestamps, values) = pairs.into_iter().unzip();
        Self { timestamps, values }
    }

    /// Build from separate timestamp/value arrays, as submitted inline on
    /// /forecast. Empty or length-mismatched input is rejected.
    pub fn from_parts(
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
    ) -> Result<Self, ServiceError> {
        if timestamps.is_empty() || values.is_empty() || timestamps.len() != values.len() {
            return Err(ServiceError::Validation(
                "invalid or missing historical data".to_string(),
            ));
        }
        let readings = timestamps
            .into_iter()
            .zip(values)
            .map(|(t, v)| AqiReading::new(t, v))
            .collect();
        Ok(Self::from_readings(readings))
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Convert into the forecasting library's series type. The library
    /// re-validates ordering, so duplicate timestamps surface here.
    pub fn to_time_series(&self) -> Result<TimeSeries, ServiceError> {
        TimeSeries::univariate(self.timestamps.clone(), self.values.clone())
            .map_err(|e| ServiceError::Validation(format!("cannot build time series: {e}")))
    }

    /// Future timestamps for a forecast of `steps` points: starts one step
    /// after the last observation, spaced FORECAST_STEP_MINUTES apart.
    pub fn future_timestamps(&self, steps: usize) -> Vec<DateTime<Utc>> {
        let Some(last) = self.last_timestamp() else {
            return Vec::new();
        };
        (1..=steps as i64)
            .map(|i| last + Duration::minutes(FORECAST_STEP_MINUTES * i))
            .collect()
    }
}

/// Parse an ISO-8601 timestamp from an inline payload. Accepts RFC 3339 with
/// an offset, a naive datetime (taken as UTC), or a bare date.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default()));
    }
    Err(ServiceError::Validation(format!(
        "invalid timestamp '{raw}': expected ISO-8601"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(minute: u32, aqi: f64) -> AqiReading {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap();
        AqiReading::new(t, aqi)
    }

    #[test]
    fn from_readings_sorts_by_time() {
        let series =
            ObservedSeries::from_readings(vec![reading(30, 3.0), reading(10, 1.0), reading(20, 2.0)]);

        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
        assert!(series.timestamps().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn from_parts_rejects_mismatched_lengths() {
        let timestamps = vec![
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 10, 0).unwrap(),
        ];
        let result = ObservedSeries::from_parts(timestamps, vec![1.0]);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn from_parts_rejects_empty_input() {
        let result = ObservedSeries::from_parts(vec![], vec![]);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn future_timestamps_are_ten_minutes_apart() {
        let series = ObservedSeries::from_readings(vec![reading(0, 1.0), reading(10, 2.0)]);
        let future = series.future_timestamps(6);

        assert_eq!(future.len(), 6);
        assert_eq!(
            future[0],
            series.last_timestamp().unwrap() + Duration::minutes(10)
        );
        assert!(future
            .windows(2)
            .all(|w| w[1] - w[0] == Duration::minutes(10)));
    }

    #[test]
    fn to_time_series_rejects_duplicate_timestamps() {
        let series = ObservedSeries::from_readings(vec![reading(0, 1.0), reading(0, 2.0)]);
        assert!(matches!(
            series.to_time_series(),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn parse_timestamp_accepts_offset_and_naive_forms() {
        let with_offset = parse_timestamp("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(with_offset, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());

        let naive = parse_timestamp("2024-03-01T12:00:00").unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());

        let date_only = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(date_only, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());

        assert!(parse_timestamp("yesterday").is_err());
    }
}
