// AQI reading domain model
use chrono::{DateTime, Utc};

/// A single AQI observation. Immutable once read from a payload or the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AqiReading {
    pub interval_start: DateTime<Utc>,
    pub aqi: f64,
}

impl AqiReading {
    pub fn new(interval_start: DateTime<Utc>, aqi: f64) -> Self {
        Self { interval_start, aqi }
    }
}
