// Repository trait for historical AQI readings
use crate::domain::reading::AqiReading;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// All readings with `interval_start >= since`, ascending by interval start.
    async fn readings_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<AqiReading>>;
}

/// In-memory stand-in for the document store.
#[cfg(test)]
pub struct FakeReadingRepository {
    pub readings: Vec<AqiReading>,
}

#[cfg(test)]
#[async_trait]
impl ReadingRepository for FakeReadingRepository {
    async fn readings_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<AqiReading>> {
        let mut matching: Vec<AqiReading> = self
            .readings
            .iter()
            .filter(|r| r.interval_start >= since)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.interval_start);
        Ok(matching)
    }
}
