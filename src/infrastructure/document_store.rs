// Document store repository - Mongo Data-API-style HTTP client
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::AqiReading;
use crate::domain::series::parse_timestamp;
use crate::infrastructure::config::DocumentStoreSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Read-only client for the readings collection, queried over the store's
/// HTTP `find` action with a range filter on `intervalStart` and an ascending
/// sort.
#[derive(Debug, Clone)]
pub struct DocumentStoreRepository {
    base_url: String,
    api_key: String,
    data_source: String,
    database: String,
    collection: String,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    documents: Vec<serde_json::Value>,
}

impl DocumentStoreRepository {
    pub fn new(settings: DocumentStoreSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            data_source: settings.data_source,
            database: settings.database,
            collection: settings.collection,
        }
    }

    async fn find(&self, filter: serde_json::Value, limit: Option<u32>) -> Result<FindResponse> {
        let url = format!("{}/action/find", self.base_url);
        let mut body = serde_json::json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": self.collection,
            "filter": filter,
            "sort": { "intervalStart": 1 },
        });
        if let Some(limit) = limit {
            body["limit"] = serde_json::json!(limit);
        }

        let client = reqwest::Client::new();
        let response = client
            .post(&url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to document store")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("document store query failed with status {}: {}", status, body);
        }

        response
            .json::<FindResponse>()
            .await
            .context("Failed to parse document store response")
    }

    /// Cheap connectivity probe used at startup. Failure is reported, never
    /// treated as fatal.
    pub async fn ping(&self) -> Result<()> {
        self.find(serde_json::json!({}), Some(1)).await.map(|_| ())
    }
}

#[async_trait]
impl ReadingRepository for DocumentStoreRepository {
    async fn readings_since(&self, since: DateTime<Utc>) -> Result<Vec<AqiReading>> {
        let filter = serde_json::json!({
            "intervalStart": { "$gte": { "$date": since.to_rfc3339() } }
        });
        let response = self.find(filter, None).await?;

        // Rows with a missing or unreadable field are skipped rather than
        // failing the whole query.
        let mut readings = Vec::with_capacity(response.documents.len());
        for document in &response.documents {
            match parse_document(document) {
                Some(reading) => readings.push(reading),
                None => tracing::warn!(%document, "skipping malformed reading document"),
            }
        }
        Ok(readings)
    }
}

fn parse_document(document: &serde_json::Value) -> Option<AqiReading> {
    let aqi = document.get("aqi")?.as_f64()?;
    let interval_start = parse_store_date(document.get("intervalStart")?)?;
    Some(AqiReading::new(interval_start, aqi))
}

/// Timestamps arrive either as plain ISO-8601 strings or in extended-JSON
/// `$date` envelopes (string or millisecond forms).
fn parse_store_date(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(raw) => parse_timestamp(raw).ok(),
        serde_json::Value::Object(map) => match map.get("$date")? {
            serde_json::Value::String(raw) => parse_timestamp(raw).ok(),
            serde_json::Value::Number(millis) => {
                DateTime::from_timestamp_millis(millis.as_i64()?)
            }
            serde_json::Value::Object(inner) => {
                let millis: i64 = inner.get("$numberLong")?.as_str()?.parse().ok()?;
                DateTime::from_timestamp_millis(millis)
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_plain_and_extended_json_dates() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let plain = serde_json::json!("2024-03-01T12:00:00Z");
        assert_eq!(parse_store_date(&plain), Some(expected));

        let wrapped = serde_json::json!({ "$date": "2024-03-01T12:00:00Z" });
        assert_eq!(parse_store_date(&wrapped), Some(expected));

        let millis = serde_json::json!({ "$date": expected.timestamp_millis() });
        assert_eq!(parse_store_date(&millis), Some(expected));

        let number_long = serde_json::json!({
            "$date": { "$numberLong": expected.timestamp_millis().to_string() }
        });
        assert_eq!(parse_store_date(&number_long), Some(expected));

        assert_eq!(parse_store_date(&serde_json::json!(42)), None);
    }

    #[test]
    fn malformed_documents_are_skipped() {
        assert!(parse_document(&serde_json::json!({ "aqi": 42.0 })).is_none());
        assert!(parse_document(&serde_json::json!({
            "intervalStart": "2024-03-01T12:00:00Z"
        }))
        .is_none());

        let good = parse_document(&serde_json::json!({
            "intervalStart": "2024-03-01T12:00:00Z",
            "aqi": 87.5
        }))
        .unwrap();
        assert_eq!(good.aqi, 87.5);
    }
}
