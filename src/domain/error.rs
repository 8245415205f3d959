// Closed error taxonomy for the service
use thiserror::Error;

/// Every failure a handler can see. Handlers map these to HTTP status codes
/// per endpoint; nothing else crosses the handler boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or insufficient input.
    #[error("{0}")]
    Validation(String),

    /// No historical data available.
    #[error("{0}")]
    NotFound(String),

    /// A model failed to fit or forecast.
    #[error("training failed: {0}")]
    Training(String),

    /// A persisted model slot could not be deserialized.
    #[error("model slot '{slot}' is corrupt: {reason}")]
    CorruptModel { slot: String, reason: String },

    /// Anything else: store I/O, document-store query failures.
    #[error("{0}")]
    Internal(String),
}
