use thiserror::Error;

/// Failures raised while fetching, transforming, or emitting report data.
///
/// Errors that only affect a single date (`ShapeMismatch`, `Transient`, `Api`, `Decode`)
/// cause that date to be skipped. `Auth` and `SinkRejected` abort the whole pass.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A row's value count does not match the number of column headers.
    #[error("row has {values} values but the report has {headers} column headers")]
    ShapeMismatch { headers: usize, values: usize },

    /// A network-level or retriable HTTP failure (timeouts, 5xx, rate limiting).
    #[error("transient failure fetching report: {0}")]
    Transient(String),

    /// The credential provider or the API refused the credentials.
    #[error("report API rejected the credentials: {0}")]
    Auth(String),

    /// Any other non-success response from the API.
    #[error("report API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("could not decode report response: {0}")]
    Decode(String),

    /// The output sink refused a record permanently.
    #[error("output sink rejected record: {0}")]
    SinkRejected(String),

    /// Settings failed validation before any fetch took place.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReportError {
    /// Returns `true` if this error must abort the current pass rather than skip one date.
    #[must_use]
    pub const fn aborts_pass(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::SinkRejected(_) | Self::InvalidConfig(_))
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
