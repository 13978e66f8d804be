use thiserror::Error;

use crate::transport::TransportError;

/// Status code reported for sends that never reached a 2xx response.
pub const FAILED_SEND_STATUS: u16 = 500;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("event receiver URL is not configured (set CA_EVENT_RECEIVER_HTTP)")]
    MissingEndpoint,

    #[error("Couldn't marshall report object: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unable to parse job annotations: {0}")]
    Annotations(#[source] serde_json::Error),

    #[error(
        "attempt #{attempts} {report_id} - Failed posting report. Url: '{url}', reason: '{source}'"
    )]
    RetriesExhausted {
        attempts: u32,
        report_id: String,
        url: String,
        #[source]
        source: AttemptError,
    },
}

impl ReportError {
    /// HTTP-equivalent status for this failure. A failed send never carries
    /// a 2xx status, so every variant maps to [`FAILED_SEND_STATUS`].
    pub fn status_code(&self) -> u16 {
        FAILED_SEND_STATUS
    }
}

/// Why a single POST attempt did not count as delivered.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("receiver returned status {status}: {body}")]
    Status { status: u16, body: String },
}
