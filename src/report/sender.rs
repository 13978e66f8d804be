use std::sync::Arc;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::record::BaseReport;
use super::status::JobStatus;
use crate::config::{ReporterConfig, RetryConfig};
use crate::endpoint::{EnvEndpoint, ResolveEndpoint, StaticEndpoint};
use crate::error::{AttemptError, ReportError};
use crate::transport::{HttpTransport, Transport, TransportError};

/// Body the receiver sends back once a job id has already been assigned.
pub const ACK_BODY: &str = "ok";

/// Placeholder for a response body that could not be read.
pub const UNREADABLE_BODY: &str = "body could not be fetched";

/// Result of a delivered report. Only produced for 2xx responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub status: u16,
    /// Job id on the first report of a job, [`ACK_BODY`] afterwards.
    pub body: String,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers report snapshots to the event receiver with bounded retries.
#[derive(Clone)]
pub struct ReportSender {
    transport: Arc<dyn Transport>,
    endpoint: Arc<dyn ResolveEndpoint>,
    endpoint_path: String,
    retry: RetryConfig,
}

impl ReportSender {
    pub fn new(transport: Arc<dyn Transport>, endpoint: Arc<dyn ResolveEndpoint>) -> Self {
        Self {
            transport,
            endpoint,
            endpoint_path: crate::config::DEFAULT_ENDPOINT_PATH.to_string(),
            retry: RetryConfig::default(),
        }
    }

    /// HTTP sender wired from configuration. Without a configured URL the
    /// environment is consulted on every send.
    pub fn from_config(config: &ReporterConfig) -> Result<Self, TransportError> {
        let endpoint: Arc<dyn ResolveEndpoint> = match &config.event_receiver_url {
            Some(url) if !url.is_empty() => Arc::new(StaticEndpoint(url.clone())),
            _ => Arc::new(EnvEndpoint::default()),
        };
        Ok(Self::new(Arc::new(HttpTransport::new()?), endpoint)
            .with_endpoint_path(config.endpoint_path())
            .with_retry(config.retry_config()))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_endpoint_path(mut self, endpoint_path: impl Into<String>) -> Self {
        self.endpoint_path = endpoint_path.into();
        self
    }

    /// Post `report` to the receiver, retrying transport errors and non-2xx
    /// responses up to the configured attempt count.
    ///
    /// Stamps the timestamp before serializing. The first successful response
    /// for a report without a job id assigns it.
    pub async fn send(&self, report: &mut BaseReport) -> Result<SendOutcome, ReportError> {
        let base_url = self
            .endpoint
            .base_url()
            .ok_or(ReportError::MissingEndpoint)?;
        let url = format!("{base_url}{}", self.endpoint_path);

        report.timestamp = Some(Utc::now());
        if report.action_id.is_empty() {
            report.action_id = "1".to_string();
            report.action_id_n = 1;
        }
        let body = serde_json::to_vec(&*report).inspect_err(|e| {
            error!(report_id = %report.report_id(), error = %e, "failed to marshal report");
        })?;

        let attempts = self.retry.attempts();
        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            let failure = match self.transport.post_json(&url, &body).await {
                Ok(response) if response.is_success() => break response,
                Ok(response) => AttemptError::Status {
                    status: response.status,
                    body: response
                        .body
                        .unwrap_or_else(|| UNREADABLE_BODY.to_string()),
                },
                Err(e) => AttemptError::Transport(e),
            };

            warn!(
                attempt,
                report_id = %report.report_id(),
                %url,
                reason = %failure,
                "failed posting report"
            );
            if attempt >= attempts {
                let err = ReportError::RetriesExhausted {
                    attempts: attempt,
                    report_id: report.report_id(),
                    url,
                    source: failure,
                };
                error!(error = %err, "giving up on report");
                return Err(err);
            }
            sleep(self.retry.delay()).await;
        };

        let body = match response.body {
            Some(body) => {
                if report.job_id.is_empty() && !body.is_empty() && body != ACK_BODY {
                    report.job_id = body.clone();
                    info!(job_id = %report.job_id, "generated jobID");
                }
                body
            }
            None => UNREADABLE_BODY.to_string(),
        };

        Ok(SendOutcome {
            status: response.status,
            body,
        })
    }

    /// Send a self-contained report without any shared record.
    ///
    /// `job_id` is sent as the report's job id and receives the job id the
    /// receiver assigns, if any.
    pub async fn send_immutable(
        &self,
        params: ImmutableReport,
        job_id: &mut String,
    ) -> Result<SendOutcome, ReportError> {
        let mut report = BaseReport {
            reporter: params.reporter,
            action_name: params.action,
            target: params.target,
            job_id: job_id.clone(),
            action_id_n: params.action_id.parse().unwrap_or_default(),
            action_id: params.action_id,
            status: params.status,
            ..Default::default()
        };
        if let Some(err) = params.error {
            error!(report_id = %report.report_id(), error = %err, "reporting failed action");
            report.errors.push(err);
        }

        let result = self.send(&mut report).await;
        *job_id = report.job_id;
        result
    }
}

/// Fields of a one-off report managed entirely by the caller.
#[derive(Debug, Clone, Default)]
pub struct ImmutableReport {
    pub target: String,
    pub reporter: String,
    pub action_id: String,
    pub action: String,
    pub status: JobStatus,
    pub error: Option<String>,
}
