//! Status reporting for jobs that span several stages and processes.
//!
//! A [`Reporter`] owns the current [`BaseReport`] of one job stage. Field
//! updates are serialized on the report; updates that ask for transmission are
//! posted to the event receiver in the background by a [`ReportSender`], which
//! retries a bounded number of times. Stages running in different processes
//! continue the same job through [`JobsAnnotations`].

pub mod config;
pub mod endpoint;
pub mod error;
pub mod report;
pub mod transport;

pub use config::{ReporterConfig, RetryConfig};
pub use endpoint::{EnvEndpoint, ResolveEndpoint, StaticEndpoint};
pub use error::{AttemptError, ReportError};
pub use report::{
    BaseReport, ImmutableReport, JobStatus, JobsAnnotations, Notifier, ReportSender, Reporter,
    SendOutcome, parse_job_annotations,
};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};
