mod annotations;
mod record;
mod reporter;
mod sender;
mod status;

#[cfg(test)]
mod testing;

pub use annotations::{JobsAnnotations, parse_job_annotations};
pub use record::BaseReport;
pub use reporter::{Notifier, Reporter};
pub use sender::{ACK_BODY, ImmutableReport, ReportSender, SendOutcome, UNREADABLE_BODY};
pub use status::JobStatus;
