use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status carried by a report.
///
/// Around a single action use `Started` before and `Success`/`Failure` after;
/// for the reporter as a whole use `Started` and finally `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Started,
    Success,
    Failure,
    Warning,
    Done,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Started => write!(f, "started"),
            JobStatus::Success => write!(f, "success"),
            JobStatus::Failure => write!(f, "failure"),
            JobStatus::Warning => write!(f, "warning"),
            JobStatus::Done => write!(f, "done"),
        }
    }
}
