use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::JobStatus;

/// The reportable state of one action within a job.
///
/// Serialized as-is as the body of every POST to the event receiver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseReport {
    /// Tenant the report belongs to.
    #[serde(rename = "customerGUID", default)]
    pub customer_guid: String,
    /// Component emitting the report.
    #[serde(default)]
    pub reporter: String,
    /// What the action is applied to (workload id, cluster, namespace...).
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub status: JobStatus,
    /// Short label for the current stage.
    #[serde(rename = "action", default)]
    pub action_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Stage counter of the end-to-end job. Normally mirrors `action_id_n`
    /// but may be overridden by callers.
    #[serde(rename = "actionID", default)]
    pub action_id: String,
    #[serde(rename = "numSeq", default)]
    pub action_id_n: u64,
    /// Assigned by the event receiver on the first report unless inherited.
    #[serde(rename = "jobID", default)]
    pub job_id: String,
    /// Job id of the parent job, for cross-process lineage.
    #[serde(rename = "parentAction", default, skip_serializing_if = "String::is_empty")]
    pub parent_action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    /// Time of the last transmission attempt.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl BaseReport {
    pub fn new(customer_guid: impl Into<String>, reporter: impl Into<String>) -> Self {
        let reporter = reporter.into();
        Self {
            customer_guid: customer_guid.into(),
            action_name: format!("Starting {reporter}"),
            reporter,
            target: String::new(),
            status: JobStatus::Started,
            errors: Vec::new(),
            action_id: "1".to_string(),
            action_id_n: 1,
            job_id: String::new(),
            parent_action: String::new(),
            details: String::new(),
            timestamp: None,
        }
    }

    /// Action id a downstream stage should continue from.
    pub fn next_action_id(&self) -> String {
        self.action_id_n.to_string()
    }

    /// Move to the next action. The sequence saturates at `u64::MAX`.
    pub fn advance_action_id(&mut self) {
        self.action_id_n = self.action_id_n.saturating_add(1);
        self.action_id = self.next_action_id();
    }

    pub fn set_action_id_n(&mut self, action_id_n: u64) {
        self.action_id_n = action_id_n;
        self.action_id = self.next_action_id();
    }

    pub fn push_error(&mut self, error: impl std::fmt::Display) {
        self.errors
            .push(format!("Action: {}, Error: {error}", self.action_name));
    }

    pub fn push_warning(&mut self, warning: impl std::fmt::Display) {
        self.errors
            .push(format!("Action: {}, Warning: {warning}", self.action_name));
    }

    /// Identifier used in log lines.
    pub fn report_id(&self) -> String {
        format!(
            "{}::{}::{} (verbose:  {}::{})",
            self.target, self.job_id, self.action_id, self.parent_action, self.action_name
        )
    }
}
