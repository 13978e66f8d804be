//! Job lineage handed between processes working on the same job.
//!
//! A stage serializes [`JobsAnnotations`] (typically into a workload annotation
//! or message header); the next stage parses it and continues the job's action
//! sequence from where the previous one stopped.

use serde::{Deserialize, Serialize};

use super::record::BaseReport;
use crate::error::ReportError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsAnnotations {
    #[serde(rename = "jobID", default)]
    pub curr_job_id: String,
    #[serde(rename = "parentJobID", default)]
    pub parent_job_id: String,
    /// Action id the receiving stage should continue from.
    #[serde(rename = "actionID", default)]
    pub last_action_id: String,
}

impl BaseReport {
    /// Build the hand-off payload for a downstream stage.
    ///
    /// `set_parent` exposes this report's job id as the parent job id;
    /// `set_current` exposes it as the current job id. Both may be set.
    pub fn annotations(&self, set_parent: bool, set_current: bool) -> JobsAnnotations {
        let mut annotations = JobsAnnotations {
            last_action_id: self.next_action_id(),
            ..Default::default()
        };
        if set_parent {
            annotations.parent_job_id = self.job_id.clone();
        }
        if set_current {
            annotations.curr_job_id = self.job_id.clone();
        }
        annotations
    }

    /// Serialized [`BaseReport::annotations`] plus the next action id.
    pub fn report_annotations(
        &self,
        set_parent: bool,
        set_current: bool,
    ) -> Result<(String, String), ReportError> {
        let annotations = self.annotations(set_parent, set_current);
        let json = serde_json::to_string(&annotations)?;
        Ok((json, annotations.last_action_id))
    }

    /// Continue the lineage described by `annotations`.
    ///
    /// A non-numeric action id is kept verbatim and leaves the sequence
    /// number untouched.
    pub fn apply_annotations(&mut self, annotations: &JobsAnnotations) {
        if !annotations.curr_job_id.is_empty() {
            self.job_id = annotations.curr_job_id.clone();
        }
        self.parent_action = annotations.parent_job_id.clone();
        self.action_id = annotations.last_action_id.clone();
        if let Ok(action_id_n) = annotations.last_action_id.parse::<u64>() {
            self.set_action_id_n(action_id_n);
        }
    }
}

/// Parse a hand-off payload, returning the embedded current job id with it.
pub fn parse_job_annotations(payload: &[u8]) -> Result<(String, JobsAnnotations), ReportError> {
    let annotations: JobsAnnotations =
        serde_json::from_slice(payload).map_err(ReportError::Annotations)?;
    Ok((annotations.curr_job_id.clone(), annotations))
}
