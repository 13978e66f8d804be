//! Shared, mutable report with serialized mutation and transmission.
//!
//! Every operation takes the report's lock. Operations that only mutate release
//! it before returning. Operations that also transmit hand the lock to a
//! spawned task, which keeps it until the send has finished and its local
//! effects (sequence advance, error reset) are applied. The next mutation on the
//! same report therefore waits for the in-flight send, while the caller itself
//! never waits on the network.
//!
//! Outcomes are delivered through an optional [`Notifier`]. Delivery never
//! blocks; a receiver nobody reads keeps its single value alive until the
//! receiver is dropped.

use std::fmt::Display;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, oneshot};
use tracing::debug;

use super::annotations::parse_job_annotations;
use super::record::BaseReport;
use super::sender::{ReportSender, SendOutcome};
use super::status::JobStatus;
use crate::error::ReportError;

/// Single-value channel receiving the outcome of one operation.
pub type Notifier = oneshot::Sender<Result<(), ReportError>>;

/// Handle to one report. Clones share the same report.
#[derive(Clone)]
pub struct Reporter {
    report: Arc<Mutex<BaseReport>>,
    sender: ReportSender,
}

impl Reporter {
    pub fn new(
        customer_guid: impl Into<String>,
        reporter: impl Into<String>,
        sender: ReportSender,
    ) -> Self {
        Self::from_report(BaseReport::new(customer_guid, reporter), sender)
    }

    pub fn from_report(report: BaseReport, sender: ReportSender) -> Self {
        Self {
            report: Arc::new(Mutex::new(report)),
            sender,
        }
    }

    /// Create a report for a new job stage and send its initial "started"
    /// report in the background.
    pub async fn start(
        customer_guid: impl Into<String>,
        reporter_name: impl Into<String>,
        action_name: Option<String>,
        target: Option<String>,
        sender: ReportSender,
        notify: Option<Notifier>,
    ) -> Self {
        let mut report = BaseReport::new(customer_guid, reporter_name);
        if let Some(action_name) = action_name.filter(|a| !a.is_empty()) {
            report.action_name = action_name;
        }
        if let Some(target) = target.filter(|t| !t.is_empty()) {
            report.target = target;
        }
        let reporter = Self::from_report(report, sender);
        reporter.send_as_routine(true, notify).await;
        reporter
    }

    /// Send the current report in the background.
    ///
    /// The lock is held until the send and its local effects complete.
    /// `progress_next` advances the action sequence after a successful send.
    pub async fn send_as_routine(&self, progress_next: bool, notify: Option<Notifier>) {
        let guard = self.lock().await;
        self.dispatch(guard, progress_next, false, notify);
    }

    /// Send the current report and wait for the outcome.
    pub async fn send(&self) -> Result<SendOutcome, ReportError> {
        let mut guard = self.lock().await;
        self.sender.send(&mut guard).await
    }

    async fn lock(&self) -> OwnedMutexGuard<BaseReport> {
        Arc::clone(&self.report).lock_owned().await
    }

    /// Apply `mutate` under the lock, then either transmit or release.
    async fn update<F>(
        &self,
        mutate: F,
        send_report: bool,
        reset_errors: bool,
        notify: Option<Notifier>,
    ) where
        F: FnOnce(&mut BaseReport),
    {
        let mut guard = self.lock().await;
        mutate(&mut *guard);

        if send_report {
            self.dispatch(guard, true, reset_errors, notify);
        } else {
            drop(guard);
            if let Some(tx) = notify {
                let _ = tx.send(Ok(()));
            }
        }
    }

    /// Run one send on a spawned task that owns the lock.
    ///
    /// A panic inside the task stays in the task: the guard is released
    /// during unwinding and `notify` is dropped without a value.
    fn dispatch(
        &self,
        mut guard: OwnedMutexGuard<BaseReport>,
        progress_next: bool,
        reset_errors: bool,
        notify: Option<Notifier>,
    ) {
        let sender = self.sender.clone();
        debug!(report_id = %guard.report_id(), "dispatching report");

        tokio::spawn(async move {
            // `ReportSender::send` only returns `Ok` for a 2xx response.
            let outcome = sender.send(&mut guard).await.map(|_| ());

            if outcome.is_ok() && progress_next {
                guard.advance_action_id();
            }
            if reset_errors {
                guard.errors.clear();
            }
            debug!(
                report_id = %guard.report_id(),
                success = outcome.is_ok(),
                "report dispatch finished"
            );

            if let Some(tx) = notify {
                let _ = tx.send(outcome);
            }
            drop(guard);
        });
    }

    /// Record `error` (if any), mark the report failed, and optionally send it.
    ///
    /// With `reset_errors`, the accumulated list is cleared once the send
    /// completes; it is left untouched when nothing is sent.
    pub async fn send_error(
        &self,
        error: Option<&(dyn Display + Sync)>,
        send_report: bool,
        reset_errors: bool,
        notify: Option<Notifier>,
    ) {
        self.update(
            |report| {
                if let Some(error) = error {
                    report.push_error(error);
                }
                report.status = JobStatus::Failure;
            },
            send_report,
            reset_errors,
            notify,
        )
        .await;
    }

    /// Record `warning`, mark the report as warning, and optionally send it.
    pub async fn send_warning(
        &self,
        warning: &str,
        send_report: bool,
        reset_warnings: bool,
        notify: Option<Notifier>,
    ) {
        self.update(
            |report| {
                report.push_warning(warning);
                report.status = JobStatus::Warning;
            },
            send_report,
            reset_warnings,
            notify,
        )
        .await;
    }

    pub async fn send_status(&self, status: JobStatus, send_report: bool, notify: Option<Notifier>) {
        self.update(|r| r.status = status, send_report, false, notify)
            .await;
    }

    pub async fn send_action(
        &self,
        action_name: impl Into<String>,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        let action_name = action_name.into();
        self.update(|r| r.action_name = action_name, send_report, false, notify)
            .await;
    }

    pub async fn send_details(
        &self,
        details: impl Into<String>,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        let details = details.into();
        self.update(|r| r.details = details, send_report, false, notify)
            .await;
    }

    pub async fn send_target(
        &self,
        target: impl Into<String>,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        let target = target.into();
        self.update(|r| r.target = target, send_report, false, notify)
            .await;
    }

    /// Overwrites any job id, including one assigned by the receiver.
    pub async fn send_job_id(
        &self,
        job_id: impl Into<String>,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        let job_id = job_id.into();
        self.update(|r| r.job_id = job_id, send_report, false, notify)
            .await;
    }

    pub async fn send_parent_action(
        &self,
        parent_action: impl Into<String>,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        let parent_action = parent_action.into();
        self.update(
            |r| r.parent_action = parent_action,
            send_report,
            false,
            notify,
        )
        .await;
    }

    pub async fn send_customer_guid(
        &self,
        customer_guid: impl Into<String>,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        let customer_guid = customer_guid.into();
        self.update(
            |r| r.customer_guid = customer_guid,
            send_report,
            false,
            notify,
        )
        .await;
    }

    /// Set the action sequence number; the action id follows it.
    pub async fn send_action_id_n(
        &self,
        action_id_n: u64,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        self.update(
            |r| r.set_action_id_n(action_id_n),
            send_report,
            false,
            notify,
        )
        .await;
    }

    pub async fn send_timestamp(
        &self,
        timestamp: DateTime<Utc>,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        self.update(
            |r| r.timestamp = Some(timestamp),
            send_report,
            false,
            notify,
        )
        .await;
    }

    /// The reporter name is stored upper-cased.
    pub async fn send_reporter(
        &self,
        reporter: impl AsRef<str>,
        send_report: bool,
        notify: Option<Notifier>,
    ) {
        let reporter = reporter.as_ref().to_uppercase();
        self.update(|r| r.reporter = reporter, send_report, false, notify)
            .await;
    }

    pub async fn set_status(&self, status: JobStatus) {
        self.send_status(status, false, None).await;
    }

    pub async fn set_action_name(&self, action_name: impl Into<String>) {
        self.send_action(action_name, false, None).await;
    }

    pub async fn set_details(&self, details: impl Into<String>) {
        self.send_details(details, false, None).await;
    }

    pub async fn set_target(&self, target: impl Into<String>) {
        self.send_target(target, false, None).await;
    }

    pub async fn set_job_id(&self, job_id: impl Into<String>) {
        self.send_job_id(job_id, false, None).await;
    }

    pub async fn set_parent_action(&self, parent_action: impl Into<String>) {
        self.send_parent_action(parent_action, false, None).await;
    }

    pub async fn set_customer_guid(&self, customer_guid: impl Into<String>) {
        self.send_customer_guid(customer_guid, false, None).await;
    }

    pub async fn set_action_id_n(&self, action_id_n: u64) {
        self.send_action_id_n(action_id_n, false, None).await;
    }

    pub async fn set_timestamp(&self, timestamp: DateTime<Utc>) {
        self.send_timestamp(timestamp, false, None).await;
    }

    pub async fn set_reporter(&self, reporter: impl AsRef<str>) {
        self.send_reporter(reporter, false, None).await;
    }

    /// Override the action id without touching the sequence number.
    pub async fn set_action_id(&self, action_id: impl Into<String>) {
        let action_id = action_id.into();
        self.update(|r| r.action_id = action_id, false, false, None)
            .await;
    }

    /// Append a raw entry to the error list; status is left as is.
    pub async fn add_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.update(|r| r.errors.push(error), false, false, None)
            .await;
    }

    /// Payload for a downstream stage plus the next action id.
    pub async fn report_annotations(
        &self,
        set_parent: bool,
        set_current: bool,
    ) -> Result<(String, String), ReportError> {
        self.lock().await.report_annotations(set_parent, set_current)
    }

    /// Continue the job described by an upstream stage's payload.
    pub async fn apply_annotations(&self, payload: &[u8]) -> Result<(), ReportError> {
        let (_, annotations) = parse_job_annotations(payload)?;
        self.update(|r| r.apply_annotations(&annotations), false, false, None)
            .await;
        Ok(())
    }

    /// Copy of the report as it stands once pending sends have released it.
    pub async fn snapshot(&self) -> BaseReport {
        self.lock().await.clone()
    }

    pub async fn job_id(&self) -> String {
        self.lock().await.job_id.clone()
    }

    pub async fn action_id(&self) -> String {
        self.lock().await.action_id.clone()
    }

    pub async fn status(&self) -> JobStatus {
        self.lock().await.status
    }

    pub async fn errors(&self) -> Vec<String> {
        self.lock().await.errors.clone()
    }
}
