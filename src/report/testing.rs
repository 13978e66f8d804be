//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::config::RetryConfig;
use crate::endpoint::StaticEndpoint;
use crate::transport::{Transport, TransportError, TransportResponse};

use super::sender::ReportSender;

pub const TEST_BASE_URL: &str = "http://receiver.test";

/// What the transport does for one call.
pub enum Step {
    Respond(u16, &'static str),
    Unreadable(u16),
    Fail,
    Panic,
}

/// Replays a fixed script of responses; once exhausted it answers `200 ok`.
///
/// With a gate, every call waits for one permit before answering.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    attempts: AtomicU32,
    bodies: Mutex<Vec<serde_json::Value>>,
    urls: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self::build(script, None))
    }

    pub fn always_ok() -> Arc<Self> {
        Self::new(Vec::<Step>::new())
    }

    pub fn gated(script: impl IntoIterator<Item = Step>) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (Arc::new(Self::build(script, Some(gate.clone()))), gate)
    }

    fn build(script: impl IntoIterator<Item = Step>, gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            attempts: AtomicU32::new(0),
            bodies: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
            gate,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, url: &str, body: &[u8]) -> Result<TransportResponse, TransportError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        self.bodies
            .lock()
            .unwrap()
            .push(serde_json::from_slice(body).unwrap());

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(status, body)) => Ok(TransportResponse {
                status,
                body: Some(body.to_string()),
            }),
            Some(Step::Unreadable(status)) => Ok(TransportResponse { status, body: None }),
            Some(Step::Fail) => Err(TransportError::Unreachable("connection refused".into())),
            Some(Step::Panic) => panic!("transport blew up"),
            None => Ok(TransportResponse {
                status: 200,
                body: Some("ok".to_string()),
            }),
        }
    }
}

/// Sender pointed at [`TEST_BASE_URL`] with no backoff.
pub fn sender(transport: Arc<ScriptedTransport>, max_retries: u32) -> ReportSender {
    ReportSender::new(transport, Arc::new(StaticEndpoint(TEST_BASE_URL.into()))).with_retry(
        RetryConfig {
            max_retries,
            delay_ms: 0,
        },
    )
}
