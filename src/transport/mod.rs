pub mod client;
pub mod error;

use async_trait::async_trait;

pub use client::HttpTransport;
pub use error::TransportError;

/// Status and body of one completed POST exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// `None` when the body could not be read.
    pub body: Option<String>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One POST of a JSON payload to a URL.
///
/// Implementations perform a single attempt; retries belong to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &[u8]) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_inclusive_2xx() {
        let resp = |status| TransportResponse { status, body: None };
        assert!(!resp(199).is_success());
        assert!(resp(200).is_success());
        assert!(resp(299).is_success());
        assert!(!resp(300).is_success());
        assert!(!resp(500).is_success());
    }
}
