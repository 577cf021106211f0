//! Transport used for dry runs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::error::TransportError;
use crate::traits::transport::{EmailTransport, RenderedEmail};

/// Logs each email instead of delivering it.
#[derive(Debug, Default)]
pub struct LogTransport {
    count: AtomicU64,
}

impl LogTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EmailTransport for LogTransport {
    async fn deliver(&self, to: &str, email: &RenderedEmail) -> Result<String, TransportError> {
        let n = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            to = %to,
            subject = %email.subject,
            html = email.html.is_some(),
            body = %email.text,
            "Dry run: email not sent"
        );
        Ok(format!("dry-run-{}", n))
    }
}
