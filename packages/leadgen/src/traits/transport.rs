//! Email delivery.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// A fully rendered outreach email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// Delivers rendered emails (SMTP, an API, or a log in dry runs).
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Send one email, returning a transport-specific message id.
    async fn deliver(&self, to: &str, email: &RenderedEmail) -> Result<String, TransportError>;
}
