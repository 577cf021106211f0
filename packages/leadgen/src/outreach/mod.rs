//! Outreach email sending.

pub mod quota;
pub mod sender;
pub mod template;
pub mod transport;

pub use quota::DailyQuota;
pub use sender::{OutreachLead, OutreachSender, SentEmail};
pub use template::{owner_name, EmailTemplate, TemplateValues};
pub use transport::LogTransport;
