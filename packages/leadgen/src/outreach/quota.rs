//! Daily send quota.

use serde::{Deserialize, Serialize};

/// Emails sent today against a daily limit.
///
/// Owned by the sender and reset explicitly, typically once per day by
/// whatever schedules outreach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuota {
    limit: u32,
    sent: u32,
}

impl DailyQuota {
    pub fn new(limit: u32) -> Self {
        Self { limit, sent: 0 }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.sent)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Count one send if the limit allows it.
    pub fn try_acquire(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.sent += 1;
        true
    }

    /// Return a slot taken for a send that then failed.
    pub fn release(&mut self) {
        self.sent = self.sent.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.sent = 0;
    }
}
