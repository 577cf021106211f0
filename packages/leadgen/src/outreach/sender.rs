//! Personalized outreach sending with a daily quota.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::quota::DailyQuota;
use super::template::{owner_name, EmailTemplate, TemplateValues};
use crate::error::OutreachError;
use crate::personalize::{Personalizer, PitchContext, PitchSource};
use crate::traits::transport::EmailTransport;
use crate::types::config::OutreachConfig;
use crate::types::lead::{QualifiedLead, TrackerRecord};

/// One recipient of an outreach email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachLead {
    pub context: PitchContext,
    pub email: Option<String>,

    /// Greeting name; derived from the business name when absent
    pub contact_name: Option<String>,
}

impl OutreachLead {
    /// Address, if it looks deliverable.
    pub fn address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| e.contains('@'))
    }
}

impl From<&QualifiedLead> for OutreachLead {
    fn from(lead: &QualifiedLead) -> Self {
        Self {
            context: PitchContext::from(lead),
            email: lead.email().map(String::from),
            contact_name: None,
        }
    }
}

impl From<&TrackerRecord> for OutreachLead {
    fn from(record: &TrackerRecord) -> Self {
        Self {
            context: PitchContext::from(record),
            email: record.email().map(String::from),
            contact_name: None,
        }
    }
}

/// A delivered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub message_id: String,
    pub pitch_source: PitchSource,
}

/// Sends personalized emails, one lead at a time.
pub struct OutreachSender {
    personalizer: Personalizer,
    transport: Arc<dyn EmailTransport>,
    template: EmailTemplate,
    quota: DailyQuota,
    config: OutreachConfig,
}

impl OutreachSender {
    pub fn new(
        personalizer: Personalizer,
        transport: Arc<dyn EmailTransport>,
        template: EmailTemplate,
        config: OutreachConfig,
    ) -> Self {
        Self {
            personalizer,
            transport,
            template,
            quota: DailyQuota::new(config.daily_limit),
            config,
        }
    }

    pub fn quota(&self) -> &DailyQuota {
        &self.quota
    }

    pub fn remaining_today(&self) -> u32 {
        self.quota.remaining()
    }

    pub fn reset_daily_quota(&mut self) {
        self.quota.reset();
    }

    /// Personalize, render and deliver one email.
    pub async fn send(&mut self, lead: &OutreachLead) -> Result<SentEmail, OutreachError> {
        if self.quota.is_exhausted() {
            warn!(limit = self.quota.limit(), "Daily email limit reached");
            return Err(OutreachError::DailyLimitReached {
                limit: self.quota.limit(),
            });
        }

        let to = lead.address().ok_or_else(|| OutreachError::NoEmail {
            business: lead.context.business_name.clone(),
        })?;

        let context = &lead.context;
        let pitch = self.personalizer.pitch(context).await;
        let name = lead
            .contact_name
            .as_deref()
            .unwrap_or_else(|| owner_name(&context.business_name));

        let email = self.template.render(&TemplateValues {
            name,
            business_name: &context.business_name,
            niche: &context.niche,
            personalized_pitch: &pitch.text,
        });

        if !self.quota.try_acquire() {
            return Err(OutreachError::DailyLimitReached {
                limit: self.quota.limit(),
            });
        }

        let delivery = self.transport.deliver(to, &email).await;
        match delivery {
            Ok(message_id) => {
                info!(
                    to = %to,
                    business = %context.business_name,
                    sent = self.quota.sent(),
                    limit = self.quota.limit(),
                    "Email sent"
                );
                Ok(SentEmail {
                    to: to.to_string(),
                    message_id,
                    pitch_source: pitch.source,
                })
            }
            Err(e) => {
                self.quota.release();
                error!(to = %to, error = %e, "Failed to send email");
                Err(e.into())
            }
        }
    }

    /// Send to each lead in order, pausing between sends.
    ///
    /// Leads without a usable address are skipped with `NoEmail`. Sending
    /// stops once the quota is used up, so the result may be shorter than
    /// the input; entry `i` always belongs to lead `i`.
    pub async fn send_batch(
        &mut self,
        leads: &[OutreachLead],
    ) -> Vec<Result<SentEmail, OutreachError>> {
        let mut results = Vec::with_capacity(leads.len());

        for (i, lead) in leads.iter().enumerate() {
            if self.quota.is_exhausted() {
                warn!(
                    remaining = leads.len() - i,
                    "Daily limit reached, remaining emails left for the next run"
                );
                break;
            }

            if lead.address().is_none() {
                debug!(business = %lead.context.business_name, "Skipping lead without a valid email");
                results.push(Err(OutreachError::NoEmail {
                    business: lead.context.business_name.clone(),
                }));
                continue;
            }

            results.push(self.send(lead).await);

            if i + 1 < leads.len() {
                let delay = self.next_delay();
                debug!(delay_secs = delay.as_secs(), "Waiting before next email");
                tokio::time::sleep(delay).await;
            }
        }

        let sent = results.iter().filter(|r| r.is_ok()).count();
        info!(sent, total = leads.len(), "Email batch complete");
        results
    }

    fn next_delay(&self) -> Duration {
        let min = self.config.delay_min.as_millis() as u64;
        let max = self.config.delay_max.as_millis() as u64;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGenerator, MockTransport};

    const TEMPLATE: &str = "Subject: A quick idea for {{Business Name}}\n\nHi {{Name}},\n\n{{personalized_pitch}}\n";

    fn lead(name: &str, email: Option<&str>) -> OutreachLead {
        OutreachLead {
            context: PitchContext {
                business_name: name.into(),
                niche: "dentist".into(),
                city: "Leeds".into(),
                website: "".into(),
                reasons: "No website".into(),
                ..Default::default()
            },
            email: email.map(String::from),
            contact_name: None,
        }
    }

    fn sender(transport: Arc<MockTransport>, limit: u32) -> OutreachSender {
        let config = OutreachConfig::new()
            .with_daily_limit(limit)
            .with_delay(Duration::ZERO, Duration::ZERO);
        OutreachSender::new(
            Personalizer::default(),
            transport,
            EmailTemplate::parse(TEMPLATE),
            config,
        )
    }

    #[tokio::test]
    async fn test_send_renders_pitch_and_greeting() {
        let transport = Arc::new(MockTransport::new());
        let mut sender = sender(transport.clone(), 5);

        let sent = sender
            .send(&lead("Dr Patel Dental", Some(" patel@gmail.com ")))
            .await
            .unwrap();

        assert_eq!(sent.to, "patel@gmail.com");
        assert_eq!(sent.pitch_source, PitchSource::Fallback);

        let (to, email) = &transport.sent()[0];
        assert_eq!(to, "patel@gmail.com");
        assert_eq!(email.subject, "A quick idea for Dr Patel Dental");
        assert!(email.text.starts_with("Hi Patel,"));
        assert!(email.text.contains("they can't find you online"));
        assert_eq!(sender.remaining_today(), 4);
    }

    #[tokio::test]
    async fn test_generated_pitch_is_rendered() {
        let transport = Arc::new(MockTransport::new());
        let generator = MockGenerator::new()
            .with_response("A simple site would let new patients book with you directly.");
        let config = OutreachConfig::new().with_delay(Duration::ZERO, Duration::ZERO);
        let mut sender = OutreachSender::new(
            Personalizer::default().with_generator(Arc::new(generator)),
            transport.clone(),
            EmailTemplate::parse(TEMPLATE),
            config,
        );

        let sent = sender.send(&lead("Sunrise Dental", Some("a@b.com"))).await.unwrap();

        assert_eq!(sent.pitch_source, PitchSource::Generated);
        assert!(transport.sent()[0]
            .1
            .text
            .contains("A simple site would let new patients book with you directly."));
    }

    #[tokio::test]
    async fn test_limit_blocks_send() {
        let transport = Arc::new(MockTransport::new());
        let mut sender = sender(transport.clone(), 1);

        sender.send(&lead("One", Some("one@x.com"))).await.unwrap();
        let err = sender.send(&lead("Two", Some("two@x.com"))).await.unwrap_err();

        assert!(matches!(err, OutreachError::DailyLimitReached { limit: 1 }));
        assert_eq!(transport.sent().len(), 1);

        sender.reset_daily_quota();
        assert!(sender.send(&lead("Two", Some("two@x.com"))).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_use_quota() {
        let transport = Arc::new(MockTransport::new().with_rejection("bad@x.com", "mailbox full"));
        let mut sender = sender(transport, 2);

        let err = sender.send(&lead("Bad", Some("bad@x.com"))).await.unwrap_err();

        assert!(matches!(err, OutreachError::Transport(_)));
        assert_eq!(sender.remaining_today(), 2);
    }

    #[tokio::test]
    async fn test_batch_skips_invalid_and_stops_at_limit() {
        let transport = Arc::new(MockTransport::new());
        let mut sender = sender(transport.clone(), 2);
        let leads = vec![
            lead("No Email", None),
            lead("First", Some("first@x.com")),
            lead("Not An Address", Some("call us")),
            lead("Second", Some("second@x.com")),
            lead("Third", Some("third@x.com")),
        ];

        let results = sender.send_batch(&leads).await;

        assert_eq!(results.len(), 4);
        assert!(matches!(results[0], Err(OutreachError::NoEmail { .. })));
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(OutreachError::NoEmail { .. })));
        assert!(results[3].is_ok());

        let recipients: Vec<_> = transport.sent().into_iter().map(|(to, _)| to).collect();
        assert_eq!(recipients, vec!["first@x.com", "second@x.com"]);
    }
}
