//! Integration tests for personalization, outreach and the pipeline driver.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use leadgen::{
    fallback_pitch, Business, EmailTemplate, FactSheet, LeadTracker, MemoryTracker,
    MockFetcher, MockGenerator, MockTransport, OutreachConfig, OutreachSender, Personalizer,
    Pipeline, PitchContext, PitchSource, Qualifier, SheetData,
};
use tokio_util::sync::CancellationToken;

const OUTDATED_SITE: &str = r#"<html><body>
  <center><font face="Arial">Bob's Plumbing</font></center>
  <marquee>Same day repairs</marquee>
  <p>bob@gmail.com</p><p>&copy; 2015</p>
</body></html>"#;

const TEMPLATE: &str = "Subject: Quick idea for {{Business Name}}\n\nHi {{Name}},\n\n{{personalized_pitch}}\n\nCheers\n";

fn outdated_context() -> PitchContext {
    PitchContext {
        business_name: "Bob's Plumbing".to_string(),
        niche: "plumber".to_string(),
        city: "Leeds".to_string(),
        website: "bobsplumbing.com".to_string(),
        reasons: "Outdated design patterns detected, Outdated copyright year (2015)".to_string(),
        ..Default::default()
    }
}

fn sender(generator: MockGenerator, transport: Arc<MockTransport>) -> OutreachSender {
    OutreachSender::new(
        Personalizer::default().with_generator(Arc::new(generator)),
        transport,
        EmailTemplate::parse(TEMPLATE),
        OutreachConfig::new().with_delay(Duration::ZERO, Duration::ZERO),
    )
}

#[tokio::test]
async fn test_contradicting_pitch_is_replaced_by_fallback() {
    let generator = MockGenerator::new().with_response(
        "Since you don't have a website yet, local customers are going straight to competitors.",
    );
    let personalizer = Personalizer::default().with_generator(Arc::new(generator));
    let context = outdated_context();

    let pitch = personalizer.pitch(&context).await;

    assert_eq!(pitch.source, PitchSource::Fallback);
    assert!(pitch.facts.has_website);
    assert!(pitch.facts.outdated_design);
    assert_eq!(pitch.text, fallback_pitch(&FactSheet::derive(&context), "plumber"));
    assert!(!pitch.text.contains("don't have a website"));
}

#[tokio::test]
async fn test_consistent_pitch_is_kept() {
    let generator = MockGenerator::new().with_response(
        "\"Your site has served you well, but a refreshed design would help new customers trust you at a glance.\"",
    );
    let personalizer = Personalizer::default().with_generator(Arc::new(generator.clone()));

    let pitch = personalizer.pitch(&outdated_context()).await;

    assert_eq!(pitch.source, PitchSource::Generated);
    assert!(pitch.text.starts_with("Your site has served you well"));
    assert!(!pitch.text.ends_with('"'));

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Bob's Plumbing"));
    assert!(prompts[0].contains("outdated_design: TRUE"));
}

#[tokio::test]
async fn test_generation_failure_uses_fallback() {
    let generator = MockGenerator::new().with_failure("rate limited");
    let personalizer = Personalizer::default().with_generator(Arc::new(generator));

    let pitch = personalizer.pitch(&outdated_context()).await;

    assert_eq!(pitch.source, PitchSource::Fallback);
    assert!(pitch.text.contains("could use a refresh"));
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let existing = SheetData {
        name: "Mar 02".to_string(),
        rows: vec![HashMap::from([
            ("Business Name".to_string(), "Old Lead Dental".to_string()),
            ("City".to_string(), "Leeds".to_string()),
            ("Phone".to_string(), "0113 496 0999".to_string()),
            ("Email Sent".to_string(), "Yes".to_string()),
        ])],
    };
    let tracker = Arc::new(MemoryTracker::from_sheets(vec![existing]));

    let fetcher = MockFetcher::new().with_page("https://bobsplumbing.com", OUTDATED_SITE);
    let qualifier = Qualifier::new(Arc::new(fetcher));

    let generator = MockGenerator::new()
        .with_response("There is no website for Bob's Plumbing, so customers can't find you online.");
    let transport = Arc::new(MockTransport::new());

    let mut pipeline = Pipeline::new(qualifier, tracker.clone())
        .with_added_by("Integration")
        .with_sender(sender(generator, transport.clone()));

    let businesses = vec![
        Business::new("Bob's Plumbing", "Leeds")
            .with_website("bobsplumbing.com")
            .with_phone("0113 496 0123")
            .with_niche("plumber"),
        // Same phone as a tracked lead, different formatting
        Business::new("Old Lead Dental Care", "Leeds").with_phone("(0113) 496-0999"),
        Business::new("New Leaf Florist", "Leeds").with_niche("florist"),
    ];

    let stats = pipeline
        .run_into("Mar 03", &businesses, CancellationToken::new())
        .await;

    assert_eq!(stats.scraped, 3);
    assert_eq!(stats.qualified, 3);
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.added, 2);
    assert_eq!(stats.emails_sent, 1);
    assert!(stats.errors.is_empty());

    // Bob has a website, so the generated claim is rejected
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let (to, email) = &sent[0];
    assert_eq!(to, "bob@gmail.com");
    assert_eq!(email.subject, "Quick idea for Bob's Plumbing");
    assert!(email.text.starts_with("Hi there,"));
    assert!(email.text.contains("could use a refresh"));
    assert!(!email.text.contains("can't find you online"));

    let sheet = tracker
        .snapshot()
        .into_iter()
        .find(|s| s.name == "Mar 03")
        .expect("sheet written");
    let bob = sheet
        .rows
        .iter()
        .find(|row| row.get("Business Name").map(String::as_str) == Some("Bob's Plumbing"))
        .expect("bob tracked");
    assert_eq!(bob.get("Email Sent").map(String::as_str), Some("Yes"));
    assert_eq!(bob.get("Added By").map(String::as_str), Some("Integration"));

    // Florist has no address and stays unsent
    let unsent = tracker.unsent_records("Mar 03").await.unwrap();
    assert_eq!(unsent.len(), 1);
    assert_eq!(unsent[0].1.business_name.as_deref(), Some("New Leaf Florist"));
}
