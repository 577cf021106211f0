//! Qualify a batch of scraped businesses and write new leads to a tracker file.
//!
//! ```text
//! leadgen --businesses scraped.json --tracker leads.json --ai --send --template email.txt
//! ```

use anyhow::{bail, Context, Result};
use browserless_client::BrowserlessClient;
use clap::Parser;
use leadgen::ai::{OpenAIGenerator, OpenAIVisionScorer};
use leadgen::{
    today_sheet, BrowserFetcher, Business, EmailTemplate, FallbackFetcher, HttpFetcher,
    LogTransport, MemoryTracker, OutreachConfig, OutreachSender, Personalizer,
    PersonalizerConfig, Pipeline, Qualifier, QualifierConfig, SheetData,
};
use openai_client::OpenAIClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "leadgen", about = "Qualify local businesses and prepare outreach")]
struct Args {
    /// JSON array of scraped businesses
    #[arg(long)]
    businesses: PathBuf,

    /// JSON tracker file (array of sheets); created if missing
    #[arg(long)]
    tracker: PathBuf,

    /// Sheet to write to (default: today, e.g. "Mar 03")
    #[arg(long)]
    sheet: Option<String>,

    /// Run the vision second pass on sites the rules pass
    #[arg(long)]
    ai: bool,

    /// Render outreach for the new leads; emails are logged, not delivered
    #[arg(long)]
    send: bool,

    /// Email template used with --send
    #[arg(long, requires = "send")]
    template: Option<PathBuf>,

    #[arg(long, default_value_t = 80)]
    daily_limit: u32,

    /// Seconds between two emails
    #[arg(long, default_value_t = 30)]
    delay_min: u64,

    #[arg(long, default_value_t = 60)]
    delay_max: u64,

    #[arg(long, default_value_t = 5)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,leadgen=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let args = Args::parse();

    let businesses: Vec<Business> = read_json(&args.businesses)
        .with_context(|| format!("Failed to load businesses from {}", args.businesses.display()))?;
    info!(count = businesses.len(), "Loaded businesses");

    let sheets: Vec<SheetData> = if args.tracker.exists() {
        read_json(&args.tracker)
            .with_context(|| format!("Failed to load tracker from {}", args.tracker.display()))?
    } else {
        Vec::new()
    };
    let tracker = Arc::new(MemoryTracker::from_sheets(sheets));

    let browserless = browserless()?;
    let openai = openai()?;

    let config = QualifierConfig::new().with_max_concurrent(args.concurrency);
    let mut fetcher = FallbackFetcher::new(config.plausible_min_chars);
    if let Some(client) = &browserless {
        fetcher = fetcher.with_strategy(Arc::new(BrowserFetcher::new(client.clone())));
    }
    fetcher = fetcher.with_strategy(Arc::new(
        HttpFetcher::new().context("Failed to build HTTP client")?,
    ));

    let mut qualifier = Qualifier::new(Arc::new(fetcher)).with_config(config);
    if args.ai {
        let (Some(client), Some(browser)) = (&openai, &browserless) else {
            bail!("--ai needs OPENAI_API_KEY and BROWSERLESS_URL");
        };
        let mut scorer = OpenAIVisionScorer::new(client.clone(), browser.clone());
        if let Ok(model) = std::env::var("LEADGEN_MODEL") {
            scorer = scorer.with_model(model);
        }
        qualifier = qualifier.with_scorer(Arc::new(scorer));
    }

    let added_by = std::env::var("LEADGEN_ADDED_BY").unwrap_or_else(|_| "Leadgen".to_string());
    let mut pipeline = Pipeline::new(qualifier, tracker.clone()).with_added_by(added_by);

    if args.send {
        let template_path = args
            .template
            .as_deref()
            .context("--send needs --template")?;
        let template = EmailTemplate::load(template_path)?;

        let mut personalizer_config = PersonalizerConfig::new();
        if let Ok(agency) = std::env::var("LEADGEN_AGENCY_NAME") {
            personalizer_config = personalizer_config.with_agency_name(agency);
        }
        if let Ok(model) = std::env::var("LEADGEN_MODEL") {
            personalizer_config = personalizer_config.with_model(model);
        }

        let mut personalizer = Personalizer::new(personalizer_config.clone());
        match &openai {
            Some(client) => {
                personalizer = personalizer.with_generator(Arc::new(OpenAIGenerator::from_config(
                    client.clone(),
                    &personalizer_config,
                )));
            }
            None => warn!("OPENAI_API_KEY not set, every pitch will use the fallback text"),
        }

        let outreach = OutreachConfig::new()
            .with_daily_limit(args.daily_limit)
            .with_delay(
                Duration::from_secs(args.delay_min),
                Duration::from_secs(args.delay_max),
            );
        pipeline = pipeline.with_sender(OutreachSender::new(
            personalizer,
            Arc::new(LogTransport::new()),
            template,
            outreach,
        ));
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight work");
            on_signal.cancel();
        }
    });

    let sheet = args.sheet.unwrap_or_else(today_sheet);
    let stats = pipeline.run_into(&sheet, &businesses, cancel).await;

    write_json(&args.tracker, &tracker.snapshot())
        .with_context(|| format!("Failed to save tracker to {}", args.tracker.display()))?;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn browserless() -> Result<Option<BrowserlessClient>> {
    let Ok(url) = std::env::var("BROWSERLESS_URL") else {
        return Ok(None);
    };
    let token = std::env::var("BROWSERLESS_TOKEN").ok();
    let client = BrowserlessClient::new(&url, token.as_deref())
        .context("Failed to create Browserless client")?;
    Ok(Some(client))
}

fn openai() -> Result<Option<OpenAIClient>> {
    if std::env::var("OPENAI_API_KEY").is_err() {
        return Ok(None);
    }
    let client = OpenAIClient::from_env().context("Failed to create OpenAI client")?;
    Ok(Some(client))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
