pub mod error;

pub use error::{BrowserlessError, Result};

use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Header Browserless sets to the upstream page's HTTP status.
const RESPONSE_CODE_HEADER: &str = "x-response-code";

#[derive(Clone)]
pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Navigation options forwarded to the headless browser.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoOptions {
    /// Lifecycle event to wait for (`domcontentloaded`, `load`, `networkidle2`)
    pub wait_until: String,

    /// Navigation timeout in milliseconds
    pub timeout: u64,
}

impl GotoOptions {
    pub fn new(wait_until: impl Into<String>, timeout: Duration) -> Self {
        Self {
            wait_until: wait_until.into(),
            timeout: timeout.as_millis() as u64,
        }
    }
}

/// Options for a `/content` render.
#[derive(Debug, Clone)]
pub struct ContentOptions {
    pub goto: GotoOptions,

    /// Extra delay after navigation so client-side rendering can settle
    pub settle: Duration,

    pub user_agent: Option<String>,
}

impl ContentOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            goto: GotoOptions::new("domcontentloaded", timeout),
            settle: Duration::from_secs(2),
            user_agent: None,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Options for a `/screenshot` capture.
#[derive(Debug, Clone)]
pub struct ScreenshotOptions {
    pub goto: GotoOptions,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub full_page: bool,
}

impl ScreenshotOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            goto: GotoOptions::new("networkidle2", timeout),
            width: 1366,
            height: 900,
            quality: 70,
            full_page: false,
        }
    }
}

/// Rendered page returned by `/content`.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,

    /// Upstream HTTP status reported by the browser, if Browserless sent one
    pub status: Option<u16>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    goto_options: &'a GotoOptions,
    wait_for_timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScreenshotRequest<'a> {
    url: &'a str,
    goto_options: &'a GotoOptions,
    options: ScreenshotFormat,
    viewport: Viewport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScreenshotFormat {
    #[serde(rename = "type")]
    image_type: &'static str,
    quality: u8,
    full_page: bool,
}

#[derive(Serialize)]
struct Viewport {
    width: u32,
    height: u32,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| BrowserlessError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        let mut endpoint = format!("{}/{}", self.base_url, path);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    /// Fetch fully-rendered HTML content for a URL via Browserless /content endpoint.
    pub async fn content(&self, url: &str) -> Result<String> {
        let options = ContentOptions::new(Duration::from_secs(30));
        Ok(self.render(url, &options).await?.html)
    }

    /// Render a URL with explicit navigation options, keeping the upstream status.
    pub async fn render(&self, url: &str, options: &ContentOptions) -> Result<RenderedPage> {
        let body = ContentRequest {
            url,
            goto_options: &options.goto,
            wait_for_timeout: options.settle.as_millis() as u64,
            user_agent: options.user_agent.as_deref(),
        };

        let resp = self
            .client
            .post(self.endpoint("content"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let upstream = resp
            .headers()
            .get(RESPONSE_CODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u16>().ok());

        let html = resp.text().await?;
        debug!(url = %url, status = ?upstream, bytes = html.len(), "Browserless render complete");

        Ok(RenderedPage {
            html,
            status: upstream,
        })
    }

    /// Capture a JPEG screenshot of the first viewport.
    pub async fn screenshot(&self, url: &str, options: &ScreenshotOptions) -> Result<Vec<u8>> {
        let body = ScreenshotRequest {
            url,
            goto_options: &options.goto,
            options: ScreenshotFormat {
                image_type: "jpeg",
                quality: options.quality,
                full_page: options.full_page,
            },
            viewport: Viewport {
                width: options.width,
                height: options.height,
            },
        };

        let resp = self
            .client
            .post(self.endpoint("screenshot"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
