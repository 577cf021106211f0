//! Vision scoring prompts and verdict parsing.
//!
//! Provider-independent: any [`VisionScorer`](crate::traits::scorer::VisionScorer)
//! backed by a chat model can reuse these.

use serde_json::Value;

use crate::error::{ScoringError, ScoringResult};
use crate::traits::scorer::ScoreRequest;
use crate::types::qualification::AiVerdict;

/// Score assumed for a rubric field the model left out.
const DEFAULT_SCORE: u8 = 5;

pub const VISION_SYSTEM_PROMPT: &str = r#"You are a website quality assessor for a web design agency that targets small-medium local businesses.
Your job is to evaluate a website screenshot and determine if the business would benefit from a new website.

Evaluate the website on these criteria:
1. **Design Quality** (1-10): Is the design modern, clean, and professional? Or does it look dated/amateur?
2. **Mobile Readiness** (1-10): Does it appear responsive and mobile-friendly?
3. **Professionalism** (1-10): Does it look trustworthy? Good typography, imagery, layout?
4. **Call-to-Action** (1-10): Are there clear CTAs (book now, call us, contact form)?
5. **Overall Score** (1-10): Overall website quality.

A score of 1-4 means the website is poor/outdated and the business NEEDS a new website.
A score of 5-6 means the website is mediocre and COULD benefit from a redesign.
A score of 7-10 means the website is good/modern and does NOT need our services.

Respond ONLY with valid JSON in this exact format:
{
  "design_score": <1-10>,
  "mobile_score": <1-10>,
  "professionalism_score": <1-10>,
  "cta_score": <1-10>,
  "overall_score": <1-10>,
  "needs_new_website": <true/false>,
  "issues": ["issue 1", "issue 2"],
  "summary": "One sentence summary of website quality"
}"#;

/// User prompt accompanying the screenshot.
pub fn vision_user_prompt(request: &ScoreRequest) -> String {
    fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
        if value.trim().is_empty() {
            fallback
        } else {
            value
        }
    }

    format!(
        "Evaluate this website screenshot for a {} business called \"{}\" in {}.\n\
         Is this a website that looks like it needs a redesign? Score it honestly.",
        or(&request.niche, "local"),
        or(&request.business_name, "Unknown"),
        or(&request.city, "Unknown"),
    )
}

/// Parse a model answer into a verdict.
///
/// Takes the outermost `{...}` span, so code fences and chatter around the
/// JSON are tolerated. Missing scores default to 5; all scores are clamped
/// to 1..=10.
pub fn parse_verdict(content: &str) -> ScoringResult<AiVerdict> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(ScoringError::Parse(format!(
                "no JSON object in response: {}",
                preview(content)
            )))
        }
    };

    let value: Value = serde_json::from_str(json)
        .map_err(|e| ScoringError::Parse(format!("{}: {}", e, preview(content))))?;
    let Value::Object(fields) = value else {
        return Err(ScoringError::Parse("response is not a JSON object".into()));
    };

    let score = |key: &str| fields.get(key).map_or(DEFAULT_SCORE, read_score);

    Ok(AiVerdict {
        design_score: score("design_score"),
        mobile_score: score("mobile_score"),
        professionalism_score: score("professionalism_score"),
        cta_score: score("cta_score"),
        overall_score: score("overall_score"),
        needs_new_website: fields
            .get("needs_new_website")
            .map(read_bool)
            .unwrap_or(false),
        issues: fields
            .get("issues")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        summary: fields
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
    })
}

fn read_score(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("/10").trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(score) if score.is_finite() => score.round().clamp(1.0, 10.0) as u8,
        _ => DEFAULT_SCORE,
    }
}

fn read_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
        _ => false,
    }
}

fn preview(content: &str) -> &str {
    let mut end = content.len().min(200);
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}
