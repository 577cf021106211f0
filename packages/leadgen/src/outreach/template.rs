//! Outreach email templates.

use std::path::Path;

use crate::error::OutreachError;
use crate::traits::transport::RenderedEmail;

/// Values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValues<'a> {
    /// Greeting name (`{{Name}}`)
    pub name: &'a str,
    pub business_name: &'a str,
    pub niche: &'a str,
    pub personalized_pitch: &'a str,
}

impl TemplateValues<'_> {
    fn apply(&self, text: &str) -> String {
        text.replace("{{Name}}", self.name)
            .replace("{{Business Name}}", self.business_name)
            .replace("{{niche}}", self.niche)
            .replace("{{personalized_pitch}}", self.personalized_pitch)
    }
}

/// Subject line plus plain and optional HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
    pub html: Option<String>,
}

impl EmailTemplate {
    /// Parse a plain-text template.
    ///
    /// The first line starting with `Subject:` (any case) gives the subject;
    /// the body is everything after it, minus leading blank lines. Without a
    /// subject line the whole text is the body.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.trim().lines().collect();

        let (subject, body_start) = lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| {
                let (head, rest) = line.split_at_checked(8)?;
                head.eq_ignore_ascii_case("subject:")
                    .then(|| (rest.trim().to_string(), i + 1))
            })
            .unwrap_or_default();

        let body = lines[body_start..]
            .iter()
            .skip_while(|line| line.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            subject,
            body,
            html: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Load `path`, plus a sibling `.html` file if one exists.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OutreachError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            OutreachError::Template(format!("cannot read {}: {}", path.display(), e))
        })?;

        let template = Self::parse(&text);
        let html_path = path.with_extension("html");
        if html_path != path && html_path.exists() {
            let html = std::fs::read_to_string(&html_path).map_err(|e| {
                OutreachError::Template(format!("cannot read {}: {}", html_path.display(), e))
            })?;
            return Ok(template.with_html(html));
        }

        Ok(template)
    }

    pub fn render(&self, values: &TemplateValues<'_>) -> RenderedEmail {
        RenderedEmail {
            subject: values.apply(&self.subject),
            text: values.apply(&self.body),
            html: self.html.as_deref().map(|html| values.apply(html)),
        }
    }
}

/// Greeting name for a business: `"Dr Smith Dental"` greets `Smith`,
/// anything else greets `there`.
pub fn owner_name(business_name: &str) -> &str {
    let mut words = business_name.split_whitespace();
    match (words.next(), words.next()) {
        (Some("Dr" | "Dr."), Some(name)) => name,
        _ => "there",
    }
}
