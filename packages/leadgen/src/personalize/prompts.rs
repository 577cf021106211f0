//! LLM prompt for fact-grounded pitch generation.

use super::facts::{FactSheet, PitchContext};

/// City shown when the lead has none.
const UNKNOWN_CITY: &str = "their area";

/// Prompt for writing the personalized paragraph of an outreach email.
pub const PERSONALIZATION_PROMPT: &str = r#"You are writing a short email paragraph for {agency}, a web design agency.

VERIFIED FACTS about this business (from our automated checks; these are the ONLY things you know for certain):
{fact_sheet}

Business context:
- Name: {business_name}
- Industry: {niche}
- Location: {city}

STRICT RULES (you MUST follow all of these):
1. You may ONLY reference weaknesses listed as TRUE in the VERIFIED FACTS above
2. NEVER claim something that is not verified. If "has_website" is TRUE, NEVER say they don't have a website
3. NEVER invent or assume problems not listed (e.g., don't say "your site looks dated" unless outdated_design is TRUE)
4. If the only issue is "uses_free_email", do NOT criticize their website design; it may be perfectly fine
5. Write 3-5 sentences of flowing prose (no bullet points, no numbered lists)
6. Do NOT start with "I noticed" (the sentence before this paragraph already covers that)
7. Do NOT mention any price or timeline (that appears later in the email)
8. Keep it under 80 words
9. Be warm and helpful, not salesy, like friendly advice from someone in the industry
10. Explain the business impact of the VERIFIED weakness (losing customers, credibility, etc.)
11. Do NOT wrap your response in quotation marks

Respond with ONLY the paragraph text."#;

/// Format the personalization prompt.
pub fn format_personalization_prompt(
    agency: &str,
    context: &PitchContext,
    facts: &FactSheet,
) -> String {
    let city = match context.city.trim() {
        "" => UNKNOWN_CITY,
        city => city,
    };

    PERSONALIZATION_PROMPT
        .replace("{agency}", agency)
        .replace("{business_name}", &context.business_name)
        .replace("{niche}", &context.niche)
        .replace("{city}", city)
        .replace("{fact_sheet}", &facts.render())
}
