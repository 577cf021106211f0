//! Rule-based pitches that state only verified facts.

use serde::{Deserialize, Serialize};

use super::facts::FactSheet;

/// Which fixed pitch to use, highest-priority true fact first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPitch {
    NoWebsite,
    SocialMediaOnly,
    WebsiteUnreachable,
    OutdatedDesign,
    NotMobileFriendly,
    SlowLoading,
    BrokenLayout,
    FreeEmailWithWebsite,
    FreeEmail,
    AiPoorDesign,
    Generic,
}

impl FallbackPitch {
    /// Select exactly one pitch for `facts`.
    pub fn select(facts: &FactSheet) -> Self {
        if facts.no_website {
            Self::NoWebsite
        } else if facts.social_media_only {
            Self::SocialMediaOnly
        } else if facts.website_unreachable {
            Self::WebsiteUnreachable
        } else if facts.outdated_design {
            Self::OutdatedDesign
        } else if facts.not_mobile_friendly {
            Self::NotMobileFriendly
        } else if facts.slow_loading {
            Self::SlowLoading
        } else if facts.broken_layout {
            Self::BrokenLayout
        } else if facts.uses_free_email && facts.has_website {
            Self::FreeEmailWithWebsite
        } else if facts.uses_free_email {
            Self::FreeEmail
        } else if facts.ai_poor_design {
            Self::AiPoorDesign
        } else {
            Self::Generic
        }
    }

    pub fn render(self, niche: &str) -> String {
        match self {
            Self::NoWebsite => format!(
                "Right now, when potential customers search for {niche} services in your area, \
                 they can't find you online. Studies show over 80% of people research businesses \
                 online before visiting, so without a website you're invisible to most of them. \
                 A clean, professional site could change that overnight."
            ),
            Self::SocialMediaOnly => format!(
                "Your social media page is a great start, but it doesn't show up in Google searches \
                 the way a proper website does. Most customers looking for {niche} services \
                 start with a Google search, and a dedicated website would help you capture \
                 that traffic and convert visitors into real bookings."
            ),
            Self::WebsiteUnreachable => format!(
                "When I tried to visit your website, it wasn't loading, which means potential \
                 customers are running into the same issue. For a {niche} business, every hour \
                 your site is down is a missed opportunity. A reliable, well-built website \
                 ensures you're always reachable."
            ),
            Self::OutdatedDesign => format!(
                "Your current website has good bones, but the design looks like it could use \
                 a refresh. In today's market, customers judge a {niche} business within seconds \
                 of landing on the site, and an updated look can make the difference between \
                 someone booking or clicking away."
            ),
            Self::NotMobileFriendly => "Your website doesn't appear to be optimized for mobile devices. \
                 Over 60% of local searches happen on phones. If your site is hard to \
                 navigate on a phone, those visitors are likely bouncing to competitors \
                 with mobile-friendly sites."
                .to_string(),
            Self::SlowLoading => format!(
                "Your website takes a bit longer than ideal to load, and research shows \
                 most visitors leave a site that doesn't load within 3 seconds. For a {niche} \
                 business, every lost visitor is a lost booking or inquiry. A faster site \
                 would help you keep those potential customers engaged."
            ),
            Self::BrokenLayout => format!(
                "Your website has some layout issues that might be affecting how customers \
                 perceive your business. First impressions matter: when someone visits a \
                 {niche} site and things look off, they often leave without reaching out. \
                 A polished, well-structured design would help build that instant trust."
            ),
            Self::FreeEmailWithWebsite => format!(
                "One thing that stood out is that you're using a free email provider like Gmail \
                 for business inquiries. While your website is there, pairing it with a professional \
                 email (like info@yourbusiness.com) would help build credibility. Customers \
                 tend to trust {niche} businesses more when everything looks polished and consistent."
            ),
            Self::FreeEmail => format!(
                "I noticed you're using a free email provider, which is common but can make \
                 a {niche} business look less established. A professional email tied to your \
                 own domain (like info@yourbusiness.com) paired with a matching website \
                 builds credibility and trust with new customers."
            ),
            Self::AiPoorDesign => format!(
                "After looking at your website, I think there's a real opportunity to elevate \
                 how your business comes across online. A more modern, polished design could help \
                 you stand out from other {niche} businesses in the area and give potential \
                 customers more confidence to reach out."
            ),
            Self::Generic => format!(
                "Looking at your current online presence, there's a real opportunity to attract \
                 more customers with a stronger website. In the {niche} space, \
                 a polished online presence is often the difference between getting the call \
                 or losing it to a competitor."
            ),
        }
    }
}

/// Fallback pitch text for `facts`.
pub fn fallback_pitch(facts: &FactSheet, niche: &str) -> String {
    FallbackPitch::select(facts).render(niche)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personalize::guard::find_contradiction;
    use proptest::prelude::*;

    #[test]
    fn test_precedence_order() {
        let mut facts = FactSheet {
            has_website: true,
            uses_free_email: true,
            slow_loading: true,
            outdated_design: true,
            ..Default::default()
        };
        assert_eq!(FallbackPitch::select(&facts), FallbackPitch::OutdatedDesign);

        facts.outdated_design = false;
        assert_eq!(FallbackPitch::select(&facts), FallbackPitch::SlowLoading);

        facts.slow_loading = false;
        assert_eq!(FallbackPitch::select(&facts), FallbackPitch::FreeEmailWithWebsite);

        facts.has_website = false;
        assert_eq!(FallbackPitch::select(&facts), FallbackPitch::FreeEmail);

        facts.uses_free_email = false;
        assert_eq!(FallbackPitch::select(&facts), FallbackPitch::Generic);
    }

    #[test]
    fn test_unreachable_beats_design_signals() {
        let facts = FactSheet {
            has_website: true,
            website_unreachable: true,
            broken_layout: true,
            ai_poor_design: true,
            ..Default::default()
        };
        assert_eq!(FallbackPitch::select(&facts), FallbackPitch::WebsiteUnreachable);
    }

    #[test]
    fn test_niche_is_substituted() {
        let text = fallback_pitch(&FactSheet::default(), "plumbing");
        assert!(text.contains("In the plumbing space"));
    }

    #[test]
    fn test_free_email_pitch_with_site_passes_guard() {
        let facts = FactSheet {
            has_website: true,
            uses_free_email: true,
            ..Default::default()
        };
        let text = fallback_pitch(&facts, "dentist");
        assert_eq!(find_contradiction(&text, &facts), None);
    }

    fn arb_facts() -> impl Strategy<Value = FactSheet> {
        prop::collection::vec(any::<bool>(), 10).prop_map(|b| FactSheet {
            has_website: b[0],
            no_website: b[1],
            social_media_only: b[2],
            outdated_design: b[3],
            not_mobile_friendly: b[4],
            slow_loading: b[5],
            broken_layout: b[6],
            uses_free_email: b[7],
            website_unreachable: b[8],
            ai_poor_design: b[9],
            ..Default::default()
        })
    }

    proptest! {
        #[test]
        fn prop_selection_is_deterministic(facts in arb_facts(), niche in "[a-z ]{0,12}") {
            let first = fallback_pitch(&facts, &niche);
            let second = fallback_pitch(&facts.clone(), &niche);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_no_website_always_wins(mut facts in arb_facts()) {
            facts.no_website = true;
            prop_assert_eq!(FallbackPitch::select(&facts), FallbackPitch::NoWebsite);
        }
    }
}
