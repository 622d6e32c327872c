use serde::Serialize;

use crate::domain::{Complexity, ProjectDescriptor, ProjectType};
use crate::errors::AnalyzerError;

use super::{Recommendation, SpecialistAnalyzer};

#[derive(Debug, Serialize)]
struct MarketingReport {
    recommended_platforms: &'static [&'static str],
    sa_specific_strategies: &'static [&'static str],
    content_recommendations: &'static [&'static str],
    budget_allocation_zar: u32,
}

pub fn platforms(project_type: ProjectType) -> &'static [&'static str] {
    match project_type {
        ProjectType::Web => &["Google Ads", "Facebook", "LinkedIn", "Twitter"],
        ProjectType::Mobile => &["App Store Optimization", "TikTok", "Instagram", "YouTube"],
        ProjectType::Ai => &["LinkedIn", "Tech blogs", "Industry forums", "Research publications"],
        ProjectType::Ecommerce => &[
            "Instagram Shopping",
            "Facebook Marketplace",
            "Influencer marketing",
            "Email campaigns",
        ],
        ProjectType::Enterprise => &["LinkedIn", "Industry events", "Whitepapers", "Webinars"],
        ProjectType::Other => {
            &["Multi-channel approach", "Content marketing", "Social media advertising"]
        }
    }
}

/// Suggested launch marketing spend in rand.
pub fn budget_allocation(complexity: Complexity) -> u32 {
    match complexity {
        Complexity::Simple => 5_000,
        Complexity::Medium => 15_000,
        Complexity::Complex => 35_000,
        Complexity::VeryComplex => 70_000,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MarketingAgent;

impl SpecialistAnalyzer for MarketingAgent {
    fn name(&self) -> &'static str {
        "marketing_agent"
    }

    fn analyze(&self, descriptor: &ProjectDescriptor) -> Result<Recommendation, AnalyzerError> {
        Recommendation::from_report(
            self.name(),
            &MarketingReport {
                recommended_platforms: platforms(descriptor.project_type),
                sa_specific_strategies: &[
                    "Local SEO for South Africa",
                    "SA social media trends",
                    "Local influencer partnerships",
                ],
                content_recommendations: &[
                    "Case studies",
                    "Demo videos",
                    "Testimonials",
                    "Blog posts",
                ],
                budget_allocation_zar: budget_allocation(descriptor.complexity),
            },
        )
    }
}
