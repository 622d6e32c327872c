use serde::Serialize;

use crate::domain::{Complexity, ProjectDescriptor, ProjectType};
use crate::errors::AnalyzerError;

use super::{Recommendation, SpecialistAnalyzer};

pub fn hourly_rate(project_type: ProjectType) -> u32 {
    match project_type {
        ProjectType::Web => 850,
        ProjectType::Mobile => 1_100,
        ProjectType::Ai => 1_500,
        ProjectType::Ecommerce => 950,
        ProjectType::Enterprise => 1_200,
        ProjectType::Other => 800,
    }
}

pub fn estimated_hours(complexity: Complexity) -> u32 {
    match complexity {
        Complexity::Simple => 80,
        Complexity::Medium => 160,
        Complexity::Complex => 320,
        Complexity::VeryComplex => 640,
    }
}

#[derive(Debug, Serialize)]
struct RateCardReport {
    hourly_rate_zar: u32,
    estimated_hours: u32,
    urgency_multiplier: f64,
    payment_terms: &'static [&'static str],
}

/// Hourly-rate view of the project, independent of the price estimate.
#[derive(Clone, Copy, Debug, Default)]
pub struct RateCardAnalyzer;

impl SpecialistAnalyzer for RateCardAnalyzer {
    fn name(&self) -> &'static str {
        "rate_card"
    }

    fn analyze(&self, descriptor: &ProjectDescriptor) -> Result<Recommendation, AnalyzerError> {
        Recommendation::from_report(
            self.name(),
            &RateCardReport {
                hourly_rate_zar: hourly_rate(descriptor.project_type),
                estimated_hours: estimated_hours(descriptor.complexity),
                urgency_multiplier: if descriptor.timeline.is_rushed() { 1.5 } else { 1.0 },
                payment_terms: &[
                    "50% upfront, 50% on completion",
                    "Monthly milestones",
                    "ZAR payments only",
                ],
            },
        )
    }
}
