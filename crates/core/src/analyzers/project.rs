use serde::Serialize;

use crate::domain::{Complexity, ProjectDescriptor};
use crate::errors::AnalyzerError;
use crate::features::count_technical_terms;

use super::{Recommendation, SpecialistAnalyzer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 10.0 {
            Self::Low
        } else if score < 20.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

fn tier_weight(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Simple => 1.0,
        Complexity::Medium => 3.0,
        Complexity::Complex => 6.0,
        Complexity::VeryComplex => 10.0,
    }
}

/// `words * 0.1 + technical terms * 2 + tier weight`, rounded to two places.
pub fn complexity_score(descriptor: &ProjectDescriptor) -> f64 {
    let words = descriptor.description.split_whitespace().count() as f64;
    let terms = count_technical_terms(&descriptor.description) as f64;
    let score = words * 0.1 + terms * 2.0 + tier_weight(descriptor.complexity);
    (score * 100.0).round() / 100.0
}

#[derive(Debug, Serialize)]
struct ProjectReport {
    complexity_score: f64,
    estimated_timeline_weeks: f64,
    key_requirements_identified: usize,
    risk_assessment: RiskLevel,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectAnalyzer;

impl SpecialistAnalyzer for ProjectAnalyzer {
    fn name(&self) -> &'static str {
        "project_analyzer"
    }

    fn analyze(&self, descriptor: &ProjectDescriptor) -> Result<Recommendation, AnalyzerError> {
        let score = complexity_score(descriptor);
        Recommendation::from_report(
            self.name(),
            &ProjectReport {
                complexity_score: score,
                estimated_timeline_weeks: (score * 1.5).max(2.0),
                key_requirements_identified: count_technical_terms(&descriptor.description),
                risk_assessment: RiskLevel::from_score(score),
            },
        )
    }
}
