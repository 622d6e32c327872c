//! Specialist analyzers.
//!
//! Each analyzer maps a descriptor to its own recommendation and knows nothing
//! about the others. [`AnalyzerPanel`] runs all of them and isolates failures,
//! so one broken analyzer yields an empty entry instead of blocking the rest.

pub mod marketing;
pub mod project;
pub mod rate_card;
pub mod security;
pub mod technology;

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::ProjectDescriptor;
use crate::errors::AnalyzerError;

pub use marketing::MarketingAgent;
pub use project::ProjectAnalyzer;
pub use rate_card::RateCardAnalyzer;
pub use security::SecurityAuditor;
pub use technology::TechRecommender;

/// Free-form key/value recommendation produced by one analyzer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recommendation(Map<String, Value>);

impl Recommendation {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Serialises a typed report; the report must serialise to a JSON object.
    pub fn from_report<T: Serialize>(
        analyzer: &'static str,
        report: &T,
    ) -> Result<Self, AnalyzerError> {
        match serde_json::to_value(report)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(AnalyzerError::NotAnObject { analyzer }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

pub trait SpecialistAnalyzer: Send + Sync {
    fn name(&self) -> &'static str;
    fn analyze(&self, descriptor: &ProjectDescriptor) -> Result<Recommendation, AnalyzerError>;
}

/// Recommendations keyed by analyzer name.
pub type Recommendations = BTreeMap<String, Recommendation>;

#[derive(Clone)]
pub struct AnalyzerPanel {
    analyzers: Vec<Arc<dyn SpecialistAnalyzer>>,
}

impl Default for AnalyzerPanel {
    fn default() -> Self {
        Self::standard()
    }
}

impl AnalyzerPanel {
    pub fn new(analyzers: Vec<Arc<dyn SpecialistAnalyzer>>) -> Self {
        Self { analyzers }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(ProjectAnalyzer),
            Arc::new(TechRecommender),
            Arc::new(RateCardAnalyzer),
            Arc::new(SecurityAuditor),
            Arc::new(MarketingAgent),
        ])
    }

    pub fn with(mut self, analyzer: Arc<dyn SpecialistAnalyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|analyzer| analyzer.name()).collect()
    }

    pub fn analyze_all(&self, descriptor: &ProjectDescriptor) -> Recommendations {
        self.analyzers
            .iter()
            .map(|analyzer| (analyzer.name().to_string(), run_isolated(analyzer.as_ref(), descriptor)))
            .collect()
    }
}

fn run_isolated(analyzer: &dyn SpecialistAnalyzer, descriptor: &ProjectDescriptor) -> Recommendation {
    let name = analyzer.name();
    let outcome = catch_unwind(AssertUnwindSafe(|| analyzer.analyze(descriptor)))
        .unwrap_or(Err(AnalyzerError::Panicked { analyzer: name }));

    match outcome {
        Ok(recommendation) => recommendation,
        Err(error) => {
            warn!(
                event_name = "analyzer.isolated_failure",
                analyzer = name,
                error = %error,
                "analyzer failed; substituting empty recommendation"
            );
            Recommendation::empty()
        }
    }
}
