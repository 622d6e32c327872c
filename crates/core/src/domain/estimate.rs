use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::descriptor::Complexity;

pub const CURRENCY_ZAR: &str = "ZAR";
pub const MARKET_LABEL: &str = "South Africa";

/// Raw output of an estimator before market adjustment and rounding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub base_price: Decimal,
    pub confidence: f64,
}

/// Which estimator produced the price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationPath {
    RuleBased,
    Learned,
    /// The learned path was selected but failed; rule tables priced the project.
    RuleBasedFallback,
}

impl EstimationPath {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RuleBased => "rule_based",
            Self::Learned => "learned",
            Self::RuleBasedFallback => "rule_based_fallback",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    RequirementsAnalysis,
    Development,
    BackendDevelopment,
    FrontendDevelopment,
    Database,
    ApiIntegration,
    ProjectManagement,
    QualityAssurance,
    Testing,
    Security,
    Deployment,
    Documentation,
    Support,
}

pub type PriceBreakdown = BTreeMap<CostCategory, Decimal>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub base_price: Decimal,
    pub final_price: Decimal,
    pub base_price_usd: Decimal,
    pub currency: String,
    pub market: String,
    pub confidence: f64,
    pub breakdown: PriceBreakdown,
    pub tier: Complexity,
    pub path: EstimationPath,
    pub rounding_increment: Decimal,
    pub affordable_tier: bool,
}

impl EstimationResult {
    pub fn breakdown_total(&self) -> Decimal {
        self.breakdown.values().copied().sum()
    }
}
