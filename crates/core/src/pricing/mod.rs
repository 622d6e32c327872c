pub mod breakdown;
pub mod learned;
pub mod rules;

use std::panic::{catch_unwind, AssertUnwindSafe};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyzers::{AnalyzerPanel, Recommendations};
use crate::config::PricingConfig;
use crate::domain::{
    Complexity, Estimate, EstimationPath, EstimationResult, ProjectDescriptor, CURRENCY_ZAR,
    MARKET_LABEL,
};
use crate::errors::EstimationError;

pub use learned::{train_and_store, LearnedEstimator};
pub use rules::{PricingTable, RuleBasedEstimator};

pub trait PriceEstimator: Send + Sync {
    fn estimate(&self, descriptor: &ProjectDescriptor) -> Result<Estimate, EstimationError>;
}

/// Pricing and specialist recommendations for one descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub pricing: EstimationResult,
    pub recommendations: Recommendations,
}

/// Chooses the estimator per tier, applies market adjustment and rounding,
/// and never fails: the rule tables price anything the learned path cannot.
pub struct EstimationOrchestrator<L = LearnedEstimator> {
    rules: RuleBasedEstimator,
    learned: L,
    analyzers: AnalyzerPanel,
    config: PricingConfig,
}

impl EstimationOrchestrator<LearnedEstimator> {
    /// Orchestrator without a trained model; complex tiers use the fallback path.
    pub fn rules_only(config: &PricingConfig) -> Self {
        Self::new(config, LearnedEstimator::unavailable())
    }
}

impl<L> EstimationOrchestrator<L>
where
    L: PriceEstimator,
{
    pub fn new(config: &PricingConfig, learned: L) -> Self {
        Self {
            rules: RuleBasedEstimator::from_config(config),
            learned,
            analyzers: AnalyzerPanel::standard(),
            config: config.clone(),
        }
    }

    pub fn with_analyzers(mut self, analyzers: AnalyzerPanel) -> Self {
        self.analyzers = analyzers;
        self
    }

    pub fn learned(&self) -> &L {
        &self.learned
    }

    pub fn rules(&self) -> &RuleBasedEstimator {
        &self.rules
    }

    pub fn calculate_price(&self, descriptor: &ProjectDescriptor) -> EstimationResult {
        let tier = descriptor.complexity;
        let (estimate, path) = if tier.uses_learned_model() {
            match self.run_learned(descriptor) {
                Ok(estimate) => (estimate, EstimationPath::Learned),
                Err(error) => {
                    warn!(
                        event_name = "pricing.learned_fallback",
                        tier = %tier,
                        project_type = %descriptor.project_type,
                        error = %error,
                        "learned estimator failed; pricing with rule tables"
                    );
                    let base_price = self.rules.price(descriptor).base_price;
                    let confidence = self.config.fallback_confidence;
                    (Estimate { base_price, confidence }, EstimationPath::RuleBasedFallback)
                }
            }
        } else {
            (self.rules.price(descriptor), EstimationPath::RuleBased)
        };

        let result = self.finalize(estimate, tier, path);
        debug!(
            event_name = "pricing.estimated",
            tier = %tier,
            path = path.as_str(),
            final_price = %result.final_price,
            confidence = result.confidence,
            "project priced"
        );
        result
    }

    pub fn analyze(&self, descriptor: &ProjectDescriptor) -> ProjectAnalysis {
        ProjectAnalysis {
            pricing: self.calculate_price(descriptor),
            recommendations: self.analyzers.analyze_all(descriptor),
        }
    }

    fn run_learned(&self, descriptor: &ProjectDescriptor) -> Result<Estimate, EstimationError> {
        let estimate = catch_unwind(AssertUnwindSafe(|| self.learned.estimate(descriptor)))
            .map_err(|_| EstimationError::Prediction("learned estimator panicked".to_string()))??;

        let price_is_usable = estimate.base_price > Decimal::ZERO
            && estimate.base_price.checked_mul(self.config.market_multiplier).is_some();
        if !price_is_usable {
            return Err(EstimationError::Prediction(format!(
                "unusable base price {}",
                estimate.base_price
            )));
        }
        if !(0.0..=1.0).contains(&estimate.confidence) {
            return Err(EstimationError::Prediction(format!(
                "confidence {} outside 0..=1",
                estimate.confidence
            )));
        }
        Ok(estimate)
    }

    fn finalize(
        &self,
        estimate: Estimate,
        tier: Complexity,
        path: EstimationPath,
    ) -> EstimationResult {
        let floor = self.config.floor_price;
        let increment = self.config.rounding.for_tier(tier);

        let adjusted = (estimate.base_price * self.config.market_multiplier).max(floor);
        let final_price = round_to_increment(adjusted, increment).max(floor);
        let base_price_usd = (final_price / self.config.exchange_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        EstimationResult {
            base_price: estimate.base_price.round_dp(2),
            final_price,
            base_price_usd,
            currency: CURRENCY_ZAR.to_string(),
            market: MARKET_LABEL.to_string(),
            confidence: estimate.confidence,
            breakdown: breakdown::allocate(final_price, tier),
            tier,
            path,
            rounding_increment: increment,
            affordable_tier: true,
        }
    }
}

/// Rounds to the nearest multiple of `increment`, halves away from zero.
pub fn round_to_increment(value: Decimal, increment: Decimal) -> Decimal {
    if increment <= Decimal::ZERO {
        return value;
    }
    (value / increment).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * increment
}
