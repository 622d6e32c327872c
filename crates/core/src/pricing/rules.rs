use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::domain::{
    Categorical, Complexity, Estimate, ProjectDescriptor, ProjectType, TeamSize, Timeline,
};
use crate::errors::EstimationError;

use super::PriceEstimator;

/// Description-length scaling applied when the description is strictly longer than `min_chars`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthTier {
    pub min_chars: usize,
    pub multiplier: Decimal,
}

/// Lookup tables shared by the rule estimator and the synthetic training set.
///
/// Tables are indexed by [`Categorical::index`], so every enum value has an entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTable {
    pub base_prices: [Decimal; 6],
    pub complexity_multipliers: [Decimal; 4],
    pub timeline_multipliers: [Decimal; 4],
    pub team_multipliers: [Decimal; 4],
    /// Ordered from the longest threshold down; the first match wins.
    pub length_tiers: Vec<LengthTier>,
    pub floor_price: Decimal,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::affordable()
    }
}

impl PricingTable {
    /// South African affordable-tier tables.
    pub fn affordable() -> Self {
        Self {
            base_prices: [
                Decimal::from(25_000),
                Decimal::from(40_000),
                Decimal::from(75_000),
                Decimal::from(50_000),
                Decimal::from(100_000),
                Decimal::from(35_000),
            ],
            complexity_multipliers: [
                Decimal::new(5, 1),
                Decimal::ONE,
                Decimal::new(13, 1),
                Decimal::new(18, 1),
            ],
            timeline_multipliers: [
                Decimal::new(8, 1),
                Decimal::ONE,
                Decimal::new(12, 1),
                Decimal::new(15, 1),
            ],
            team_multipliers: [
                Decimal::new(6, 1),
                Decimal::ONE,
                Decimal::new(12, 1),
                Decimal::new(15, 1),
            ],
            length_tiers: vec![
                LengthTier { min_chars: 1_000, multiplier: Decimal::new(110, 2) },
                LengthTier { min_chars: 500, multiplier: Decimal::new(105, 2) },
            ],
            floor_price: Decimal::from(5_000),
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        let mut table = Self::affordable();
        table.floor_price = config.floor_price;
        for (project_type, price) in &config.base_price_overrides {
            table.base_prices[project_type.index()] = *price;
        }
        table
    }

    pub fn base_price(&self, project_type: ProjectType) -> Decimal {
        self.base_prices[project_type.index()]
    }

    pub fn complexity_multiplier(&self, complexity: Complexity) -> Decimal {
        self.complexity_multipliers[complexity.index()]
    }

    pub fn timeline_multiplier(&self, timeline: Timeline) -> Decimal {
        self.timeline_multipliers[timeline.index()]
    }

    pub fn team_multiplier(&self, team_size: TeamSize) -> Decimal {
        self.team_multipliers[team_size.index()]
    }

    pub fn length_multiplier(&self, description_chars: usize) -> Decimal {
        self.length_tiers
            .iter()
            .find(|tier| description_chars > tier.min_chars)
            .map(|tier| tier.multiplier)
            .unwrap_or(Decimal::ONE)
    }

    /// Table price before the description-length tier and the floor.
    pub fn categorical_price(
        &self,
        project_type: ProjectType,
        complexity: Complexity,
        timeline: Timeline,
        team_size: TeamSize,
    ) -> Decimal {
        self.base_price(project_type)
            * self.complexity_multiplier(complexity)
            * self.timeline_multiplier(timeline)
            * self.team_multiplier(team_size)
    }

    pub fn clamp_to_floor(&self, price: Decimal) -> Decimal {
        price.max(self.floor_price)
    }

    pub fn price(&self, descriptor: &ProjectDescriptor) -> Decimal {
        let price = self.categorical_price(
            descriptor.project_type,
            descriptor.complexity,
            descriptor.timeline,
            descriptor.team_size,
        ) * self.length_multiplier(descriptor.description_chars());
        self.clamp_to_floor(price)
    }
}

/// Deterministic table-driven estimator. Always available.
#[derive(Clone, Debug)]
pub struct RuleBasedEstimator {
    table: PricingTable,
    confidence: f64,
}

impl RuleBasedEstimator {
    pub fn new(table: PricingTable, confidence: f64) -> Self {
        Self { table, confidence }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(PricingTable::from_config(config), config.rule_confidence)
    }

    pub fn table(&self) -> &PricingTable {
        &self.table
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn price(&self, descriptor: &ProjectDescriptor) -> Estimate {
        Estimate { base_price: self.table.price(descriptor), confidence: self.confidence }
    }
}

impl PriceEstimator for RuleBasedEstimator {
    fn estimate(&self, descriptor: &ProjectDescriptor) -> Result<Estimate, EstimationError> {
        Ok(self.price(descriptor))
    }
}
