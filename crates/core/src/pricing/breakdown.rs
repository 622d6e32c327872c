use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{Complexity, CostCategory, PriceBreakdown};

/// Basis points per category; each table sums to 10_000.
pub type WeightTable = &'static [(CostCategory, u32)];

pub const BASIS_POINTS_TOTAL: u32 = 10_000;

const SIMPLE_WEIGHTS: WeightTable = &[
    (CostCategory::Development, 7_000),
    (CostCategory::ProjectManagement, 1_500),
    (CostCategory::QualityAssurance, 1_000),
    (CostCategory::Deployment, 500),
];

const MEDIUM_WEIGHTS: WeightTable = &[
    (CostCategory::Development, 6_000),
    (CostCategory::ProjectManagement, 1_500),
    (CostCategory::QualityAssurance, 1_200),
    (CostCategory::Deployment, 800),
    (CostCategory::Support, 500),
];

const COMPLEX_WEIGHTS: WeightTable = &[
    (CostCategory::RequirementsAnalysis, 1_000),
    (CostCategory::BackendDevelopment, 2_000),
    (CostCategory::FrontendDevelopment, 1_500),
    (CostCategory::Database, 800),
    (CostCategory::ApiIntegration, 700),
    (CostCategory::ProjectManagement, 1_000),
    (CostCategory::Testing, 1_000),
    (CostCategory::Security, 500),
    (CostCategory::Deployment, 700),
    (CostCategory::Documentation, 400),
    (CostCategory::Support, 400),
];

pub fn weights_for(complexity: Complexity) -> WeightTable {
    match complexity {
        Complexity::Simple => SIMPLE_WEIGHTS,
        Complexity::Medium => MEDIUM_WEIGHTS,
        Complexity::Complex | Complexity::VeryComplex => COMPLEX_WEIGHTS,
    }
}

/// Splits `total` across the tier's categories.
///
/// Shares are rounded to cents and the rounding residue is assigned to the
/// heaviest category, so the values always sum to `total` exactly.
pub fn allocate(total: Decimal, complexity: Complexity) -> PriceBreakdown {
    let weights = weights_for(complexity);
    let mut breakdown = PriceBreakdown::new();

    let mut allocated = Decimal::ZERO;
    for (category, basis_points) in weights {
        let share = (total * Decimal::new(i64::from(*basis_points), 4))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        allocated += share;
        breakdown.insert(*category, share);
    }

    let residue = total - allocated;
    if !residue.is_zero() {
        let heaviest = weights
            .iter()
            .max_by_key(|(_, basis_points)| *basis_points)
            .map(|(category, _)| *category);
        if let Some(share) = heaviest.and_then(|category| breakdown.get_mut(&category)) {
            *share += residue;
        }
    }

    breakdown
}
