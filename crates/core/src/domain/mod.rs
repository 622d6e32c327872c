pub mod descriptor;
pub mod estimate;

pub use descriptor::{
    Categorical, Complexity, DescriptorRequest, ProjectDescriptor, ProjectType, TeamSize, Timeline,
};
pub use estimate::{
    CostCategory, Estimate, EstimationPath, EstimationResult, PriceBreakdown, CURRENCY_ZAR,
    MARKET_LABEL,
};
