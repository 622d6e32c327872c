pub mod analyzers;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod features;
pub mod ml;
pub mod pricing;

pub use analyzers::{AnalyzerPanel, Recommendation, Recommendations, SpecialistAnalyzer};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::{
    Categorical, Complexity, CostCategory, DescriptorRequest, Estimate, EstimationPath,
    EstimationResult, ProjectDescriptor, ProjectType, TeamSize, Timeline,
};
pub use errors::{ApplicationError, DomainError, EstimationError, InterfaceError, ModelStoreError};
pub use features::{FeatureVector, FEATURE_DIM};
pub use ml::{FileModelStore, InMemoryModelStore, ModelStore, PriceModel};
pub use pricing::{
    EstimationOrchestrator, LearnedEstimator, PriceEstimator, PricingTable, ProjectAnalysis,
    RuleBasedEstimator,
};
