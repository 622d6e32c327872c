use serde::Serialize;

use crate::domain::{ProjectDescriptor, ProjectType};
use crate::errors::AnalyzerError;

use super::{Recommendation, SpecialistAnalyzer};

const LOCAL_CONSIDERATIONS: &[&str] =
    &["Local hosting options", "Payment gateways supporting ZAR", "SA compliance standards"];

#[derive(Debug, Serialize)]
struct TechnologyReport {
    recommended_tech_stack: &'static [&'static str],
    scalability_recommendations: &'static str,
    sa_specific_recommendations: &'static [&'static str],
}

pub fn tech_stack(project_type: ProjectType) -> &'static [&'static str] {
    match project_type {
        ProjectType::Web => &["React.js", "Node.js", "MongoDB", "AWS"],
        ProjectType::Mobile => &["React Native", "Firebase", "iOS/Android Native"],
        ProjectType::Ai => &["Python", "TensorFlow", "PyTorch", "Scikit-learn"],
        ProjectType::Ecommerce => &["Shopify", "WooCommerce", "Magento", "Stripe"],
        ProjectType::Enterprise => &["Java Spring", ".NET", "Oracle DB", "Docker"],
        ProjectType::Other => &["JavaScript", "Python", "SQL", "Cloud Services"],
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TechRecommender;

impl SpecialistAnalyzer for TechRecommender {
    fn name(&self) -> &'static str {
        "tech_recommender"
    }

    fn analyze(&self, descriptor: &ProjectDescriptor) -> Result<Recommendation, AnalyzerError> {
        let scalability = if descriptor.complexity.uses_learned_model() {
            "Microservices architecture"
        } else {
            "Monolithic architecture"
        };

        Recommendation::from_report(
            self.name(),
            &TechnologyReport {
                recommended_tech_stack: tech_stack(descriptor.project_type),
                scalability_recommendations: scalability,
                sa_specific_recommendations: LOCAL_CONSIDERATIONS,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::TechRecommender;
    use crate::analyzers::SpecialistAnalyzer;
    use crate::domain::{Complexity, ProjectDescriptor, ProjectType, TeamSize, Timeline};

    #[test]
    fn recommends_stack_and_architecture_by_tier() {
        let simple = ProjectDescriptor::new(
            "Model serving",
            ProjectType::Ai,
            Complexity::Medium,
            Timeline::Standard,
            TeamSize::Small,
        );
        let report = TechRecommender.analyze(&simple).expect("report");
        assert_eq!(
            report.get("recommended_tech_stack"),
            Some(&json!(["Python", "TensorFlow", "PyTorch", "Scikit-learn"]))
        );
        assert_eq!(
            report.get("scalability_recommendations"),
            Some(&json!("Monolithic architecture"))
        );

        let complex = ProjectDescriptor { complexity: Complexity::VeryComplex, ..simple };
        let report = TechRecommender.analyze(&complex).expect("report");
        assert_eq!(
            report.get("scalability_recommendations"),
            Some(&json!("Microservices architecture"))
        );
    }
}
