use serde::Serialize;

use crate::domain::{Complexity, ProjectDescriptor};
use crate::errors::AnalyzerError;

use super::{Recommendation, SpecialistAnalyzer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SecurityLevel {
    Standard,
    Advanced,
    Military,
}

impl SecurityLevel {
    pub fn for_tier(complexity: Complexity) -> Self {
        match complexity {
            Complexity::Simple | Complexity::Medium => Self::Standard,
            Complexity::Complex => Self::Advanced,
            Complexity::VeryComplex => Self::Military,
        }
    }
}

#[derive(Debug, Serialize)]
struct SecurityReport {
    recommended_security_level: SecurityLevel,
    encryption_standards: &'static [&'static str],
    compliance_frameworks: &'static [&'static str],
    security_testing: &'static [&'static str],
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SecurityAuditor;

impl SpecialistAnalyzer for SecurityAuditor {
    fn name(&self) -> &'static str {
        "security_auditor"
    }

    fn analyze(&self, descriptor: &ProjectDescriptor) -> Result<Recommendation, AnalyzerError> {
        Recommendation::from_report(
            self.name(),
            &SecurityReport {
                recommended_security_level: SecurityLevel::for_tier(descriptor.complexity),
                encryption_standards: &["AES-256", "TLS 1.3", "End-to-end encryption"],
                compliance_frameworks: &["POPIA (SA)", "GDPR", "ISO 27001"],
                security_testing: &["Penetration testing", "Code review", "Vulnerability assessment"],
            },
        )
    }
}
