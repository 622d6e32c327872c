use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::DomainError;

/// A closed set of labelled categories with a documented default bucket.
///
/// Unknown labels never fail: they resolve to [`Categorical::DEFAULT`] and a
/// `descriptor.unknown_label` diagnostic is emitted.
pub trait Categorical: Copy + Eq + Sized + 'static {
    const FIELD: &'static str;
    const ALL: &'static [Self];
    const DEFAULT: Self;

    fn label(self) -> &'static str;

    fn index(self) -> usize {
        Self::ALL.iter().position(|candidate| *candidate == self).unwrap_or(0)
    }

    fn from_label(raw: &str) -> Option<Self> {
        let normalized = normalize_label(raw);
        Self::ALL.iter().copied().find(|candidate| candidate.label() == normalized)
    }

    fn parse_lenient(raw: &str) -> Self {
        Self::from_label(raw).unwrap_or_else(|| {
            warn!(
                event_name = "descriptor.unknown_label",
                field = Self::FIELD,
                label = raw,
                substituted = Self::DEFAULT.label(),
                "unknown descriptor label replaced with default bucket"
            );
            Self::DEFAULT
        })
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

macro_rules! categorical_conversions {
    ($ty:ty) => {
        impl From<String> for $ty {
            fn from(value: String) -> Self {
                <$ty as Categorical>::parse_lenient(&value)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum ProjectType {
    Web,
    Mobile,
    Ai,
    Ecommerce,
    Enterprise,
    Other,
}

impl Categorical for ProjectType {
    const FIELD: &'static str = "project_type";
    const ALL: &'static [Self] =
        &[Self::Web, Self::Mobile, Self::Ai, Self::Ecommerce, Self::Enterprise, Self::Other];
    const DEFAULT: Self = Self::Other;

    fn label(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Mobile => "mobile",
            Self::Ai => "ai",
            Self::Ecommerce => "ecommerce",
            Self::Enterprise => "enterprise",
            Self::Other => "other",
        }
    }
}

categorical_conversions!(ProjectType);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
    VeryComplex,
}

impl Complexity {
    /// Tiers priced by the learned model; everything below stays on the rule tables.
    pub fn uses_learned_model(self) -> bool {
        matches!(self, Self::Complex | Self::VeryComplex)
    }
}

impl Categorical for Complexity {
    const FIELD: &'static str = "complexity";
    const ALL: &'static [Self] = &[Self::Simple, Self::Medium, Self::Complex, Self::VeryComplex];
    const DEFAULT: Self = Self::Medium;

    fn label(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
            Self::VeryComplex => "very-complex",
        }
    }
}

categorical_conversions!(Complexity);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum Timeline {
    Flexible,
    Standard,
    Urgent,
    Asap,
}

impl Timeline {
    pub fn is_rushed(self) -> bool {
        matches!(self, Self::Urgent | Self::Asap)
    }
}

impl Categorical for Timeline {
    const FIELD: &'static str = "timeline";
    const ALL: &'static [Self] = &[Self::Flexible, Self::Standard, Self::Urgent, Self::Asap];
    const DEFAULT: Self = Self::Standard;

    fn label(self) -> &'static str {
        match self {
            Self::Flexible => "flexible",
            Self::Standard => "standard",
            Self::Urgent => "urgent",
            Self::Asap => "asap",
        }
    }
}

categorical_conversions!(Timeline);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum TeamSize {
    Solo,
    Small,
    Medium,
    Large,
}

impl Categorical for TeamSize {
    const FIELD: &'static str = "team_size";
    const ALL: &'static [Self] = &[Self::Solo, Self::Small, Self::Medium, Self::Large];
    const DEFAULT: Self = Self::Small;

    fn label(self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

categorical_conversions!(TeamSize);

/// Structured input describing a project to be estimated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub description: String,
    pub project_type: ProjectType,
    pub complexity: Complexity,
    pub timeline: Timeline,
    pub team_size: TeamSize,
}

impl ProjectDescriptor {
    pub fn new(
        description: impl Into<String>,
        project_type: ProjectType,
        complexity: Complexity,
        timeline: Timeline,
        team_size: TeamSize,
    ) -> Self {
        Self { description: description.into(), project_type, complexity, timeline, team_size }
    }

    pub fn description_chars(&self) -> usize {
        self.description.chars().count()
    }
}

/// Unvalidated descriptor fields as they arrive from a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub complexity: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
}

impl DescriptorRequest {
    /// Every field must be present and non-blank. Unknown enum labels are
    /// accepted and resolved to their default bucket.
    pub fn validate(&self) -> Result<ProjectDescriptor, DomainError> {
        let description = required("description", self.description.as_deref())?;
        let project_type = required("project_type", self.project_type.as_deref())?;
        let complexity = required("complexity", self.complexity.as_deref())?;
        let timeline = required("timeline", self.timeline.as_deref())?;
        let team_size = required("team_size", self.team_size.as_deref())?;

        Ok(ProjectDescriptor::new(
            description,
            ProjectType::parse_lenient(project_type),
            Complexity::parse_lenient(complexity),
            Timeline::parse_lenient(timeline),
            TeamSize::parse_lenient(team_size),
        ))
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, DomainError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(DomainError::MissingField { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Categorical, Complexity, DescriptorRequest, ProjectDescriptor, ProjectType, TeamSize,
        Timeline,
    };
    use crate::errors::DomainError;

    #[test]
    fn labels_parse_case_and_separator_insensitively() {
        assert_eq!(Complexity::from_label("Very_Complex"), Some(Complexity::VeryComplex));
        assert_eq!(Complexity::from_label(" very complex "), Some(Complexity::VeryComplex));
        assert_eq!(ProjectType::from_label("ECOMMERCE"), Some(ProjectType::Ecommerce));
        assert_eq!(Timeline::from_label("soonish"), None);
    }

    #[test]
    fn unknown_labels_fall_back_to_default_bucket() {
        assert_eq!(ProjectType::parse_lenient("blockchain"), ProjectType::Other);
        assert_eq!(Complexity::parse_lenient(""), Complexity::Medium);
        assert_eq!(Timeline::parse_lenient("yesterday"), Timeline::Standard);
        assert_eq!(TeamSize::parse_lenient("army"), TeamSize::Small);
    }

    #[test]
    fn indexes_follow_declaration_order() {
        assert_eq!(ProjectType::Web.index(), 0);
        assert_eq!(ProjectType::Other.index(), 5);
        assert_eq!(Complexity::VeryComplex.index(), 3);
        assert_eq!(TeamSize::Large.index(), 3);
    }

    #[test]
    fn descriptor_deserializes_with_lenient_enums() {
        let descriptor: ProjectDescriptor = serde_json::from_str(
            r#"{
                "description": "Shop with card payments",
                "project_type": "ecommerce",
                "complexity": "very-complex",
                "timeline": "whenever",
                "team_size": "large"
            }"#,
        )
        .expect("descriptor should deserialize");

        assert_eq!(descriptor.project_type, ProjectType::Ecommerce);
        assert_eq!(descriptor.complexity, Complexity::VeryComplex);
        assert_eq!(descriptor.timeline, Timeline::Standard);
        assert_eq!(descriptor.team_size, TeamSize::Large);
    }

    #[test]
    fn descriptor_serializes_canonical_labels() {
        let descriptor = ProjectDescriptor::new(
            "Landing page",
            ProjectType::Web,
            Complexity::VeryComplex,
            Timeline::Asap,
            TeamSize::Solo,
        );
        let json = serde_json::to_value(&descriptor).expect("serialize");
        assert_eq!(json["complexity"], "very-complex");
        assert_eq!(json["project_type"], "web");
    }

    #[test]
    fn description_length_counts_characters_not_bytes() {
        let descriptor = ProjectDescriptor::new(
            "café",
            ProjectType::Web,
            Complexity::Simple,
            Timeline::Standard,
            TeamSize::Solo,
        );
        assert_eq!(descriptor.description_chars(), 4);
    }

    fn request() -> DescriptorRequest {
        DescriptorRequest {
            description: Some("  Landing page ".to_string()),
            project_type: Some("web".to_string()),
            complexity: Some("simple".to_string()),
            timeline: Some("flexible".to_string()),
            team_size: Some("solo".to_string()),
        }
    }

    #[test]
    fn complete_requests_validate_into_descriptors() {
        let descriptor = request().validate().expect("valid request");
        assert_eq!(descriptor.description, "Landing page");
        assert_eq!(descriptor.project_type, ProjectType::Web);
        assert_eq!(descriptor.complexity, Complexity::Simple);
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        let missing = DescriptorRequest { timeline: None, ..request() };
        assert_eq!(missing.validate(), Err(DomainError::MissingField { field: "timeline" }));

        let blank = DescriptorRequest { description: Some("   ".to_string()), ..request() };
        assert_eq!(blank.validate(), Err(DomainError::MissingField { field: "description" }));
    }

    #[test]
    fn unknown_labels_in_requests_use_default_buckets() {
        let request = DescriptorRequest { team_size: Some("army".to_string()), ..request() };
        assert_eq!(request.validate().expect("lenient").team_size, TeamSize::Small);
    }
}
