//! Fixed-length numeric encoding of a project descriptor.
//!
//! Layout (20 values):
//! - `[0..6)`   project type one-hot
//! - `[6..10)`  complexity one-hot
//! - `[10..14)` timeline one-hot
//! - `[14..18)` team size one-hot
//! - `[18]`     description length in characters
//! - `[19]`     technical term hits

use serde::{Deserialize, Serialize};

use crate::domain::{Categorical, Complexity, ProjectDescriptor, ProjectType, TeamSize, Timeline};
use crate::errors::FeatureError;

pub const FEATURE_DIM: usize = 20;

const TYPE_OFFSET: usize = 0;
const COMPLEXITY_OFFSET: usize = 6;
const TIMELINE_OFFSET: usize = 10;
const TEAM_OFFSET: usize = 14;
const DESCRIPTION_LENGTH_INDEX: usize = 18;
const TECHNICAL_TERMS_INDEX: usize = 19;

/// Lowercase single-word vocabulary matched against description tokens.
pub const TECHNICAL_VOCABULARY: &[&str] = &[
    "ai",
    "analytics",
    "api",
    "authentication",
    "aws",
    "azure",
    "blockchain",
    "cloud",
    "database",
    "docker",
    "integration",
    "kubernetes",
    "microservices",
    "ml",
    "mobile",
    "payment",
    "python",
    "react",
    "web",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn description_length(&self) -> f64 {
        self.values[DESCRIPTION_LENGTH_INDEX]
    }

    pub fn technical_terms(&self) -> f64 {
        self.values[TECHNICAL_TERMS_INDEX]
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

/// Categorical fields and scalars recovered from a [`FeatureVector`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedFeatures {
    pub project_type: ProjectType,
    pub complexity: Complexity,
    pub timeline: Timeline,
    pub team_size: TeamSize,
    pub description_length: f64,
    pub technical_terms: f64,
}

pub fn encode(descriptor: &ProjectDescriptor) -> FeatureVector {
    encode_parts(
        descriptor.project_type,
        descriptor.complexity,
        descriptor.timeline,
        descriptor.team_size,
        descriptor.description_chars(),
        count_technical_terms(&descriptor.description),
    )
}

/// Encodes already-extracted parts; used when synthesising training rows.
pub fn encode_parts(
    project_type: ProjectType,
    complexity: Complexity,
    timeline: Timeline,
    team_size: TeamSize,
    description_length: usize,
    technical_terms: usize,
) -> FeatureVector {
    let mut values = vec![0.0; FEATURE_DIM];
    values[TYPE_OFFSET + project_type.index()] = 1.0;
    values[COMPLEXITY_OFFSET + complexity.index()] = 1.0;
    values[TIMELINE_OFFSET + timeline.index()] = 1.0;
    values[TEAM_OFFSET + team_size.index()] = 1.0;
    values[DESCRIPTION_LENGTH_INDEX] = description_length as f64;
    values[TECHNICAL_TERMS_INDEX] = technical_terms as f64;
    FeatureVector { values }
}

pub fn decode(values: &[f64]) -> Result<DecodedFeatures, FeatureError> {
    if values.len() != FEATURE_DIM {
        return Err(FeatureError::Length { expected: FEATURE_DIM, actual: values.len() });
    }

    let description_length = values[DESCRIPTION_LENGTH_INDEX];
    if !description_length.is_finite() {
        return Err(FeatureError::NonFinite { name: "description_length" });
    }
    let technical_terms = values[TECHNICAL_TERMS_INDEX];
    if !technical_terms.is_finite() {
        return Err(FeatureError::NonFinite { name: "technical_terms" });
    }

    Ok(DecodedFeatures {
        project_type: arg_max(&values[TYPE_OFFSET..COMPLEXITY_OFFSET]),
        complexity: arg_max(&values[COMPLEXITY_OFFSET..TIMELINE_OFFSET]),
        timeline: arg_max(&values[TIMELINE_OFFSET..TEAM_OFFSET]),
        team_size: arg_max(&values[TEAM_OFFSET..DESCRIPTION_LENGTH_INDEX]),
        description_length,
        technical_terms,
    })
}

/// Counts whole-word, case-insensitive hits of [`TECHNICAL_VOCABULARY`].
pub fn count_technical_terms(text: &str) -> usize {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .filter(|token| {
            let lowered = token.to_lowercase();
            TECHNICAL_VOCABULARY.contains(&lowered.as_str())
        })
        .count()
}

// An all-zero block decodes to the field's default bucket.
fn arg_max<T: Categorical>(block: &[f64]) -> T {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in block.iter().copied().enumerate() {
        if value > 0.0 && best.map_or(true, |(_, current)| value > current) {
            best = Some((index, value));
        }
    }
    best.and_then(|(index, _)| T::ALL.get(index).copied()).unwrap_or(T::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::{count_technical_terms, decode, encode, FEATURE_DIM};
    use crate::domain::{Complexity, ProjectDescriptor, ProjectType, TeamSize, Timeline};
    use crate::errors::FeatureError;

    fn descriptor(description: &str) -> ProjectDescriptor {
        ProjectDescriptor::new(
            description,
            ProjectType::Ecommerce,
            Complexity::VeryComplex,
            Timeline::Urgent,
            TeamSize::Medium,
        )
    }

    #[test]
    fn vector_length_is_constant() {
        assert_eq!(encode(&descriptor("")).len(), FEATURE_DIM);
        assert_eq!(encode(&descriptor(&"x".repeat(5_000))).len(), FEATURE_DIM);
    }

    #[test]
    fn each_one_hot_block_has_exactly_one_hot_slot() {
        let vector = encode(&descriptor("Storefront"));
        let values = vector.as_slice();

        for range in [0..6, 6..10, 10..14, 14..18] {
            let hot = values[range.clone()].iter().filter(|value| **value == 1.0).count();
            assert_eq!(hot, 1, "block {range:?} should have a single hot slot");
        }
        assert_eq!(values[3], 1.0, "ecommerce is the fourth project type");
        assert_eq!(values[9], 1.0, "very-complex is the last complexity slot");
    }

    #[test]
    fn unknown_labels_encode_to_default_slots() {
        let descriptor: ProjectDescriptor = serde_json::from_value(serde_json::json!({
            "description": "Something",
            "project_type": "spaceship",
            "complexity": "galactic",
            "timeline": "yesterday",
            "team_size": "army"
        }))
        .expect("lenient descriptor");

        let decoded = decode(encode(&descriptor).as_slice()).expect("decode");
        assert_eq!(decoded.project_type, ProjectType::Other);
        assert_eq!(decoded.complexity, Complexity::Medium);
        assert_eq!(decoded.timeline, Timeline::Standard);
        assert_eq!(decoded.team_size, TeamSize::Small);
    }

    #[test]
    fn scalars_carry_length_and_term_hits() {
        let vector = encode(&descriptor("REST API over a cloud database, plus an Api gateway"));
        assert_eq!(vector.description_length(), 51.0);
        assert_eq!(vector.technical_terms(), 4.0);
    }

    #[test]
    fn decode_recovers_categorical_fields() {
        let original = descriptor("Mobile app");
        let decoded = decode(encode(&original).as_slice()).expect("decode");

        assert_eq!(decoded.project_type, original.project_type);
        assert_eq!(decoded.complexity, original.complexity);
        assert_eq!(decoded.timeline, original.timeline);
        assert_eq!(decoded.team_size, original.team_size);
        assert_eq!(decoded.description_length, 10.0);
        assert_eq!(decoded.technical_terms, 1.0);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let error = decode(&[0.0; 7]).expect_err("short vector");
        assert_eq!(error, FeatureError::Length { expected: FEATURE_DIM, actual: 7 });
    }

    #[test]
    fn term_matching_is_whole_word_and_case_insensitive() {
        assert_eq!(count_technical_terms("AI-powered ML on AWS"), 3);
        assert_eq!(count_technical_terms("said rapid webbing"), 0);
        assert_eq!(count_technical_terms(""), 0);
    }
}
