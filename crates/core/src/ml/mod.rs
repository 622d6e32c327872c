//! Price regression model
//!
//! Ridge regression trained by batch gradient descent on synthetic rows drawn
//! from the rule tables. Training is seeded, so the same seed and row count
//! always yield the same weights.

pub mod store;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{Categorical, Complexity, ProjectType, TeamSize, Timeline};
use crate::errors::{EstimationError, TrainingError};
use crate::features::{encode_parts, FeatureVector, FEATURE_DIM};
use crate::pricing::rules::PricingTable;

pub use store::{FileModelStore, InMemoryModelStore, ModelStore};

/// Model input width: bias plus every encoded feature.
pub const MODEL_DIM: usize = FEATURE_DIM + 1;

pub const MODEL_VERSION: &str = "1.0.0";

const DESCRIPTION_LENGTH_SCALE: f64 = 2_000.0;
const TECHNICAL_TERMS_SCALE: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Ridge regression on `ln(price)`.
    LogLinear,
    /// Plain linear regression on the price itself.
    Linear,
}

/// One synthetic historical project with the price it was sold for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub features: FeatureVector,
    pub price: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceModel {
    pub kind: ModelKind,
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub weights: Vec<f64>,
    pub target_offset: f64,
    pub target_scale: f64,
    pub training_samples: usize,
    /// Mean absolute percentage error on the training rows.
    pub training_error: f64,
    /// Digest of the pricing table, row count and seed behind the training set.
    /// Empty for models trained from ad-hoc rows.
    #[serde(default)]
    pub training_fingerprint: String,
}

impl PriceModel {
    pub const LEARNING_RATE: f64 = 0.1;
    pub const EPOCHS: usize = 1_500;
    pub const REGULARIZATION: f64 = 0.001;

    pub fn train(kind: ModelKind, rows: &[TrainingRow]) -> Result<Self, TrainingError> {
        if rows.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        let mut inputs = Vec::with_capacity(rows.len());
        let mut raw_targets = Vec::with_capacity(rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            if row.features.len() != FEATURE_DIM {
                return Err(TrainingError::FeatureDimension {
                    row: row_index,
                    expected: FEATURE_DIM,
                    actual: row.features.len(),
                });
            }
            if !row.price.is_finite() || row.price <= 0.0 {
                return Err(TrainingError::InvalidTarget { row: row_index, price: row.price });
            }
            inputs.push(normalize(row.features.as_slice()));
            raw_targets.push(match kind {
                ModelKind::LogLinear => row.price.ln(),
                ModelKind::Linear => row.price,
            });
        }

        let n = rows.len() as f64;
        let target_offset = raw_targets.iter().sum::<f64>() / n;
        let variance =
            raw_targets.iter().map(|value| (value - target_offset).powi(2)).sum::<f64>() / n;
        let target_scale = if variance > f64::EPSILON { variance.sqrt() } else { 1.0 };
        let targets: Vec<f64> =
            raw_targets.iter().map(|value| (value - target_offset) / target_scale).collect();

        let mut weights = vec![0.0; MODEL_DIM];
        for _ in 0..Self::EPOCHS {
            let mut gradients = vec![0.0; MODEL_DIM];

            for (x, y) in inputs.iter().zip(&targets) {
                let error = dot(&weights, x) - y;
                for (gradient, xi) in gradients.iter_mut().zip(x) {
                    *gradient += error * xi;
                }
            }

            // Average, then add L2 (bias stays unregularized).
            for (j, gradient) in gradients.iter_mut().enumerate() {
                *gradient /= n;
                if j > 0 {
                    *gradient += Self::REGULARIZATION * weights[j];
                }
            }

            for (weight, gradient) in weights.iter_mut().zip(&gradients) {
                *weight -= Self::LEARNING_RATE * gradient;
            }
        }

        if weights.iter().any(|weight| !weight.is_finite()) {
            return Err(TrainingError::Diverged { epochs: Self::EPOCHS });
        }

        let mut model = Self {
            kind,
            version: MODEL_VERSION.to_string(),
            trained_at: Utc::now(),
            weights,
            target_offset,
            target_scale,
            training_samples: rows.len(),
            training_error: 0.0,
            training_fingerprint: String::new(),
        };
        model.training_error = model.mean_absolute_percentage_error(rows);
        if !model.training_error.is_finite() {
            return Err(TrainingError::Diverged { epochs: Self::EPOCHS });
        }

        Ok(model)
    }

    /// Artifacts must match the current feature layout to be usable.
    pub fn is_compatible(&self) -> bool {
        self.weights.len() == MODEL_DIM
            && self.weights.iter().all(|weight| weight.is_finite())
            && self.target_offset.is_finite()
            && self.target_scale.is_finite()
            && self.target_scale > 0.0
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64, EstimationError> {
        if !self.is_compatible() {
            return Err(EstimationError::Prediction(format!(
                "model has {} weights, expected {MODEL_DIM}",
                self.weights.len()
            )));
        }
        if features.len() != FEATURE_DIM {
            return Err(EstimationError::Prediction(format!(
                "feature vector has {} values, expected {FEATURE_DIM}",
                features.len()
            )));
        }

        let standardized = dot(&self.weights, &normalize(features.as_slice()));
        let target = standardized * self.target_scale + self.target_offset;
        let price = match self.kind {
            ModelKind::LogLinear => target.exp(),
            ModelKind::Linear => target,
        };

        if price.is_finite() && price > 0.0 {
            Ok(price)
        } else {
            Err(EstimationError::InvalidPrediction(price))
        }
    }

    fn mean_absolute_percentage_error(&self, rows: &[TrainingRow]) -> f64 {
        let total: f64 = rows
            .iter()
            .map(|row| match self.predict(&row.features) {
                Ok(predicted) => ((predicted - row.price) / row.price).abs(),
                Err(_) => 1.0,
            })
            .sum();
        total / rows.len() as f64
    }
}

/// Identifies the synthetic training set drawn from `table` with `rows` and `seed`.
///
/// Decimals are normalized first, so `1.0` and `1.00` hash the same.
pub fn training_fingerprint(table: &PricingTable, rows: usize, seed: u64) -> String {
    let join = |values: &[Decimal]| {
        values.iter().map(|value| value.normalize().to_string()).collect::<Vec<_>>().join(",")
    };
    let length_tiers = table
        .length_tiers
        .iter()
        .map(|tier| format!("{}:{}", tier.min_chars, tier.multiplier.normalize()))
        .collect::<Vec<_>>()
        .join(",");
    let canonical = format!(
        "rows={rows};seed={seed};base={};complexity={};timeline={};team={};\
         length={length_tiers};floor={}",
        join(&table.base_prices),
        join(&table.complexity_multipliers),
        join(&table.timeline_multipliers),
        join(&table.team_multipliers),
        table.floor_price.normalize(),
    );

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// Draws `rows` synthetic projects priced by the rule tables with ±10% noise.
pub fn synthetic_training_rows(table: &PricingTable, rows: usize, seed: u64) -> Vec<TrainingRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let floor = table.floor_price.to_f64().unwrap_or(0.0);

    (0..rows)
        .map(|_| {
            let project_type = pick::<ProjectType>(&mut rng);
            let complexity = pick::<Complexity>(&mut rng);
            let timeline = pick::<Timeline>(&mut rng);
            let team_size = pick::<TeamSize>(&mut rng);
            let description_length = rng.gen_range(50..2_000);
            let technical_terms = rng.gen_range(1..15);

            let base = table
                .categorical_price(project_type, complexity, timeline, team_size)
                .to_f64()
                .unwrap_or(floor);
            let price = (base * rng.gen_range(0.9..1.1)).max(floor);

            TrainingRow {
                features: encode_parts(
                    project_type,
                    complexity,
                    timeline,
                    team_size,
                    description_length,
                    technical_terms,
                ),
                price,
            }
        })
        .collect()
}

fn pick<T: Categorical>(rng: &mut StdRng) -> T {
    T::ALL[rng.gen_range(0..T::ALL.len())]
}

fn normalize(features: &[f64]) -> Vec<f64> {
    let mut x = Vec::with_capacity(MODEL_DIM);
    x.push(1.0);
    x.extend_from_slice(&features[..FEATURE_DIM - 2]);
    x.push(features[FEATURE_DIM - 2] / DESCRIPTION_LENGTH_SCALE);
    x.push(features[FEATURE_DIM - 1] / TECHNICAL_TERMS_SCALE);
    x
}

fn dot(weights: &[f64], x: &[f64]) -> f64 {
    weights.iter().zip(x).map(|(w, xi)| w * xi).sum()
}
