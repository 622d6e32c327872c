use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::config::ModelConfig;
use crate::domain::{Estimate, ProjectDescriptor};
use crate::errors::{ApplicationError, EstimationError, ModelStoreError, TrainingError};
use crate::features;
use crate::ml::{
    synthetic_training_rows, training_fingerprint, ModelKind, ModelStore, PriceModel, TrainingRow,
};

use super::rules::PricingTable;
use super::PriceEstimator;

/// Regression-backed estimator. The model handle is fixed after startup.
#[derive(Clone, Debug)]
pub struct LearnedEstimator {
    model: Option<Arc<PriceModel>>,
    confidence: f64,
}

impl LearnedEstimator {
    pub fn from_model(model: PriceModel, confidence: f64) -> Self {
        Self { model: Some(Arc::new(model)), confidence }
    }

    /// An estimator that always reports [`EstimationError::ModelUnavailable`].
    pub fn unavailable() -> Self {
        Self { model: None, confidence: 0.0 }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&PriceModel> {
        self.model.as_deref()
    }

    /// Loads the cached artifact, or trains a replacement when it is missing,
    /// unreadable, built for a different feature layout, or trained on tables
    /// that no longer match `table`.
    ///
    /// Training tries the log-linear model first and the plain linear model
    /// second. If both fail the estimator is returned unavailable.
    pub async fn initialize(
        store: &dyn ModelStore,
        table: &PricingTable,
        settings: &ModelConfig,
        confidence: f64,
    ) -> Self {
        let key = settings.artifact_key.as_str();
        let timeout = Duration::from_secs(settings.load_timeout_secs);
        let fingerprint = training_fingerprint(table, settings.training_rows, settings.seed);

        match load_with_timeout(store, key, timeout).await {
            Ok(model) if !model.is_compatible() => {
                warn!(
                    event_name = "learned_model.incompatible",
                    artifact_key = key,
                    weights = model.weights.len(),
                    "cached pricing model does not match the feature layout; retraining"
                );
            }
            Ok(model) if model.training_fingerprint != fingerprint => {
                info!(
                    event_name = "learned_model.stale",
                    artifact_key = key,
                    cached = %model.training_fingerprint,
                    current = %fingerprint,
                    "cached pricing model was trained on other pricing tables; retraining"
                );
            }
            Ok(model) => {
                info!(
                    event_name = "learned_model.loaded",
                    artifact_key = key,
                    kind = ?model.kind,
                    version = %model.version,
                    training_samples = model.training_samples,
                    "loaded cached pricing model"
                );
                return Self::from_model(model, confidence);
            }
            Err(ModelStoreError::NotFound(_)) => {
                info!(
                    event_name = "learned_model.missing",
                    artifact_key = key,
                    "no cached pricing model; training a new one"
                );
            }
            Err(load_error) => {
                warn!(
                    event_name = "learned_model.load_failed",
                    artifact_key = key,
                    error = %load_error,
                    "could not load cached pricing model; retraining"
                );
            }
        }

        let rows = synthetic_training_rows(table, settings.training_rows, settings.seed);
        match train_fingerprinted(ModelKind::LogLinear, &rows, &fingerprint) {
            Ok(model) => {
                info!(
                    event_name = "learned_model.trained",
                    kind = ?model.kind,
                    training_samples = model.training_samples,
                    training_error = model.training_error,
                    "trained pricing model"
                );
                if let Err(save_error) = save_with_timeout(store, key, &model, timeout).await {
                    warn!(
                        event_name = "learned_model.save_failed",
                        artifact_key = key,
                        error = %save_error,
                        "pricing model trained but could not be cached"
                    );
                }
                return Self::from_model(model, confidence);
            }
            Err(training_error) => {
                warn!(
                    event_name = "learned_model.training_failed",
                    kind = ?ModelKind::LogLinear,
                    error = %training_error,
                    "primary model training failed; trying linear fallback"
                );
            }
        }

        match train_fingerprinted(ModelKind::Linear, &rows, &fingerprint) {
            Ok(model) => {
                info!(
                    event_name = "learned_model.trained",
                    kind = ?model.kind,
                    training_samples = model.training_samples,
                    training_error = model.training_error,
                    "trained fallback pricing model"
                );
                Self::from_model(model, confidence)
            }
            Err(training_error) => {
                error!(
                    event_name = "learned_model.unavailable",
                    error = %training_error,
                    "no pricing model could be trained; rule tables will price every project"
                );
                Self::unavailable()
            }
        }
    }
}

impl PriceEstimator for LearnedEstimator {
    fn estimate(&self, descriptor: &ProjectDescriptor) -> Result<Estimate, EstimationError> {
        let model = self.model.as_ref().ok_or(EstimationError::ModelUnavailable)?;
        let predicted = model.predict(&features::encode(descriptor))?;
        let base_price = Decimal::try_from(predicted)
            .map_err(|_| EstimationError::InvalidPrediction(predicted))?
            .round_dp(2);

        Ok(Estimate { base_price, confidence: self.confidence })
    }
}

/// Trains the primary model from the rule tables and stores it under the configured key.
pub async fn train_and_store(
    store: &dyn ModelStore,
    table: &PricingTable,
    settings: &ModelConfig,
) -> Result<PriceModel, ApplicationError> {
    let rows = synthetic_training_rows(table, settings.training_rows, settings.seed);
    let fingerprint = training_fingerprint(table, settings.training_rows, settings.seed);
    let model = train_fingerprinted(ModelKind::LogLinear, &rows, &fingerprint)
        .map_err(|error| ApplicationError::Integration(format!("model training failed: {error}")))?;

    let timeout = Duration::from_secs(settings.load_timeout_secs);
    save_with_timeout(store, &settings.artifact_key, &model, timeout)
        .await
        .map_err(|error| ApplicationError::Integration(format!("model save failed: {error}")))?;

    info!(
        event_name = "learned_model.stored",
        artifact_key = %settings.artifact_key,
        training_error = model.training_error,
        "pricing model trained and stored"
    );
    Ok(model)
}

fn train_fingerprinted(
    kind: ModelKind,
    rows: &[TrainingRow],
    fingerprint: &str,
) -> Result<PriceModel, TrainingError> {
    let mut model = PriceModel::train(kind, rows)?;
    model.training_fingerprint = fingerprint.to_string();
    Ok(model)
}

async fn load_with_timeout(
    store: &dyn ModelStore,
    key: &str,
    timeout: Duration,
) -> Result<PriceModel, ModelStoreError> {
    tokio::time::timeout(timeout, store.load(key))
        .await
        .map_err(|_| ModelStoreError::Timeout(timeout))?
}

async fn save_with_timeout(
    store: &dyn ModelStore,
    key: &str,
    model: &PriceModel,
    timeout: Duration,
) -> Result<(), ModelStoreError> {
    tokio::time::timeout(timeout, store.save(key, model))
        .await
        .map_err(|_| ModelStoreError::Timeout(timeout))?
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;

    use super::{train_and_store, LearnedEstimator};
    use crate::config::ModelConfig;
    use crate::domain::{
        Categorical, Complexity, ProjectDescriptor, ProjectType, TeamSize, Timeline,
    };
    use crate::errors::{EstimationError, ModelStoreError};
    use crate::ml::{training_fingerprint, InMemoryModelStore, ModelKind, ModelStore, PriceModel};
    use crate::pricing::rules::PricingTable;
    use crate::pricing::PriceEstimator;

    struct SlowStore;

    #[async_trait::async_trait]
    impl ModelStore for SlowStore {
        async fn load(&self, _key: &str) -> Result<PriceModel, ModelStoreError> {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Err(ModelStoreError::NotFound("slow".to_string()))
        }

        async fn save(&self, _key: &str, _model: &PriceModel) -> Result<(), ModelStoreError> {
            Err(ModelStoreError::InvalidKey("read-only".to_string()))
        }
    }

    fn settings() -> ModelConfig {
        ModelConfig { training_rows: 300, load_timeout_secs: 1, ..ModelConfig::default() }
    }

    fn complex_descriptor() -> ProjectDescriptor {
        ProjectDescriptor::new(
            "Inventory platform with API integration and cloud database",
            ProjectType::Enterprise,
            Complexity::Complex,
            Timeline::Standard,
            TeamSize::Medium,
        )
    }

    #[tokio::test]
    async fn trains_and_caches_when_no_artifact_exists() {
        let store = InMemoryModelStore::default();
        let estimator =
            LearnedEstimator::initialize(&store, &PricingTable::affordable(), &settings(), 0.85)
                .await;

        assert!(estimator.is_available());
        assert_eq!(estimator.model().map(|model| model.kind), Some(ModelKind::LogLinear));
        assert!(store.load("pricing-model").await.is_ok(), "artifact should be cached");

        let estimate = estimator.estimate(&complex_descriptor()).expect("estimate");
        assert!(estimate.base_price > Decimal::ZERO);
        assert_eq!(estimate.confidence, 0.85);
    }

    #[tokio::test]
    async fn reuses_a_compatible_cached_artifact() {
        let store = InMemoryModelStore::default();
        let mut cached = train_and_store(&store, &PricingTable::affordable(), &settings())
            .await
            .expect("train and store");
        cached.version = "cached".to_string();
        store.save("pricing-model", &cached).await.expect("save");

        let estimator =
            LearnedEstimator::initialize(&store, &PricingTable::affordable(), &settings(), 0.85)
                .await;
        assert_eq!(estimator.model().map(|model| model.version.as_str()), Some("cached"));
    }

    #[tokio::test]
    async fn retrains_when_cached_artifact_has_wrong_dimensions() {
        let store = InMemoryModelStore::default();
        let mut stale = train_and_store(&store, &PricingTable::affordable(), &settings())
            .await
            .expect("train and store");
        stale.weights.truncate(9);
        stale.version = "stale".to_string();
        store.save("pricing-model", &stale).await.expect("save");

        let estimator =
            LearnedEstimator::initialize(&store, &PricingTable::affordable(), &settings(), 0.85)
                .await;
        let model = estimator.model().expect("retrained model");
        assert_ne!(model.version, "stale");
        assert!(model.is_compatible());
    }

    #[tokio::test]
    async fn retrains_when_pricing_tables_change() {
        let store = InMemoryModelStore::default();
        let defaults = PricingTable::affordable();
        let cached =
            train_and_store(&store, &defaults, &settings()).await.expect("train and store");
        let cached_price = LearnedEstimator::from_model(cached.clone(), 0.85)
            .estimate(&complex_descriptor())
            .expect("estimate")
            .base_price;

        let mut repriced = defaults;
        repriced.base_prices[ProjectType::Enterprise.index()] = Decimal::from(400_000);
        let estimator = LearnedEstimator::initialize(&store, &repriced, &settings(), 0.85).await;

        let model = estimator.model().expect("retrained model");
        assert_ne!(model.training_fingerprint, cached.training_fingerprint);
        assert_eq!(
            model.training_fingerprint,
            training_fingerprint(&repriced, settings().training_rows, settings().seed)
        );
        let stored = store.load("pricing-model").await.expect("replacement cached");
        assert_eq!(stored.training_fingerprint, model.training_fingerprint);

        let repriced_price =
            estimator.estimate(&complex_descriptor()).expect("estimate").base_price;
        assert!(
            repriced_price > cached_price * Decimal::from(2),
            "expected {repriced_price} to track the quadrupled base price from {cached_price}"
        );
    }

    #[tokio::test]
    async fn slow_store_is_bounded_by_timeout() {
        let estimator =
            LearnedEstimator::initialize(&SlowStore, &PricingTable::affordable(), &settings(), 0.85)
                .await;

        assert!(estimator.is_available(), "timeout should fall through to training");
    }

    #[test]
    fn unavailable_estimator_reports_model_unavailable() {
        let estimator = LearnedEstimator::unavailable();
        assert_eq!(
            estimator.estimate(&complex_descriptor()).expect_err("no model"),
            EstimationError::ModelUnavailable
        );
    }
}
