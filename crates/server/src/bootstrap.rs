use std::sync::Arc;

use synthai_agent::prompts::PromptError;
use synthai_agent::AgentRuntime;
use synthai_core::config::{AppConfig, ConfigError, LoadOptions};
use synthai_core::ml::{FileModelStore, ModelStore};
use synthai_core::pricing::{EstimationOrchestrator, LearnedEstimator, PricingTable};
use thiserror::Error;
use tracing::info;

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("prompt templates failed to load: {0}")]
    Prompts(#[from] PromptError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        artifact_dir = %config.model.artifact_dir.display(),
        "starting application bootstrap"
    );

    let store = FileModelStore::new(&config.model.artifact_dir);
    let state = build_state(&config, &store).await?;

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        learned_model_loaded = state.orchestrator.learned().is_available(),
        "application bootstrap finished"
    );
    Ok(Application { config, state })
}

pub async fn build_state(
    config: &AppConfig,
    store: &dyn ModelStore,
) -> Result<AppState, BootstrapError> {
    let table = PricingTable::from_config(&config.pricing);
    let learned =
        LearnedEstimator::initialize(store, &table, &config.model, config.pricing.learned_confidence)
            .await;
    let orchestrator = EstimationOrchestrator::new(&config.pricing, learned);
    let agent = AgentRuntime::from_config(config)?;

    Ok(AppState { orchestrator: Arc::new(orchestrator), agent: Arc::new(agent) })
}

#[cfg(test)]
mod tests {
    use synthai_core::config::{AppConfig, ConfigOverrides, LoadOptions};
    use synthai_core::ml::{InMemoryModelStore, ModelStore};

    use super::{bootstrap, build_state};

    #[tokio::test]
    async fn bootstrap_trains_and_caches_the_model_on_first_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = LoadOptions {
            overrides: ConfigOverrides {
                model_artifact_dir: Some(dir.path().to_path_buf()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        };

        let app = bootstrap(options.clone()).await.expect("bootstrap");
        assert!(app.state.orchestrator.learned().is_available());
        assert!(dir.path().join(format!("{}.json", app.config.model.artifact_key)).exists());

        let restarted = bootstrap(options).await.expect("second bootstrap");
        assert!(restarted.state.orchestrator.learned().is_available());
    }

    #[tokio::test]
    async fn build_state_uses_the_given_store() {
        let store = InMemoryModelStore::default();
        let config = AppConfig::default();

        let state = build_state(&config, &store).await.expect("state");
        assert!(state.orchestrator.learned().is_available());
        assert!(store.load(&config.model.artifact_key).await.is_ok());
    }
}
