use serde::Serialize;
use synthai_core::ml::{FileModelStore, ModelKind};
use synthai_core::pricing::{train_and_store, PricingTable};

use crate::commands::{current_thread_runtime, load_config, to_data, CommandResult};

const COMMAND: &str = "train-model";

#[derive(Debug, Serialize)]
struct TrainingSummary {
    artifact_key: String,
    artifact_path: String,
    kind: ModelKind,
    version: String,
    training_samples: usize,
    training_error: f64,
}

/// Retrains the pricing model from the rule tables and overwrites the stored artifact.
pub fn run() -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match current_thread_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let store = FileModelStore::new(config.model.artifact_dir.clone());
    let table = PricingTable::from_config(&config.pricing);
    let trained = runtime.block_on(train_and_store(&store, &table, &config.model));

    let model = match trained {
        Ok(model) => model,
        Err(error) => return CommandResult::failure(COMMAND, "training", error.to_string(), 4),
    };
    let artifact_path = match store.artifact_path(&config.model.artifact_key) {
        Ok(path) => path.display().to_string(),
        Err(error) => return CommandResult::failure(COMMAND, "model_store", error.to_string(), 4),
    };

    let summary = TrainingSummary {
        artifact_key: config.model.artifact_key.clone(),
        artifact_path,
        kind: model.kind,
        version: model.version.clone(),
        training_samples: model.training_samples,
        training_error: model.training_error,
    };
    match to_data(COMMAND, &summary) {
        Ok(value) => CommandResult::success_with(
            COMMAND,
            format!("trained model stored under `{}`", summary.artifact_key),
            Some(value),
        ),
        Err(result) => result,
    }
}
