use serde::Serialize;
use synthai_agent::AgentRuntime;
use synthai_core::analyzers::Recommendations;
use synthai_core::domain::{DescriptorRequest, EstimationResult};
use synthai_core::ml::FileModelStore;
use synthai_core::pricing::{EstimationOrchestrator, LearnedEstimator, PricingTable};

use crate::commands::{current_thread_runtime, load_config, to_data, CommandResult};

const COMMAND: &str = "estimate";

#[derive(Debug, Serialize)]
struct EstimateData {
    pricing: EstimationResult,
    recommendations: Recommendations,
    advisory_notes: Option<String>,
}

/// Prices one descriptor. `advise` also asks the configured text generator for notes.
pub fn run(request: DescriptorRequest, advise: bool) -> CommandResult {
    let descriptor = match request.validate() {
        Ok(descriptor) => descriptor,
        Err(error) => return CommandResult::failure(COMMAND, "validation", error.to_string(), 1),
    };
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match current_thread_runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let store = FileModelStore::new(config.model.artifact_dir.clone());
        let table = PricingTable::from_config(&config.pricing);
        let learned = LearnedEstimator::initialize(
            &store,
            &table,
            &config.model,
            config.pricing.learned_confidence,
        )
        .await;
        let analysis = EstimationOrchestrator::new(&config.pricing, learned).analyze(&descriptor);

        let advisory_notes = if advise {
            let agent = AgentRuntime::from_config(&config)
                .map_err(|error| ("prompt_templates", error.to_string(), 4u8))?;
            agent.advise(&descriptor, &analysis.pricing).await
        } else {
            None
        };

        Ok::<_, (&'static str, String, u8)>(EstimateData {
            pricing: analysis.pricing,
            recommendations: analysis.recommendations,
            advisory_notes,
        })
    });

    match result {
        Ok(data) => {
            let message = format!(
                "{} {} priced at {} {}",
                descriptor.complexity,
                descriptor.project_type,
                data.pricing.final_price,
                data.pricing.currency
            );
            match to_data(COMMAND, &data) {
                Ok(value) => CommandResult::success_with(COMMAND, message, Some(value)),
                Err(result) => result,
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(COMMAND, error_class, message, exit_code)
        }
    }
}
