use std::sync::Arc;

use synthai_core::domain::{EstimationResult, ProjectDescriptor};
use tracing::{debug, warn};

use crate::handlers::HandlerError;
use crate::llm::{complete_within, GenerationSettings, TextGenerationError, TextGenerator};
use crate::prompts::PromptLibrary;

/// Asks the text generator for client-facing notes on a finished estimate.
///
/// The notes are attached verbatim. Nothing in them feeds back into the price.
pub struct PricingAdvisor {
    generator: Arc<dyn TextGenerator>,
    prompts: Arc<PromptLibrary>,
    settings: GenerationSettings,
}

impl PricingAdvisor {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        prompts: Arc<PromptLibrary>,
        settings: GenerationSettings,
    ) -> Self {
        Self { generator, prompts, settings }
    }

    /// Advisory notes, or `None` when the generator is unavailable, slow or fails.
    pub async fn advise(
        &self,
        descriptor: &ProjectDescriptor,
        result: &EstimationResult,
    ) -> Option<String> {
        match self.request_notes(descriptor, result).await {
            Ok(notes) => Some(notes),
            Err(HandlerError::Generation(TextGenerationError::Unavailable)) => {
                debug!(event_name = "advisor.skipped", "text generation disabled");
                None
            }
            Err(error) => {
                warn!(
                    event_name = "advisor.unavailable",
                    tier = %result.tier,
                    error = %error,
                    "advisory notes omitted"
                );
                None
            }
        }
    }

    async fn request_notes(
        &self,
        descriptor: &ProjectDescriptor,
        result: &EstimationResult,
    ) -> Result<String, HandlerError> {
        let prompt = self.prompts.pricing_advice_prompt(descriptor, result)?;
        let request = self.settings.request(prompt.system, prompt.user);
        Ok(complete_within(self.generator.as_ref(), &request, self.settings.timeout).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use synthai_core::config::PricingConfig;
    use synthai_core::domain::{Complexity, ProjectDescriptor, ProjectType, TeamSize, Timeline};
    use synthai_core::EstimationOrchestrator;

    use super::PricingAdvisor;
    use crate::llm::{
        CompletionRequest, GenerationSettings, TextGenerationError, TextGenerator,
        UnavailableTextGenerator,
    };
    use crate::prompts::PromptLibrary;

    struct NotesGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for NotesGenerator {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<String, TextGenerationError> {
            assert!(request.user_prompt.contains("Do not propose a different price."));
            Ok("  Phase the blog for later. Prepare your logo.  ".to_string())
        }
    }

    struct StalledGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for StalledGenerator {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<String, TextGenerationError> {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok("late".to_string())
        }
    }

    fn advisor(generator: Arc<dyn TextGenerator>) -> PricingAdvisor {
        let settings = GenerationSettings {
            timeout: Duration::from_millis(20),
            ..GenerationSettings::default()
        };
        PricingAdvisor::new(
            generator,
            Arc::new(PromptLibrary::embedded().expect("templates compile")),
            settings,
        )
    }

    fn descriptor() -> ProjectDescriptor {
        ProjectDescriptor::new(
            "Online store with payment gateway",
            ProjectType::Ecommerce,
            Complexity::Medium,
            Timeline::Standard,
            TeamSize::Small,
        )
    }

    #[tokio::test]
    async fn notes_are_attached_verbatim_without_touching_the_price() {
        let descriptor = descriptor();
        let result = EstimationOrchestrator::rules_only(&PricingConfig::default())
            .calculate_price(&descriptor);
        let before = result.clone();

        let notes = advisor(Arc::new(NotesGenerator)).advise(&descriptor, &result).await;
        assert_eq!(notes.as_deref(), Some("Phase the blog for later. Prepare your logo."));
        assert_eq!(result, before);
    }

    #[tokio::test]
    async fn unavailable_or_slow_generators_omit_notes() {
        let descriptor = descriptor();
        let result = EstimationOrchestrator::rules_only(&PricingConfig::default())
            .calculate_price(&descriptor);

        let unavailable = advisor(Arc::new(UnavailableTextGenerator));
        assert!(unavailable.advise(&descriptor, &result).await.is_none());

        let stalled = advisor(Arc::new(StalledGenerator));
        assert!(stalled.advise(&descriptor, &result).await.is_none());
    }
}
