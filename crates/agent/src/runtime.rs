use std::sync::Arc;

use synthai_core::config::AppConfig;
use synthai_core::domain::{EstimationResult, ProjectDescriptor};

use crate::advisor::PricingAdvisor;
use crate::conversation::{ConversationStore, InMemoryConversationStore};
use crate::dispatcher::{DispatchOutcome, IntentDispatcher};
use crate::llm::{text_generator_from_config, GenerationSettings, TextGenerator};
use crate::prompts::{PromptError, PromptLibrary};

/// Conversation dispatcher and pricing advisor wired to one text generator.
pub struct AgentRuntime {
    dispatcher: IntentDispatcher,
    advisor: PricingAdvisor,
}

impl AgentRuntime {
    pub fn from_config(config: &AppConfig) -> Result<Self, PromptError> {
        let store = Arc::new(InMemoryConversationStore::new(config.conversation.history_limit));
        Self::with_parts(config, text_generator_from_config(&config.llm), store)
    }

    pub fn with_parts(
        config: &AppConfig,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn ConversationStore>,
    ) -> Result<Self, PromptError> {
        let prompts = Arc::new(PromptLibrary::embedded()?);
        let settings = GenerationSettings::from_config(&config.llm);
        let history_limit = config.conversation.history_limit;

        let dispatcher = IntentDispatcher::standard(
            store,
            Arc::clone(&generator),
            Arc::clone(&prompts),
            settings,
            config.conversation.reply_seed,
            history_limit,
        );
        let advisor = PricingAdvisor::new(generator, prompts, settings);

        Ok(Self { dispatcher, advisor })
    }

    pub async fn handle_message(&self, message: &str, sender_id: &str) -> DispatchOutcome {
        self.dispatcher.handle_with_outcome(message, sender_id).await
    }

    pub async fn advise(
        &self,
        descriptor: &ProjectDescriptor,
        result: &EstimationResult,
    ) -> Option<String> {
        self.advisor.advise(descriptor, result).await
    }

    pub fn dispatcher(&self) -> &IntentDispatcher {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use synthai_core::config::AppConfig;

    use super::AgentRuntime;
    use crate::conversation::ConversationStage;
    use crate::intent::Intent;

    #[tokio::test]
    async fn default_config_runtime_answers_without_a_generator() {
        let runtime = AgentRuntime::from_config(&AppConfig::default()).expect("runtime");

        let greeting = runtime.handle_message("hi", "sender").await;
        assert_eq!(greeting.intent, Intent::Greeting);
        assert_eq!(greeting.stage, ConversationStage::Active);

        let pricing = runtime.handle_message("how much does this cost", "sender").await;
        assert_eq!(pricing.intent, Intent::PricingInquiry);
        assert!(pricing.response.contains("https://synthai.co.za/pricing"));

        let state =
            runtime.dispatcher().store().get_or_create("sender").await.expect("conversation");
        assert_eq!(state.history.len(), 2);
    }
}
