use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conversation::{ConversationStage, ConversationState, ConversationStore, Exchange};
use crate::handlers::{
    GreetingHandler, HandlerContext, IntentHandler, LlmIntentHandler, ReplySelector,
};
use crate::intent::{Intent, IntentClassifier};
use crate::llm::{GenerationSettings, TextGenerator};
use crate::prompts::PromptLibrary;

/// Reply used when no handler is registered for an intent.
pub const DEFAULT_REPLY: &str =
    "Thanks for your message! A member of the SynthAI team will get back to you shortly.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub intent: Intent,
    pub response: String,
    pub stage: ConversationStage,
}

/// Routes inbound messages to intent handlers and records the exchange.
pub struct IntentDispatcher {
    classifier: IntentClassifier,
    store: Arc<dyn ConversationStore>,
    handlers: HashMap<Intent, Arc<dyn IntentHandler>>,
}

impl IntentDispatcher {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { classifier: IntentClassifier::new(), store, handlers: HashMap::new() }
    }

    /// Dispatcher with the greeting handler plus a generator-backed handler for every other intent.
    pub fn standard(
        store: Arc<dyn ConversationStore>,
        generator: Arc<dyn TextGenerator>,
        prompts: Arc<PromptLibrary>,
        settings: GenerationSettings,
        reply_seed: u64,
        history_window: usize,
    ) -> Self {
        let selector = ReplySelector::new(reply_seed);
        let mut dispatcher =
            Self::new(store).with_handler(Arc::new(GreetingHandler::new(selector)));
        for intent in Intent::ALL.into_iter().filter(|intent| *intent != Intent::Greeting) {
            dispatcher.register(Arc::new(LlmIntentHandler::for_intent(
                intent,
                Arc::clone(&generator),
                Arc::clone(&prompts),
                settings,
                selector,
                history_window,
            )));
        }
        dispatcher
    }

    /// Registers `handler` for its intent, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn IntentHandler>) {
        self.handlers.insert(handler.intent(), handler);
    }

    pub fn with_handler(mut self, handler: Arc<dyn IntentHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub async fn handle(&self, message: &str, sender_id: &str) -> String {
        self.handle_with_outcome(message, sender_id).await.response
    }

    pub async fn handle_with_outcome(&self, message: &str, sender_id: &str) -> DispatchOutcome {
        let state = match self.store.get_or_create(sender_id).await {
            Ok(state) => state,
            Err(error) => {
                warn!(
                    event_name = "conversation.load_failed",
                    sender_id,
                    error = %error,
                    "conversation store unavailable; answering without history"
                );
                ConversationState::new(sender_id)
            }
        };

        let intent = self.classifier.classify(message);
        let handler = self.handlers.get(&intent);
        let context = HandlerContext { message, sender_id, state: &state };

        let response = match handler {
            Some(handler) => match handler.respond(&context).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => handler.fallback(&context),
                Err(error) => {
                    warn!(
                        event_name = "conversation.fallback_reply",
                        sender_id,
                        intent = intent.as_str(),
                        error = %error,
                        "handler failed; using canned reply"
                    );
                    handler.fallback(&context)
                }
            },
            None => DEFAULT_REPLY.to_string(),
        };
        let response =
            if response.trim().is_empty() { DEFAULT_REPLY.to_string() } else { response };

        let stage = handler.map_or(state.stage, |handler| handler.next_stage(state.stage));
        self.record(sender_id, message, &response, intent, state.stage, stage).await;

        debug!(
            event_name = "conversation.dispatched",
            sender_id,
            intent = intent.as_str(),
            stage = ?stage,
            "message handled"
        );
        DispatchOutcome { intent, response, stage }
    }

    async fn record(
        &self,
        sender_id: &str,
        message: &str,
        response: &str,
        intent: Intent,
        previous: ConversationStage,
        stage: ConversationStage,
    ) {
        let exchange = Exchange {
            message: message.to_string(),
            response: response.to_string(),
            intent,
        };
        if let Err(error) = self.store.append(sender_id, exchange).await {
            warn!(
                event_name = "conversation.append_failed",
                sender_id,
                error = %error,
                "exchange not recorded"
            );
        }
        if stage != previous {
            if let Err(error) = self.store.set_stage(sender_id, stage).await {
                warn!(
                    event_name = "conversation.stage_update_failed",
                    sender_id,
                    error = %error,
                    "stage not recorded"
                );
            }
        }
    }
}
