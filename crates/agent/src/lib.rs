//! Conversational layer for SynthAI.
//!
//! Inbound messages are classified by keyword ([`intent`]), routed to an
//! intent handler ([`handlers`], [`dispatcher`]) and recorded in a bounded
//! per-sender history ([`conversation`]). Handlers ask an external text
//! generator ([`llm`]) for a reply and fall back to canned text when it is
//! unavailable, so every message gets a non-empty answer.
//!
//! The generator never decides prices. [`advisor`] only attaches its notes
//! to an estimate computed by `synthai-core`.

pub mod advisor;
pub mod conversation;
pub mod dispatcher;
pub mod handlers;
pub mod intent;
pub mod llm;
pub mod prompts;
pub mod runtime;

pub use advisor::PricingAdvisor;
pub use conversation::{
    ConversationStage, ConversationState, ConversationStore, InMemoryConversationStore,
};
pub use dispatcher::{DispatchOutcome, IntentDispatcher};
pub use intent::{classify, Intent, IntentClassifier};
pub use llm::{TextGenerationError, TextGenerator};
pub use runtime::AgentRuntime;
