use std::sync::Arc;

use thiserror::Error;

use crate::conversation::{ConversationStage, ConversationState};
use crate::intent::Intent;
use crate::llm::{complete_within, GenerationSettings, TextGenerationError, TextGenerator};
use crate::prompts::{PromptError, PromptLibrary};

pub const PRICING_LINK_SUFFIX: &str =
    "\n\n💡 Get your affordable quote now: https://synthai.co.za/pricing";

pub const GREETINGS: &[&str] = &[
    "Hi there! 👋 Welcome to SynthAI. We build affordable websites, apps and business software for South African businesses. How can we help you today?",
    "Hello and welcome to SynthAI! 🚀 Ask me about pricing, a project idea, technical support or marketing. What's on your mind?",
    "Howzit! 😊 Thanks for reaching out to SynthAI. Tell me a bit about what you need and I'll point you in the right direction.",
];

const PRICING_FALLBACKS: &[&str] = &[
    "Great news! 🎉 We've reduced our prices by 60%! Simple websites from R5,000, e-commerce from R15,000. Get your instant affordable quote at https://synthai.co.za/pricing 💰",
    "Our prices start at R5,000 for a simple website, R15,000 for an online store and R20,000 for a mobile app. Project analysis is free! Get an instant quote at https://synthai.co.za/pricing 💰",
];

const PROJECT_FALLBACKS: &[&str] = &[
    "We'd love to help with your project! 🚀 What would you like to build, and when do you need it? Share a short description and we'll send you a free analysis.",
    "Sounds exciting! Tell us the type of project (website, app, store or business software), the main features and your timeline, and we'll scope it for free.",
];

const TECHNICAL_FALLBACKS: &[&str] = &[
    "Sorry you're running into trouble! 🛠️ Please send the project name and a short description of the error and our support team will get back to you shortly.",
    "Thanks for letting us know. Our support team is on it: reply with what you were doing when the problem happened and any error message you saw.",
];

const MARKETING_FALLBACKS: &[&str] = &[
    "We offer affordable digital marketing for South African businesses: SEO, social media campaigns and local advertising. 📈 Want a free consultation?",
    "Let's grow your audience! 📣 SynthAI can help with SEO, content and social media campaigns. Tell us about your business and target customers.",
];

const GENERAL_FALLBACKS: &[&str] = &[
    "Thanks for your message! SynthAI builds affordable websites, apps and business software. How can we help you today?",
    "Happy to help! Ask me about pricing, starting a project, technical support or marketing and I'll point you in the right direction.",
];

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Generation(#[from] TextGenerationError),
}

/// What a handler sees about the message it is answering.
#[derive(Clone, Copy, Debug)]
pub struct HandlerContext<'a> {
    pub message: &'a str,
    pub sender_id: &'a str,
    pub state: &'a ConversationState,
}

#[async_trait::async_trait]
pub trait IntentHandler: Send + Sync {
    fn intent(&self) -> Intent;

    async fn respond(&self, context: &HandlerContext<'_>) -> Result<String, HandlerError>;

    /// Deterministic, non-empty reply used when `respond` fails.
    fn fallback(&self, context: &HandlerContext<'_>) -> String;

    /// Stage after this handler answers. Only greetings move a conversation on.
    fn next_stage(&self, current: ConversationStage) -> ConversationStage {
        current
    }
}

/// Picks one of a fixed set of replies with a seeded FNV-1a hash of the
/// message, so identical messages always get the same reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplySelector {
    seed: u64,
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x1000_0000_01b3;

impl ReplySelector {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn index(&self, key: &str, options: usize) -> usize {
        if options == 0 {
            return 0;
        }
        let normalized = key.trim().to_lowercase();
        (fnv1a_64_with_seed(normalized.as_bytes(), self.seed) % options as u64) as usize
    }

    pub fn select<'a>(&self, key: &str, options: &[&'a str]) -> &'a str {
        options.get(self.index(key, options.len())).copied().unwrap_or_default()
    }
}

fn fnv1a_64_with_seed(bytes: &[u8], seed: u64) -> u64 {
    let mut hash = FNV_OFFSET_BASIS ^ seed;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Answers greetings locally and moves the conversation to the active stage.
#[derive(Clone, Debug)]
pub struct GreetingHandler {
    selector: ReplySelector,
}

impl GreetingHandler {
    pub fn new(selector: ReplySelector) -> Self {
        Self { selector }
    }
}

#[async_trait::async_trait]
impl IntentHandler for GreetingHandler {
    fn intent(&self) -> Intent {
        Intent::Greeting
    }

    async fn respond(&self, context: &HandlerContext<'_>) -> Result<String, HandlerError> {
        Ok(self.fallback(context))
    }

    fn fallback(&self, context: &HandlerContext<'_>) -> String {
        self.selector.select(context.message, GREETINGS).to_string()
    }

    fn next_stage(&self, _current: ConversationStage) -> ConversationStage {
        ConversationStage::Active
    }
}

/// Renders the intent's prompt and asks the text generator for a reply.
pub struct LlmIntentHandler {
    intent: Intent,
    generator: Arc<dyn TextGenerator>,
    prompts: Arc<PromptLibrary>,
    settings: GenerationSettings,
    selector: ReplySelector,
    history_window: usize,
    fallbacks: &'static [&'static str],
    suffix: Option<&'static str>,
}

impl LlmIntentHandler {
    /// Handler for any intent except greetings, with the canned replies for that intent.
    pub fn for_intent(
        intent: Intent,
        generator: Arc<dyn TextGenerator>,
        prompts: Arc<PromptLibrary>,
        settings: GenerationSettings,
        selector: ReplySelector,
        history_window: usize,
    ) -> Self {
        let (fallbacks, suffix) = match intent {
            Intent::PricingInquiry => (PRICING_FALLBACKS, Some(PRICING_LINK_SUFFIX)),
            Intent::ProjectHelp => (PROJECT_FALLBACKS, None),
            Intent::TechnicalSupport => (TECHNICAL_FALLBACKS, None),
            Intent::MarketingInfo => (MARKETING_FALLBACKS, None),
            Intent::Greeting | Intent::GeneralInquiry => (GENERAL_FALLBACKS, None),
        };
        Self {
            intent,
            generator,
            prompts,
            settings,
            selector,
            history_window,
            fallbacks,
            suffix,
        }
    }

    pub fn fallbacks(&self) -> &'static [&'static str] {
        self.fallbacks
    }
}

#[async_trait::async_trait]
impl IntentHandler for LlmIntentHandler {
    fn intent(&self) -> Intent {
        self.intent
    }

    async fn respond(&self, context: &HandlerContext<'_>) -> Result<String, HandlerError> {
        let prompt = self.prompts.conversation_prompt(
            self.intent,
            context.message,
            context.state,
            self.history_window,
        )?;
        let request = self.settings.request(prompt.system, prompt.user);
        let text =
            complete_within(self.generator.as_ref(), &request, self.settings.timeout).await?;

        Ok(match self.suffix {
            Some(suffix) => format!("{text}{suffix}"),
            None => text,
        })
    }

    fn fallback(&self, context: &HandlerContext<'_>) -> String {
        self.selector.select(context.message, self.fallbacks).to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        GreetingHandler, HandlerContext, HandlerError, IntentHandler, LlmIntentHandler,
        ReplySelector, GREETINGS, PRICING_LINK_SUFFIX,
    };
    use crate::conversation::{ConversationStage, ConversationState};
    use crate::intent::Intent;
    use crate::llm::{
        CompletionRequest, GenerationSettings, TextGenerationError, TextGenerator,
        UnavailableTextGenerator,
    };
    use crate::prompts::PromptLibrary;

    struct EchoGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for EchoGenerator {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<String, TextGenerationError> {
            Ok(format!("echo ({} chars)", request.user_prompt.len()))
        }
    }

    fn handler(intent: Intent, generator: Arc<dyn TextGenerator>) -> LlmIntentHandler {
        LlmIntentHandler::for_intent(
            intent,
            generator,
            Arc::new(PromptLibrary::embedded().expect("templates compile")),
            GenerationSettings::default(),
            ReplySelector::new(7),
            3,
        )
    }

    #[test]
    fn reply_selection_is_stable_and_in_range() {
        let selector = ReplySelector::new(0x5f3c_9a17);
        let first = selector.select("hi", GREETINGS);
        for _ in 0..10 {
            assert_eq!(selector.select("hi", GREETINGS), first);
        }
        assert_eq!(selector.select("  HI ", GREETINGS), first);

        for message in ["hello", "hey", "good morning", "molo", "sawubona"] {
            assert!(selector.index(message, GREETINGS.len()) < GREETINGS.len());
        }
        assert_eq!(selector.select("anything", &[]), "");
    }

    #[test]
    fn different_messages_spread_across_options() {
        let selector = ReplySelector::new(1);
        let picks = (0..50)
            .map(|index| selector.index(&format!("hello {index}"), GREETINGS.len()))
            .collect::<std::collections::BTreeSet<_>>();
        assert_eq!(picks.len(), GREETINGS.len());
    }

    #[tokio::test]
    async fn greeting_handler_activates_the_conversation() {
        let handler = GreetingHandler::new(ReplySelector::new(3));
        let state = ConversationState::new("sender");
        let context = HandlerContext { message: "hi", sender_id: "sender", state: &state };

        let reply = handler.respond(&context).await.expect("greeting");
        assert!(GREETINGS.contains(&reply.as_str()));
        assert_eq!(handler.next_stage(ConversationStage::Greeting), ConversationStage::Active);
    }

    #[tokio::test]
    async fn pricing_replies_carry_the_quote_link() {
        let handler = handler(Intent::PricingInquiry, Arc::new(EchoGenerator));
        let state = ConversationState::new("sender");
        let context =
            HandlerContext { message: "how much for a site?", sender_id: "sender", state: &state };

        let reply = handler.respond(&context).await.expect("reply");
        assert!(reply.starts_with("echo ("));
        assert!(reply.ends_with(PRICING_LINK_SUFFIX));
    }

    #[tokio::test]
    async fn unavailable_generator_surfaces_error_and_fallback_is_canned() {
        for intent in Intent::ALL.into_iter().filter(|intent| *intent != Intent::Greeting) {
            let handler = handler(intent, Arc::new(UnavailableTextGenerator));
            let state = ConversationState::new("sender");
            let context = HandlerContext { message: "help", sender_id: "sender", state: &state };

            let error = handler.respond(&context).await.expect_err("generator is unavailable");
            assert!(matches!(error, HandlerError::Generation(TextGenerationError::Unavailable)));

            let fallback = handler.fallback(&context);
            assert!(!fallback.trim().is_empty());
            assert!(handler.fallbacks().contains(&fallback.as_str()));
        }
    }

    #[test]
    fn only_the_greeting_handler_changes_the_stage() {
        for intent in Intent::ALL.into_iter().filter(|intent| *intent != Intent::Greeting) {
            let handler = handler(intent, Arc::new(UnavailableTextGenerator));
            assert_eq!(
                handler.next_stage(ConversationStage::Greeting),
                ConversationStage::Greeting,
                "{intent} should leave a new conversation in the greeting stage"
            );
            assert_eq!(handler.next_stage(ConversationStage::Active), ConversationStage::Active);
        }
    }
}
