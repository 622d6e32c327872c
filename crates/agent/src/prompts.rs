use serde::Serialize;
use synthai_core::domain::{EstimationResult, ProjectDescriptor};
use tera::{Context, Tera};
use thiserror::Error;

use crate::conversation::{ConversationState, Exchange};
use crate::intent::Intent;

pub const SYSTEM_TEMPLATE: &str = "system.tera";
pub const PRICING_ADVICE_TEMPLATE: &str = "pricing_advice.tera";

const EMBEDDED_TEMPLATES: [(&str, &str); 8] = [
    ("_history.tera", include_str!("../templates/_history.tera")),
    (SYSTEM_TEMPLATE, include_str!("../templates/system.tera")),
    ("pricing_inquiry.tera", include_str!("../templates/pricing_inquiry.tera")),
    ("project_help.tera", include_str!("../templates/project_help.tera")),
    ("technical_support.tera", include_str!("../templates/technical_support.tera")),
    ("marketing_info.tera", include_str!("../templates/marketing_info.tera")),
    ("general_inquiry.tera", include_str!("../templates/general_inquiry.tera")),
    (PRICING_ADVICE_TEMPLATE, include_str!("../templates/pricing_advice.tera")),
];

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no prompt template for intent `{0}`")]
    MissingTemplate(Intent),
    #[error("prompt template error: {0}")]
    Template(#[from] tera::Error),
}

/// A rendered system/user prompt pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[derive(Serialize)]
struct HistoryTurn<'a> {
    message: &'a str,
    response: &'a str,
}

impl<'a> From<&'a Exchange> for HistoryTurn<'a> {
    fn from(exchange: &'a Exchange) -> Self {
        Self { message: &exchange.message, response: &exchange.response }
    }
}

pub struct PromptLibrary {
    tera: Tera,
}

impl PromptLibrary {
    /// Templates compiled into the binary.
    pub fn embedded() -> Result<Self, PromptError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(EMBEDDED_TEMPLATES)?;
        Ok(Self { tera })
    }

    pub fn template_for(intent: Intent) -> Option<&'static str> {
        match intent {
            Intent::PricingInquiry => Some("pricing_inquiry.tera"),
            Intent::ProjectHelp => Some("project_help.tera"),
            Intent::TechnicalSupport => Some("technical_support.tera"),
            Intent::MarketingInfo => Some("marketing_info.tera"),
            Intent::GeneralInquiry => Some("general_inquiry.tera"),
            Intent::Greeting => None,
        }
    }

    /// Renders the prompt for `intent`, including up to `history_window` recent exchanges.
    pub fn conversation_prompt(
        &self,
        intent: Intent,
        message: &str,
        state: &ConversationState,
        history_window: usize,
    ) -> Result<Prompt, PromptError> {
        let template = Self::template_for(intent).ok_or(PromptError::MissingTemplate(intent))?;
        let history = state.recent(history_window).map(HistoryTurn::from).collect::<Vec<_>>();

        let mut context = Context::new();
        context.insert("intent", intent.as_str());
        context.insert("message", message.trim());
        context.insert("history", &history);

        Ok(Prompt {
            system: self.tera.render(SYSTEM_TEMPLATE, &context)?.trim().to_string(),
            user: self.tera.render(template, &context)?.trim().to_string(),
        })
    }

    pub fn pricing_advice_prompt(
        &self,
        descriptor: &ProjectDescriptor,
        result: &EstimationResult,
    ) -> Result<Prompt, PromptError> {
        let mut context = Context::new();
        context.insert("intent", "");
        context.insert("project_type", &descriptor.project_type.to_string());
        context.insert("complexity", &descriptor.complexity.to_string());
        context.insert("timeline", &descriptor.timeline.to_string());
        context.insert("team_size", &descriptor.team_size.to_string());
        context.insert("description", descriptor.description.trim());
        context.insert("final_price", &result.final_price.to_string());
        context.insert("base_price_usd", &result.base_price_usd.to_string());
        context.insert("path", result.path.as_str());
        context.insert("confidence", &format!("{:.2}", result.confidence));

        Ok(Prompt {
            system: self.tera.render(SYSTEM_TEMPLATE, &context)?.trim().to_string(),
            user: self.tera.render(PRICING_ADVICE_TEMPLATE, &context)?.trim().to_string(),
        })
    }
}
