use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use serde::Serialize;
use synthai_core::config::AppConfig;
use toml::Value;

use crate::commands::{load_config, to_data, CommandResult};

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

/// Effective configuration with the source of every value; secrets are redacted.
pub fn run() -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let entries = effective_entries(&config);
    match to_data(COMMAND, &entries) {
        Ok(value) => CommandResult::success_with(
            COMMAND,
            "effective config (source precedence: env > file > default)",
            Some(value),
        ),
        Err(result) => result,
    }
}

fn effective_entries(config: &AppConfig) -> Vec<ConfigEntry> {
    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let entry = |key: &'static str, value: String, env_keys: &[&str]| ConfigEntry {
        key,
        value,
        source: field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref()),
    };

    let rounding = &config.pricing.rounding;
    vec![
        entry(
            "pricing.market_multiplier",
            config.pricing.market_multiplier.to_string(),
            &["SYNTHAI_PRICING_MARKET_MULTIPLIER"],
        ),
        entry(
            "pricing.floor_price",
            config.pricing.floor_price.to_string(),
            &["SYNTHAI_PRICING_FLOOR_PRICE"],
        ),
        entry("pricing.exchange_rate", config.pricing.exchange_rate.to_string(), &[]),
        entry(
            "pricing.rounding",
            format!(
                "simple={} medium={} complex={} very_complex={}",
                rounding.simple, rounding.medium, rounding.complex, rounding.very_complex
            ),
            &[],
        ),
        entry(
            "model.artifact_dir",
            config.model.artifact_dir.display().to_string(),
            &["SYNTHAI_MODEL_ARTIFACT_DIR"],
        ),
        entry("model.artifact_key", config.model.artifact_key.clone(), &[]),
        entry(
            "model.training_rows",
            config.model.training_rows.to_string(),
            &["SYNTHAI_MODEL_TRAINING_ROWS"],
        ),
        entry(
            "llm.provider",
            format!("{:?}", config.llm.provider),
            &["SYNTHAI_LLM_PROVIDER"],
        ),
        entry("llm.model", config.llm.model.clone(), &["SYNTHAI_LLM_MODEL"]),
        entry(
            "llm.base_url",
            config.llm.effective_base_url().unwrap_or_else(|| "<unset>".to_string()),
            &["SYNTHAI_LLM_BASE_URL"],
        ),
        entry(
            "llm.api_key",
            config
                .llm
                .api_key
                .as_ref()
                .map(|key| redact_token(key.expose_secret()))
                .unwrap_or_else(|| "<unset>".to_string()),
            &["SYNTHAI_LLM_API_KEY"],
        ),
        entry(
            "conversation.history_limit",
            config.conversation.history_limit.to_string(),
            &["SYNTHAI_CONVERSATION_HISTORY_LIMIT"],
        ),
        entry(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["SYNTHAI_SERVER_BIND_ADDRESS"],
        ),
        entry("server.port", config.server.port.to_string(), &["SYNTHAI_SERVER_PORT"]),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["SYNTHAI_LOGGING_LEVEL", "SYNTHAI_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["SYNTHAI_LOGGING_FORMAT", "SYNTHAI_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    ["synthai.toml", "config/synthai.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_token};

    #[test]
    fn tokens_keep_only_their_prefix() {
        assert_eq!(redact_token("sk-live-abcdef"), "sk-***");
        assert_eq!(redact_token("plainsecret"), "<redacted>");
        assert_eq!(redact_token("   "), "<empty>");
    }

    #[test]
    fn nested_keys_are_found_in_toml_documents() {
        let doc: toml::Value = "[llm]\nmodel = \"llama3\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "llm.model"));
        assert!(!contains_path(&doc, "llm.api_key"));
        assert!(!contains_path(&doc, "server.port"));
    }
}
