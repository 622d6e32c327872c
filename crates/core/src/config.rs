use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Categorical, Complexity, ProjectType};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub model: ModelConfig,
    pub llm: LlmConfig,
    pub conversation: ConversationConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfig {
    pub market_multiplier: Decimal,
    pub floor_price: Decimal,
    /// Static ZAR per USD rate used for the reference price only.
    pub exchange_rate: Decimal,
    pub learned_confidence: f64,
    pub rule_confidence: f64,
    pub fallback_confidence: f64,
    pub rounding: RoundingIncrements,
    pub base_price_overrides: BTreeMap<ProjectType, Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundingIncrements {
    pub simple: Decimal,
    pub medium: Decimal,
    pub complex: Decimal,
    pub very_complex: Decimal,
}

impl RoundingIncrements {
    pub fn for_tier(&self, tier: Complexity) -> Decimal {
        match tier {
            Complexity::Simple => self.simple,
            Complexity::Medium => self.medium,
            Complexity::Complex => self.complex,
            Complexity::VeryComplex => self.very_complex,
        }
    }

    fn all(&self) -> [(Complexity, Decimal); 4] {
        [
            (Complexity::Simple, self.simple),
            (Complexity::Medium, self.medium),
            (Complexity::Complex, self.complex),
            (Complexity::VeryComplex, self.very_complex),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelConfig {
    pub artifact_dir: PathBuf,
    pub artifact_key: String,
    pub load_timeout_secs: u64,
    pub training_rows: usize,
    pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationConfig {
    pub history_limit: usize,
    pub reply_seed: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Disabled,
    OpenAi,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub model_artifact_dir: Option<PathBuf>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            market_multiplier: Decimal::new(110, 2),
            floor_price: Decimal::from(5_000),
            exchange_rate: Decimal::new(185, 1),
            learned_confidence: 0.85,
            rule_confidence: 0.75,
            fallback_confidence: 0.6,
            rounding: RoundingIncrements {
                simple: Decimal::from(100),
                medium: Decimal::from(100),
                complex: Decimal::from(500),
                very_complex: Decimal::from(500),
            },
            base_price_overrides: BTreeMap::new(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("models"),
            artifact_key: "pricing-model".to_string(),
            load_timeout_secs: 10,
            training_rows: 1_000,
            seed: 42,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Disabled,
            api_key: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 15,
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            model: ModelConfig::default(),
            llm: LlmConfig::default(),
            conversation: ConversationConfig { history_limit: 10, reply_seed: 0x5f3c_9a17 },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl LlmProvider {
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::Disabled => None,
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected disabled|openai|ollama)"
            ))),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("synthai.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(pricing) = patch.pricing {
            if let Some(value) = pricing.market_multiplier {
                self.pricing.market_multiplier =
                    decimal_from_f64("pricing.market_multiplier", value)?;
            }
            if let Some(value) = pricing.floor_price {
                self.pricing.floor_price = Decimal::from(value);
            }
            if let Some(value) = pricing.exchange_rate {
                self.pricing.exchange_rate = decimal_from_f64("pricing.exchange_rate", value)?;
            }
            if let Some(value) = pricing.learned_confidence {
                self.pricing.learned_confidence = value;
            }
            if let Some(value) = pricing.rule_confidence {
                self.pricing.rule_confidence = value;
            }
            if let Some(value) = pricing.fallback_confidence {
                self.pricing.fallback_confidence = value;
            }
            if let Some(rounding) = pricing.rounding {
                if let Some(value) = rounding.simple {
                    self.pricing.rounding.simple = Decimal::from(value);
                }
                if let Some(value) = rounding.medium {
                    self.pricing.rounding.medium = Decimal::from(value);
                }
                if let Some(value) = rounding.complex {
                    self.pricing.rounding.complex = Decimal::from(value);
                }
                if let Some(value) = rounding.very_complex {
                    self.pricing.rounding.very_complex = Decimal::from(value);
                }
            }
            if let Some(base_prices) = pricing.base_prices {
                for (label, price) in base_prices {
                    let project_type = ProjectType::from_label(&label).ok_or_else(|| {
                        ConfigError::Validation(format!(
                            "pricing.base_prices has unknown project type `{label}`"
                        ))
                    })?;
                    self.pricing.base_price_overrides.insert(project_type, Decimal::from(price));
                }
            }
        }

        if let Some(model) = patch.model {
            if let Some(artifact_dir) = model.artifact_dir {
                self.model.artifact_dir = artifact_dir;
            }
            if let Some(artifact_key) = model.artifact_key {
                self.model.artifact_key = artifact_key;
            }
            if let Some(load_timeout_secs) = model.load_timeout_secs {
                self.model.load_timeout_secs = load_timeout_secs;
            }
            if let Some(training_rows) = model.training_rows {
                self.model.training_rows = training_rows;
            }
            if let Some(seed) = model.seed {
                self.model.seed = seed;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(max_tokens) = llm.max_tokens {
                self.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
        }

        if let Some(conversation) = patch.conversation {
            if let Some(history_limit) = conversation.history_limit {
                self.conversation.history_limit = history_limit;
            }
            if let Some(reply_seed) = conversation.reply_seed {
                self.conversation.reply_seed = reply_seed;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SYNTHAI_PRICING_MARKET_MULTIPLIER") {
            self.pricing.market_multiplier =
                parse_decimal("SYNTHAI_PRICING_MARKET_MULTIPLIER", &value)?;
        }
        if let Some(value) = read_env("SYNTHAI_PRICING_FLOOR_PRICE") {
            self.pricing.floor_price = parse_decimal("SYNTHAI_PRICING_FLOOR_PRICE", &value)?;
        }

        if let Some(value) = read_env("SYNTHAI_MODEL_ARTIFACT_DIR") {
            self.model.artifact_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("SYNTHAI_MODEL_LOAD_TIMEOUT_SECS") {
            self.model.load_timeout_secs = parse_u64("SYNTHAI_MODEL_LOAD_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("SYNTHAI_MODEL_TRAINING_ROWS") {
            self.model.training_rows = parse_usize("SYNTHAI_MODEL_TRAINING_ROWS", &value)?;
        }
        if let Some(value) = read_env("SYNTHAI_MODEL_SEED") {
            self.model.seed = parse_u64("SYNTHAI_MODEL_SEED", &value)?;
        }

        if let Some(value) = read_env("SYNTHAI_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("SYNTHAI_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SYNTHAI_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("SYNTHAI_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("SYNTHAI_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("SYNTHAI_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SYNTHAI_CONVERSATION_HISTORY_LIMIT") {
            self.conversation.history_limit =
                parse_usize("SYNTHAI_CONVERSATION_HISTORY_LIMIT", &value)?;
        }

        if let Some(value) = read_env("SYNTHAI_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SYNTHAI_SERVER_PORT") {
            self.server.port = parse_u16("SYNTHAI_SERVER_PORT", &value)?;
        }

        if let Some(value) =
            read_env("SYNTHAI_LOGGING_LEVEL").or_else(|| read_env("SYNTHAI_LOG_LEVEL"))
        {
            self.logging.level = value;
        }
        if let Some(value) =
            read_env("SYNTHAI_LOGGING_FORMAT").or_else(|| read_env("SYNTHAI_LOG_FORMAT"))
        {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(provider) = overrides.llm_provider {
            self.llm.provider = provider;
        }
        if let Some(model) = overrides.llm_model {
            self.llm.model = model;
        }
        if let Some(api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(api_key));
        }
        if let Some(base_url) = overrides.llm_base_url {
            self.llm.base_url = Some(base_url);
        }
        if let Some(artifact_dir) = overrides.model_artifact_dir {
            self.model.artifact_dir = artifact_dir;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pricing(&self.pricing)?;
        validate_model(&self.model)?;
        validate_llm(&self.llm)?;
        validate_conversation(&self.conversation)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

impl LlmConfig {
    /// Explicit base URL, or the provider's well-known endpoint.
    pub fn effective_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("synthai.toml"), PathBuf::from("config/synthai.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.market_multiplier <= Decimal::ONE {
        return Err(ConfigError::Validation(
            "pricing.market_multiplier must be greater than 1.0".to_string(),
        ));
    }
    if pricing.floor_price <= Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.floor_price must be greater than zero".to_string(),
        ));
    }
    if pricing.exchange_rate <= Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.exchange_rate must be greater than zero".to_string(),
        ));
    }

    for (key, value) in [
        ("pricing.learned_confidence", pricing.learned_confidence),
        ("pricing.rule_confidence", pricing.rule_confidence),
        ("pricing.fallback_confidence", pricing.fallback_confidence),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!("{key} must be in range 0.0..=1.0")));
        }
    }
    if pricing.learned_confidence <= pricing.rule_confidence {
        return Err(ConfigError::Validation(
            "pricing.learned_confidence must exceed pricing.rule_confidence".to_string(),
        ));
    }
    if pricing.fallback_confidence > pricing.rule_confidence {
        return Err(ConfigError::Validation(
            "pricing.fallback_confidence must not exceed pricing.rule_confidence".to_string(),
        ));
    }

    for (tier, increment) in pricing.rounding.all() {
        if increment <= Decimal::ZERO {
            return Err(ConfigError::Validation(format!(
                "pricing.rounding.{} must be greater than zero",
                tier.label().replace('-', "_")
            )));
        }
        if !(pricing.floor_price % increment).is_zero() {
            return Err(ConfigError::Validation(format!(
                "pricing.floor_price must be a multiple of the {} rounding increment ({increment})",
                tier.label()
            )));
        }
    }

    if pricing.base_price_overrides.values().any(|price| *price <= Decimal::ZERO) {
        return Err(ConfigError::Validation(
            "pricing.base_prices entries must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_model(model: &ModelConfig) -> Result<(), ConfigError> {
    let key = model.artifact_key.trim();
    if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
        return Err(ConfigError::Validation(
            "model.artifact_key must be a plain, non-empty name".to_string(),
        ));
    }
    if model.load_timeout_secs == 0 || model.load_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "model.load_timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if model.training_rows < 50 {
        return Err(ConfigError::Validation(
            "model.training_rows must be at least 50".to_string(),
        ));
    }
    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }
    if llm.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "llm.max_tokens must be greater than zero".to_string(),
        ));
    }

    match llm.provider {
        LlmProvider::OpenAi => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for the openai provider".to_string(),
                ));
            }
        }
        LlmProvider::Ollama | LlmProvider::Disabled => {}
    }

    if let Some(base_url) = &llm.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "llm.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_conversation(conversation: &ConversationConfig) -> Result<(), ConfigError> {
    if conversation.history_limit == 0 || conversation.history_limit > 10 {
        return Err(ConfigError::Validation(
            "conversation.history_limit must be in range 1..=10".to_string(),
        ));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    Decimal::from_str(value.trim()).map_err(|_| invalid_override(key, value))
}

fn decimal_from_f64(key: &str, value: f64) -> Result<Decimal, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::Validation(format!("{key} must be a finite number")));
    }
    Decimal::from_str(&value.to_string())
        .map_err(|_| ConfigError::Validation(format!("{key} is out of range: {value}")))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    model: Option<ModelPatch>,
    llm: Option<LlmPatch>,
    conversation: Option<ConversationPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    market_multiplier: Option<f64>,
    floor_price: Option<u64>,
    exchange_rate: Option<f64>,
    learned_confidence: Option<f64>,
    rule_confidence: Option<f64>,
    fallback_confidence: Option<f64>,
    rounding: Option<RoundingPatch>,
    base_prices: Option<BTreeMap<String, u64>>,
}

#[derive(Debug, Default, Deserialize)]
struct RoundingPatch {
    simple: Option<u64>,
    medium: Option<u64>,
    complex: Option<u64>,
    very_complex: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelPatch {
    artifact_dir: Option<PathBuf>,
    artifact_key: Option<String>,
    load_timeout_secs: Option<u64>,
    training_rows: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct ConversationPatch {
    history_limit: Option<usize>,
    reply_seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
