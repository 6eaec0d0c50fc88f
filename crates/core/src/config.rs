use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::DEFAULT_MAX_RULE_RECOMMENDATIONS;
use crate::scoring::ScoringVariant;

/// Upper bound for `engine.max_rule_recommendations`; a profile never gets more than 8 rule items.
pub const MAX_RULE_RECOMMENDATIONS_LIMIT: usize = 8;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub ai: AiConfig,
    pub engine: EngineConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub enabled: bool,
    pub provider: AiProvider,
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub max_rule_recommendations: usize,
    pub scoring_variant: ScoringVariant,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenRouter,
    OpenAi,
    Ollama,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }
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
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub ai_enabled: Option<bool>,
    pub ai_provider: Option<AiProvider>,
    pub ai_model: Option<String>,
    pub server_port: Option<u16>,
    pub scoring_variant: Option<ScoringVariant>,
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://greenpath.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            ai: AiConfig {
                enabled: false,
                provider: AiProvider::OpenRouter,
                base_url: None,
                api_key: None,
                model: "anthropic/claude-3-haiku".to_string(),
                timeout_secs: 30,
                max_retries: 1,
            },
            engine: EngineConfig {
                max_rule_recommendations: DEFAULT_MAX_RULE_RECOMMENDATIONS,
                scoring_variant: ScoringVariant::Basic,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for AiProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported ai provider `{other}` (expected openrouter|openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
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

impl AiConfig {
    /// Configured base URL, or the provider's public endpoint.
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

impl AppConfig {
    /// Precedence: defaults < file < `GREENPATH_*` env < explicit overrides.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("greenpath.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(ai) = patch.ai {
            if let Some(enabled) = ai.enabled {
                self.ai.enabled = enabled;
            }
            if let Some(provider) = ai.provider {
                self.ai.provider = provider;
            }
            if let Some(base_url) = ai.base_url {
                self.ai.base_url = Some(base_url);
            }
            if let Some(api_key) = ai.api_key {
                self.ai.api_key = Some(api_key.into());
            }
            if let Some(model) = ai.model {
                self.ai.model = model;
            }
            if let Some(timeout_secs) = ai.timeout_secs {
                self.ai.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = ai.max_retries {
                self.ai.max_retries = max_retries;
            }
        }

        if let Some(engine) = patch.engine {
            if let Some(max_rule_recommendations) = engine.max_rule_recommendations {
                self.engine.max_rule_recommendations = max_rule_recommendations;
            }
            if let Some(scoring_variant) = engine.scoring_variant {
                self.engine.scoring_variant = scoring_variant;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
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
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("GREENPATH_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("GREENPATH_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("GREENPATH_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("GREENPATH_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("GREENPATH_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("GREENPATH_AI_ENABLED") {
            self.ai.enabled = parse_env("GREENPATH_AI_ENABLED", &value)?;
        }
        if let Some(value) = read_env("GREENPATH_AI_PROVIDER") {
            self.ai.provider = value.parse()?;
        }
        if let Some(value) = read_env("GREENPATH_AI_BASE_URL") {
            self.ai.base_url = Some(value);
        }
        // OPENROUTER_API_KEY is accepted for deployments that already export it.
        if let Some(value) =
            read_env("GREENPATH_AI_API_KEY").or_else(|| read_env("OPENROUTER_API_KEY"))
        {
            self.ai.api_key = Some(value.into());
        }
        if let Some(value) = read_env("GREENPATH_AI_MODEL") {
            self.ai.model = value;
        }
        if let Some(value) = read_env("GREENPATH_AI_TIMEOUT_SECS") {
            self.ai.timeout_secs = parse_env("GREENPATH_AI_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("GREENPATH_AI_MAX_RETRIES") {
            self.ai.max_retries = parse_env("GREENPATH_AI_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("GREENPATH_ENGINE_MAX_RULE_RECOMMENDATIONS") {
            self.engine.max_rule_recommendations =
                parse_env("GREENPATH_ENGINE_MAX_RULE_RECOMMENDATIONS", &value)?;
        }
        if let Some(value) = read_env("GREENPATH_ENGINE_SCORING_VARIANT") {
            self.engine.scoring_variant = ScoringVariant::parse(&value).ok_or_else(|| {
                ConfigError::InvalidEnvOverride {
                    key: "GREENPATH_ENGINE_SCORING_VARIANT".to_string(),
                    value: value.clone(),
                }
            })?;
        }

        if let Some(value) = read_env("GREENPATH_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("GREENPATH_SERVER_PORT") {
            self.server.port = parse_env("GREENPATH_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("GREENPATH_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_env("GREENPATH_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("GREENPATH_LOGGING_LEVEL").or_else(|| read_env("GREENPATH_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("GREENPATH_LOGGING_FORMAT").or_else(|| read_env("GREENPATH_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(enabled) = overrides.ai_enabled {
            self.ai.enabled = enabled;
        }
        if let Some(provider) = overrides.ai_provider {
            self.ai.provider = provider;
        }
        if let Some(model) = overrides.ai_model {
            self.ai.model = model;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(scoring_variant) = overrides.scoring_variant {
            self.engine.scoring_variant = scoring_variant;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_ai(&self.ai)?;
        validate_engine(&self.engine)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("greenpath.toml"), PathBuf::from("config/greenpath.toml")]
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
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let key = &after[..end];
        let value = env::var(key)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.to_string() })?;
        output.push_str(&value);
        rest = &after[end + 1..];
    }
    output.push_str(rest);

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_ai(ai: &AiConfig) -> Result<(), ConfigError> {
    if ai.timeout_secs == 0 || ai.timeout_secs > 300 {
        return Err(ConfigError::Validation("ai.timeout_secs must be in range 1..=300".to_string()));
    }

    if !ai.enabled {
        return Ok(());
    }

    if ai.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ai.model is required when ai.enabled is true".to_string(),
        ));
    }

    if ai.provider != AiProvider::Ollama && !ai.has_api_key() {
        return Err(ConfigError::Validation(format!(
            "ai.api_key is required for the {} provider (set GREENPATH_AI_API_KEY)",
            ai.provider.as_str()
        )));
    }

    let base_url = ai.effective_base_url();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "ai.base_url must start with http:// or https://".to_string(),
        ));
    }

    Ok(())
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if engine.max_rule_recommendations == 0
        || engine.max_rule_recommendations > MAX_RULE_RECOMMENDATIONS_LIMIT
    {
        return Err(ConfigError::Validation(format!(
            "engine.max_rule_recommendations must be in range 1..={MAX_RULE_RECOMMENDATIONS_LIMIT}"
        )));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
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

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    ai: Option<AiPatch>,
    engine: Option<EnginePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AiPatch {
    enabled: Option<bool>,
    provider: Option<AiProvider>,
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    max_rule_recommendations: Option<usize>,
    scoring_variant: Option<ScoringVariant>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
