use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use greenpath_core::config::AppConfig;
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };
    CommandResult::text(render(&config, detect_config_path().as_deref()))
}

pub fn render(config: &AppConfig, config_file_path: Option<&Path>) -> String {
    let config_file_doc = load_config_file_doc(config_file_path);
    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    for field in fields(config) {
        let source =
            field_source(field.key, field.env_keys, config_file_doc.as_ref(), config_file_path);
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }
    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let api_key = if config.ai.has_api_key() { "<redacted>" } else { "<unset>" };
    vec![
        Field {
            key: "database.url",
            env_keys: &["GREENPATH_DATABASE_URL"],
            value: config.database.url.clone(),
        },
        Field {
            key: "database.max_connections",
            env_keys: &["GREENPATH_DATABASE_MAX_CONNECTIONS"],
            value: config.database.max_connections.to_string(),
        },
        Field {
            key: "database.timeout_secs",
            env_keys: &["GREENPATH_DATABASE_TIMEOUT_SECS"],
            value: config.database.timeout_secs.to_string(),
        },
        Field {
            key: "ai.enabled",
            env_keys: &["GREENPATH_AI_ENABLED"],
            value: config.ai.enabled.to_string(),
        },
        Field {
            key: "ai.provider",
            env_keys: &["GREENPATH_AI_PROVIDER"],
            value: config.ai.provider.as_str().to_string(),
        },
        Field {
            key: "ai.base_url",
            env_keys: &["GREENPATH_AI_BASE_URL"],
            value: config.ai.effective_base_url(),
        },
        Field {
            key: "ai.api_key",
            env_keys: &["GREENPATH_AI_API_KEY", "OPENROUTER_API_KEY"],
            value: api_key.to_string(),
        },
        Field {
            key: "ai.model",
            env_keys: &["GREENPATH_AI_MODEL"],
            value: config.ai.model.clone(),
        },
        Field {
            key: "ai.timeout_secs",
            env_keys: &["GREENPATH_AI_TIMEOUT_SECS"],
            value: config.ai.timeout_secs.to_string(),
        },
        Field {
            key: "engine.max_rule_recommendations",
            env_keys: &["GREENPATH_ENGINE_MAX_RULE_RECOMMENDATIONS"],
            value: config.engine.max_rule_recommendations.to_string(),
        },
        Field {
            key: "engine.scoring_variant",
            env_keys: &["GREENPATH_ENGINE_SCORING_VARIANT"],
            value: config.engine.scoring_variant.as_str().to_string(),
        },
        Field {
            key: "server.bind_address",
            env_keys: &["GREENPATH_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        Field {
            key: "server.port",
            env_keys: &["GREENPATH_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        Field {
            key: "logging.level",
            env_keys: &["GREENPATH_LOGGING_LEVEL", "GREENPATH_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key: "logging.format",
            env_keys: &["GREENPATH_LOGGING_FORMAT", "GREENPATH_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format).to_lowercase(),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("greenpath.toml"), PathBuf::from("config/greenpath.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|env_key| env::var_os(env_key).is_some()) {
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

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::contains_path;

    #[test]
    fn nested_keys_are_found_in_toml_documents() {
        let doc = "[ai]\nmodel = \"gpt-4o-mini\"\n".parse::<Value>().expect("toml");
        assert!(contains_path(&doc, "ai.model"));
        assert!(!contains_path(&doc, "ai.provider"));
        assert!(!contains_path(&doc, "server.port"));
    }
}
