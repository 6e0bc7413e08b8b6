use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use virtuoso_core::config::{ConfigOverrides, LoadOptions};
use virtuoso_core::SessionId;

use crate::commands::{load_config, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = detect_config_path(options.config_path.as_deref());
    let overridden = overridden_keys(&options.overrides);

    let config = match load_config("config", options, &SessionId::generate()) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        if overridden.iter().any(|key| *key == key_path) {
            return "override".to_string();
        }
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];

    lines.push(render_line(
        "store.name",
        &config.store.name,
        source("store.name", &["VIRTUOSO_STORE_NAME"]),
    ));
    lines.push(render_line(
        "store.currency",
        &config.store.currency,
        source("store.currency", &["VIRTUOSO_STORE_CURRENCY"]),
    ));
    lines.push(render_line(
        "store.email",
        &config.store.email,
        source("store.email", &["VIRTUOSO_STORE_EMAIL"]),
    ));
    lines.push(render_line(
        "store.phone",
        &config.store.phone,
        source("store.phone", &["VIRTUOSO_STORE_PHONE"]),
    ));
    lines.push(render_line(
        "store.address",
        &config.store.address,
        source("store.address", &["VIRTUOSO_STORE_ADDRESS"]),
    ));

    let catalog_path = config
        .catalog
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<built-in>".to_string());
    lines.push(render_line(
        "catalog.path",
        &catalog_path,
        source("catalog.path", &["VIRTUOSO_CATALOG_PATH"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["VIRTUOSO_LOGGING_LEVEL", "VIRTUOSO_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["VIRTUOSO_LOGGING_FORMAT", "VIRTUOSO_LOG_FORMAT"]),
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn overridden_keys(overrides: &ConfigOverrides) -> Vec<&'static str> {
    [
        ("store.name", overrides.store_name.is_some()),
        ("store.currency", overrides.currency.is_some()),
        ("catalog.path", overrides.catalog_path.is_some()),
        ("logging.level", overrides.log_level.is_some()),
        ("logging.format", overrides.log_format.is_some()),
    ]
    .into_iter()
    .filter_map(|(key, set)| set.then_some(key))
    .collect()
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("virtuoso.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/virtuoso.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

/// Env keys are checked in the same order the loader applies them; blank
/// values are ignored by the loader and so never count as a source.
fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| is_set(key)) {
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

fn is_set(env_key: &str) -> bool {
    env::var(env_key).map(|value| !value.trim().is_empty()).unwrap_or(false)
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
