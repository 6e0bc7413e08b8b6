use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storefront::pricing::DEFAULT_CURRENCY;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub name: String,
    pub currency: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogConfig {
    /// TOML catalog file; the built-in garments are used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
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
    pub store_name: Option<String>,
    pub currency: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
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
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                name: "VIRTUOSO".to_string(),
                currency: DEFAULT_CURRENCY.to_string(),
                email: "info@virtuoso.shop".to_string(),
                phone: "+7 (495) 123-45-67".to_string(),
                address: "Москва, ул. Тверская, 1".to_string(),
            },
            catalog: CatalogConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
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

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("virtuoso.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(name) = store.name {
                self.store.name = name;
            }
            if let Some(currency) = store.currency {
                self.store.currency = currency;
            }
            if let Some(email) = store.email {
                self.store.email = email;
            }
            if let Some(phone) = store.phone {
                self.store.phone = phone;
            }
            if let Some(address) = store.address {
                self.store.address = address;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = Some(path);
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
        if let Some(value) = read_env("VIRTUOSO_STORE_NAME") {
            self.store.name = value;
        }
        if let Some(value) = read_env("VIRTUOSO_STORE_CURRENCY") {
            self.store.currency = value;
        }
        if let Some(value) = read_env("VIRTUOSO_STORE_EMAIL") {
            self.store.email = value;
        }
        if let Some(value) = read_env("VIRTUOSO_STORE_PHONE") {
            self.store.phone = value;
        }
        if let Some(value) = read_env("VIRTUOSO_STORE_ADDRESS") {
            self.store.address = value;
        }
        if let Some(value) = read_env("VIRTUOSO_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(value));
        }

        let log_level =
            read_env("VIRTUOSO_LOGGING_LEVEL").or_else(|| read_env("VIRTUOSO_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }

        let log_format =
            read_env("VIRTUOSO_LOGGING_FORMAT").or_else(|| read_env("VIRTUOSO_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(store_name) = overrides.store_name {
            self.store.name = store_name;
        }
        if let Some(currency) = overrides.currency {
            self.store.currency = currency;
        }
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = Some(catalog_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_catalog(&self.catalog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("virtuoso.toml"), PathBuf::from("config/virtuoso.toml")]
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

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.name.trim().is_empty() {
        return Err(ConfigError::Validation("store.name must not be empty".to_string()));
    }
    if store.currency.trim().is_empty() {
        return Err(ConfigError::Validation("store.currency must not be empty".to_string()));
    }
    if !store.email.is_empty() && !store.email.contains('@') {
        return Err(ConfigError::Validation(format!(
            "store.email `{}` is not an email address",
            store.email
        )));
    }
    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if let Some(path) = &catalog.path {
        if !path.exists() {
            return Err(ConfigError::Validation(format!(
                "catalog.path `{}` does not exist",
                path.display()
            )));
        }
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

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    catalog: Option<CatalogPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    name: Option<String>,
    currency: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const CONFIG_VARS: &[&str] = &[
        "VIRTUOSO_STORE_NAME",
        "VIRTUOSO_STORE_CURRENCY",
        "VIRTUOSO_STORE_EMAIL",
        "VIRTUOSO_STORE_PHONE",
        "VIRTUOSO_STORE_ADDRESS",
        "VIRTUOSO_CATALOG_PATH",
        "VIRTUOSO_LOGGING_LEVEL",
        "VIRTUOSO_LOGGING_FORMAT",
        "VIRTUOSO_LOG_LEVEL",
        "VIRTUOSO_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_describe_the_virtuoso_store() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        let config = AppConfig::load(LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.store.name == "VIRTUOSO", "default store name")?;
        ensure(config.store.currency == "₽", "default currency is rubles")?;
        ensure(config.catalog.path.is_none(), "built-in catalog by default")?;
        ensure(config.logging.format == LogFormat::Compact, "compact logs by default")?;
        Ok(())
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);
        env::set_var("TEST_VIRTUOSO_EMAIL", "shop@example.com");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("virtuoso.toml");
            fs::write(
                &path,
                r#"
[store]
email = "${TEST_VIRTUOSO_EMAIL}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.store.email == "shop@example.com", "email should be interpolated")?;
            Ok(())
        })();

        clear_vars(&["TEST_VIRTUOSO_EMAIL"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);
        env::set_var("VIRTUOSO_LOG_LEVEL", "warn");
        env::set_var("VIRTUOSO_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["VIRTUOSO_LOG_LEVEL", "VIRTUOSO_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);
        env::set_var("VIRTUOSO_STORE_NAME", "VIRTUOSO ENV");
        env::set_var("VIRTUOSO_STORE_PHONE", "+7 (000) 000-00-00");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("virtuoso.toml");
            fs::write(
                &path,
                r#"
[store]
name = "VIRTUOSO FILE"
currency = "RUB"
phone = "+7 (111) 111-11-11"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    store_name: Some("VIRTUOSO OVERRIDE".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.store.name == "VIRTUOSO OVERRIDE", "override store name should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.store.phone == "+7 (000) 000-00-00", "env phone should win over file")?;
            ensure(config.store.currency == "RUB", "file currency should win over default")?;
            Ok(())
        })();

        clear_vars(&["VIRTUOSO_STORE_NAME", "VIRTUOSO_STORE_PHONE"]);
        result
    }

    #[test]
    fn missing_required_file_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        let result = AppConfig::load(LoadOptions {
            config_path: Some("missing/virtuoso.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "required file should be reported missing",
        )
    }

    #[test]
    fn unterminated_interpolation_fails() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("virtuoso.toml");
        fs::write(&path, "[store]\nname = \"${UNCLOSED\"\n").map_err(|err| err.to_string())?;

        let result =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });
        ensure(
            matches!(result, Err(ConfigError::UnterminatedInterpolation)),
            "unterminated interpolation should fail",
        )
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                log_level: Some("verbose".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        match result {
            Err(ConfigError::Validation(message)) => {
                ensure(message.contains("logging.level"), "message should name logging.level")
            }
            _ => Err("invalid log level should fail validation".to_string()),
        }
    }

    #[test]
    fn missing_catalog_path_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);
        env::set_var("VIRTUOSO_CATALOG_PATH", "nowhere/catalog.toml");

        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["VIRTUOSO_CATALOG_PATH"]);

        match result {
            Err(ConfigError::Validation(message)) => {
                ensure(message.contains("catalog.path"), "message should name catalog.path")
            }
            _ => Err("missing catalog file should fail validation".to_string()),
        }
    }

    #[test]
    fn empty_currency_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                currency: Some("  ".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::Validation(_))),
            "blank currency should fail validation",
        )
    }

    #[test]
    fn invalid_log_format_env_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);
        env::set_var("VIRTUOSO_LOGGING_FORMAT", "xml");

        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["VIRTUOSO_LOGGING_FORMAT"]);

        ensure(
            matches!(result, Err(ConfigError::Validation(_))),
            "unknown log format should fail",
        )
    }
}
