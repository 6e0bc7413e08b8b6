pub mod cart;
pub mod catalog;
pub mod config;
pub mod doctor;
pub mod session;

use serde::Serialize;
use serde_json::Value;
use virtuoso_core::{
    config::{AppConfig, LoadOptions},
    ApplicationError, Catalog, ProductId, Section, SessionId, StorefrontEvent, ViewerControl,
};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            hint: None,
            correlation_id: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            hint: None,
            correlation_id: None,
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Failure envelope for application errors: the interface mapping adds the
    /// user-safe hint and the session's correlation id.
    pub fn from_application_error(
        command: &str,
        error_class: &str,
        error: ApplicationError,
        correlation_id: &SessionId,
        exit_code: u8,
    ) -> Self {
        let interface = error.into_interface(correlation_id.to_string());
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: interface.to_string(),
            hint: Some(interface.user_message().to_string()),
            correlation_id: Some(correlation_id.to_string()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) const EXIT_CONFIG: u8 = 2;
pub(crate) const EXIT_UNKNOWN_PRODUCT: u8 = 3;
pub(crate) const EXIT_INVALID_ACTION: u8 = 4;
pub(crate) const EXIT_CATALOG: u8 = 5;

/// Loads config and catalog, or the failure result the command should print.
pub(crate) fn prepare(
    command: &str,
    options: LoadOptions,
    session_id: &SessionId,
) -> Result<(AppConfig, Catalog), CommandResult> {
    let config = load_config(command, options, session_id)?;

    let catalog = load_catalog(&config).map_err(|error| {
        CommandResult::from_application_error(
            command,
            "catalog_load",
            error,
            session_id,
            EXIT_CATALOG,
        )
    })?;

    Ok((config, catalog))
}

pub(crate) fn load_config(
    command: &str,
    options: LoadOptions,
    session_id: &SessionId,
) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options).map_err(|error| {
        CommandResult::from_application_error(
            command,
            "config_validation",
            ApplicationError::Configuration(error.to_string()),
            session_id,
            EXIT_CONFIG,
        )
    })
}

pub(crate) fn load_catalog(
    config: &AppConfig,
) -> Result<Catalog, virtuoso_core::ApplicationError> {
    match &config.catalog.path {
        Some(path) => Catalog::from_toml_file(path, &config.store.currency),
        None => Ok(Catalog::seeded_in(&config.store.currency)),
    }
}

/// Parses a `verb[:argument]` token into a storefront event.
pub fn parse_event(token: &str) -> Result<StorefrontEvent, String> {
    let (verb, argument) = match token.split_once(':') {
        Some((verb, argument)) => (verb.trim(), Some(argument.trim())),
        None => (token.trim(), None),
    };

    let product_id = || -> Result<ProductId, String> {
        match argument {
            Some(value) if !value.is_empty() => Ok(ProductId::new(value)),
            _ => Err(format!("`{token}` needs a product id (`{verb}:<id>`)")),
        }
    };

    match verb {
        "add" => Ok(StorefrontEvent::AddToCart { product_id: product_id()? }),
        "remove" => Ok(StorefrontEvent::RemoveFromCart { product_id: product_id()? }),
        "inc" => Ok(StorefrontEvent::AdjustQuantity { product_id: product_id()?, delta: 1 }),
        "dec" => Ok(StorefrontEvent::AdjustQuantity { product_id: product_id()?, delta: -1 }),
        "select" => Ok(StorefrontEvent::SelectGarment { product_id: product_id()? }),
        "try-on" => Ok(StorefrontEvent::TryOn { product_id: product_id()? }),
        "menu" => Ok(StorefrontEvent::ToggleMenu),
        "nav" => {
            let section = argument
                .ok_or_else(|| format!("`{token}` needs a section (`nav:<section>`)"))?
                .parse::<Section>()
                .map_err(|error| error.to_string())?;
            Ok(StorefrontEvent::Navigate { section })
        }
        "viewer" => {
            let control = argument
                .ok_or_else(|| format!("`{token}` needs a control (`viewer:<control>`)"))?
                .parse::<ViewerControl>()
                .map_err(|error| error.to_string())?;
            Ok(StorefrontEvent::Viewer { control })
        }
        other => Err(format!("unsupported action `{other}`")),
    }
}
