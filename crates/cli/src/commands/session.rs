use serde::Serialize;
use tracing::{debug, info};
use virtuoso_core::{
    apply_event, config::LoadOptions, ApplicationError, CartSummary, Catalog, DomainError,
    ProductId, Section, Session, SessionId,
};

use crate::commands::{
    parse_event, prepare, CommandResult, EXIT_INVALID_ACTION, EXIT_UNKNOWN_PRODUCT,
};

#[derive(Debug, Serialize)]
struct SessionSnapshot {
    session_id: String,
    active_section: Section,
    active_label: &'static str,
    menu_open: bool,
    selected_garment: Option<ProductId>,
    fitting_room_label: Option<String>,
    cart: CartSummary,
}

impl SessionSnapshot {
    fn capture(session: &Session, catalog: &Catalog, currency: &str) -> Self {
        Self {
            session_id: session.id.to_string(),
            active_section: session.active_section,
            active_label: session.active_section.label(),
            menu_open: session.menu_open,
            selected_garment: session.selected_garment.clone(),
            fitting_room_label: session.fitting_room_label(catalog).map(str::to_string),
            cart: CartSummary::from_cart(&session.cart, currency),
        }
    }
}

pub fn run(options: LoadOptions, events: &[String]) -> CommandResult {
    let session_id = SessionId::generate();
    let (config, catalog) = match prepare("session", options, &session_id) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let mut session = Session::new(session_id.clone());
    info!(
        event_name = "storefront.session.started",
        correlation_id = %session.id,
        catalog_size = catalog.len(),
        "storefront session started"
    );

    for token in events {
        let event = match parse_event(token) {
            Ok(event) => event,
            Err(message) => {
                return CommandResult::failure(
                    "session",
                    "invalid_action",
                    message,
                    EXIT_INVALID_ACTION,
                );
            }
        };

        session = match apply_event(session, &catalog, &event) {
            Ok(next) => next,
            Err(error) => {
                let (error_class, exit_code) = match &error {
                    DomainError::UnknownProduct(_) => ("unknown_product", EXIT_UNKNOWN_PRODUCT),
                    _ => ("invalid_action", EXIT_INVALID_ACTION),
                };
                return CommandResult::from_application_error(
                    "session",
                    error_class,
                    ApplicationError::Domain(error),
                    &session_id,
                    exit_code,
                );
            }
        };
        debug!(
            event_name = "storefront.session.event_applied",
            correlation_id = %session.id,
            event = event.name(),
            active_section = %session.active_section,
            menu_open = session.menu_open,
            "storefront event applied"
        );
    }

    let snapshot = SessionSnapshot::capture(&session, &catalog, &config.store.currency);
    let message = format!(
        "{} at {}, cart total {}",
        config.store.name, snapshot.active_label, snapshot.cart.display_grand_total
    );
    CommandResult::success_with_data("session", message, serde_json::to_value(&snapshot).ok())
}
