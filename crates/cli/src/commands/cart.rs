use tracing::{debug, info};
use virtuoso_core::{
    apply_event, config::LoadOptions, ApplicationError, CartSummary, DomainError, Session,
    SessionId, StorefrontEvent,
};

use crate::commands::{
    parse_event, prepare, CommandResult, EXIT_INVALID_ACTION, EXIT_UNKNOWN_PRODUCT,
};

pub fn run(options: LoadOptions, actions: &[String]) -> CommandResult {
    let session_id = SessionId::generate();
    let (config, catalog) = match prepare("cart", options, &session_id) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let mut session = Session::new(session_id.clone());
    for token in actions {
        let event = match parse_event(token) {
            Ok(event) if is_cart_event(&event) => event,
            Ok(event) => {
                return CommandResult::failure(
                    "cart",
                    "invalid_action",
                    format!("`{}` is a session event; use `virtuoso session`", event.name()),
                    EXIT_INVALID_ACTION,
                );
            }
            Err(message) => {
                return CommandResult::failure(
                    "cart",
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
                    "cart",
                    error_class,
                    ApplicationError::Domain(error),
                    &session_id,
                    exit_code,
                );
            }
        };
        debug!(
            event_name = "storefront.cart.action_applied",
            correlation_id = %session.id,
            action = event.name(),
            lines = session.cart.lines().len(),
            "cart action applied"
        );
    }

    let summary = CartSummary::from_cart(&session.cart, &config.store.currency);
    info!(
        event_name = "storefront.cart.replayed",
        correlation_id = %session.id,
        actions = actions.len(),
        item_count = summary.item_count,
        grand_total = summary.grand_total,
        "cart replay finished"
    );

    let message = format!(
        "{} item(s) across {} line(s), total {}",
        summary.item_count, summary.distinct_products, summary.display_grand_total
    );
    CommandResult::success_with_data("cart", message, serde_json::to_value(&summary).ok())
}

fn is_cart_event(event: &StorefrontEvent) -> bool {
    matches!(
        event,
        StorefrontEvent::AddToCart { .. }
            | StorefrontEvent::RemoveFromCart { .. }
            | StorefrontEvent::AdjustQuantity { .. }
    )
}
