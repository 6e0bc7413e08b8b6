use tracing::info;
use virtuoso_core::{config::LoadOptions, Catalog, SessionId};

use crate::commands::{prepare, CommandResult};

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let correlation_id = SessionId::generate();
    let (config, catalog) = match prepare("catalog", options, &correlation_id) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    info!(
        event_name = "storefront.catalog.listed",
        correlation_id = %correlation_id,
        products = catalog.len(),
        source = if config.catalog.path.is_some() { "file" } else { "seeded" },
        "catalog listed"
    );

    if json_output {
        return CommandResult::success_with_data(
            "catalog",
            format!("{} product(s)", catalog.len()),
            serde_json::to_value(catalog.products()).ok(),
        );
    }

    CommandResult { exit_code: 0, output: render_human(&config.store.name, &catalog) }
}

fn render_human(store_name: &str, catalog: &Catalog) -> String {
    let mut lines = vec![format!("{store_name} catalog ({} products):", catalog.len())];
    for product in catalog.products() {
        lines.push(format!(
            "- [{}] {} ({} · {}) {}",
            product.id, product.name, product.category, product.color, product.display_price
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use virtuoso_core::Catalog;

    use super::render_human;

    #[test]
    fn human_listing_keeps_display_order() {
        let rendered = render_human("VIRTUOSO", &Catalog::seeded());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "VIRTUOSO catalog (6 products):");
        assert_eq!(lines[1], "- [1] Классическая рубашка (Рубашки · Белый) 4 990 ₽");
        assert_eq!(lines[6], "- [6] Футболка базовая (Футболки · Белый) 1 990 ₽");
    }
}
