pub mod catalog;
pub mod pricing;
pub mod session;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

use self::{
    catalog::Catalog,
    session::{Section, Session, ViewerControl},
};

/// A user interaction as the presentational layer reports it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorefrontEvent {
    Navigate { section: Section },
    ToggleMenu,
    SelectGarment { product_id: ProductId },
    TryOn { product_id: ProductId },
    Viewer { control: ViewerControl },
    AddToCart { product_id: ProductId },
    RemoveFromCart { product_id: ProductId },
    AdjustQuantity { product_id: ProductId, delta: i64 },
}

impl StorefrontEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::ToggleMenu => "toggle_menu",
            Self::SelectGarment { .. } => "select_garment",
            Self::TryOn { .. } => "try_on",
            Self::Viewer { .. } => "viewer",
            Self::AddToCart { .. } => "add_to_cart",
            Self::RemoveFromCart { .. } => "remove_from_cart",
            Self::AdjustQuantity { .. } => "adjust_quantity",
        }
    }
}

/// Applies one event to the session.
///
/// Only `AddToCart` can fail: a line must snapshot a real catalog product.
/// Removal and quantity changes tolerate unknown ids.
pub fn apply_event(
    session: Session,
    catalog: &Catalog,
    event: &StorefrontEvent,
) -> Result<Session, DomainError> {
    let next = match event {
        StorefrontEvent::Navigate { section } => session.navigate(*section),
        StorefrontEvent::ToggleMenu => session.toggle_menu(),
        StorefrontEvent::SelectGarment { product_id } => session.select_garment(product_id.clone()),
        StorefrontEvent::TryOn { product_id } => session.try_on(product_id.clone()),
        StorefrontEvent::Viewer { control } => session.apply_viewer_control(*control),
        StorefrontEvent::AddToCart { product_id } => {
            let product = catalog.require(product_id)?;
            session.add_to_cart(product)
        }
        StorefrontEvent::RemoveFromCart { product_id } => session.remove_from_cart(product_id),
        StorefrontEvent::AdjustQuantity { product_id, delta } => {
            session.adjust_quantity(product_id, *delta)
        }
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use crate::domain::cart::{grand_total, item_count};
    use crate::domain::product::ProductId;
    use crate::errors::DomainError;

    use super::{
        apply_event,
        catalog::Catalog,
        session::{Section, Session, SessionId},
        StorefrontEvent,
    };

    fn replay(events: &[StorefrontEvent]) -> Result<Session, DomainError> {
        let catalog = Catalog::seeded();
        events.iter().try_fold(Session::new(SessionId("replay".to_string())), |session, event| {
            apply_event(session, &catalog, event)
        })
    }

    #[test]
    fn replays_browse_and_buy_flow() {
        let session = replay(&[
            StorefrontEvent::ToggleMenu,
            StorefrontEvent::Navigate { section: Section::Catalog },
            StorefrontEvent::TryOn { product_id: ProductId::new("5") },
            StorefrontEvent::AddToCart { product_id: ProductId::new("5") },
            StorefrontEvent::AddToCart { product_id: ProductId::new("6") },
            StorefrontEvent::AdjustQuantity { product_id: ProductId::new("6"), delta: 2 },
        ])
        .expect("replay succeeds");

        assert_eq!(session.active_section, Section::Fitting);
        assert!(!session.menu_open);
        assert_eq!(session.selected_garment, Some(ProductId::new("5")));
        assert_eq!(item_count(&session.cart), 4);
        assert_eq!(grand_total(&session.cart), 8990 + 1990 * 3);
    }

    #[test]
    fn adding_unknown_product_is_rejected() {
        let error = replay(&[StorefrontEvent::AddToCart { product_id: ProductId::new("99") }])
            .expect_err("unknown product");
        assert_eq!(error, DomainError::UnknownProduct(ProductId::new("99")));
    }

    #[test]
    fn removing_unknown_product_is_tolerated() {
        let session = replay(&[
            StorefrontEvent::AddToCart { product_id: ProductId::new("1") },
            StorefrontEvent::RemoveFromCart { product_id: ProductId::new("99") },
            StorefrontEvent::AdjustQuantity { product_id: ProductId::new("99"), delta: -1 },
        ])
        .expect("tolerated");

        assert_eq!(session.cart.lines().len(), 1);
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_value(StorefrontEvent::Navigate { section: Section::About })
            .expect("serialize");
        assert_eq!(json["kind"], "navigate");
        assert_eq!(json["section"], "about");
    }
}
