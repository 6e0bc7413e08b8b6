pub mod config;
pub mod domain;
pub mod errors;
pub mod storefront;

pub use domain::cart::{grand_total, item_count, line_total, Cart, CartLine};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use storefront::catalog::Catalog;
pub use storefront::pricing::{format_price, CartSummary, CartSummaryLine};
pub use storefront::session::{Section, Session, SessionId, ViewerControl};
pub use storefront::{apply_event, StorefrontEvent};
