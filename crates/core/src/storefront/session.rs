use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;
use crate::storefront::catalog::Catalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Home,
    Fitting,
    Catalog,
    About,
    Contact,
}

impl Section {
    /// Navigation order.
    pub const ALL: [Section; 5] =
        [Section::Home, Section::Fitting, Section::Catalog, Section::About, Section::Contact];

    pub fn anchor(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Fitting => "fitting",
            Self::Catalog => "catalog",
            Self::About => "about",
            Self::Contact => "contact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "ГЛАВНАЯ",
            Self::Fitting => "ПРИМЕРОЧНАЯ",
            Self::Catalog => "КАТАЛОГ",
            Self::About => "О НАС",
            Self::Contact => "КОНТАКТЫ",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.anchor())
    }
}

impl FromStr for Section {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|section| section.anchor() == normalized)
            .ok_or_else(|| DomainError::UnknownSection(value.to_string()))
    }
}

/// Fitting room viewer buttons. None of them change session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerControl {
    Rotate,
    Zoom,
    Measure,
}

impl ViewerControl {
    pub const ALL: [ViewerControl; 3] =
        [ViewerControl::Rotate, ViewerControl::Zoom, ViewerControl::Measure];

    pub fn label(self) -> &'static str {
        match self {
            Self::Rotate => "Повернуть",
            Self::Zoom => "Увеличить",
            Self::Measure => "Размеры",
        }
    }
}

impl FromStr for ViewerControl {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rotate" => Ok(Self::Rotate),
            "zoom" => Ok(Self::Zoom),
            "measure" => Ok(Self::Measure),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported viewer control `{other}` (expected rotate|zoom|measure)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transient storefront state. Everything here resets with the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub active_section: Section,
    pub menu_open: bool,
    pub selected_garment: Option<ProductId>,
    pub cart: Cart,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            active_section: Section::Home,
            menu_open: false,
            selected_garment: None,
            cart: Cart::new(),
        }
    }

    pub fn start() -> Self {
        Self::new(SessionId::generate())
    }

    /// Scrolling to a section always collapses the mobile menu.
    pub fn navigate(mut self, section: Section) -> Self {
        self.active_section = section;
        self.menu_open = false;
        self
    }

    pub fn toggle_menu(mut self) -> Self {
        self.menu_open = !self.menu_open;
        self
    }

    pub fn select_garment(mut self, product_id: ProductId) -> Self {
        self.selected_garment = Some(product_id);
        self
    }

    pub fn try_on(self, product_id: ProductId) -> Self {
        self.select_garment(product_id).navigate(Section::Fitting)
    }

    pub fn apply_viewer_control(self, _control: ViewerControl) -> Self {
        self
    }

    pub fn add_to_cart(mut self, product: &Product) -> Self {
        self.cart = self.cart.add(product);
        self
    }

    pub fn remove_from_cart(mut self, product_id: &ProductId) -> Self {
        self.cart = self.cart.remove(product_id);
        self
    }

    pub fn adjust_quantity(mut self, product_id: &ProductId, delta: i64) -> Self {
        self.cart = self.cart.set_quantity_delta(product_id, delta);
        self
    }

    /// Name shown over the fitting room mannequin, if the selection resolves.
    pub fn fitting_room_label<'a>(&self, catalog: &'a Catalog) -> Option<&'a str> {
        let selected = self.selected_garment.as_ref()?;
        catalog.find(selected).map(|product| product.name.as_str())
    }
}
