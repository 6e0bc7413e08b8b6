use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::product::{Product, ProductId};
use crate::errors::{ApplicationError, DomainError};
use crate::storefront::pricing::{format_price, DEFAULT_CURRENCY};

const SEED_GARMENTS: &[(&str, &str, &str, &str, u64)] = &[
    ("1", "Классическая рубашка", "Рубашки", "Белый", 4990),
    ("2", "Брюки чинос", "Брюки", "Бежевый", 5990),
    ("3", "Шерстяной свитер", "Свитера", "Серый", 7990),
    ("4", "Джинсы slim fit", "Джинсы", "Синий", 6490),
    ("5", "Кардиган", "Кардиганы", "Черный", 8990),
    ("6", "Футболка базовая", "Футболки", "Белый", 1990),
];

/// Closed, display-ordered product list. Read-only once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(&product.id) {
                return Err(DomainError::DuplicateProduct(product.id.clone()));
            }
        }
        Ok(Self { products })
    }

    /// The six garments the storefront ships with.
    pub fn seeded() -> Self {
        Self::seeded_in(DEFAULT_CURRENCY)
    }

    pub fn seeded_in(currency: &str) -> Self {
        let products = SEED_GARMENTS
            .iter()
            .map(|(id, name, category, color, price)| Product {
                id: ProductId::new(*id),
                name: (*name).to_string(),
                category: (*category).to_string(),
                color: (*color).to_string(),
                unit_price: *price,
                display_price: format_price(*price, currency),
            })
            .collect();
        Self { products }
    }

    pub fn from_toml_file(path: &Path, currency: &str) -> Result<Self, ApplicationError> {
        let raw = fs::read_to_string(path).map_err(|error| ApplicationError::Catalog {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        Self::from_toml_str(&raw, currency).map_err(|error| match error {
            ApplicationError::Catalog { message, .. } => {
                ApplicationError::Catalog { path: path.to_path_buf(), message }
            }
            other => other,
        })
    }

    pub fn from_toml_str(raw: &str, currency: &str) -> Result<Self, ApplicationError> {
        let document = toml::from_str::<CatalogDocument>(raw).map_err(|error| {
            ApplicationError::Catalog { path: "<inline>".into(), message: error.to_string() }
        })?;

        let products = document
            .products
            .into_iter()
            .map(|entry| Product {
                display_price: entry
                    .display_price
                    .unwrap_or_else(|| format_price(entry.price, currency)),
                id: ProductId(entry.id),
                name: entry.name,
                category: entry.category,
                color: entry.color,
                unit_price: entry.price,
            })
            .collect();

        Self::new(products).map_err(ApplicationError::from)
    }

    pub fn find(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == product_id)
    }

    pub fn require(&self, product_id: &ProductId) -> Result<&Product, DomainError> {
        self.find(product_id).ok_or_else(|| DomainError::UnknownProduct(product_id.clone()))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    products: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    name: String,
    category: String,
    color: String,
    price: u64,
    display_price: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use crate::domain::product::{Product, ProductId};
    use crate::errors::{ApplicationError, DomainError};

    use super::Catalog;

    #[test]
    fn seeded_catalog_has_six_garments_in_display_order() {
        let catalog = Catalog::seeded();
        let ids: Vec<&str> = catalog.products().iter().map(|product| product.id.as_str()).collect();

        assert_eq!(catalog.len(), 6);
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(catalog.products()[0].display_price, "4 990 ₽");
        assert_eq!(catalog.products()[5].unit_price, 1990);
    }

    #[test]
    fn seeded_catalog_passes_uniqueness_check() {
        let seeded = Catalog::seeded();
        let rebuilt = Catalog::new(seeded.products().to_vec()).expect("seeded ids are unique");
        assert_eq!(rebuilt, seeded);
    }

    #[test]
    fn seeded_display_prices_follow_currency() {
        let catalog = Catalog::seeded_in("RUB");
        assert_eq!(catalog.products()[4].display_price, "8 990 RUB");
    }

    #[test]
    fn find_and_require_by_id() {
        let catalog = Catalog::seeded();

        let cardigan = catalog.find(&ProductId::new("5")).expect("cardigan");
        assert_eq!(cardigan.name, "Кардиган");
        assert_eq!(
            catalog.require(&ProductId::new("7")),
            Err(DomainError::UnknownProduct(ProductId::new("7")))
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let shirt = Catalog::seeded().products()[0].clone();
        let copy = Product { name: "Другая рубашка".to_string(), ..shirt.clone() };

        let error = Catalog::new(vec![shirt, copy]).expect_err("duplicate id should fail");
        assert_eq!(error, DomainError::DuplicateProduct(ProductId::new("1")));
    }

    #[test]
    fn loads_catalog_file_and_derives_display_price() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
[[products]]
id = "coat"
name = "Пальто"
category = "Пальто"
color = "Черный"
price = 12990

[[products]]
id = "scarf"
name = "Шарф"
category = "Аксессуары"
color = "Серый"
price = 990
display_price = "990 руб."
"#,
        )
        .expect("write catalog");

        let catalog = Catalog::from_toml_file(&path, "₽").expect("catalog loads");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.products()[0].display_price, "12 990 ₽");
        assert_eq!(catalog.products()[1].display_price, "990 руб.");
    }

    #[test]
    fn malformed_catalog_file_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.toml");
        fs::write(&path, "[[products]]\nid = \"1\"\n").expect("write catalog");

        let error = Catalog::from_toml_file(&path, "₽").expect_err("missing fields");
        assert!(matches!(error, ApplicationError::Catalog { ref path, .. } if path.ends_with("catalog.toml")));
    }

    #[test]
    fn duplicate_ids_in_file_surface_as_domain_error() {
        let raw = r#"
[[products]]
id = "1"
name = "A"
category = "C"
color = "X"
price = 1

[[products]]
id = "1"
name = "B"
category = "C"
color = "X"
price = 2
"#;
        let error = Catalog::from_toml_str(raw, "₽").expect_err("duplicate id");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::DuplicateProduct(ProductId::new("1")))
        );
    }
}
