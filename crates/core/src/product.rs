//! Storefront products and the demo catalog.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A product offered by the store. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub image_url: String,
}

impl Product {
    /// Price as shown on marketing material, e.g. `$12.50`.
    pub fn display_price(&self) -> String {
        format_price(self.price)
    }
}

/// Format a price with a dollar sign and two decimals.
pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// Read-only product catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The built-in demo catalog served when no catalog file is configured.
    pub fn demo() -> Self {
        let product = |id: i64, name: &str, price: f64, image: &str| Product {
            id,
            name: name.to_string(),
            price,
            image_url: format!("https://images.unsplash.com/{image}?w=800"),
        };

        Self::new(vec![
            product(1, "Canvas Tote Bag", 24.99, "photo-1544816155-12df9643f363"),
            product(2, "Ceramic Coffee Mug", 14.5, "photo-1514228742587-6b1558fcca3d"),
            product(3, "Wireless Headphones", 129.0, "photo-1505740420928-5e560c06d30e"),
            product(4, "Leather Notebook", 32.0, "photo-1531346878377-a5be20888e57"),
            product(5, "Scented Candle", 18.75, "photo-1602874801007-bd458bb1b8b6"),
        ])
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: i64) -> Result<&Product, CoreError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or(CoreError::NotFound {
                entity: "Product",
                id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn price_has_two_decimals() {
        assert_eq!(format_price(12.5), "$12.50");
        assert_eq!(format_price(129.0), "$129.00");
        assert_eq!(format_price(0.999), "$1.00");
    }

    #[test]
    fn product_serializes_camel_case() {
        let product = Product {
            id: 7,
            name: "Mug".into(),
            price: 3.0,
            image_url: "https://example.com/mug.png".into(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["imageUrl"], "https://example.com/mug.png");
    }

    #[test]
    fn catalog_lookup() {
        let catalog = ProductCatalog::demo();
        assert_eq!(catalog.get(2).unwrap().name, "Ceramic Coffee Mug");
        assert_matches!(catalog.get(99), Err(CoreError::NotFound { entity: "Product", .. }));
    }
}
