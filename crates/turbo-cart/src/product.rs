//! Catalog and stock records returned by the backend.

use crate::ids::ProductId;
use crate::price::Price;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A catalog product record.
///
/// Fields the storefront does not model are kept in `extra` so a record
/// copied into the cart serializes back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price exactly as the catalog sent it.
    pub price: Number,
    /// Image URL.
    pub image: String,
    /// Any further catalog fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Create a product with no extra fields.
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: impl Into<Number>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price: price.into(),
            image: image.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Unit price in cents, `None` if the catalog value does not fit.
    pub fn unit_price(&self) -> Option<Price> {
        Price::from_number(&self.price)
    }
}

/// Stock ceiling for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Product identifier.
    pub id: ProductId,
    /// Maximum purchasable quantity.
    pub amount: u32,
}

impl Stock {
    /// Create a stock record.
    pub fn new(id: ProductId, amount: u32) -> Self {
        Self { id, amount }
    }

    /// Whether `quantity` units can be bought.
    pub fn allows(&self, quantity: u64) -> bool {
        quantity <= u64::from(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_keeps_unknown_fields() {
        let json = r#"{"id":2,"title":"Tênis VR Caminhada","price":139.9,"image":"https://img/2.jpg","brand":"VR"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(2));
        assert_eq!(product.unit_price(), Some(Price::from_cents(13990)));
        assert_eq!(product.extra.get("brand"), Some(&serde_json::json!("VR")));

        let back: serde_json::Value = serde_json::to_value(&product).unwrap();
        assert_eq!(back["brand"], "VR");
        assert_eq!(back["title"], "Tênis VR Caminhada");
    }

    #[test]
    fn test_product_price_is_kept_verbatim() {
        for json in [
            r#"{"id":1,"title":"t","price":19.999,"image":"i"}"#,
            r#"{"id":1,"title":"t","price":200,"image":"i"}"#,
            r#"{"id":1,"title":"t","price":1e300,"image":"i"}"#,
        ] {
            let product: Product = serde_json::from_str(json).unwrap();
            let back = serde_json::to_string(&product).unwrap();
            let reparsed: serde_json::Value = serde_json::from_str(&back).unwrap();
            let original: serde_json::Value = serde_json::from_str(json).unwrap();
            assert_eq!(reparsed, original);
        }

        let product: Product =
            serde_json::from_str(r#"{"id":1,"title":"t","price":1e300,"image":"i"}"#).unwrap();
        assert_eq!(product.unit_price(), None);
    }

    #[test]
    fn test_product_missing_title_is_rejected() {
        let result: Result<Product, _> = serde_json::from_str(r#"{"id":2,"price":1,"image":""}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_stock_allows() {
        let stock = Stock::new(ProductId::new(1), 3);
        assert!(stock.allows(3));
        assert!(!stock.allows(4));
    }

    #[test]
    fn test_stock_parses() {
        let stock: Stock = serde_json::from_str(r#"{"id":1,"amount":3}"#).unwrap();
        assert_eq!(stock, Stock::new(ProductId::new(1), 3));
        let negative: Result<Stock, _> = serde_json::from_str(r#"{"id":1,"amount":-1}"#);
        assert!(negative.is_err());
    }
}
