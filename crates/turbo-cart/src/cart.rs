//! Cart and line item types.

use crate::ids::ProductId;
use crate::price::Price;
use crate::product::Product;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// A product entry in the cart with its quantity.
///
/// Serializes as the product record with an `amount` field merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// The catalog record copied at the time the product was added.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity, at least 1.
    pub amount: u32,
}

impl LineItem {
    /// Create a line item with quantity 1.
    pub fn new(mut product: Product) -> Self {
        // The merged `amount` wins over anything the catalog sent.
        product.extra.remove("amount");
        Self { product, amount: 1 }
    }

    /// Product identifier.
    pub fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity, `None` on overflow.
    pub fn subtotal(&self) -> Option<Price> {
        self.product.unit_price()?.try_multiply(self.amount)
    }
}

/// A stored cart that violates the cart invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidCart {
    /// The same product appears twice.
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),

    /// A line item has quantity 0.
    #[error("product {0} has zero quantity")]
    ZeroAmount(ProductId),
}

/// Ordered line items, unique by product.
///
/// Serializes as a plain JSON array of line items.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the line items.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Get an item by product.
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id() == product_id)
    }

    /// Check whether the product is in the cart.
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Quantity of a product, if present.
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.get(product_id).map(|i| i.amount)
    }

    /// Append a new item. Returns `false` and leaves the cart untouched if the
    /// product is already present.
    pub fn push(&mut self, item: LineItem) -> bool {
        if self.contains(item.id()) || item.amount == 0 {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Set the quantity of a product.
    ///
    /// A quantity of 0 removes the item. Returns `false` if the product is not
    /// in the cart.
    pub fn set_amount(&mut self, product_id: ProductId, amount: u32) -> bool {
        if amount == 0 {
            return self.remove(product_id).is_some();
        }
        match self.items.iter_mut().find(|i| i.id() == product_id) {
            Some(item) => {
                item.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Remove a product from the cart.
    pub fn remove(&mut self, product_id: ProductId) -> Option<LineItem> {
        let index = self.items.iter().position(|i| i.id() == product_id)?;
        Some(self.items.remove(index))
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units (sum of quantities).
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.amount)).sum()
    }

    /// Sum of line subtotals, `None` on overflow.
    pub fn total(&self) -> Option<Price> {
        self.items
            .iter()
            .try_fold(Price::zero(), |acc, item| acc.try_add(&item.subtotal()?))
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = InvalidCart;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut cart = Cart::new();
        for item in items {
            let id = item.id();
            if item.amount == 0 {
                return Err(InvalidCart::ZeroAmount(id));
            }
            if !cart.push(item) {
                return Err(InvalidCart::DuplicateProduct(id));
            }
        }
        Ok(cart)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, cents: i64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Product {}", id),
            Price::from_cents(cents),
            format!("https://img.example.com/{}.jpg", id),
        )
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Some(Price::zero()));
    }

    #[test]
    fn test_push_keeps_order_and_uniqueness() {
        let mut cart = Cart::new();
        assert!(cart.push(LineItem::new(product(2, 100))));
        assert!(cart.push(LineItem::new(product(1, 100))));
        assert!(!cart.push(LineItem::new(product(2, 100))));

        let ids: Vec<u64> = cart.iter().map(|i| i.id().get()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_set_amount_replaces_quantity() {
        let mut cart = Cart::new();
        cart.push(LineItem::new(product(1, 100)));

        assert!(cart.set_amount(ProductId::new(1), 4));
        assert_eq!(cart.quantity_of(ProductId::new(1)), Some(4));
        assert!(!cart.set_amount(ProductId::new(9), 4));
    }

    #[test]
    fn test_set_amount_zero_removes() {
        let mut cart = Cart::new();
        cart.push(LineItem::new(product(1, 100)));
        assert!(cart.set_amount(ProductId::new(1), 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.push(LineItem::new(product(1, 100)));
        cart.push(LineItem::new(product(2, 100)));

        let removed = cart.remove(ProductId::new(1)).unwrap();
        assert_eq!(removed.id(), ProductId::new(1));
        assert!(cart.remove(ProductId::new(1)).is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        cart.push(LineItem::new(product(1, 17990)));
        cart.push(LineItem::new(product(2, 13990)));
        cart.set_amount(ProductId::new(1), 2);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.unit_count(), 3);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().subtotal().unwrap().cents(), 35980);
        assert_eq!(cart.total().unwrap().cents(), 49970);
    }

    #[test]
    fn test_line_item_drops_catalog_amount() {
        let mut p = product(1, 100);
        p.extra.insert("amount".to_string(), serde_json::json!(12));
        let item = LineItem::new(p);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["amount"], 1);
    }

    #[test]
    fn test_serializes_as_array_of_merged_records() {
        let mut cart = Cart::new();
        cart.push(LineItem::new(product(1, 17990)));

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 1,
                "title": "Product 1",
                "price": 179.9,
                "image": "https://img.example.com/1.jpg",
                "amount": 1
            }])
        );
    }

    #[test]
    fn test_deserialize_rejects_duplicates_and_zero() {
        let dup = r#"[{"id":1,"title":"a","price":1,"image":"","amount":1},
                      {"id":1,"title":"a","price":1,"image":"","amount":2}]"#;
        assert!(serde_json::from_str::<Cart>(dup).is_err());

        let zero = r#"[{"id":1,"title":"a","price":1,"image":"","amount":0}]"#;
        assert!(serde_json::from_str::<Cart>(zero).is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_extra_fields() {
        let stored = r#"[{"id":3,"title":"Tênis Adidas","price":219.9,"image":"https://img/3.jpg","color":"black","amount":2}]"#;
        let cart: Cart = serde_json::from_str(stored).unwrap();
        assert_eq!(cart.quantity_of(ProductId::new(3)), Some(2));

        let again: Cart = serde_json::from_str(&serde_json::to_string(&cart).unwrap()).unwrap();
        assert_eq!(again, cart);
        assert_eq!(again.get(ProductId::new(3)).unwrap().product.extra["color"], "black");
    }
}
