use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// Discount-adjusted price per unit, in minor currency units. Integer floor;
/// the same value is frozen onto order lines at checkout.
pub fn discounted_unit_price(price_cents: i64, discount_percent: i32) -> i64 {
    price_cents * (100 - i64::from(discount_percent)) / 100
}

/// One product in a cart: a snapshot of the catalog row plus a quantity.
/// Quantity never drops below 1; removing a product is an explicit operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub brand: String,
    pub price_cents: i64,
    pub discount_percent: i32,
    pub image_url: Option<String>,
    pub quantity: i32,
}

impl CartLine {
    pub fn unit_price_cents(&self) -> i64 {
        discounted_unit_price(self.price_cents, self.discount_percent)
    }

    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents() * i64::from(self.quantity)
    }
}

/// Session-scoped aggregator. Lines keep insertion order; state lives only
/// in process memory and is dropped on checkout success or explicit clear.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Add a product. A product already in the cart gains one unit instead
    /// of a second line.
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
        {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            price_cents: product.price_cents,
            discount_percent: product.discount_percent,
            image_url: product.image_url.clone(),
            quantity: 1,
        });
    }

    /// Set the quantity of a line. Values below 1 clamp to 1; free-text
    /// numeric inputs upstream make zero and negatives reachable.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i32) -> bool {
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity.max(1);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total_cents).sum()
    }
}

/// All live carts, keyed by the session identity. Mutations come one at a
/// time from request handlers; the mutex only guards against interleaving.
#[derive(Clone, Default)]
pub struct CartStore {
    inner: Arc<Mutex<HashMap<Uuid, Cart>>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cart<R>(&self, user_id: Uuid, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut carts = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(carts.entry(user_id).or_default())
    }

    pub fn snapshot(&self, user_id: Uuid) -> Cart {
        self.with_cart(user_id, |cart| cart.clone())
    }

    pub fn clear(&self, user_id: Uuid) {
        let mut carts = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        carts.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(price_cents: i64, discount_percent: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Oud Royale".into(),
            brand: "Maison Test".into(),
            description: "Deep amber oud".into(),
            price_cents,
            discount_percent,
            categories: vec!["oriental".into()],
            image_url: None,
            image_file_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn adding_same_product_twice_merges_into_one_line() {
        let p = product(10_000, 0);
        let mut cart = Cart::default();
        cart.add(&p);
        cart.add(&p);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn subtotal_is_sum_of_discounted_line_totals() {
        let mut cart = Cart::default();
        let a = product(10_000, 0);
        let b = product(5_000, 50);
        cart.add(&a);
        cart.add(&a);
        cart.add(&b);
        cart.set_quantity(b.id, 3);

        // 100.00 * 2 + 25.00 * 3
        assert_eq!(cart.subtotal_cents(), 20_000 + 7_500);
    }

    #[test]
    fn subtotal_scenario_no_discount() {
        let mut cart = Cart::default();
        let p = product(10_000, 0);
        cart.add(&p);
        cart.set_quantity(p.id, 2);
        assert_eq!(cart.subtotal_cents(), 20_000);
    }

    #[test]
    fn subtotal_scenario_half_discount() {
        let mut cart = Cart::default();
        let p = product(5_000, 50);
        cart.add(&p);
        cart.set_quantity(p.id, 3);
        assert_eq!(cart.subtotal_cents(), 7_500);
    }

    #[test]
    fn set_quantity_clamps_below_one() {
        let mut cart = Cart::default();
        let p = product(1_000, 0);
        cart.add(&p);

        assert!(cart.set_quantity(p.id, 0));
        assert_eq!(cart.lines()[0].quantity, 1);

        assert!(cart.set_quantity(p.id, -4));
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn set_quantity_unknown_product_is_a_noop() {
        let mut cart = Cart::default();
        assert!(!cart.set_quantity(Uuid::new_v4(), 2));
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_deletes_the_line() {
        let mut cart = Cart::default();
        let a = product(1_000, 0);
        let b = product(2_000, 0);
        cart.add(&a);
        cart.add(&b);

        assert!(cart.remove(a.id));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product_id, b.id);
        assert!(!cart.remove(a.id));
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = Cart::default();
        cart.add(&product(1_000, 0));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal_cents(), 0);
    }

    #[test]
    fn store_keeps_carts_separate_per_session() {
        let store = CartStore::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let p = product(1_000, 0);

        store.with_cart(alice, |c| c.add(&p));
        assert_eq!(store.snapshot(alice).lines().len(), 1);
        assert!(store.snapshot(bob).is_empty());

        store.clear(alice);
        assert!(store.snapshot(alice).is_empty());
    }
}
