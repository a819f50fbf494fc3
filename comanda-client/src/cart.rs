//! Cart model
//!
//! Lines are keyed by product code plus the sorted add-on codes, so the
//! same product with the same add-ons merges into one line and any other
//! combination is a separate line. Lines keep insertion order.
//!
//! Amounts here are exact; rounding to cents happens when the order is
//! assembled.

use crate::error::CartError;
use shared::Decimal;
use shared::models::{AddOnGroup, AddOnOption, Product};

/// Cart line key: product code, then sorted add-on codes, `|`-joined.
/// A `\` or `|` inside a code is backslash-escaped.
pub fn line_key(product_code: &str, add_ons: &[AddOnOption]) -> String {
    let mut codes: Vec<&str> = add_ons.iter().map(|a| a.code.as_str()).collect();
    codes.sort_unstable();
    std::iter::once(product_code)
        .chain(codes)
        .map(escape_key_part)
        .collect::<Vec<_>>()
        .join("|")
}

fn escape_key_part(part: &str) -> String {
    part.replace('\\', "\\\\").replace('|', "\\|")
}

/// Check a selection against every group's bounds
pub fn validate_selection(groups: &[AddOnGroup], selected: &[AddOnOption]) -> Result<(), CartError> {
    if let Some(unknown) = selected
        .iter()
        .find(|option| !groups.iter().any(|g| g.contains(&option.code)))
    {
        return Err(CartError::UnknownAddOn(unknown.code.clone()));
    }

    for group in groups {
        let count = selected.iter().filter(|o| group.contains(&o.code)).count() as u32;
        let required = group.required_selections();
        if count < required {
            return Err(CartError::MissingRequiredAddOns {
                group: group.display_name.clone(),
                required,
                selected: count,
            });
        }
        if let Some(max) = group.max_allowed
            && count > max
        {
            return Err(CartError::TooManyAddOns {
                group: group.display_name.clone(),
                max,
                selected: count,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub key: String,
    pub product: Product,
    pub quantity: u32,
    pub add_ons: Vec<AddOnOption>,
}

impl CartLine {
    /// Product price (zero when unpriced) plus every add-on price
    pub fn unit_price_with_addons(&self) -> Decimal {
        self.product.price() + self.add_ons.iter().map(|a| a.unit_price).sum::<Decimal>()
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price_with_addons() * Decimal::from(self.quantity)
    }
}

/// Snapshot of cart amounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotals {
    /// `(line key, line total)` in cart order
    pub lines: Vec<(String, Decimal)>,
    pub total: Decimal,
}

impl CartTotals {
    pub fn line_total(&self, key: &str) -> Option<Decimal> {
        self.lines.iter().find(|(k, _)| k == key).map(|(_, amount)| *amount)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of a product with the given add-ons; returns the line
    /// key. Quantity 0 changes nothing.
    pub fn add_item(&mut self, product: Product, quantity: u32, add_ons: Vec<AddOnOption>) -> String {
        let key = line_key(&product.code, &add_ons);
        if quantity == 0 {
            return key;
        }

        match self.lines.iter_mut().find(|l| l.key == key) {
            Some(line) => line.quantity += quantity,
            None => {
                tracing::debug!(key = %key, quantity, "New cart line");
                self.lines.push(CartLine {
                    key: key.clone(),
                    product,
                    quantity,
                    add_ons,
                });
            }
        }
        key
    }

    /// [`add_item`](Self::add_item) after checking quantity and add-on bounds
    pub fn add_validated(
        &mut self,
        product: Product,
        quantity: u32,
        add_ons: Vec<AddOnOption>,
        groups: &[AddOnGroup],
    ) -> Result<String, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        validate_selection(groups, &add_ons)?;
        Ok(self.add_item(product, quantity, add_ons))
    }

    /// Add one to an existing line; `false` if the key is unknown
    pub fn increment(&mut self, key: &str) -> bool {
        match self.lines.iter_mut().find(|l| l.key == key) {
            Some(line) => {
                line.quantity += 1;
                true
            }
            None => false,
        }
    }

    /// Take one off a line, deleting it at zero; `false` if the key is unknown
    pub fn remove_one(&mut self, key: &str) -> bool {
        let Some(index) = self.lines.iter().position(|l| l.key == key) else {
            return false;
        };
        let line = &mut self.lines[index];
        line.quantity = line.quantity.saturating_sub(1);
        if line.quantity == 0 {
            self.lines.remove(index);
        }
        true
    }

    pub fn line_total(&self, key: &str) -> Option<Decimal> {
        self.line(key).map(CartLine::line_total)
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Every line total plus the cart total, in one pass
    pub fn totals(&self) -> CartTotals {
        let lines: Vec<(String, Decimal)> = self
            .lines
            .iter()
            .map(|l| (l.key.clone(), l.line_total()))
            .collect();
        let total = lines.iter().map(|(_, amount)| *amount).sum();
        CartTotals { lines, total }
    }

    pub fn line(&self, key: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.key == key)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burger() -> Product {
        Product::new("100", "X-Burger", Some(Decimal::new(1000, 2)))
    }

    fn bacon() -> AddOnOption {
        AddOnOption::new("200", "Bacon", Decimal::new(150, 2))
    }

    fn cheese() -> AddOnOption {
        AddOnOption::new("150", "Queijo", Decimal::new(200, 2))
    }

    #[test]
    fn test_line_key_sorts_addons() {
        assert_eq!(line_key("100", &[]), "100");
        assert_eq!(line_key("100", &[bacon(), cheese()]), "100|150|200");
        assert_eq!(line_key("100", &[cheese(), bacon()]), "100|150|200");
    }

    #[test]
    fn test_separator_in_code_does_not_collide() {
        let mut cart = Cart::new();
        let combo = cart.add_item(Product::new("1|2", "Combo", None), 1, vec![]);
        let burger = cart.add_item(
            Product::new("1", "Burger", None),
            1,
            vec![AddOnOption::new("2", "Bacon", Decimal::ZERO)],
        );

        assert_ne!(combo, burger);
        assert_eq!(combo, "1\\|2");
        assert_eq!(burger, "1|2");
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.line(&combo).unwrap().quantity, 1);
        assert_eq!(cart.line(&burger).unwrap().add_ons.len(), 1);
    }

    #[test]
    fn test_same_key_merges() {
        let mut cart = Cart::new();
        let a = cart.add_item(burger(), 1, vec![bacon(), cheese()]);
        let b = cart.add_item(burger(), 2, vec![cheese(), bacon()]);

        assert_eq!(a, b);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_different_addons_are_new_line() {
        let mut cart = Cart::new();
        cart.add_item(burger(), 1, vec![]);
        cart.add_item(burger(), 1, vec![bacon()]);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Decimal::new(2150, 2));
    }

    #[test]
    fn test_line_total_includes_addons() {
        let mut cart = Cart::new();
        let key = cart.add_item(burger(), 2, vec![bacon()]);

        assert_eq!(cart.line(&key).unwrap().unit_price_with_addons(), Decimal::new(1150, 2));
        assert_eq!(cart.line_total(&key), Some(Decimal::new(2300, 2)));

        let totals = cart.totals();
        assert_eq!(totals.line_total(&key), Some(Decimal::new(2300, 2)));
        assert_eq!(totals.total, Decimal::new(2300, 2));
        assert_eq!(totals.line_total("missing"), None);
    }

    #[test]
    fn test_unpriced_product_counts_zero() {
        let mut cart = Cart::new();
        let key = cart.add_item(Product::new("7", "Água", None), 3, vec![bacon()]);
        assert_eq!(cart.line_total(&key), Some(Decimal::new(450, 2)));
    }

    #[test]
    fn test_remove_one_deletes_at_zero() {
        let mut cart = Cart::new();
        let key = cart.add_item(burger(), 2, vec![]);

        assert!(cart.remove_one(&key));
        assert_eq!(cart.line(&key).unwrap().quantity, 1);
        assert!(cart.remove_one(&key));
        assert!(cart.is_empty());
        assert!(!cart.remove_one(&key));
        assert_eq!(cart.line_total(&key), None);
    }

    #[test]
    fn test_zero_quantity_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(burger(), 0, vec![]);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_increment_and_clear() {
        let mut cart = Cart::new();
        let key = cart.add_item(burger(), 1, vec![]);
        assert!(cart.increment(&key));
        assert!(!cart.increment("missing"));
        assert_eq!(cart.item_count(), 2);

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_validate_selection() {
        let sauces = AddOnGroup::new("Molhos", vec![AddOnOption::new("1", "Ketchup", Decimal::ZERO)], 1, None, false);
        let extras = AddOnGroup::new("Extras", vec![bacon(), cheese()], 0, Some(1), false);
        let groups = vec![sauces, extras];
        let ketchup = groups[0].options[0].clone();

        assert_eq!(
            validate_selection(&groups, &[]),
            Err(CartError::MissingRequiredAddOns {
                group: "Molhos".into(),
                required: 1,
                selected: 0
            })
        );
        assert_eq!(
            validate_selection(&groups, &[ketchup.clone(), bacon(), cheese()]),
            Err(CartError::TooManyAddOns {
                group: "Extras".into(),
                max: 1,
                selected: 2
            })
        );
        assert_eq!(
            validate_selection(&groups, &[AddOnOption::new("999", "?", Decimal::ZERO)]),
            Err(CartError::UnknownAddOn("999".into()))
        );
        assert_eq!(validate_selection(&groups, &[ketchup, bacon()]), Ok(()));
    }

    #[test]
    fn test_add_validated() {
        let groups = vec![AddOnGroup::new("Extras", vec![bacon()], 0, None, true)];
        let mut cart = Cart::new();

        assert_eq!(
            cart.add_validated(burger(), 0, vec![bacon()], &groups),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.add_validated(burger(), 1, vec![], &groups).is_err());
        let key = cart.add_validated(burger(), 1, vec![bacon()], &groups).unwrap();
        assert_eq!(key, "100|200");
    }
}
