//! Cart aggregate and its pure transition function.
//!
//! `CartState::apply` is a reducer: it takes the current state and an action
//! and returns the next state. It performs no I/O, never fails, and always
//! rebuilds the derived totals from the full line list.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::Serialize;

use super::line::CartLine;
use crate::types::LineId;

/// A state transition for the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Merge into the line with the same product and attributes, or append.
    ///
    /// When merging, the existing line keeps its ID and snapshot; only its
    /// quantity grows (saturating at `u32::MAX`).
    Insert(CartLine),
    /// Set a line's quantity, clamped to `1..=u32::MAX`. Unknown IDs are ignored.
    SetQuantity {
        /// Line to update.
        line_id: LineId,
        /// Requested quantity; zero and negatives clamp to one.
        quantity: i64,
    },
    /// Remove a line. Unknown IDs are ignored.
    Remove(LineId),
    /// Drop every line.
    Clear,
    /// Replace all lines (used when loading a persisted mirror).
    Replace(Vec<CartLine>),
}

/// The cart aggregate: lines plus totals derived from them.
///
/// Fields are private so the totals can only be produced by
/// [`CartState::from_lines`], which recomputes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    lines: Vec<CartLine>,
    item_count: u64,
    subtotal: Decimal,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a state from lines, computing `item_count` and `subtotal`.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let item_count = lines.iter().map(|line| u64::from(line.quantity.get())).sum();
        let subtotal = lines.iter().map(CartLine::line_total).sum();
        Self {
            lines,
            item_count,
            subtotal,
        }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of quantities.
    #[must_use]
    pub const fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Sum of `unit_price × quantity`.
    #[must_use]
    pub const fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find a line by ID.
    #[must_use]
    pub fn line(&self, line_id: &LineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == *line_id)
    }

    /// Consume the state, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Apply an action and return the next state.
    #[must_use]
    pub fn apply(self, action: CartAction) -> Self {
        let mut lines = self.lines;

        match action {
            CartAction::Insert(line) => {
                let existing = lines
                    .iter()
                    .position(|existing| existing.is_same_selection(&line.product_id, &line.attributes));

                match existing.and_then(|index| lines.get_mut(index)) {
                    Some(existing) => {
                        existing.quantity = existing.quantity.saturating_add(line.quantity.get());
                    }
                    None => lines.push(line),
                }
            }
            CartAction::SetQuantity { line_id, quantity } => {
                if let Some(line) = lines.iter_mut().find(|line| line.id == line_id) {
                    line.quantity = clamp_quantity(quantity);
                }
            }
            CartAction::Remove(line_id) => lines.retain(|line| line.id != line_id),
            CartAction::Clear => lines.clear(),
            CartAction::Replace(replacement) => lines = replacement,
        }

        Self::from_lines(lines)
    }
}

/// Clamp a requested quantity into `1..=u32::MAX`.
fn clamp_quantity(quantity: i64) -> NonZeroU32 {
    let clamped = quantity.clamp(1, i64::from(u32::MAX));
    u32::try_from(clamped)
        .ok()
        .and_then(NonZeroU32::new)
        .unwrap_or(NonZeroU32::MIN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::ProductSnapshot;
    use crate::types::{Attributes, ProductId};

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn line(product: &str, cents: i64, quantity: u32, attributes: Attributes) -> CartLine {
        let product_id = ProductId::parse(product).unwrap();
        CartLine::new(
            LineId::generate(&product_id),
            product_id,
            ProductSnapshot {
                name: format!("Product {product}"),
                unit_price: Decimal::new(cents, 2),
                image_ref: format!("{product}.png"),
            },
            qty(quantity),
            attributes,
            None,
        )
    }

    fn assert_totals_consistent(state: &CartState) {
        let count: u64 = state.lines().iter().map(|l| u64::from(l.quantity.get())).sum();
        let subtotal: Decimal = state
            .lines()
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity.get()))
            .sum();
        assert_eq!(state.item_count(), count);
        assert_eq!(state.subtotal(), subtotal);
    }

    #[test]
    fn test_empty_state() {
        let state = CartState::empty();
        assert!(state.is_empty());
        assert_eq!(state.item_count(), 0);
        assert_eq!(state.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_insert_single_line() {
        let state = CartState::empty().apply(CartAction::Insert(line(
            "sku-1",
            1000,
            1,
            Attributes::new(),
        )));

        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.lines()[0].product_id.as_str(), "sku-1");
        assert_eq!(state.item_count(), 1);
        assert_eq!(state.subtotal(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_insert_merges_equal_attributes() {
        let medium = Attributes::new().with("size", "M");
        let first = line("p", 1000, 2, medium.clone());
        let first_id = first.id.clone();

        let state = CartState::empty()
            .apply(CartAction::Insert(first))
            .apply(CartAction::Insert(line("p", 1000, 3, medium)));

        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.lines()[0].id, first_id);
        assert_eq!(state.lines()[0].quantity.get(), 5);
        assert_eq!(state.item_count(), 5);
    }

    #[test]
    fn test_insert_distinct_attributes_appends() {
        let state = CartState::empty()
            .apply(CartAction::Insert(line(
                "p",
                1000,
                2,
                Attributes::new().with("size", "M"),
            )))
            .apply(CartAction::Insert(line(
                "p",
                1000,
                3,
                Attributes::new().with("size", "L"),
            )));

        assert_eq!(state.lines().len(), 2);
        assert_eq!(state.item_count(), 5);
    }

    #[test]
    fn test_merge_saturates() {
        let state = CartState::empty()
            .apply(CartAction::Insert(line("p", 100, u32::MAX, Attributes::new())))
            .apply(CartAction::Insert(line("p", 100, 10, Attributes::new())));

        assert_eq!(state.lines()[0].quantity.get(), u32::MAX);
        assert_totals_consistent(&state);
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let item = line("p", 500, 4, Attributes::new());
        let id = item.id.clone();
        let state = CartState::empty().apply(CartAction::Insert(item));

        let zero = state.clone().apply(CartAction::SetQuantity {
            line_id: id.clone(),
            quantity: 0,
        });
        assert_eq!(zero.lines()[0].quantity.get(), 1);

        let negative = state.apply(CartAction::SetQuantity {
            line_id: id,
            quantity: -5,
        });
        assert_eq!(negative.lines()[0].quantity.get(), 1);
        assert_eq!(negative.subtotal(), Decimal::new(500, 2));
    }

    #[test]
    fn test_set_quantity_unknown_line_is_noop() {
        let state = CartState::empty().apply(CartAction::Insert(line("p", 500, 2, Attributes::new())));
        let next = state.clone().apply(CartAction::SetQuantity {
            line_id: LineId::parse("missing").unwrap(),
            quantity: 9,
        });
        assert_eq!(state, next);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let keep = line("a", 100, 1, Attributes::new());
        let drop = line("b", 200, 2, Attributes::new());
        let drop_id = drop.id.clone();
        let state = CartState::empty()
            .apply(CartAction::Insert(keep))
            .apply(CartAction::Insert(drop));

        let once = state.apply(CartAction::Remove(drop_id.clone()));
        let twice = once.clone().apply(CartAction::Remove(drop_id));

        assert_eq!(once, twice);
        assert_eq!(once.lines().len(), 1);
        assert_eq!(once.item_count(), 1);
    }

    #[test]
    fn test_subtotal_is_exact() {
        let state = CartState::empty()
            .apply(CartAction::Insert(line("a", 1000, 2, Attributes::new())))
            .apply(CartAction::Insert(line("b", 500, 3, Attributes::new())));

        assert_eq!(state.subtotal(), Decimal::new(3500, 2));
        assert_eq!(state.item_count(), 5);
    }

    #[test]
    fn test_subtotal_has_no_float_drift() {
        let mut state = CartState::empty();
        for i in 0..10 {
            state = state.apply(CartAction::Insert(line(&format!("p{i}"), 10, 1, Attributes::new())));
        }
        // 10 × 0.10 is exactly 1.00 in decimal arithmetic.
        assert_eq!(state.subtotal(), Decimal::ONE);
    }

    #[test]
    fn test_clear_resets_totals() {
        let state = CartState::empty()
            .apply(CartAction::Insert(line("a", 1000, 2, Attributes::new())))
            .apply(CartAction::Clear);
        assert_eq!(state, CartState::empty());
    }

    #[test]
    fn test_replace_recomputes_totals() {
        let lines = vec![
            line("a", 1000, 2, Attributes::new()),
            line("b", 500, 3, Attributes::new()),
        ];
        let state = CartState::empty().apply(CartAction::Replace(lines.clone()));
        assert_eq!(state, CartState::from_lines(lines));
        assert_eq!(state.subtotal(), Decimal::new(3500, 2));
    }

    #[test]
    fn test_totals_hold_across_mixed_sequence() {
        // Deterministic pseudo-random walk over all actions.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        let mut state = CartState::empty();
        for _ in 0..500 {
            let roll = next();
            let action = match roll % 4 {
                0 | 1 => {
                    let product = format!("p{}", next() % 5);
                    let size = if next() % 2 == 0 { "M" } else { "L" };
                    let cents = i64::try_from(next() % 10_000).unwrap();
                    let quantity = u32::try_from(next() % 5 + 1).unwrap();
                    CartAction::Insert(line(
                        &product,
                        cents,
                        quantity,
                        Attributes::new().with("size", size),
                    ))
                }
                2 if !state.is_empty() => {
                    let index = usize::try_from(next()).unwrap() % state.lines().len();
                    CartAction::SetQuantity {
                        line_id: state.lines()[index].id.clone(),
                        quantity: i64::try_from(next() % 20).unwrap() - 5,
                    }
                }
                3 if !state.is_empty() => {
                    let index = usize::try_from(next()).unwrap() % state.lines().len();
                    CartAction::Remove(state.lines()[index].id.clone())
                }
                _ => CartAction::Remove(LineId::parse("stale").unwrap()),
            };

            state = state.apply(action);
            assert_totals_consistent(&state);
            assert!(state.lines().iter().all(|l| l.quantity.get() >= 1));
        }
    }

    #[test]
    fn test_lines_round_trip_through_json() {
        let state = CartState::empty()
            .apply(CartAction::Insert(line(
                "a",
                1000,
                2,
                Attributes::new().with("color", "red"),
            )))
            .apply(CartAction::Insert(line("b", 500, 3, Attributes::new())));

        let json = serde_json::to_string(state.lines()).unwrap();
        let restored: Vec<CartLine> = serde_json::from_str(&json).unwrap();
        let reloaded = CartState::from_lines(restored);

        assert_eq!(reloaded, state);
        assert_eq!(reloaded.item_count(), 5);
        assert_eq!(reloaded.subtotal(), Decimal::new(3500, 2));
    }

    #[test]
    fn test_persisted_format_uses_camel_case() {
        let state = CartState::empty().apply(CartAction::Insert(line("a", 1000, 1, Attributes::new())));
        let value = serde_json::to_value(&state.lines()[0]).unwrap();

        assert!(value.get("productId").is_some());
        assert!(value.get("unitPrice").is_some());
        assert!(value.get("imageRef").is_some());
        assert!(value.get("variantId").is_some());
    }

    #[test]
    fn test_persisted_zero_quantity_is_rejected() {
        let json = r#"[{"id":"a_1","productId":"a","name":"A","unitPrice":"1.00","imageRef":"","quantity":0}]"#;
        assert!(serde_json::from_str::<Vec<CartLine>>(json).is_err());
    }
}
