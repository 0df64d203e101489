//! A single cart line.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Attributes, LineId, ProductId, VariantId};

/// Display data for a product, captured when a line is created.
///
/// This is a snapshot: later catalog changes do not flow into existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Product display name.
    pub name: String,
    /// Price of one unit.
    pub unit_price: Decimal,
    /// Primary image reference (URL or path), empty when the product has none.
    pub image_ref: String,
}

/// One distinct product + attribute selection and its quantity.
///
/// Serialized with camelCase keys; this is the persisted mirror format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Unique within the cart.
    pub id: LineId,
    /// External product reference (not owned by the cart).
    pub product_id: ProductId,
    /// Snapshot of the product name.
    pub name: String,
    /// Snapshot of the unit price.
    pub unit_price: Decimal,
    /// Snapshot of the primary image.
    pub image_ref: String,
    /// Always at least one.
    pub quantity: NonZeroU32,
    /// Selection attributes; part of the merge identity.
    #[serde(default)]
    pub attributes: Attributes,
    /// Specific stock-keeping variant, if chosen.
    #[serde(default)]
    pub variant_id: Option<VariantId>,
}

impl CartLine {
    /// Build a new line from a product snapshot.
    #[must_use]
    pub fn new(
        id: LineId,
        product_id: ProductId,
        snapshot: ProductSnapshot,
        quantity: NonZeroU32,
        attributes: Attributes,
        variant_id: Option<VariantId>,
    ) -> Self {
        Self {
            id,
            product_id,
            name: snapshot.name,
            unit_price: snapshot.unit_price,
            image_ref: snapshot.image_ref,
            quantity,
            attributes,
            variant_id,
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity.get())
    }

    /// Whether this line holds the given product with exactly these attributes.
    #[must_use]
    pub fn is_same_selection(&self, product_id: &ProductId, attributes: &Attributes) -> bool {
        self.product_id == *product_id && self.attributes == *attributes
    }
}
