//! Cart and order primitives used by server-side checkout.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use super::Money;

/// Catalogue product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Reject non-positive identifiers.
    pub fn new(id: i64) -> Result<Self, CartValidationError> {
        if id <= 0 {
            return Err(CartValidationError::InvalidProductId);
        }
        Ok(Self(id))
    }

    /// Raw identifier.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a completed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Wrap a database identifier.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

/// Validation failures for checkout carts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartValidationError {
    /// No lines were submitted.
    Empty,
    /// A product id is not positive.
    InvalidProductId,
    /// A quantity is zero, negative or too large.
    InvalidQuantity,
}

impl fmt::Display for CartValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "cart must contain at least one item"),
            Self::InvalidProductId => write!(f, "product_id must be a positive integer"),
            Self::InvalidQuantity => write!(f, "quantity must be at least 1"),
        }
    }
}

impl std::error::Error for CartValidationError {}

/// One product and how many units of it to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    /// Product to buy.
    pub product_id: ProductId,
    /// Units; always at least one.
    pub quantity: u32,
}

/// Non-empty cart with one line per product.
///
/// ## Invariants
/// - At least one line.
/// - Every quantity is at least 1.
/// - Product ids are unique and sorted, so row locks are always taken in the
///   same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart(Vec<CartLine>);

impl Cart {
    /// Validate raw `(product_id, quantity)` pairs, merging duplicates.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::Cart;
    ///
    /// let cart = Cart::try_from_pairs([(7, 1), (3, 2), (7, 2)]).unwrap();
    /// let quantities: Vec<_> = cart.lines().iter().map(|l| l.quantity).collect();
    /// assert_eq!(quantities, vec![2, 3]);
    /// ```
    pub fn try_from_pairs(
        pairs: impl IntoIterator<Item = (i64, i64)>,
    ) -> Result<Self, CartValidationError> {
        let mut merged: BTreeMap<ProductId, u32> = BTreeMap::new();
        for (raw_id, raw_quantity) in pairs {
            let product_id = ProductId::new(raw_id)?;
            let quantity = u32::try_from(raw_quantity)
                .ok()
                .filter(|quantity| *quantity >= 1)
                .ok_or(CartValidationError::InvalidQuantity)?;
            let entry = merged.entry(product_id).or_insert(0);
            *entry = entry
                .checked_add(quantity)
                .ok_or(CartValidationError::InvalidQuantity)?;
        }
        if merged.is_empty() {
            return Err(CartValidationError::Empty);
        }
        Ok(Self(
            merged
                .into_iter()
                .map(|(product_id, quantity)| CartLine {
                    product_id,
                    quantity,
                })
                .collect(),
        ))
    }

    /// Lines in submission order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.0
    }

    /// Product ids in ascending order.
    pub fn product_ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.0.iter().map(|line| line.product_id)
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Order identifier.
    pub order_id: OrderId,
    /// Amount charged after discounts.
    pub total: Money,
    /// Balance after the charge.
    pub new_balance: Money,
}
