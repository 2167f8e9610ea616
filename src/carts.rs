//! Carts
//!
//! A cart belongs to exactly one customer. Lines are deduplicated by identity,
//! `(product, customization)`: adding a line that matches an existing one increases
//! its quantity and replaces its uploaded files with the newly supplied list.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    customers::CustomerUuid, customization::Customization, products::ProductUuid,
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart Line UUID
pub type CartLineUuid = TypedUuid<CartLine>;

/// Reference to an uploaded artwork file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(String);

impl FileRef {
    /// Wrap a storage reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The underlying reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors raised by cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities must be at least one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Incrementing the line would overflow its quantity.
    #[error("quantity overflow on line {0}")]
    QuantityOverflow(CartLineUuid),

    /// No line with this UUID exists in the cart.
    #[error("cart line {0} not found")]
    LineNotFound(CartLineUuid),
}

/// Cart Line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub uuid: CartLineUuid,
    pub product: ProductUuid,
    pub quantity: u32,
    pub customization: Customization,
    pub files: Vec<FileRef>,
    pub added_at: Timestamp,
}

impl CartLine {
    /// Whether this line has the given identity.
    pub fn is_same_item(&self, product: ProductUuid, customization: &Customization) -> bool {
        self.product == product && &self.customization == customization
    }
}

/// A line to merge into a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartLine {
    pub product: ProductUuid,
    pub quantity: u32,
    pub customization: Customization,
    pub files: Vec<FileRef>,
}

/// Cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub uuid: CartUuid,
    pub owner: CustomerUuid,
    lines: Vec<CartLine>,
    #[serde(default)]
    revision: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cart {
    /// Create an empty cart for `owner`.
    pub fn new(owner: CustomerUuid, now: Timestamp) -> Self {
        Self {
            uuid: CartUuid::new(),
            owner,
            lines: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of successful mutations since the cart was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self, now: Timestamp) {
        self.revision = self.revision.saturating_add(1);
        self.updated_at = now;
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Find a line by UUID.
    pub fn line(&self, line: CartLineUuid) -> Option<&CartLine> {
        self.lines.iter().find(|candidate| candidate.uuid == line)
    }

    /// Find the line with the given identity.
    pub fn find_item(&self, product: ProductUuid, customization: &Customization) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.is_same_item(product, customization))
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Merge a line into the cart and return the UUID of the affected line.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: the requested quantity is zero.
    /// - [`CartError::QuantityOverflow`]: the merged quantity does not fit.
    pub fn add_line(&mut self, new: NewCartLine, now: Timestamp) -> Result<CartLineUuid, CartError> {
        if new.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let existing = self
            .lines
            .iter_mut()
            .find(|line| line.is_same_item(new.product, &new.customization));

        let uuid = if let Some(line) = existing {
            line.quantity = line
                .quantity
                .checked_add(new.quantity)
                .ok_or(CartError::QuantityOverflow(line.uuid))?;
            line.files = new.files;

            line.uuid
        } else {
            let uuid = CartLineUuid::new();

            self.lines.push(CartLine {
                uuid,
                product: new.product,
                quantity: new.quantity,
                customization: new.customization,
                files: new.files,
                added_at: now,
            });

            uuid
        };

        self.touch(now);

        Ok(uuid)
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: `quantity` is zero; use [`Cart::remove_line`].
    /// - [`CartError::LineNotFound`]: the line does not exist.
    pub fn update_quantity(
        &mut self,
        line: CartLineUuid,
        quantity: u32,
        now: Timestamp,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let target = self
            .lines
            .iter_mut()
            .find(|candidate| candidate.uuid == line)
            .ok_or(CartError::LineNotFound(line))?;

        target.quantity = quantity;
        self.touch(now);

        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line does not exist.
    pub fn remove_line(&mut self, line: CartLineUuid, now: Timestamp) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|candidate| candidate.uuid == line)
            .ok_or(CartError::LineNotFound(line))?;

        let removed = self.lines.remove(index);
        self.touch(now);

        Ok(removed)
    }
}
