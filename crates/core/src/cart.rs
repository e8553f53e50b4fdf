//! Local shopping cart of subscription packages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::views::PackageView;

/// Upper bound on a single line's quantity.
pub const MAX_QUANTITY: u32 = 99;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CartError {
    #[error("package {0} is not available to order")]
    NotOrderable(String),

    #[error("package {0} is not in the cart")]
    NotInCart(String),

    #[error("quantity must be at most {}", MAX_QUANTITY)]
    QuantityTooLarge,
}

/// One package in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub package_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` of a package, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the package is inactive or has no id, or if the
    /// resulting quantity exceeds [`MAX_QUANTITY`].
    pub fn add(&mut self, package: &PackageView, quantity: u32) -> Result<(), CartError> {
        if !package.is_orderable() {
            return Err(CartError::NotOrderable(package.name.clone()));
        }
        if quantity == 0 {
            return Ok(());
        }

        if let Some(line) = self.line_mut(&package.id) {
            let next = line.quantity.saturating_add(quantity);
            if next > MAX_QUANTITY {
                return Err(CartError::QuantityTooLarge);
            }
            line.quantity = next;
            line.unit_price = package.price;
            return Ok(());
        }

        if quantity > MAX_QUANTITY {
            return Err(CartError::QuantityTooLarge);
        }
        self.lines.push(CartLine {
            package_id: package.id.clone(),
            name: package.name.clone(),
            unit_price: package.price,
            quantity,
        });
        Ok(())
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if the package is not in the cart or `quantity`
    /// exceeds [`MAX_QUANTITY`].
    pub fn set_quantity(&mut self, package_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(package_id);
        }
        if quantity > MAX_QUANTITY {
            return Err(CartError::QuantityTooLarge);
        }
        let line = self
            .line_mut(package_id)
            .ok_or_else(|| CartError::NotInCart(package_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the package is not in the cart.
    pub fn remove(&mut self, package_id: &str) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.package_id != package_id);
        if self.lines.len() == before {
            return Err(CartError::NotInCart(package_id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Total number of units across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |n, l| n.saturating_add(l.quantity))
    }

    fn line_mut(&mut self, package_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.package_id == package_id)
    }
}
