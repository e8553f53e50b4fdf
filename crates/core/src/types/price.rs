//! Money amounts using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A money amount with currency information.
///
/// The backend reports bare numbers; the currency is a storefront setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the storefront's default currency.
    #[must_use]
    pub fn of(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::default())
    }

    /// Format for display with thousands separators (e.g. `350,000 ₫`, `$19.99`).
    #[must_use]
    pub fn display(&self) -> String {
        let scale = self.currency_code.minor_digits();
        let rounded = self.amount.round_dp(scale);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.*}", scale as usize, rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
        let grouped = group_thousands(int_part);
        let number = if frac_part.is_empty() {
            grouped
        } else {
            format!("{grouped}.{frac_part}")
        };
        let sign = if negative { "-" } else { "" };

        match self.currency_code {
            CurrencyCode::VND => format!("{sign}{number} ₫"),
            CurrencyCode::USD => format!("{sign}${number}"),
            CurrencyCode::EUR => format!("{sign}€{number}"),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `,` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    VND,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Digits after the decimal point used for display.
    #[must_use]
    pub const fn minor_digits(self) -> u32 {
        match self {
            Self::VND => 0,
            Self::USD | Self::EUR => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_vnd_groups_thousands() {
        let price = Price::new(Decimal::new(1_250_000, 0), CurrencyCode::VND);
        assert_eq!(price.display(), "1,250,000 ₫");
    }

    #[test]
    fn test_display_usd_keeps_cents() {
        let price = Price::new(Decimal::new(199_999, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "$1,999.99");
    }

    #[test]
    fn test_display_small_and_negative() {
        assert_eq!(Price::of(Decimal::ZERO).display(), "0 ₫");
        assert_eq!(
            Price::new(Decimal::new(-4500, 0), CurrencyCode::VND).display(),
            "-4,500 ₫"
        );
    }
}
