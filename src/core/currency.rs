//! Fiat currency selection and display precision rules

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The fiat display currency. The reference currency for cost/value math is
/// always BTC; this only selects which fiat-denominated ticker fields are
/// read and which symbol is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fiat {
    Eur,
    Usd,
}

impl Fiat {
    /// Resolves a configured currency code. Unknown codes fall back to USD.
    pub fn from_code(code: &str) -> Self {
        match code.to_uppercase().as_str() {
            "EUR" => Fiat::Eur,
            _ => Fiat::Usd,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Fiat::Eur => "EUR",
            Fiat::Usd => "USD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Fiat::Eur => "€",
            Fiat::Usd => "$",
        }
    }
}

impl Display for Fiat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The currency a holding's acquisition cost is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCurrency {
    #[default]
    Btc,
    Fiat,
}

/// Display precision derived from the configured price ceiling.
///
/// Prices below the ceiling are small enough that low-order digits matter,
/// so they get two extra fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalPolicy {
    pub base_precision: usize,
    pub fine_precision: usize,
}

impl DecimalPolicy {
    pub fn from_max_price(max_price: f64) -> Self {
        let repr = format!("{max_price}");
        let base_precision = repr.split('.').nth(1).map_or(0, str::len);
        DecimalPolicy {
            base_precision,
            fine_precision: base_precision + 2,
        }
    }

    /// Fractional digits to use when displaying `price` against the ceiling.
    pub fn for_price(&self, price: f64, max_price: f64) -> usize {
        if price < max_price {
            self.fine_precision
        } else {
            self.base_precision
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fiat_from_code() {
        assert_eq!(Fiat::from_code("EUR"), Fiat::Eur);
        assert_eq!(Fiat::from_code("eur"), Fiat::Eur);
        assert_eq!(Fiat::from_code("USD"), Fiat::Usd);
        // Unknown codes alias to the default fiat
        assert_eq!(Fiat::from_code("GBP"), Fiat::Usd);
        assert_eq!(Fiat::from_code(""), Fiat::Usd);
    }

    #[test]
    fn test_fiat_symbols() {
        assert_eq!(Fiat::Eur.symbol(), "€");
        assert_eq!(Fiat::Usd.symbol(), "$");
        assert_eq!(Fiat::Eur.code(), "EUR");
    }

    #[test]
    fn test_decimal_policy_fractional_threshold() {
        let policy = DecimalPolicy::from_max_price(0.015);
        assert_eq!(policy.base_precision, 3);
        assert_eq!(policy.fine_precision, 5);
    }

    #[test]
    fn test_decimal_policy_integral_threshold() {
        let policy = DecimalPolicy::from_max_price(5.0);
        assert_eq!(policy.base_precision, 0);
        assert_eq!(policy.fine_precision, 2);
    }

    #[test]
    fn test_decimal_policy_for_price() {
        let policy = DecimalPolicy::from_max_price(0.015);
        assert_eq!(policy.for_price(0.001, 0.015), 5);
        assert_eq!(policy.for_price(0.015, 0.015), 3);
        assert_eq!(policy.for_price(120.0, 0.015), 3);
    }

    #[test]
    fn test_cost_currency_deserialization() {
        let btc: CostCurrency = serde_yaml::from_str("btc").unwrap();
        assert_eq!(btc, CostCurrency::Btc);
        let fiat: CostCurrency = serde_yaml::from_str("fiat").unwrap();
        assert_eq!(fiat, CostCurrency::Fiat);
    }
}
