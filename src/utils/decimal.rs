use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::{ToPrimitive, Zero};

pub trait BigDecimalHelpers {
    fn to_f64_or_zero(&self) -> f64;
    /// Two-decimal rendering used in user facing messages
    fn to_money_string(&self) -> String;
}

impl BigDecimalHelpers for BigDecimal {
    fn to_f64_or_zero(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }

    fn to_money_string(&self) -> String {
        format!("{:.2}", self.to_f64_or_zero())
    }
}

/// Converts a JSON number into a money value using its shortest decimal
/// representation, so `0.1` becomes `0.1` and not the binary expansion.
pub fn money_from_f64(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    BigDecimal::from_str(&value.to_string()).ok()
}

pub fn is_positive(value: &BigDecimal) -> bool {
    value > &BigDecimal::zero()
}
