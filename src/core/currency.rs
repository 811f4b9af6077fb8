//! Currency handling for case amounts
//!
//! Cases are denominated in ARS or USD. USD cases carry a USD→ARS exchange
//! rate; ARS values are a display/export projection and are never stored.

use serde::{Deserialize, Serialize};

/// Currency of a case's monetary inputs
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyType {
    #[default]
    Ars,
    Usd,
}

impl CurrencyType {
    /// Display symbol used in front of amounts
    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyType::Ars => "$",
            CurrencyType::Usd => "US$",
        }
    }
}

impl std::fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyType::Ars => write!(f, "ARS"),
            CurrencyType::Usd => write!(f, "USD"),
        }
    }
}

impl std::str::FromStr for CurrencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ARS" => Ok(CurrencyType::Ars),
            "USD" => Ok(CurrencyType::Usd),
            _ => Err(format!("Invalid currency: {}. Use ARS or USD", s)),
        }
    }
}

/// An amount expressed in ARS
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArsAmount {
    /// The case is already in ARS
    Native(f64),
    /// Converted from USD with a valid exchange rate
    Converted(f64),
    /// USD case without a usable exchange rate
    Unavailable,
}

impl ArsAmount {
    /// The ARS value, or `None` when conversion is unavailable
    pub fn value(&self) -> Option<f64> {
        match self {
            ArsAmount::Native(v) | ArsAmount::Converted(v) => Some(*v),
            ArsAmount::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, ArsAmount::Unavailable)
    }
}

/// Express `value` in ARS for the given currency and USD→ARS rate.
///
/// A non-positive (or non-finite) rate on a USD case yields
/// [`ArsAmount::Unavailable`], never zero.
pub fn to_ars(value: f64, currency: CurrencyType, exchange_rate: f64) -> ArsAmount {
    match currency {
        CurrencyType::Ars => ArsAmount::Native(value),
        CurrencyType::Usd if exchange_rate.is_finite() && exchange_rate > 0.0 => {
            ArsAmount::Converted(value * exchange_rate)
        }
        CurrencyType::Usd => ArsAmount::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ars_is_native() {
        assert_eq!(to_ars(150.0, CurrencyType::Ars, 0.0), ArsAmount::Native(150.0));
        assert_eq!(to_ars(150.0, CurrencyType::Ars, 900.0), ArsAmount::Native(150.0));
    }

    #[test]
    fn test_usd_converts_with_rate() {
        assert_eq!(
            to_ars(10.0, CurrencyType::Usd, 1000.0),
            ArsAmount::Converted(10_000.0)
        );
    }

    #[test]
    fn test_usd_without_rate_is_unavailable_not_zero() {
        let amount = to_ars(10.0, CurrencyType::Usd, 0.0);
        assert_eq!(amount, ArsAmount::Unavailable);
        assert_eq!(amount.value(), None);
        assert!(!amount.is_available());
        assert_eq!(to_ars(10.0, CurrencyType::Usd, -5.0), ArsAmount::Unavailable);
        assert_eq!(to_ars(10.0, CurrencyType::Usd, f64::NAN), ArsAmount::Unavailable);
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("usd".parse::<CurrencyType>().unwrap(), CurrencyType::Usd);
        assert!("EUR".parse::<CurrencyType>().is_err());
    }
}
