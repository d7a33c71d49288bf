// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Fixed-rate currency conversion

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies the shop prices in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Ukrainian hryvnia
    Uah,
    /// US dollar
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    /// ISO code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Uah => "UAH",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uah" | "₴" | "грн" => Ok(Self::Uah),
            "usd" | "$" => Ok(Self::Usd),
            "eur" | "€" => Ok(Self::Eur),
            other => Err(format!("Unknown currency: {other}. Valid: uah, usd, eur")),
        }
    }
}

/// Exchange rates, all expressed against UAH
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    /// UAH per 1 USD
    pub usd_to_uah: f64,
    /// UAH per 1 EUR
    pub eur_to_uah: f64,
}

/// Default UAH per USD
pub const USD_TO_UAH: f64 = 41.5;
/// Default UAH per EUR
pub const EUR_TO_UAH: f64 = 45.0;

impl Default for Rates {
    fn default() -> Self {
        Self {
            usd_to_uah: USD_TO_UAH,
            eur_to_uah: EUR_TO_UAH,
        }
    }
}

impl Rates {
    /// UAH value of one unit of `currency`
    #[must_use]
    pub fn uah_per(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Uah => 1.0,
            Currency::Usd => self.usd_to_uah,
            Currency::Eur => self.eur_to_uah,
        }
    }

    /// Convert `amount` between currencies, going through UAH
    #[must_use]
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> f64 {
        if from == to {
            return amount;
        }
        amount * self.uah_per(from) / self.uah_per(to)
    }

    /// Both rates are finite and positive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.usd_to_uah, self.eur_to_uah]
            .iter()
            .all(|r| r.is_finite() && *r > 0.0)
    }
}

/// Render an amount as `1,234.50 UAH`
#[must_use]
pub fn format_amount(amount: f64, currency: Currency) -> String {
    format!("{} {}", group_thousands(amount), currency.code())
}

/// Render an optional amount, `—` when absent
#[must_use]
pub fn format_optional(amount: Option<f64>, currency: Currency) -> String {
    amount.map_or_else(|| "—".to_string(), |a| format_amount(a, currency))
}

fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_same_currency_is_identity() {
        let rates = Rates::default();
        assert_eq!(rates.convert(123.45, Currency::Eur, Currency::Eur), 123.45);
    }

    #[test]
    fn test_convert_usd_to_uah() {
        let rates = Rates::default();
        let uah = rates.convert(100.0, Currency::Usd, Currency::Uah);
        assert!((uah - 4150.0).abs() < 1e-9);
    }

    #[test]
    fn test_cross_conversion_goes_through_uah() {
        let rates = Rates { usd_to_uah: 40.0, eur_to_uah: 44.0 };
        let eur = rates.convert(110.0, Currency::Usd, Currency::Eur);
        assert!((eur - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!("UAH".parse::<Currency>().unwrap(), Currency::Uah);
        assert_eq!("€".parse::<Currency>().unwrap(), Currency::Eur);
        assert!("gbp".parse::<Currency>().is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.5, Currency::Uah), "1,234.50 UAH");
        assert_eq!(format_amount(999.999, Currency::Usd), "1,000.00 USD");
        assert_eq!(format_amount(12.0, Currency::Eur), "12.00 EUR");
        assert_eq!(format_amount(-1_500_000.0, Currency::Uah), "-1,500,000.00 UAH");
        assert_eq!(format_optional(None, Currency::Uah), "—");
    }

    #[test]
    fn test_invalid_rates() {
        assert!(Rates::default().is_valid());
        assert!(!Rates { usd_to_uah: 0.0, eur_to_uah: 45.0 }.is_valid());
        assert!(!Rates { usd_to_uah: f64::NAN, eur_to_uah: 45.0 }.is_valid());
    }
}
