//! Currency table used for challenge prize pools and partner budgets.
//!
//! Conversion goes through USD using the static reference rates below.
//! Amounts are rounded to the target currency's minor units.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Supported display currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Inr,
    Jpy,
}

/// Currency used when a record carries no explicit currency.
pub const DEFAULT_CURRENCY: Currency = Currency::Usd;

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Inr,
        Currency::Jpy,
    ];

    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Inr => "₹",
            Currency::Jpy => "¥",
        }
    }

    /// Number of digits after the decimal separator.
    pub fn minor_units(self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Value of one unit of this currency in USD.
    pub fn usd_rate(self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Eur => 1.08,
            Currency::Gbp => 1.27,
            Currency::Inr => 0.012,
            Currency::Jpy => 0.0067,
        }
    }

    fn round(self, amount: f64) -> f64 {
        let factor = 10f64.powi(self.minor_units() as i32);
        (amount * factor).round() / factor
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| CoreError::Validation(format!("Unsupported currency: {s}")))
    }
}

/// Convert `amount` from one currency to another, rounded to the target's
/// minor units.
pub fn convert(amount: f64, from: Currency, to: Currency) -> f64 {
    if from == to {
        return to.round(amount);
    }
    to.round(amount * from.usd_rate() / to.usd_rate())
}

/// Render an amount with the currency symbol and thousands separators,
/// e.g. `$1,234.50` or `-¥1,235`.
pub fn format_amount(amount: f64, currency: Currency) -> String {
    let minor = currency.minor_units();
    let factor = 10u64.pow(minor);
    let scaled = (amount.abs() * factor as f64).round() as u64;
    let whole = scaled / factor;
    let fraction = scaled % factor;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && scaled > 0 { "-" } else { "" };
    if minor == 0 {
        format!("{sign}{}{grouped}", currency.symbol())
    } else {
        format!(
            "{sign}{}{grouped}.{fraction:0width$}",
            currency.symbol(),
            width = minor as usize
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
