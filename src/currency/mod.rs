use std::{collections::HashMap, fmt, str::FromStr};

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{ConversionWarning, ValidationError};

/// ISO 4217 style currency code: exactly three ASCII letters, stored uppercase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        if code.chars().count() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(ValidationError::InvalidCurrencyCode(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Currency::default().code()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl From<Currency> for CurrencyCode {
    fn from(currency: Currency) -> Self {
        currency.code()
    }
}

/// Currencies a user may pick as the base for aggregated totals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    GBP,
    USD,
    EUR,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::GBP, Currency::USD, Currency::EUR];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::GBP => "GBP",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }

    pub fn code(&self) -> CurrencyCode {
        CurrencyCode(self.as_str().to_string())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = CurrencyCode::parse(value.trim())?;
        Currency::ALL
            .into_iter()
            .find(|currency| currency.as_str() == code.as_str())
            .ok_or_else(|| ValidationError::UnsupportedCurrency(code.to_string()))
    }
}

/// Reference currency every conversion is routed through.
pub const PIVOT: Currency = Currency::GBP;

static STANDARD_TABLE: Lazy<FxTable> = Lazy::new(|| {
    FxTable::new(PIVOT.code())
        .with_rate(Currency::GBP.code(), Decimal::ONE)
        .with_rate(Currency::USD.code(), Decimal::new(79, 2))
        .with_rate(Currency::EUR.code(), Decimal::new(86, 2))
});

/// Static table of rates into the pivot currency.
///
/// The table holds no mutable state once built and can be shared freely
/// between readers.
#[derive(Debug, Clone, PartialEq)]
pub struct FxTable {
    pivot: CurrencyCode,
    to_pivot: HashMap<CurrencyCode, Decimal>,
}

impl FxTable {
    pub fn new(pivot: CurrencyCode) -> Self {
        Self {
            pivot,
            to_pivot: HashMap::new(),
        }
    }

    /// The built-in table: GBP pivot, USD 0.79, EUR 0.86.
    pub fn standard() -> &'static FxTable {
        &STANDARD_TABLE
    }

    pub fn with_rate(mut self, code: CurrencyCode, rate_to_pivot: Decimal) -> Self {
        self.to_pivot.insert(code, rate_to_pivot);
        self
    }

    pub fn pivot(&self) -> &CurrencyCode {
        &self.pivot
    }

    pub fn rate_to_pivot(&self, code: &str) -> Option<Decimal> {
        let key = CurrencyCode(code.to_ascii_uppercase());
        self.to_pivot.get(&key).copied()
    }

    pub fn supports(&self, code: &str) -> bool {
        self.rate_to_pivot(code).is_some()
    }

    /// Converts `amount` from `from` into `to`, failing when either rate is
    /// missing from the table or the result does not fit in a `Decimal`.
    pub fn try_convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Decimal, ConversionWarning> {
        let source = self
            .rate_to_pivot(from)
            .ok_or_else(|| ConversionWarning::MissingRate(from.to_ascii_uppercase()))?;
        let target = self
            .rate_to_pivot(to)
            .ok_or_else(|| ConversionWarning::MissingRate(to.to_ascii_uppercase()))?;
        if from.eq_ignore_ascii_case(to) {
            return Ok(amount);
        }
        if target.is_zero() {
            return Err(ConversionWarning::MissingRate(to.to_ascii_uppercase()));
        }
        amount
            .checked_mul(source)
            .and_then(|in_pivot| in_pivot.checked_div(target))
            .ok_or_else(|| ConversionWarning::Overflow {
                amount,
                from: from.to_ascii_uppercase(),
                to: to.to_ascii_uppercase(),
            })
    }

    /// Converts `amount`, returning it unchanged and logging a warning when
    /// the conversion fails.
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Decimal {
        match self.try_convert(amount, from, to) {
            Ok(converted) => converted,
            Err(warning) => {
                tracing::warn!(%amount, from, to, "{warning}; returning amount unconverted");
                amount
            }
        }
    }
}

pub fn symbol_for(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "USD" => "$".into(),
        "GBP" => "£".into(),
        "EUR" => "€".into(),
        other => other.into(),
    }
}
