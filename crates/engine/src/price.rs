//! Purchase-price parsing.
//!
//! Prices arrive as free text from a form field that tolerates a currency
//! glyph, grouping spaces and either decimal separator. All monetary values
//! are [`Decimal`] to avoid floating-point drift.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{EngineError, ResultEngine};

/// Parses raw price text into an optional decimal amount.
///
/// The ruble glyph and all whitespace are stripped first. An empty result
/// means "no price". Otherwise the text is parsed with a comma decimal
/// separator, then with a dot separator; if neither succeeds the input is
/// rejected with [`EngineError::Format`].
///
/// ```rust
/// use rust_decimal::Decimal;
///
/// let price = engine::parse_price("12 345,67 ₽").unwrap();
/// assert_eq!(price, Some(Decimal::new(12_345_67, 2)));
/// assert_eq!(engine::parse_price("  ").unwrap(), None);
/// assert!(engine::parse_price("abc").is_err());
/// ```
pub fn parse_price(input: &str) -> ResultEngine<Option<Decimal>> {
    let cleaned: String = input
        .chars()
        .filter(|c| *c != '₽' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }

    let comma_as_dot = cleaned.replace(',', ".");
    Decimal::from_str(&comma_as_dot)
        .or_else(|_| Decimal::from_str(&cleaned))
        .map(Some)
        .map_err(|_| EngineError::Format(format!("invalid price: {}", input.trim())))
}
