//! Currency text parsing.
//!
//! Extraction runs in three stages so each can be tested on its own:
//! [`locate`] finds the first pattern match, [`normalize`] strips it down to
//! a bare numeral, and [`parse_normalized`] converts that numeral into
//! [`Money`]. Any stage that finds nothing usable yields `None`; malformed
//! input never produces a partial or default amount.

use std::str::FromStr;

use lotprice_core::Money;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::EngineError;

/// Largest amount read from page text: 10^15. Anything above it is treated
/// as a scrape artefact rather than a price.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// A compiled pattern describing how a currency-tagged number appears in
/// page text, e.g. `£[\d,]+(?:\.\d{2})?`.
#[derive(Debug, Clone)]
pub struct AmountPattern {
    regex: Regex,
}

impl AmountPattern {
    /// Compiles `pattern`. `context` names the profile field for error messages.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn new(pattern: &str, context: &str) -> Result<Self, EngineError> {
        let regex = Regex::new(pattern).map_err(|source| EngineError::InvalidPattern {
            context: context.to_owned(),
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self { regex })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Every match in `text`, left to right.
    pub fn find_all<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.regex.find_iter(text).map(|m| m.as_str())
    }
}

/// Returns the first substring of `text` matching `pattern`.
#[must_use]
pub fn locate<'t>(text: &'t str, pattern: &AmountPattern) -> Option<&'t str> {
    pattern.regex.find(text).map(|m| m.as_str())
}

/// Drops every character that is not an ASCII digit or `.`.
///
/// Currency symbols and thousands separators are removed, not validated.
#[must_use]
pub fn normalize(matched: &str) -> String {
    matched
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Parses a normalized numeral. Empty strings, a lone `.`, numerals with
/// more than one decimal point, and values above [`MAX_AMOUNT`] are rejected.
#[must_use]
pub fn parse_normalized(numeral: &str) -> Option<Money> {
    if !numeral.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if numeral.bytes().filter(|&b| b == b'.').count() > 1 {
        return None;
    }
    let value = Decimal::from_str(numeral).ok()?;
    if value > MAX_AMOUNT {
        tracing::debug!(numeral, "amount above ceiling ignored");
        return None;
    }
    Money::new(value)
}

/// Extracts the first amount in `text` that matches `pattern`.
///
/// Returns `None` when `text` is absent or empty, when nothing matches, or
/// when the match does not reduce to a valid number.
#[must_use]
pub fn parse_amount(text: Option<&str>, pattern: &AmountPattern) -> Option<Money> {
    let text = text?;
    let matched = locate(text, pattern)?;
    parse_normalized(&normalize(matched))
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
